//! Rendering surface contract
//!
//! A surface is the embedded rendering context behind one tab. The core only
//! sees it through [`Surface`] (commands out) and [`SurfaceEvent`] (lifecycle
//! events in).

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::TabError;
use crate::tab::TabId;
use crate::Result;

/// Load failure code meaning "aborted by another navigation"
pub const ERR_ABORTED: i32 = -3;

/// Lifecycle events a surface reports for its tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SurfaceEvent {
    /// First content is ready; navigation history may be queried from now on
    DomReady,
    NavigationStarted,
    NavigationStopped,
    TitleUpdated {
        title: String,
    },
    FaviconUpdated {
        favicons: Vec<String>,
    },
    Navigated {
        url: String,
    },
    NavigatedInPage {
        url: String,
    },
    /// Cancelable: the core may veto it
    WillNavigate {
        url: String,
    },
    NewWindowRequested {
        url: String,
    },
    LoadFailed {
        #[serde(rename = "errorCode")]
        error_code: i32,
        description: String,
    },
}

/// Commands sent to a surface. Mirrors the [`Surface`] methods so a remote
/// surface can forward them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SurfaceCommand {
    Open { url: String },
    Load { url: String },
    Back,
    Forward,
    Reload,
    Close,
}

pub trait Surface: Send {
    fn load_url(&mut self, url: &str) -> Result<()>;
    /// Location the surface currently shows (raw, not normalized)
    fn current_url(&self) -> Option<String>;
    fn can_go_back(&self) -> bool;
    fn can_go_forward(&self) -> bool;
    fn go_back(&mut self) -> Result<()>;
    fn go_forward(&mut self) -> Result<()>;
    fn reload(&mut self) -> Result<()>;

    /// The surface navigated on its own (link, redirect, in-page anchor).
    /// Engines that track their own history ignore this.
    fn record_navigation(&mut self, _url: &str) {}

    /// The tab is going away.
    fn close(&mut self) {}
}

pub trait SurfaceFactory: Send {
    fn create(&mut self, tab_id: TabId, url: &str) -> Box<dyn Surface>;
}

pub type CommandSink = Arc<dyn Fn(TabId, SurfaceCommand) + Send + Sync>;

/// A surface without a renderer: keeps its own back/forward list and
/// reports every command to an optional sink.
pub struct HeadlessSurface {
    tab_id: TabId,
    history: Vec<String>,
    index: usize,
    sink: Option<CommandSink>,
    closed: bool,
}

impl HeadlessSurface {
    pub fn new(tab_id: TabId, url: &str, sink: Option<CommandSink>) -> Self {
        let surface = Self {
            tab_id,
            history: vec![url.to_string()],
            index: 0,
            sink,
            closed: false,
        };
        surface.emit(SurfaceCommand::Open {
            url: url.to_string(),
        });
        surface
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    fn emit(&self, command: SurfaceCommand) {
        if let Some(sink) = &self.sink {
            sink(self.tab_id, command);
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(TabError::Detached(self.tab_id))
        } else {
            Ok(())
        }
    }

    fn push_entry(&mut self, url: &str) {
        self.history.truncate(self.index + 1);
        self.history.push(url.to_string());
        self.index = self.history.len() - 1;
    }
}

impl Surface for HeadlessSurface {
    fn load_url(&mut self, url: &str) -> Result<()> {
        self.ensure_open()?;
        if url.is_empty() {
            return Err(TabError::InvalidUrl("URL cannot be empty".to_string()));
        }

        self.push_entry(url);
        self.emit(SurfaceCommand::Load {
            url: url.to_string(),
        });
        Ok(())
    }

    fn current_url(&self) -> Option<String> {
        self.history.get(self.index).cloned()
    }

    fn can_go_back(&self) -> bool {
        !self.closed && self.index > 0
    }

    fn can_go_forward(&self) -> bool {
        !self.closed && self.index + 1 < self.history.len()
    }

    fn go_back(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.index == 0 {
            return Err(TabError::Rejected {
                command: "back".to_string(),
                reason: "no earlier entry".to_string(),
            });
        }

        self.index -= 1;
        self.emit(SurfaceCommand::Back);
        Ok(())
    }

    fn go_forward(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.index + 1 >= self.history.len() {
            return Err(TabError::Rejected {
                command: "forward".to_string(),
                reason: "no later entry".to_string(),
            });
        }

        self.index += 1;
        self.emit(SurfaceCommand::Forward);
        Ok(())
    }

    fn reload(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.emit(SurfaceCommand::Reload);
        Ok(())
    }

    fn record_navigation(&mut self, url: &str) {
        if self.closed || self.current_url().as_deref() == Some(url) {
            return;
        }
        // Back/forward land on entries we already hold
        if self.index > 0 && self.history[self.index - 1] == url {
            self.index -= 1;
        } else if self.history.get(self.index + 1).map(String::as_str) == Some(url) {
            self.index += 1;
        } else {
            self.push_entry(url);
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.emit(SurfaceCommand::Close);
        }
    }
}

#[derive(Default)]
pub struct HeadlessFactory {
    sink: Option<CommandSink>,
}

impl HeadlessFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(sink: CommandSink) -> Self {
        Self { sink: Some(sink) }
    }
}

impl SurfaceFactory for HeadlessFactory {
    fn create(&mut self, tab_id: TabId, url: &str) -> Box<dyn Surface> {
        Box::new(HeadlessSurface::new(tab_id, url, self.sink.clone()))
    }
}
