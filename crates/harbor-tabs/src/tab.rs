//! Tab data structure
//!
//! A tab shows:
//! - Favicon (or a loading indicator)
//! - Title
//! - The last navigated location

use serde::{Deserialize, Serialize};

use crate::state::SecurityState;

/// Title until the surface reports one
pub const DEFAULT_TITLE: &str = "New Tab";
/// Title shown when the surface reports an empty one
pub const UNTITLED: &str = "Untitled";

/// Process-unique tab identifier. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(u64);

impl TabId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: TabId,
    /// Last known location, internal pages already normalized
    pub url: String,
    pub title: String,
    pub favicon: Option<String>,
    /// Between "navigation started" and "navigation stopped"
    pub loading: bool,
}

impl Tab {
    pub fn new(id: TabId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            title: DEFAULT_TITLE.to_string(),
            favicon: None,
            loading: false,
        }
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = if title.is_empty() {
            UNTITLED.to_string()
        } else {
            title.to_string()
        };
    }

    pub fn set_favicon(&mut self, favicon: Option<String>) {
        self.favicon = favicon;
    }

    /// Starting a load drops the previous page's favicon.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        if loading {
            self.favicon = None;
        }
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// Favicon the chrome should render; hidden behind the spinner while loading.
    pub fn display_favicon(&self) -> Option<&str> {
        if self.loading {
            None
        } else {
            self.favicon.as_deref()
        }
    }

    pub fn security(&self) -> SecurityState {
        SecurityState::for_url(&self.url)
    }
}
