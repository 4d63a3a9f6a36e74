//! Shell event loop
//!
//! One task owns the [`Session`] and applies inbound messages strictly one
//! after another. Everything outbound is fire-and-forget.

use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use harbor_session::{EventVerdict, HostCommand, Session};
use harbor_storage::{Database, MemoryStore, SharedStore};
use harbor_tabs::{CommandSink, HeadlessFactory};

use crate::bridge::{decode_inbound, InboundMessage, OutboundMessage, SurfaceEventMessage};
use crate::config::Config;
use crate::Result;

pub struct Shell {
    session: Session,
    host_commands: UnboundedReceiver<HostCommand>,
    outbound: UnboundedSender<OutboundMessage>,
    log_diagnostics: bool,
    processed: u64,
}

impl Shell {
    /// Open the configured store and start a session.
    ///
    /// An unusable database degrades to an in-memory store.
    pub fn new(
        config: &Config,
        outbound: UnboundedSender<OutboundMessage>,
        log_diagnostics: bool,
    ) -> Result<Self> {
        let store: SharedStore = match open_database(config) {
            Ok(db) => Arc::new(db),
            Err(e) => {
                tracing::warn!(
                    path = %config.database_path.display(),
                    error = %e,
                    "Database unavailable, history will not persist"
                );
                MemoryStore::new().shared()
            }
        };
        Self::with_store(config, store, outbound, log_diagnostics)
    }

    pub fn with_store(
        config: &Config,
        store: SharedStore,
        outbound: UnboundedSender<OutboundMessage>,
        log_diagnostics: bool,
    ) -> Result<Self> {
        let (host_tx, host_rx) = unbounded_channel();
        let factory = HeadlessFactory::with_sink(surface_sink(outbound.clone()));
        let session = Session::new(Box::new(factory), store, config.session_options(), host_tx)?;

        tracing::info!(
            download_dir = %config.download_dir.display(),
            log_diagnostics,
            "Shell started"
        );

        Ok(Self {
            session,
            host_commands: host_rx,
            outbound,
            log_diagnostics,
            processed: 0,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Decode and apply one line of bridge input.
    pub fn handle_line(&mut self, line: &str) {
        if let Some(message) = decode_inbound(line) {
            self.handle(message);
        }
    }

    /// Apply one inbound message to completion.
    pub fn handle(&mut self, message: InboundMessage) {
        let channel = message.channel();
        match message {
            InboundMessage::DownloadItem(snapshot) => {
                let outcome = self.session.handle_download_snapshot(snapshot);
                tracing::trace!(?outcome, "Download snapshot applied");
            }
            InboundMessage::SurfaceEvent(SurfaceEventMessage { tab_id, event }) => {
                let vetoed_url = match &event {
                    harbor_tabs::SurfaceEvent::WillNavigate { url } => Some(url.clone()),
                    _ => None,
                };
                let verdict = self.session.handle_surface_event(tab_id, event);
                if let (EventVerdict::Prevent, Some(url)) = (verdict, vetoed_url) {
                    self.emit(OutboundMessage::NavigationPrevented { tab_id, url });
                }
            }
            InboundMessage::UserCommand(command) => self.session.execute(command),
        }

        while let Ok(command) = self.host_commands.try_recv() {
            self.emit(command.into());
        }

        self.processed += 1;
        if self.log_diagnostics {
            let diagnostics = self.session.diagnostics();
            tracing::debug!(
                channel,
                processed = self.processed,
                tabs = diagnostics.tab_count,
                active_tab = ?diagnostics.active_tab,
                live_downloads = diagnostics.live_downloads,
                archived_downloads = diagnostics.archived_downloads,
                "Diagnostics"
            );
        }
    }

    /// Process lines until the inbound channel closes.
    pub async fn run(mut self, mut inbound: UnboundedReceiver<String>) {
        while let Some(line) = inbound.recv().await {
            self.handle_line(&line);
        }
        tracing::info!(processed = self.processed, "Inbound bridge closed, shell stopping");
    }

    fn emit(&self, message: OutboundMessage) {
        if self.outbound.send(message).is_err() {
            tracing::warn!("Outbound bridge closed, message dropped");
        }
    }
}

fn open_database(config: &Config) -> Result<Database> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Database::open(&config.database_path)?)
}

fn surface_sink(outbound: UnboundedSender<OutboundMessage>) -> CommandSink {
    Arc::new(move |tab_id, command| {
        if outbound
            .send(OutboundMessage::SurfaceCommand { tab_id, command })
            .is_err()
        {
            tracing::warn!(tab_id = %tab_id, "Outbound bridge closed, surface command dropped");
        }
    })
}
