//! Harbor Core
//!
//! Coordination layer for the Harbor shell. The host process and the
//! rendering surfaces talk to it only through bridge messages; all state
//! lives in the [`Session`] owned by the [`Shell`] event loop.

mod bridge;
mod config;
mod error;
mod shell;

pub use bridge::{decode_inbound, encode_outbound, InboundMessage, OutboundMessage, SurfaceEventMessage};
pub use config::{Config, CONFIG_FILE_NAME};
pub use error::CoreError;
pub use shell::Shell;

// Re-export core components
pub use harbor_download::{
    unique_path, DownloadObserver, DownloadSnapshot, DownloadState, SnapshotOutcome,
    TransferOutcome, TransferUpdate,
};
pub use harbor_navigation::{HistoryEntry, InputResolution, SearchEngine, SEARCH_ENGINES};
pub use harbor_session::{Diagnostics, EventVerdict, HostCommand, Session, SessionOptions, UserCommand};
pub use harbor_storage::{Database, KeyValueStore, MemoryStore, SharedStore};
pub use harbor_tabs::{ChromeState, SurfaceCommand, SurfaceEvent, Tab, TabId};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging on stderr; stdout carries bridge traffic.
pub fn init_logging(debug: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
