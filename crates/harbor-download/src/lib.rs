//! Harbor Downloads
//!
//! Two sides of one contract:
//! - the host side ([`DownloadObserver`]) owns real transfers, resolves
//!   collision-free save paths and turns raw observations into snapshots
//!   with a sampled transfer speed;
//! - the orchestration side ([`DownloadTracker`], [`DownloadHistory`])
//!   mirrors those snapshots, enforces the terminal-state rules and archives
//!   finished downloads.

mod download;
mod error;
mod history;
mod observer;
mod resolve;
mod tracker;

pub use download::{format_speed, DownloadSnapshot, DownloadState};
pub use error::DownloadError;
pub use history::{DownloadHistory, DOWNLOAD_HISTORY_KEY, DOWNLOAD_HISTORY_LIMIT};
pub use observer::{DownloadObserver, SpeedSampler, TransferOutcome, TransferUpdate};
pub use resolve::{sanitize_file_name, unique_path, FALLBACK_FILE_NAME};
pub use tracker::{DownloadTracker, SnapshotOutcome};

pub type Result<T> = std::result::Result<T, DownloadError>;
