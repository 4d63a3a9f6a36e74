//! Host-side download observation
//!
//! The host owns the real transfers. [`DownloadObserver`] assigns ids,
//! resolves save paths, samples transfer speed and produces the snapshots
//! that are pushed to the shell.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::download::{DownloadSnapshot, DownloadState};
use crate::error::DownloadError;
use crate::resolve::unique_path;
use crate::Result;

/// Minimum interval used when computing a rate, in seconds.
const MIN_SAMPLE_SECS: f64 = 0.1;

/// Raw observation reported by the transfer engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferUpdate {
    Progressing {
        received_bytes: u64,
        total_bytes: u64,
        paused: bool,
    },
    Interrupted {
        received_bytes: u64,
        total_bytes: u64,
    },
    Done {
        outcome: TransferOutcome,
        received_bytes: u64,
        total_bytes: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    Completed,
    Cancelled,
    /// The engine gave up; reported as `failed`
    Interrupted,
}

impl TransferOutcome {
    fn state(self) -> DownloadState {
        match self {
            TransferOutcome::Completed => DownloadState::Completed,
            TransferOutcome::Cancelled => DownloadState::Cancelled,
            TransferOutcome::Interrupted => DownloadState::Failed,
        }
    }
}

/// Per-download rate sampler.
///
/// The rate is only recomputed for progressing samples; stalled and
/// finished samples carry the previous value.
#[derive(Debug, Clone)]
pub struct SpeedSampler {
    last_bytes: u64,
    last_time: Instant,
    speed_bps: f64,
}

impl SpeedSampler {
    pub fn new(started: Instant) -> Self {
        Self {
            last_bytes: 0,
            last_time: started,
            speed_bps: 0.0,
        }
    }

    pub fn sample(&mut self, received_bytes: u64, now: Instant, progressing: bool) -> f64 {
        if progressing {
            let elapsed = now
                .saturating_duration_since(self.last_time)
                .as_secs_f64()
                .max(MIN_SAMPLE_SECS);
            let delta = received_bytes as f64 - self.last_bytes as f64;
            self.speed_bps = (delta / elapsed).max(0.0);
        }
        self.last_bytes = received_bytes;
        self.last_time = now;
        self.speed_bps
    }

    pub fn speed_bps(&self) -> f64 {
        self.speed_bps
    }
}

struct Transfer {
    filename: String,
    save_path: String,
    received_bytes: u64,
    total_bytes: u64,
    paused: bool,
    sampler: SpeedSampler,
}

impl Transfer {
    fn snapshot(&self, id: &str, state: DownloadState) -> DownloadSnapshot {
        DownloadSnapshot {
            id: id.to_string(),
            filename: self.filename.clone(),
            received_bytes: self.received_bytes,
            total_bytes: self.total_bytes,
            state,
            save_path: self.save_path.clone(),
            speed_bps: self.sampler.speed_bps(),
        }
    }
}

/// Tracks in-flight transfers on the host.
pub struct DownloadObserver {
    transfers: Arc<Mutex<HashMap<String, Transfer>>>,
}

impl DownloadObserver {
    pub fn new() -> Self {
        Self {
            transfers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register a transfer the engine is about to start.
    ///
    /// The save path is resolved once, here, and never changes afterwards.
    pub fn accept(&self, directory: &Path, suggested_name: &str) -> DownloadSnapshot {
        self.accept_at(directory, suggested_name, Instant::now())
    }

    pub fn accept_at(
        &self,
        directory: &Path,
        suggested_name: &str,
        now: Instant,
    ) -> DownloadSnapshot {
        let path = unique_path(directory, suggested_name);
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let id = new_download_id();

        let transfer = Transfer {
            filename,
            save_path: path.to_string_lossy().to_string(),
            received_bytes: 0,
            total_bytes: 0,
            paused: false,
            sampler: SpeedSampler::new(now),
        };
        let snapshot = transfer.snapshot(&id, DownloadState::Progress);
        self.transfers.lock().insert(id.clone(), transfer);

        tracing::info!(
            download_id = %id,
            save_path = %snapshot.save_path,
            "Accepted download"
        );

        snapshot
    }

    pub fn observe(&self, id: &str, update: TransferUpdate) -> Result<DownloadSnapshot> {
        self.observe_at(id, update, Instant::now())
    }

    /// Fold an engine observation into the transfer and snapshot it.
    ///
    /// A `Done` observation retires the transfer.
    pub fn observe_at(
        &self,
        id: &str,
        update: TransferUpdate,
        now: Instant,
    ) -> Result<DownloadSnapshot> {
        let mut transfers = self.transfers.lock();
        let transfer = transfers
            .get_mut(id)
            .ok_or_else(|| DownloadError::NotFound(id.to_string()))?;

        let state = match update {
            TransferUpdate::Progressing {
                received_bytes,
                total_bytes,
                paused,
            } => {
                transfer.paused = paused;
                transfer.total_bytes = total_bytes;
                transfer.received_bytes = received_bytes;
                transfer.sampler.sample(received_bytes, now, !paused);
                if paused {
                    DownloadState::Interrupted
                } else {
                    DownloadState::Progress
                }
            }
            TransferUpdate::Interrupted {
                received_bytes,
                total_bytes,
            } => {
                transfer.total_bytes = total_bytes;
                transfer.received_bytes = received_bytes;
                transfer.sampler.sample(received_bytes, now, false);
                DownloadState::Interrupted
            }
            TransferUpdate::Done {
                outcome,
                received_bytes,
                total_bytes,
            } => {
                transfer.total_bytes = total_bytes;
                transfer.received_bytes = received_bytes;
                transfer.sampler.sample(received_bytes, now, false);
                outcome.state()
            }
        };

        let snapshot = transfer.snapshot(id, state);
        if state.is_terminal() {
            transfers.remove(id);
            tracing::info!(download_id = %id, state = %state, "Download finished");
        }

        Ok(snapshot)
    }

    /// Whether a cancel request should reach the engine.
    ///
    /// Paused transfers and transfers that already finished ignore cancel.
    pub fn cancel_allowed(&self, id: &str) -> bool {
        match self.transfers.lock().get(id) {
            Some(transfer) => !transfer.paused,
            None => {
                tracing::debug!(download_id = %id, "Cancel for unknown or finished download");
                false
            }
        }
    }

    pub fn in_flight(&self) -> usize {
        self.transfers.lock().len()
    }
}

impl Default for DownloadObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DownloadObserver {
    fn clone(&self) -> Self {
        Self {
            transfers: Arc::clone(&self.transfers),
        }
    }
}

/// `<unix millis>-<8 hex chars>`
fn new_download_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}", chrono::Utc::now().timestamp_millis(), &random[..8])
}
