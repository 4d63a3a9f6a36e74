//! Finished-download archive

use harbor_storage::{HistoryLog, LogEntry, SharedStore};

use crate::download::DownloadSnapshot;

pub const DOWNLOAD_HISTORY_KEY: &str = "downloadHistory";
pub const DOWNLOAD_HISTORY_LIMIT: usize = 40;

impl LogEntry for DownloadSnapshot {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Terminal downloads, newest first, persisted after every change.
pub struct DownloadHistory {
    log: HistoryLog<DownloadSnapshot>,
}

impl DownloadHistory {
    pub fn load(store: SharedStore, cap: usize) -> Self {
        let log = HistoryLog::load(store, DOWNLOAD_HISTORY_KEY, cap);
        tracing::debug!(entries = log.len(), "Loaded download history");
        Self { log }
    }

    /// Record a finished download. Re-archiving the same id replaces the
    /// existing entry in place.
    pub fn archive(&mut self, snapshot: DownloadSnapshot) -> bool {
        if !snapshot.is_terminal() {
            tracing::debug!(download_id = %snapshot.id, "Not archiving unfinished download");
            return false;
        }
        self.log.upsert(snapshot);
        true
    }

    pub fn get(&self, id: &str) -> Option<&DownloadSnapshot> {
        self.log.get(id)
    }

    pub fn entries(&self) -> &[DownloadSnapshot] {
        self.log.entries()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn clear(&mut self) {
        self.log.clear();
    }
}
