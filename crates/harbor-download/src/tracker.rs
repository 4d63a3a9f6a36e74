//! Shell-side mirror of host downloads

use std::collections::{HashMap, HashSet, VecDeque};

use crate::download::{DownloadSnapshot, DownloadState};
use crate::history::DOWNLOAD_HISTORY_LIMIT;

/// What applying a snapshot did to the mirror.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotOutcome {
    /// Missing id or unusable values
    Rejected,
    /// The user dismissed this download; nothing changes
    Dismissed,
    /// Arrived after the download already finished in another state
    Stale,
    /// Live entry created or refreshed
    Updated {
        snapshot: DownloadSnapshot,
        is_new: bool,
    },
    /// Terminal snapshot; the download left the live set and should be archived
    Finished(DownloadSnapshot),
}

#[derive(Debug, Clone, Copy)]
struct Finish {
    state: DownloadState,
    /// Finished while dismissed; never archived
    dismissed: bool,
}

/// Live downloads keyed by id, newest first.
///
/// Once an id reaches a terminal state it never returns to the live set.
/// Only the most recent `finished_cap` terminal ids are remembered.
#[derive(Debug)]
pub struct DownloadTracker {
    live: HashMap<String, DownloadSnapshot>,
    order: Vec<String>,
    /// Ids hidden by the user that have not finished yet
    dismissed: HashSet<String>,
    finished: HashMap<String, Finish>,
    finished_order: VecDeque<String>,
    finished_cap: usize,
    cancelling: HashSet<String>,
}

impl Default for DownloadTracker {
    fn default() -> Self {
        Self::with_finished_cap(DOWNLOAD_HISTORY_LIMIT)
    }
}

impl DownloadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_finished_cap(finished_cap: usize) -> Self {
        Self {
            live: HashMap::new(),
            order: Vec::new(),
            dismissed: HashSet::new(),
            finished: HashMap::new(),
            finished_order: VecDeque::new(),
            finished_cap: finished_cap.max(1),
            cancelling: HashSet::new(),
        }
    }

    pub fn apply(&mut self, mut snapshot: DownloadSnapshot) -> SnapshotOutcome {
        if let Err(e) = snapshot.validate() {
            tracing::warn!(error = %e, "Dropping download snapshot");
            return SnapshotOutcome::Rejected;
        }

        let id = snapshot.id.clone();

        if let Some(finish) = self.finished.get(&id) {
            if finish.dismissed {
                return SnapshotOutcome::Dismissed;
            }
            if finish.state == snapshot.state {
                return SnapshotOutcome::Finished(snapshot);
            }
            tracing::debug!(
                download_id = %id,
                finished = %finish.state,
                received = %snapshot.state,
                "Ignoring snapshot for finished download"
            );
            return SnapshotOutcome::Stale;
        }

        if self.dismissed.contains(&id) {
            if snapshot.is_terminal() {
                self.dismissed.remove(&id);
                self.remember_finished(&id, snapshot.state, true);
                tracing::debug!(download_id = %id, state = %snapshot.state, "Dismissed download finished");
            }
            return SnapshotOutcome::Dismissed;
        }

        if let Some(previous) = self.live.get(&id) {
            if !previous.save_path.is_empty() {
                snapshot.save_path = previous.save_path.clone();
            }
            if snapshot.total_bytes == 0 {
                snapshot.total_bytes = previous.total_bytes;
            }
        }

        if snapshot.is_terminal() {
            self.live.remove(&id);
            self.order.retain(|existing| existing != &id);
            self.cancelling.remove(&id);
            self.remember_finished(&id, snapshot.state, false);
            tracing::info!(download_id = %id, state = %snapshot.state, "Download finished");
            return SnapshotOutcome::Finished(snapshot);
        }

        let is_new = !self.live.contains_key(&id);
        if is_new {
            self.order.insert(0, id.clone());
            tracing::info!(download_id = %id, filename = %snapshot.filename, "Tracking download");
        }
        self.live.insert(id, snapshot.clone());

        SnapshotOutcome::Updated { snapshot, is_new }
    }

    /// Returns true when a cancel command should be sent to the host.
    ///
    /// Any live download qualifies, stalled ones included. The host refuses
    /// cancel for paused transfers, and its terminal snapshot decides the
    /// outcome, so a download that completes first stays completed.
    pub fn request_cancel(&mut self, id: &str) -> bool {
        if !self.live.contains_key(id) {
            tracing::debug!(download_id = %id, "Cancel ignored, download not live");
            return false;
        }
        self.cancelling.insert(id.to_string());
        true
    }

    pub fn is_cancelling(&self, id: &str) -> bool {
        self.cancelling.contains(id)
    }

    /// Drop a live download from view; its later snapshots are ignored and
    /// it is not archived when it finishes.
    pub fn dismiss(&mut self, id: &str) -> bool {
        if self.live.remove(id).is_none() {
            return false;
        }
        self.order.retain(|existing| existing != id);
        self.cancelling.remove(id);
        self.dismissed.insert(id.to_string());
        tracing::debug!(download_id = %id, "Dismissed download");
        true
    }

    pub fn is_dismissed(&self, id: &str) -> bool {
        self.dismissed.contains(id) || self.finished.get(id).is_some_and(|f| f.dismissed)
    }

    /// Dismiss every live download.
    pub fn clear(&mut self) {
        let ids: Vec<String> = self.order.clone();
        for id in &ids {
            self.dismiss(id);
        }
    }

    pub fn get(&self, id: &str) -> Option<&DownloadSnapshot> {
        self.live.get(id)
    }

    pub fn live(&self) -> Vec<&DownloadSnapshot> {
        self.order
            .iter()
            .filter_map(|id| self.live.get(id))
            .collect()
    }

    pub fn finished_state(&self, id: &str) -> Option<DownloadState> {
        self.finished.get(id).map(|f| f.state)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    fn remember_finished(&mut self, id: &str, state: DownloadState, dismissed: bool) {
        self.finished.insert(id.to_string(), Finish { state, dismissed });
        self.finished_order.push_back(id.to_string());
        while self.finished_order.len() > self.finished_cap {
            if let Some(oldest) = self.finished_order.pop_front() {
                self.finished.remove(&oldest);
            }
        }
    }
}
