//! Browse history
//!
//! Only external (`http`/`https`) navigations are recorded. Re-visiting a
//! URL moves it to the front; title updates patch the entry in place.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use harbor_storage::{HistoryLog, LogEntry, SharedStore};

use crate::internal::{is_external_url, is_internal_url};

pub const BROWSE_HISTORY_KEY: &str = "browseHistory";
pub const BROWSE_HISTORY_LIMIT: usize = 60;
/// Rows shown in the address bar dropdown
pub const DROPDOWN_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub url: String,
    pub title: String,
    /// Unix milliseconds of the visit
    pub timestamp: i64,
}

impl LogEntry for HistoryEntry {
    fn key(&self) -> &str {
        &self.url
    }
}

pub struct BrowseHistory {
    log: HistoryLog<HistoryEntry>,
}

impl BrowseHistory {
    pub fn load(store: SharedStore, cap: usize) -> Self {
        let log = HistoryLog::load(store, BROWSE_HISTORY_KEY, cap);
        tracing::debug!(entries = log.len(), "Loaded browse history");
        Self { log }
    }

    /// Record a visit. Returns false when the URL is not eligible.
    pub fn record_visit(&mut self, url: &str, title: Option<&str>) -> bool {
        if !is_external_url(url) || is_internal_url(url) {
            return false;
        }

        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(url)
            .to_string();

        self.log.push_front(HistoryEntry {
            url: url.to_string(),
            title,
            timestamp: Utc::now().timestamp_millis(),
        });
        true
    }

    /// Update the stored title for a URL without moving the entry.
    pub fn update_title(&mut self, url: &str, title: &str) -> bool {
        if title.trim().is_empty() {
            return false;
        }

        self.log.update(url, |entry| entry.title = title.to_string())
    }

    /// Case-insensitive substring match over url and title, newest first.
    pub fn search(&self, query: &str, limit: usize) -> Vec<HistoryEntry> {
        let query = query.trim().to_lowercase();

        self.log
            .entries()
            .iter()
            .filter(|e| !e.url.is_empty() && !e.title.is_empty())
            .filter(|e| {
                query.is_empty()
                    || e.url.to_lowercase().contains(&query)
                    || e.title.to_lowercase().contains(&query)
            })
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        self.search("", limit)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
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
