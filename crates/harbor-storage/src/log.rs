//! Capped, keyed, most-recent-first logs persisted as JSON arrays.
//!
//! Every mutation rewrites the whole serialized list under the log's key.
//! Loading never fails: a missing, unreadable or non-array value yields an
//! empty log, and individual entries that don't parse are skipped.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::store::SharedStore;

/// An entry with a stable identity inside its log.
pub trait LogEntry: Serialize + DeserializeOwned + Clone {
    fn key(&self) -> &str;
}

pub struct HistoryLog<T: LogEntry> {
    store: SharedStore,
    storage_key: String,
    cap: usize,
    entries: Vec<T>,
}

impl<T: LogEntry> HistoryLog<T> {
    /// Load the log stored under `storage_key`, truncated to `cap`.
    pub fn load(store: SharedStore, storage_key: &str, cap: usize) -> Self {
        let entries = match store.get(storage_key) {
            Ok(Some(raw)) => parse_entries(storage_key, &raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(key = %storage_key, error = %e, "History read failed, starting empty");
                Vec::new()
            }
        };

        let mut log = Self {
            store,
            storage_key: storage_key.to_string(),
            cap,
            entries,
        };
        log.entries.truncate(cap);
        log
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.iter().find(|e| e.key() == key)
    }

    /// Remove any entry with the same key and insert at the front.
    pub fn push_front(&mut self, entry: T) {
        self.entries.retain(|e| e.key() != entry.key());
        self.entries.insert(0, entry);
        self.entries.truncate(self.cap);
        self.persist();
    }

    /// Replace the entry with the same key where it stands, or prepend.
    pub fn upsert(&mut self, entry: T) {
        match self.entries.iter().position(|e| e.key() == entry.key()) {
            Some(index) => self.entries[index] = entry,
            None => self.entries.insert(0, entry),
        }
        self.entries.truncate(self.cap);
        self.persist();
    }

    /// Patch the entry for `key` without moving it. Returns false when absent.
    pub fn update<F>(&mut self, key: &str, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let Some(entry) = self.entries.iter_mut().find(|e| e.key() == key) else {
            return false;
        };
        f(entry);
        self.persist();
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    fn persist(&self) {
        let raw = match serde_json::to_string(&self.entries) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %self.storage_key, error = %e, "History serialization failed");
                return;
            }
        };

        if let Err(e) = self.store.set(&self.storage_key, &raw) {
            tracing::warn!(key = %self.storage_key, error = %e, "History write skipped");
        }
    }
}

fn parse_entries<T: LogEntry>(storage_key: &str, raw: &str) -> Vec<T> {
    match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(values) => values
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        Err(e) => {
            tracing::warn!(key = %storage_key, error = %e, "Stored history is corrupt, starting empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KeyValueStore, MemoryStore};
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Visit {
        url: String,
        title: String,
    }

    impl LogEntry for Visit {
        fn key(&self) -> &str {
            &self.url
        }
    }

    fn visit(url: &str, title: &str) -> Visit {
        Visit {
            url: url.to_string(),
            title: title.to_string(),
        }
    }

    #[test]
    fn test_push_front_dedups() {
        let mut log = HistoryLog::load(MemoryStore::new().shared(), "visits", 10);
        log.push_front(visit("https://a.test", "A"));
        log.push_front(visit("https://b.test", "B"));
        log.push_front(visit("https://a.test", "A again"));

        let urls: Vec<_> = log.entries().iter().map(|v| v.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.test", "https://b.test"]);
        assert_eq!(log.entries()[0].title, "A again");
    }

    #[test]
    fn test_upsert_keeps_position() {
        let mut log = HistoryLog::load(MemoryStore::new().shared(), "visits", 10);
        log.upsert(visit("https://a.test", "A"));
        log.upsert(visit("https://b.test", "B"));
        log.upsert(visit("https://a.test", "A2"));

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].url, "https://b.test");
        assert_eq!(log.entries()[1].title, "A2");
    }

    #[test]
    fn test_cap_enforced() {
        let mut log = HistoryLog::load(MemoryStore::new().shared(), "visits", 3);
        for i in 0..10 {
            log.push_front(visit(&format!("https://{i}.test"), ""));
            assert!(log.len() <= 3);
        }
        assert_eq!(log.entries()[0].url, "https://9.test");
    }

    #[test]
    fn test_persist_and_reload() {
        let store = MemoryStore::new().shared();
        {
            let mut log = HistoryLog::load(store.clone(), "visits", 10);
            log.push_front(visit("https://a.test", "A"));
            assert!(log.update("https://a.test", |v| v.title = "Patched".to_string()));
            assert!(!log.update("https://missing.test", |_| {}));
        }

        let log: HistoryLog<Visit> = HistoryLog::load(store, "visits", 10);
        assert_eq!(log.entries(), &[visit("https://a.test", "Patched")]);
    }

    #[test]
    fn test_corrupt_value_loads_empty() {
        let store = MemoryStore::new().shared();
        store.set("visits", "{not json").unwrap();
        let log: HistoryLog<Visit> = HistoryLog::load(store.clone(), "visits", 10);
        assert!(log.is_empty());

        store.set("visits", r#"{"url":"x"}"#).unwrap();
        let log: HistoryLog<Visit> = HistoryLog::load(store, "visits", 10);
        assert!(log.is_empty());
    }

    #[test]
    fn test_bad_entries_skipped() {
        let store = MemoryStore::new().shared();
        store
            .set("visits", r#"[{"url":"https://a.test","title":"A"},42,{"url":1}]"#)
            .unwrap();
        let log: HistoryLog<Visit> = HistoryLog::load(store, "visits", 10);
        assert_eq!(log.entries(), &[visit("https://a.test", "A")]);
    }

    #[test]
    fn test_failing_store_never_panics() {
        let mut log: HistoryLog<Visit> = HistoryLog::load(MemoryStore::failing().shared(), "visits", 2);
        assert!(log.is_empty());
        log.push_front(visit("https://a.test", "A"));
        assert_eq!(log.len(), 1);
        log.clear();
        assert!(log.is_empty());
    }
}
