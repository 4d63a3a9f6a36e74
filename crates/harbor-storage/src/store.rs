//! Key-value store abstraction
//!
//! Persistence is best-effort: callers treat a failed read as "no data" and
//! a failed write as "write skipped".

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::database::Database;
use crate::error::StorageError;
use crate::Result;

/// Synchronous string store shared by the history logs and preferences.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.get_setting(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_setting(key, value)
    }
}

/// In-memory store. `failing()` builds one whose every access errors, to
/// exercise the degrade-to-empty paths.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
    failing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            failing: true,
        }
    }

    pub fn shared(self) -> SharedStore {
        Arc::new(self)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if self.failing {
            return Err(StorageError::Unavailable(format!("read of {key} refused")));
        }
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.failing {
            return Err(StorageError::Unavailable(format!("write of {key} refused")));
        }
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
