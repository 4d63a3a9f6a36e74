//! Harbor Storage Layer
//!
//! A synchronous, best-effort string key-value store (SQLite-backed in
//! production, in-memory for tests) and the capped JSON logs that the
//! browse and download histories persist through it.

mod database;
mod error;
mod log;
mod migrations;
mod store;

pub use database::Database;
pub use error::StorageError;
pub use log::{HistoryLog, LogEntry};
pub use store::{KeyValueStore, MemoryStore, SharedStore};

pub type Result<T> = std::result::Result<T, StorageError>;
