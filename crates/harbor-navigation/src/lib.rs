//! Harbor Navigation
//!
//! - Address bar input resolution:
//!   1. Internal pseudo-URL (`app://settings`, `app://home`) → intercept
//!   2. Something that looks like an address → navigate
//!   3. Anything else → search with the selected engine
//! - Browse history: external navigations only, most recent first, capped.

mod engine;
mod error;
mod history;
mod input;
mod internal;

pub use engine::{SearchEngine, SearchPreference, DEFAULT_ENGINE, SEARCH_ENGINES, SEARCH_ENGINE_KEY};
pub use error::NavigationError;
pub use history::{BrowseHistory, HistoryEntry, BROWSE_HISTORY_KEY, BROWSE_HISTORY_LIMIT, DROPDOWN_LIMIT};
pub use input::{InputResolution, InputResolver};
pub use internal::{is_external_url, is_internal_url, InternalPage, InternalPages};

pub type Result<T> = std::result::Result<T, NavigationError>;
