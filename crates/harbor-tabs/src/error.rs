//! Tab error types

use thiserror::Error;

use crate::tab::TabId;

#[derive(Error, Debug)]
pub enum TabError {
    #[error("Surface for tab {0} is detached")]
    Detached(TabId),

    #[error("Surface rejected {command}: {reason}")]
    Rejected { command: String, reason: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
