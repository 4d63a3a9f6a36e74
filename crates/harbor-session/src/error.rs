//! Session error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Navigation error: {0}")]
    Navigation(#[from] harbor_navigation::NavigationError),

    #[error("Host channel closed, dropped {0}")]
    HostChannelClosed(String),
}
