//! Harbor Session
//!
//! A [`Session`] owns every piece of mutable shell state (tabs, downloads,
//! both history logs, the search preference) and is the only thing that
//! mutates it. Inbound events are applied one at a time through
//! [`Session::handle_surface_event`], [`Session::handle_download_snapshot`]
//! and [`Session::execute`].

mod command;
mod dispatch;
mod error;
mod session;

pub use command::{EventVerdict, HostCommand, UserCommand};
pub use error::SessionError;
pub use session::{Diagnostics, Session, SessionOptions};

pub type Result<T> = std::result::Result<T, SessionError>;
