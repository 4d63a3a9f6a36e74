//! Harbor Tab Management
//!
//! An ordered set of tabs, each paired with a rendering surface. Exactly one
//! tab is active whenever the registry is non-empty, and the registry is
//! never left empty: closing the last tab opens a fresh default one.

mod error;
mod gate;
mod registry;
mod state;
mod surface;
mod tab;

pub use error::TabError;
pub use gate::NavigationGate;
pub use registry::{ChromeState, TabRegistry};
pub use state::SecurityState;
pub use surface::{
    CommandSink, HeadlessFactory, HeadlessSurface, Surface, SurfaceCommand, SurfaceEvent,
    SurfaceFactory, ERR_ABORTED,
};
pub use tab::{Tab, TabId, DEFAULT_TITLE, UNTITLED};

pub type Result<T> = std::result::Result<T, TabError>;
