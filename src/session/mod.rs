//! Session management
//!
//! Defines the per-connection session state machine, the shared handle
//! broadcasts are delivered through, and the registry of active
//! sessions.

pub mod registry;
pub mod state;

pub use registry::{SessionHandle, SessionRegistry};
pub use state::{Session, SessionId, SessionState};
