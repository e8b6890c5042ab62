//! Error handling
//!
//! Domain-specific error types for each module of the relay server.

pub mod types;

pub use types::{AuthError, RegistryError, StartupError};
