//! Server core
//!
//! Listener, accept loop, and the per-connection worker.

pub mod core;
pub mod worker;

pub use core::Server;
