//! Authentication system
//!
//! Credential storage and the prompt/response handshake run on every
//! fresh connection before it is admitted to the chat.

pub mod credentials;
pub mod handshake;

pub use credentials::{CredentialStore, StaticCredentials};
pub use handshake::AuthHandshake;
