//! Wire protocol literals and line formatting
//!
//! The chat protocol is plaintext over TCP with no framing: prompts are
//! sent without a trailing newline and each read returns whatever bytes
//! are available up to a fixed cap. All literals live here so the
//! handshake, the dispatcher, and the tests agree byte-for-byte.

use std::net::SocketAddr;

/// Prompt sent before reading the username. Not newline-terminated.
pub const USERNAME_PROMPT: &[u8] = b"Get usuario:";

/// Prompt sent before reading the password. Not newline-terminated.
pub const PASSWORD_PROMPT: &[u8] = b"Get password:";

/// Sent after a failed credential check, before re-prompting.
pub const AUTH_FAILURE: &[u8] = b"Usuario o clave invalida. Intente nuevamente.\n";

/// Sent once the credential check succeeds.
pub const AUTH_SUCCESS: &[u8] = b"Autenticacion exitosa. Bienvenido al chat!\n";

/// Historical read cap: a single read never returns more than this many
/// bytes and messages larger than the cap are not reassembled.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// Formats a chat message relayed on behalf of a client.
pub fn relay_line(identity: &str, addr: &SocketAddr, text: &str) -> String {
    format!("{}@{}: {}", identity, addr, text)
}

/// Formats an operator-originated broadcast.
pub fn announce_line(text: &str) -> String {
    format!("Servidor: {}", text)
}
