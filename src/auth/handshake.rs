//! Authentication handshake
//!
//! Prompt/response exchange run synchronously on a fresh connection
//! before any chat traffic is accepted. Credential lines are raw byte
//! chunks up to the read cap, not delimiter-framed; the submitted value
//! is the chunk with surrounding ASCII whitespace trimmed.
//!
//! The base protocol re-prompts on failure with no retry limit. A retry
//! cap can be configured; when it is reached the handshake fails and the
//! caller drops the connection, after the failure notice has been sent.

use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::auth::CredentialStore;
use crate::error::AuthError;
use crate::protocol::{AUTH_FAILURE, AUTH_SUCCESS, PASSWORD_PROMPT, USERNAME_PROMPT};

pub struct AuthHandshake<'a> {
    credentials: &'a dyn CredentialStore,
    max_retries: Option<u32>,
    io_timeout: Option<Duration>,
    read_cap: usize,
}

impl<'a> AuthHandshake<'a> {
    pub fn new(
        credentials: &'a dyn CredentialStore,
        max_retries: Option<u32>,
        io_timeout: Option<Duration>,
        read_cap: usize,
    ) -> Self {
        Self {
            credentials,
            max_retries,
            io_timeout,
            read_cap,
        }
    }

    /// Runs the handshake to completion and returns the authenticated
    /// identity. Does not touch the session registry.
    pub async fn authenticate<S>(&self, stream: &mut S) -> Result<String, AuthError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut buf = vec![0u8; self.read_cap];
        let mut failures: u32 = 0;

        loop {
            stream.write_all(USERNAME_PROMPT).await?;
            stream.flush().await?;
            let username = self.read_credential(stream, &mut buf).await?;

            stream.write_all(PASSWORD_PROMPT).await?;
            stream.flush().await?;
            let password = self.read_credential(stream, &mut buf).await?;

            if self.credentials.verify(&username, &password) {
                stream.write_all(AUTH_SUCCESS).await?;
                stream.flush().await?;
                return Ok(username);
            }

            // The failure notice goes out even on the last allowed
            // attempt, so a capped client sees why it was dropped.
            failures += 1;
            stream.write_all(AUTH_FAILURE).await?;
            stream.flush().await?;

            if let Some(cap) = self.max_retries {
                if failures >= cap {
                    return Err(AuthError::RetriesExhausted(failures));
                }
            }
        }
    }

    async fn read_credential<S>(
        &self,
        stream: &mut S,
        buf: &mut [u8],
    ) -> Result<String, AuthError>
    where
        S: AsyncRead + Unpin,
    {
        let n = match self.io_timeout {
            Some(deadline) => match timeout(deadline, stream.read(buf)).await {
                Ok(result) => result?,
                Err(_) => {
                    return Err(AuthError::Io(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        "read deadline elapsed during authentication",
                    )));
                }
            },
            None => stream.read(buf).await?,
        };

        if n == 0 {
            return Err(AuthError::Disconnected);
        }

        Ok(String::from_utf8_lossy(&buf[..n]).trim().to_string())
    }
}
