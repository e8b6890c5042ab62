//! Broadcast dispatcher
//!
//! Fans one message out to a snapshot of the active sessions. The
//! registry lock is released before any socket I/O; a send failure on
//! one recipient is reported and never aborts delivery to the rest.

use std::sync::Arc;

use crate::display::DisplaySink;
use crate::protocol::{announce_line, relay_line};
use crate::session::{SessionHandle, SessionRegistry};

pub struct BroadcastDispatcher {
    registry: Arc<SessionRegistry>,
    display: Arc<dyn DisplaySink>,
}

impl BroadcastDispatcher {
    pub fn new(registry: Arc<SessionRegistry>, display: Arc<dyn DisplaySink>) -> Self {
        Self { registry, display }
    }

    /// Relays a chat message from `sender` to every other active
    /// session as `"{identity}@{address}: {text}"`.
    pub async fn relay(&self, sender: &SessionHandle, text: &str) {
        let line = relay_line(sender.username(), sender.addr(), text);
        let recipients = self.registry.snapshot(Some(sender.id())).await;
        self.deliver(&recipients, &line).await;
    }

    /// Broadcasts an operator-originated message to every active
    /// session as `"Servidor: {text}"`. The operator's own echo goes
    /// to the display sink after delivery.
    pub async fn announce(&self, text: &str) {
        let line = announce_line(text);
        let recipients = self.registry.snapshot(None).await;
        self.deliver(&recipients, &line).await;
        self.display.announced(text);
    }

    async fn deliver(&self, recipients: &[SessionHandle], line: &str) {
        for recipient in recipients {
            if let Err(e) = recipient.send(line.as_bytes()).await {
                self.display.error(&format!(
                    "Failed to send to {}@{}: {}",
                    recipient.username(),
                    recipient.addr(),
                    e
                ));
            }
        }
    }
}
