//! Fire-and-forget confirmation requests raised by item saves.
//!
//! The planner only enqueues; a background task composes and sends the email.
//! Nothing that happens on the sending side reaches back into the planner.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::boundary::BoundaryError;
use crate::email::{EmailService, SendOutcome, confirmation_email};
use crate::models::Item;

/// Raised after an item with an email and reminders is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationRequest {
    pub item: Item,
}

/// Receives confirmation requests. Must not block the caller.
pub trait Notifier {
    fn notify(&self, request: ConfirmationRequest);
}

/// Drops every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _request: ConfirmationRequest) {}
}

/// Hands requests to a dispatcher task over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<ConfirmationRequest>,
}

impl Notifier for ChannelNotifier {
    fn notify(&self, request: ConfirmationRequest) {
        let id = request.item.id();
        if self.tx.send(request).is_err() {
            warn!(item = %id, "confirmation dispatcher is gone; request dropped");
        }
    }
}

/// Composes and sends the confirmation email for one item.
pub async fn send_confirmation<E>(email: &E, item: &Item) -> Result<SendOutcome, BoundaryError>
where
    E: EmailService + ?Sized,
{
    let Some(message) = confirmation_email(item) else {
        return Ok(SendOutcome {
            success: false,
            message: "item has no email or reminders".to_string(),
        });
    };
    email.send(&message).await
}

/// Spawns the dispatcher on the current tokio runtime.
///
/// The task ends once every [`ChannelNotifier`] clone has been dropped and
/// the queue is drained, so awaiting the handle flushes pending emails.
pub fn spawn_dispatcher(email: Arc<dyn EmailService>) -> (ChannelNotifier, JoinHandle<usize>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<ConfirmationRequest>();
    let handle = tokio::spawn(async move {
        let mut sent = 0;
        while let Some(request) = rx.recv().await {
            let item = &request.item;
            match send_confirmation(email.as_ref(), item).await {
                Ok(outcome) if outcome.success => {
                    sent += 1;
                    info!(item = %item.id(), "{}", outcome.message);
                }
                Ok(outcome) => {
                    warn!(item = %item.id(), "confirmation not sent: {}", outcome.message);
                }
                Err(err) => {
                    warn!(item = %item.id(), error = %err, "confirmation email failed");
                }
            }
        }
        sent
    });
    (ChannelNotifier { tx }, handle)
}
