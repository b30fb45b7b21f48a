//! Change notifications for views that need to re-read state.
//!
//! Every successful mutation publishes exactly one event once the change is
//! visible to readers. Events describe what changed; subscribers still query
//! the service for the authoritative record.

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{debug, warn};

use super::domain::{AccountId, ApplicationId, ApplicationStatus};

const EVENT_BUFFER_SIZE: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    ApplicationCreated {
        id: ApplicationId,
        number: String,
    },
    StatusChanged {
        id: ApplicationId,
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    AccountRegistered {
        account_id: AccountId,
    },
    SessionStarted {
        account_id: AccountId,
    },
    SessionEnded,
}

/// Publish side of the notification channel. Cloning shares the channel.
#[derive(Debug, Clone)]
pub struct ChangeBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { sender }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub(crate) fn publish(&self, event: ChangeEvent) {
        match self.sender.send(event) {
            Ok(delivered) => debug!(delivered, "change event published"),
            Err(_) => debug!("change event dropped: no subscribers"),
        }
    }
}

/// Receiving half handed to one observer. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<ChangeEvent>,
}

impl Subscription {
    /// Next pending event without waiting.
    pub fn try_next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "subscriber lagged behind change bus");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Drain every event currently queued.
    pub fn drain(&mut self) -> Vec<ChangeEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Wait for the next event; `None` once every publisher is gone.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "subscriber lagged behind change bus");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {}
}
