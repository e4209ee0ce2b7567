//! # Broadcast Notifications
//!
//! The single observation point for a submission: success notifications and
//! errors travel over the same channel, as distinct variants.

use crate::domain::errors::{Result, SubmissionError};
use tokio::sync::mpsc;
use tracing::debug;

/// Progress of a submitted transaction.
#[derive(Debug)]
pub enum BroadcastEvent {
    /// The orderer accepted the envelope
    Submitted { orderer: String },
    /// The transaction was sequenced into a block
    Committed { block_number: u64 },
    /// Submission failed, either before or after reaching an orderer
    Error(SubmissionError),
}

impl BroadcastEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BroadcastEvent::Submitted { .. })
    }
}

/// Create a connected notifier/handle pair.
pub fn broadcast_channel(capacity: usize) -> (BroadcastNotifier, BroadcastHandle) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (BroadcastNotifier { sender }, BroadcastHandle { receiver })
}

/// Producer side, held by the orderer transport.
#[derive(Clone, Debug)]
pub struct BroadcastNotifier {
    sender: mpsc::Sender<BroadcastEvent>,
}

impl BroadcastNotifier {
    /// Send without waiting. Returns `false` if the event was dropped.
    pub fn notify(&self, event: BroadcastEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "Broadcast notification dropped");
                false
            }
        }
    }

    /// Send, waiting for capacity. Returns `false` if the handle is gone.
    pub async fn send(&self, event: BroadcastEvent) -> bool {
        self.sender.send(event).await.is_ok()
    }
}

/// Consumer side, returned to the submitter.
#[derive(Debug)]
pub struct BroadcastHandle {
    receiver: mpsc::Receiver<BroadcastEvent>,
}

impl BroadcastHandle {
    /// A handle that yields exactly one error event, then closes.
    pub fn failed(error: SubmissionError) -> Self {
        let (notifier, handle) = broadcast_channel(1);
        notifier.notify(BroadcastEvent::Error(error));
        handle
    }

    /// Next notification, or `None` once the producer is done.
    pub async fn recv(&mut self) -> Option<BroadcastEvent> {
        self.receiver.recv().await
    }

    /// Wait for the terminal event.
    ///
    /// Resolves to the committed block number, or the reported error.
    pub async fn completion(mut self) -> Result<u64> {
        while let Some(event) = self.receiver.recv().await {
            match event {
                BroadcastEvent::Submitted { orderer } => {
                    debug!(orderer = %orderer, "Transaction submitted");
                }
                BroadcastEvent::Committed { block_number } => return Ok(block_number),
                BroadcastEvent::Error(e) => return Err(e),
            }
        }
        Err(SubmissionError::NotificationsClosed)
    }
}
