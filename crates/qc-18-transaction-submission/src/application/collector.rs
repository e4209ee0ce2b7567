//! # Endorsement Collector
//!
//! Reduces the fan-out stage's result into one [`TransactionRequest`].
//!
//! The fan-out stage publishes exactly one item, either the full response set
//! or an error, into a capacity-one slot. The collector waits on that slot
//! until an item arrives or the timeout elapses. This is the only point in the
//! pipeline where the submitting flow suspends.
//!
//! A timeout cancels the wait only. In-flight peer calls are left to time out
//! on their own.

use crate::config::SubmissionConfig;
use crate::domain::entities::{EndorsementResponse, Header, Proposal, TransactionRequest};
use crate::domain::errors::{Result, SubmissionError};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Default bound on the wait for endorsements.
pub const DEFAULT_COLLECT_TIMEOUT: Duration = Duration::from_millis(15_000);

/// The single item the fan-out stage publishes.
pub type EndorsementEvent = std::result::Result<Vec<EndorsementResponse>, String>;

/// Create a one-shot endorsement slot.
pub fn endorsement_slot() -> (EndorsementPublisher, EndorsementStream) {
    let (sender, receiver) = oneshot::channel();
    (
        EndorsementPublisher {
            sender: Mutex::new(Some(sender)),
        },
        EndorsementStream { receiver },
    )
}

/// Write side of the slot. Completes it at most once.
#[derive(Debug)]
pub struct EndorsementPublisher {
    sender: Mutex<Option<oneshot::Sender<EndorsementEvent>>>,
}

impl EndorsementPublisher {
    /// Publish the fan-out result.
    ///
    /// A second call fails with [`SubmissionError::SlotAlreadyFilled`]. If the
    /// collector has already given up the event is discarded and `Ok` is
    /// returned.
    pub fn publish(&self, event: EndorsementEvent) -> Result<()> {
        let sender = match self.sender.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        let Some(sender) = sender else {
            warn!("Endorsement slot written twice");
            return Err(SubmissionError::SlotAlreadyFilled);
        };

        if sender.send(event).is_err() {
            debug!("Endorsement collector no longer waiting, result discarded");
        }
        Ok(())
    }

    /// Publish the full response set.
    pub fn publish_responses(&self, responses: Vec<EndorsementResponse>) -> Result<()> {
        self.publish(Ok(responses))
    }

    /// Publish an error item.
    pub fn publish_error(&self, reason: impl Into<String>) -> Result<()> {
        self.publish(Err(reason.into()))
    }
}

/// Read side of the slot, consumed by [`EndorsementCollector`].
#[derive(Debug)]
pub struct EndorsementStream {
    receiver: oneshot::Receiver<EndorsementEvent>,
}

/// Waits for the fan-out result under a bounded timeout.
#[derive(Clone, Debug)]
pub struct EndorsementCollector {
    timeout: Duration,
}

impl EndorsementCollector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn from_config(config: &SubmissionConfig) -> Self {
        Self::new(config.collect_timeout())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Collect using the configured timeout.
    pub async fn collect(
        &self,
        stream: EndorsementStream,
        proposal: Proposal,
        header: Header,
    ) -> Result<TransactionRequest> {
        self.collect_within(stream, proposal, header, self.timeout)
            .await
    }

    /// Collect, waiting at most `timeout`.
    ///
    /// The returned request has not been through quorum validation yet.
    pub async fn collect_within(
        &self,
        stream: EndorsementStream,
        proposal: Proposal,
        header: Header,
        timeout: Duration,
    ) -> Result<TransactionRequest> {
        let timeout_ms = timeout_millis(timeout);

        match tokio::time::timeout(timeout, stream.receiver).await {
            Ok(Ok(Ok(responses))) => {
                debug!(responses = responses.len(), "Endorsements collected");
                Ok(TransactionRequest::new(responses, proposal, header))
            }
            Ok(Ok(Err(reason))) => {
                warn!(%reason, "Endorsement fan-out reported an error");
                Err(SubmissionError::EndorsementFailed(reason))
            }
            Ok(Err(_)) => {
                warn!("Endorsement producer dropped without publishing");
                Err(SubmissionError::EndorsementChannelClosed)
            }
            Err(_) => {
                warn!(timeout_ms, "Endorsement collection timed out");
                Err(SubmissionError::CollectionTimeout { timeout_ms })
            }
        }
    }
}

/// Milliseconds in `timeout`, saturating at `u64::MAX`.
fn timeout_millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

impl Default for EndorsementCollector {
    fn default() -> Self {
        Self::new(DEFAULT_COLLECT_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Endorsement, Response};
    use tokio::time::Instant;

    fn response(status: i32) -> EndorsementResponse {
        EndorsementResponse {
            version: 1,
            response: Response {
                status,
                message: String::new(),
                payload: vec![],
            },
            payload: vec![],
            endorsement: Endorsement {
                endorser: vec![1],
                signature: vec![2],
            },
        }
    }

    fn header() -> Header {
        Header {
            channel_header: vec![1],
            signature_header: vec![2],
        }
    }

    fn proposal() -> Proposal {
        Proposal {
            header: vec![3],
            payload: vec![4],
        }
    }

    #[tokio::test]
    async fn test_collects_published_responses() {
        let (publisher, stream) = endorsement_slot();
        publisher
            .publish_responses(vec![response(200), response(500)])
            .unwrap();

        let request = EndorsementCollector::default()
            .collect(stream, proposal(), header())
            .await
            .unwrap();

        assert_eq!(request.responses().len(), 2);
        assert_eq!(request.responses()[1].response.status, 500);
        assert_eq!(request.proposal(), &proposal());
        assert_eq!(request.header(), &header());
    }

    #[tokio::test]
    async fn test_value_published_after_wait_begins() {
        let (publisher, stream) = endorsement_slot();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            publisher.publish_responses(vec![response(200)]).unwrap();
        });

        let request = EndorsementCollector::new(Duration::from_secs(5))
            .collect(stream, proposal(), header())
            .await
            .unwrap();

        assert_eq!(request.responses().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_without_event() {
        let (_publisher, stream) = endorsement_slot();
        let started = Instant::now();

        let result = EndorsementCollector::default()
            .collect(stream, proposal(), header())
            .await;

        assert!(matches!(
            result,
            Err(SubmissionError::CollectionTimeout { timeout_ms: 15_000 })
        ));
        assert!(result.unwrap_err().is_retriable());
        assert!(started.elapsed() >= DEFAULT_COLLECT_TIMEOUT);
        assert!(started.elapsed() < DEFAULT_COLLECT_TIMEOUT + Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_item_returns_immediately() {
        let (publisher, stream) = endorsement_slot();
        publisher.publish_error("peer1: connection refused").unwrap();
        let started = Instant::now();

        let result = EndorsementCollector::default()
            .collect(stream, proposal(), header())
            .await;

        assert!(matches!(result, Err(SubmissionError::EndorsementFailed(_))));
        assert!(started.elapsed() < Duration::from_millis(1));
    }

    #[tokio::test]
    async fn test_dropped_producer_is_distinct_failure() {
        let (publisher, stream) = endorsement_slot();
        drop(publisher);

        let result = EndorsementCollector::default()
            .collect(stream, proposal(), header())
            .await;

        assert!(matches!(
            result,
            Err(SubmissionError::EndorsementChannelClosed)
        ));
    }

    #[test]
    fn test_second_publish_is_an_error() {
        let (publisher, _stream) = endorsement_slot();

        publisher.publish_responses(vec![response(200)]).unwrap();
        let second = publisher.publish_responses(vec![response(200)]);

        assert!(matches!(second, Err(SubmissionError::SlotAlreadyFilled)));
    }

    #[test]
    fn test_publish_after_collector_gone_is_ok() {
        let (publisher, stream) = endorsement_slot();
        drop(stream);

        assert!(publisher.publish_error("late").is_ok());
    }

    #[test]
    fn test_from_config_uses_configured_timeout() {
        let config = SubmissionConfig {
            collect_timeout_ms: 250,
            ..Default::default()
        };
        assert_eq!(
            EndorsementCollector::from_config(&config).timeout(),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn test_timeout_millis_saturates() {
        assert_eq!(timeout_millis(Duration::from_secs(15)), 15_000);
        assert_eq!(timeout_millis(Duration::MAX), u64::MAX);
    }
}
