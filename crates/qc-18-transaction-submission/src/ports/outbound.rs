//! # Outbound Ports (Driven Ports / SPI)
//!
//! Collaborators the submission core calls but does not implement: endorsing
//! peers, ordering nodes, the signing capability and the identity provider.

use super::handle::BroadcastHandle;
use crate::domain::entities::{EndorsementResponse, Envelope, SignedProposal};
use async_trait::async_trait;
use thiserror::Error;

/// Runtime to spawn peer and orderer work on, when the caller has a preference.
pub type SchedulerHint = Option<tokio::runtime::Handle>;

/// Error from the signing capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SigningError {
    /// No key material is available for this identity
    #[error("Signing key unavailable")]
    KeyUnavailable,

    /// The signer rejected or failed the request
    #[error("Signer failure: {0}")]
    Failed(String),
}

/// Error reported by an endorsing peer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PeerError {
    #[error("Peer {endpoint} unreachable: {reason}")]
    Unreachable { endpoint: String, reason: String },

    #[error("Peer {endpoint} timed out")]
    Timeout { endpoint: String },

    #[error("Peer {endpoint} returned a malformed response")]
    MalformedResponse { endpoint: String },
}

/// Signing capability carried by a transaction context.
///
/// The algorithm is the implementor's business; the core only hands over the
/// exact bytes that will be transmitted.
pub trait SigningIdentity: Send + Sync {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SigningError>;
}

/// Source of the submitter's identity fields.
pub trait IdentityProvider: Send + Sync {
    /// Membership service provider id, e.g. `Org1MSP`.
    fn msp_id(&self) -> &str;

    /// Enrollment certificate bytes.
    fn certificate(&self) -> &[u8];
}

/// Endorsing peer.
#[async_trait]
pub trait Peer: Send + Sync {
    fn endpoint(&self) -> &str;

    /// Submit a signed proposal and wait for this peer's endorsement.
    async fn send_proposal(
        &self,
        proposal: &SignedProposal,
    ) -> Result<EndorsementResponse, PeerError>;
}

/// Ordering node.
pub trait Orderer: Send + Sync {
    fn endpoint(&self) -> &str;

    /// Whether the node is currently believed reachable.
    fn is_healthy(&self) -> bool {
        true
    }

    /// Submit an envelope. Returns immediately; progress is reported on the
    /// handle.
    fn broadcast(&self, envelope: Envelope, scheduler: SchedulerHint) -> BroadcastHandle;
}

/// Mock implementations for testing
#[cfg(test)]
pub mod mocks {
    use super::*;
    use crate::domain::entities::{Endorsement, Response};
    use crate::ports::handle::{broadcast_channel, BroadcastEvent};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Signer that returns a fixed signature and counts calls.
    #[derive(Default)]
    pub struct MockSigner {
        pub calls: AtomicUsize,
        pub fail: bool,
    }

    impl MockSigner {
        pub fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }
    }

    impl SigningIdentity for MockSigner {
        fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SigningError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SigningError::Failed("hsm offline".into()));
            }
            Ok([b"sig:".as_slice(), &message[..message.len().min(4)]].concat())
        }
    }

    pub struct MockIdentity;

    impl IdentityProvider for MockIdentity {
        fn msp_id(&self) -> &str {
            "Org1MSP"
        }

        fn certificate(&self) -> &[u8] {
            b"user1-cert"
        }
    }

    /// Peer that answers with a fixed status.
    pub struct MockPeer {
        pub endpoint: String,
        pub status: i32,
        pub fail: bool,
        pub received: Mutex<Vec<SignedProposal>>,
    }

    impl MockPeer {
        pub fn endorsing(endpoint: &str, status: i32) -> Self {
            Self {
                endpoint: endpoint.to_string(),
                status,
                fail: false,
                received: Mutex::new(Vec::new()),
            }
        }

        pub fn unreachable(endpoint: &str) -> Self {
            Self {
                fail: true,
                ..Self::endorsing(endpoint, 0)
            }
        }
    }

    #[async_trait]
    impl Peer for MockPeer {
        fn endpoint(&self) -> &str {
            &self.endpoint
        }

        async fn send_proposal(
            &self,
            proposal: &SignedProposal,
        ) -> Result<EndorsementResponse, PeerError> {
            self.received.lock().unwrap().push(proposal.clone());
            if self.fail {
                return Err(PeerError::Unreachable {
                    endpoint: self.endpoint.clone(),
                    reason: "connection refused".into(),
                });
            }
            Ok(EndorsementResponse {
                version: 1,
                response: Response {
                    status: self.status,
                    message: String::new(),
                    payload: vec![],
                },
                payload: b"rw-set".to_vec(),
                endorsement: Endorsement {
                    endorser: self.endpoint.as_bytes().to_vec(),
                    signature: b"peer-sig".to_vec(),
                },
            })
        }
    }

    /// Orderer that records envelopes and reports submit + commit.
    pub struct MockOrderer {
        pub endpoint: String,
        pub healthy: bool,
        pub received: Arc<Mutex<Vec<Envelope>>>,
    }

    impl MockOrderer {
        pub fn new(endpoint: &str) -> Self {
            Self {
                endpoint: endpoint.to_string(),
                healthy: true,
                received: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn unhealthy(endpoint: &str) -> Self {
            Self {
                healthy: false,
                ..Self::new(endpoint)
            }
        }

        pub fn calls(&self) -> usize {
            self.received.lock().unwrap().len()
        }
    }

    impl Orderer for MockOrderer {
        fn endpoint(&self) -> &str {
            &self.endpoint
        }

        fn is_healthy(&self) -> bool {
            self.healthy
        }

        fn broadcast(&self, envelope: Envelope, _scheduler: SchedulerHint) -> BroadcastHandle {
            self.received.lock().unwrap().push(envelope);
            let (notifier, handle) = broadcast_channel(4);
            notifier.notify(BroadcastEvent::Submitted {
                orderer: self.endpoint.clone(),
            });
            notifier.notify(BroadcastEvent::Committed { block_number: 7 });
            handle
        }
    }
}
