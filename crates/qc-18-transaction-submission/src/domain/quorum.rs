//! # Quorum Validation
//!
//! Decides whether a collected set of endorsements may become a transaction.
//!
//! The decision is made by a [`QuorumPolicy`]. The default is
//! [`UnanimousPolicy`]: a single failed endorsement rejects the whole batch.
//! A rejection yields `None`, so callers that need to tell "no peer answered"
//! apart from "one peer failed" must inspect the responses themselves.

use super::entities::{EndorsementResponse, TransactionRequest};
use crate::config::QuorumConfig;
use std::fmt;
use tracing::{debug, warn};

/// Why a policy refused a response set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// No responses at all
    Empty,
    /// Too few successful responses
    Insufficient { succeeded: usize, total: usize },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Empty => write!(f, "no endorsement responses"),
            RejectReason::Insufficient { succeeded, total } => {
                write!(f, "{succeeded} of {total} endorsements succeeded")
            }
        }
    }
}

/// Outcome of a quorum policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuorumDecision {
    /// Responses admitted for assembly, in their original order
    Accept(Vec<EndorsementResponse>),
    Reject(RejectReason),
}

/// Pluggable quorum rule.
///
/// Accepted responses must all be successful; the assembler relies on it.
pub trait QuorumPolicy: Send + Sync + fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Judge the full response set.
    fn evaluate(&self, responses: Vec<EndorsementResponse>) -> QuorumDecision;
}

/// Every response must succeed.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnanimousPolicy;

impl QuorumPolicy for UnanimousPolicy {
    fn name(&self) -> &'static str {
        "unanimous"
    }

    fn evaluate(&self, responses: Vec<EndorsementResponse>) -> QuorumDecision {
        if responses.is_empty() {
            return QuorumDecision::Reject(RejectReason::Empty);
        }

        let succeeded = responses.iter().filter(|r| r.is_success()).count();
        if succeeded != responses.len() {
            return QuorumDecision::Reject(RejectReason::Insufficient {
                succeeded,
                total: responses.len(),
            });
        }

        QuorumDecision::Accept(responses)
    }
}

/// At least `min_percent` of the responses must succeed.
///
/// Only the successful responses are admitted.
#[derive(Clone, Copy, Debug)]
pub struct ThresholdPolicy {
    min_percent: u8,
}

impl ThresholdPolicy {
    /// `min_percent` is clamped to `1..=100`.
    pub fn new(min_percent: u8) -> Self {
        Self {
            min_percent: min_percent.clamp(1, 100),
        }
    }

    pub fn min_percent(&self) -> u8 {
        self.min_percent
    }
}

impl QuorumPolicy for ThresholdPolicy {
    fn name(&self) -> &'static str {
        "threshold"
    }

    fn evaluate(&self, responses: Vec<EndorsementResponse>) -> QuorumDecision {
        let total = responses.len();
        if total == 0 {
            return QuorumDecision::Reject(RejectReason::Empty);
        }

        let successful: Vec<_> = responses.into_iter().filter(|r| r.is_success()).collect();
        let succeeded = successful.len();

        if succeeded == 0 || succeeded * 100 < usize::from(self.min_percent) * total {
            return QuorumDecision::Reject(RejectReason::Insufficient { succeeded, total });
        }

        QuorumDecision::Accept(successful)
    }
}

/// Applies a quorum policy to collected transaction requests.
#[derive(Debug)]
pub struct QuorumValidator {
    policy: Box<dyn QuorumPolicy>,
}

impl QuorumValidator {
    pub fn new(policy: Box<dyn QuorumPolicy>) -> Self {
        Self { policy }
    }

    /// Validator with the all-or-nothing rule.
    pub fn unanimous() -> Self {
        Self::new(Box::new(UnanimousPolicy))
    }

    /// Validator for the configured quorum rule.
    pub fn from_config(config: &QuorumConfig) -> Self {
        match *config {
            QuorumConfig::Unanimous => Self::unanimous(),
            QuorumConfig::Threshold { min_percent } => {
                Self::new(Box::new(ThresholdPolicy::new(min_percent)))
            }
        }
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Accept the request (possibly narrowed by the policy) or reject it.
    ///
    /// Proposal and header pass through untouched.
    pub fn validate(&self, request: TransactionRequest) -> Option<TransactionRequest> {
        let (responses, proposal, header) = request.into_parts();
        let total = responses.len();

        match self.policy.evaluate(responses) {
            QuorumDecision::Accept(accepted) => {
                debug!(
                    policy = self.policy.name(),
                    accepted = accepted.len(),
                    total,
                    "Endorsement quorum reached"
                );
                Some(TransactionRequest::new(accepted, proposal, header))
            }
            QuorumDecision::Reject(reason) => {
                warn!(policy = self.policy.name(), %reason, "Endorsement quorum rejected");
                None
            }
        }
    }
}

impl Default for QuorumValidator {
    fn default() -> Self {
        Self::unanimous()
    }
}
