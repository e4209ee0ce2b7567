//! # Submission Errors
//!
//! Error types for the transaction submission pipeline.
//!
//! Pure stages (builder, quorum, assembler) return these directly. Async stages
//! (collector, broadcaster) deliver them on the same channel as their success
//! values.

use crate::ports::outbound::SigningError;
use thiserror::Error;

/// All errors that can occur while submitting a transaction.
#[derive(Debug, Error)]
pub enum SubmissionError {
    // =========================================================================
    // Malformed input
    // =========================================================================
    /// No transaction request was supplied
    #[error("Missing input request object on the transaction request")]
    MissingTransactionRequest,

    /// The transaction request carries no endorsement responses
    #[error("Missing proposal responses in transaction request")]
    MissingProposalResponses,

    /// The transaction request carries an empty proposal
    #[error("Missing proposal in transaction request")]
    MissingProposal,

    /// No ordering node was configured
    #[error("Missing orderer objects on this channel")]
    NoOrderers,

    /// Creator identity bytes were empty
    #[error("Creator identity must not be empty")]
    EmptyCreator,

    // =========================================================================
    // Encoding
    // =========================================================================
    /// Bytes could not be decoded into the expected structure
    #[error("Invalid {what} data: {source}")]
    InvalidData {
        what: &'static str,
        #[source]
        source: bincode::Error,
    },

    /// A structure could not be encoded
    #[error("Failed to serialize {what}: {source}")]
    Serialization {
        what: &'static str,
        #[source]
        source: bincode::Error,
    },

    // =========================================================================
    // Endorsement collection
    // =========================================================================
    /// No endorsement result arrived within the bound
    #[error("Endorsement collection timed out after {timeout_ms}ms")]
    CollectionTimeout { timeout_ms: u64 },

    /// The fan-out stage published an error item
    #[error("Endorsement failed: {0}")]
    EndorsementFailed(String),

    /// The producer went away without publishing anything
    #[error("Endorsement channel closed before a result was published")]
    EndorsementChannelClosed,

    /// Endorsements arrived but the quorum rule refused them
    #[error("Endorsements rejected by the quorum policy")]
    EndorsementRejected,

    /// The one-shot endorsement slot was written twice
    #[error("Endorsement slot already filled")]
    SlotAlreadyFilled,

    // =========================================================================
    // Assembly / signing / broadcast
    // =========================================================================
    /// Request handed to the assembler violates the quorum invariant
    #[error("Invalid transaction request: {0}")]
    InvalidTransactionRequest(&'static str),

    /// The signing capability failed
    #[error("Signing failed: {0}")]
    Signing(#[from] SigningError),

    /// An ordering node reported a failure
    #[error("Orderer {endpoint} failed: {reason}")]
    Orderer { endpoint: String, reason: String },

    /// The notification channel closed before a terminal event
    #[error("Broadcast notifications closed before completion")]
    NotificationsClosed,
}

impl SubmissionError {
    /// Whether the caller may retry the same submission attempt.
    ///
    /// Only a collection timeout qualifies; rejections and malformed input
    /// will fail the same way again.
    pub fn is_retriable(&self) -> bool {
        matches!(self, SubmissionError::CollectionTimeout { .. })
    }

    /// Whether this error stems from caller-supplied input.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            SubmissionError::MissingTransactionRequest
                | SubmissionError::MissingProposalResponses
                | SubmissionError::MissingProposal
                | SubmissionError::NoOrderers
                | SubmissionError::EmptyCreator
        )
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SubmissionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_retriable() {
        let err = SubmissionError::CollectionTimeout { timeout_ms: 15_000 };
        assert!(err.is_retriable());
        assert_eq!(
            err.to_string(),
            "Endorsement collection timed out after 15000ms"
        );
    }

    #[test]
    fn test_rejections_are_not_retriable() {
        assert!(!SubmissionError::EndorsementFailed("peer0 down".into()).is_retriable());
        assert!(!SubmissionError::NoOrderers.is_retriable());
        assert!(!SubmissionError::EndorsementRejected.is_retriable());
        assert!(!SubmissionError::SlotAlreadyFilled.is_retriable());
    }

    #[test]
    fn test_malformed_input_classification() {
        assert!(SubmissionError::MissingTransactionRequest.is_malformed_input());
        assert!(SubmissionError::MissingProposalResponses.is_malformed_input());
        assert!(SubmissionError::MissingProposal.is_malformed_input());
        assert!(SubmissionError::NoOrderers.is_malformed_input());
        assert!(!SubmissionError::NotificationsClosed.is_malformed_input());
        assert!(!SubmissionError::EndorsementRejected.is_malformed_input());
    }

    #[test]
    fn test_orderer_error_display() {
        let err = SubmissionError::Orderer {
            endpoint: "orderer0:7050".into(),
            reason: "SERVICE_UNAVAILABLE".into(),
        };
        assert_eq!(
            err.to_string(),
            "Orderer orderer0:7050 failed: SERVICE_UNAVAILABLE"
        );
    }
}
