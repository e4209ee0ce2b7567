//! Per-attempt transaction context.

use crate::domain::builder::{compute_tx_id, create_serialized_identity, generate_nonce};
use crate::domain::errors::{Result, SubmissionError};
use crate::ports::outbound::{IdentityProvider, SigningError, SigningIdentity};
use std::fmt;
use std::sync::Arc;

/// Identity, nonce and signer for one submission attempt.
///
/// The transaction id is derived from the nonce and creator, so a new context
/// means a new transaction.
#[derive(Clone)]
pub struct TransactionContext {
    creator: Vec<u8>,
    nonce: Vec<u8>,
    tx_id: String,
    signer: Arc<dyn SigningIdentity>,
}

impl TransactionContext {
    /// Context with a freshly generated nonce.
    pub fn new(identity: &dyn IdentityProvider, signer: Arc<dyn SigningIdentity>) -> Result<Self> {
        Self::with_nonce(identity, signer, generate_nonce())
    }

    /// Context with a caller-chosen nonce.
    pub fn with_nonce(
        identity: &dyn IdentityProvider,
        signer: Arc<dyn SigningIdentity>,
        nonce: Vec<u8>,
    ) -> Result<Self> {
        let creator = create_serialized_identity(identity)?;
        if identity.certificate().is_empty() {
            return Err(SubmissionError::EmptyCreator);
        }
        let tx_id = compute_tx_id(&nonce, &creator);

        Ok(Self {
            creator,
            nonce,
            tx_id,
            signer,
        })
    }

    /// Encoded `SerializedIdentity` of the submitter.
    pub fn creator(&self) -> &[u8] {
        &self.creator
    }

    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }

    /// Sign with the context's signing capability.
    pub fn sign(&self, message: &[u8]) -> std::result::Result<Vec<u8>, SigningError> {
        self.signer.sign(message)
    }
}

impl fmt::Debug for TransactionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionContext")
            .field("tx_id", &self.tx_id)
            .field("nonce", &hex::encode(&self.nonce))
            .finish_non_exhaustive()
    }
}
