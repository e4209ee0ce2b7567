//! # Signer Adapter
//!
//! Encodes once, signs the encoded bytes once, and freezes both together.
//! No retries: a signing failure ends the submission attempt.

use super::context::TransactionContext;
use crate::domain::codec;
use crate::domain::entities::{Envelope, Proposal, SignedProposal};
use crate::domain::errors::Result;
use tracing::{debug, error};

/// Sign a proposal for the endorsing peers.
pub fn sign_proposal(ctx: &TransactionContext, proposal: &Proposal) -> Result<SignedProposal> {
    let proposal_bytes = codec::encode("proposal", proposal)?;
    let signature = ctx.sign(&proposal_bytes).map_err(|e| {
        error!(tx_id = %ctx.tx_id(), error = %e, "Proposal signing failed");
        e
    })?;

    debug!(tx_id = %ctx.tx_id(), len = proposal_bytes.len(), "Proposal signed");

    Ok(SignedProposal {
        proposal_bytes,
        signature,
    })
}

/// Sign an assembled commit payload into an envelope.
pub fn sign_envelope_payload(ctx: &TransactionContext, payload_bytes: Vec<u8>) -> Result<Envelope> {
    let signature = ctx.sign(&payload_bytes).map_err(|e| {
        error!(tx_id = %ctx.tx_id(), error = %e, "Envelope signing failed");
        e
    })?;

    debug!(tx_id = %ctx.tx_id(), len = payload_bytes.len(), "Envelope signed");

    Ok(Envelope {
        payload: payload_bytes,
        signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::SubmissionError;
    use crate::ports::outbound::mocks::{MockIdentity, MockSigner};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn proposal() -> Proposal {
        Proposal {
            header: vec![1, 2, 3],
            payload: vec![4, 5, 6],
        }
    }

    #[test]
    fn test_sign_proposal_signs_frozen_bytes() {
        let signer = Arc::new(MockSigner::default());
        let ctx = TransactionContext::with_nonce(&MockIdentity, signer.clone(), vec![1]).unwrap();

        let signed = sign_proposal(&ctx, &proposal()).unwrap();

        assert_eq!(signed.proposal_bytes, codec::encode("proposal", &proposal()).unwrap());
        assert_eq!(signed.proposal().unwrap(), proposal());
        assert_eq!(signer.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sign_envelope_keeps_payload() {
        let signer = Arc::new(MockSigner::default());
        let ctx = TransactionContext::with_nonce(&MockIdentity, signer.clone(), vec![1]).unwrap();

        let envelope = sign_envelope_payload(&ctx, b"payload".to_vec()).unwrap();

        assert_eq!(envelope.payload, b"payload");
        assert_eq!(envelope.signature, b"sig:payl");
        assert_eq!(signer.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_signing_failure_not_retried() {
        let signer = Arc::new(MockSigner::failing());
        let ctx = TransactionContext::with_nonce(&MockIdentity, signer.clone(), vec![1]).unwrap();

        let result = sign_proposal(&ctx, &proposal());

        assert!(matches!(result, Err(SubmissionError::Signing(_))));
        assert_eq!(signer.calls.load(Ordering::SeqCst), 1);
    }
}
