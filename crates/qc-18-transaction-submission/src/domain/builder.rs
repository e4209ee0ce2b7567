//! # Message Builder
//!
//! Pure constructors for headers and proposals. No I/O; the only failures are
//! an empty creator and encoding errors.

use super::codec;
use super::entities::{
    ChaincodeInvocationSpec, ChaincodeProposalPayload, ChannelHeader, Header, HeaderType,
    Proposal, SerializedIdentity, SignatureHeader, Timestamp, TransientMap,
    CHANNEL_HEADER_VERSION,
};
use super::errors::{Result, SubmissionError};
use crate::ports::outbound::IdentityProvider;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Length of a freshly generated nonce.
pub const NONCE_LENGTH: usize = 24;

/// Serialize the identity that signs on behalf of a user.
pub fn create_serialized_identity(identity: &dyn IdentityProvider) -> Result<Vec<u8>> {
    let serialized = SerializedIdentity {
        msp_id: identity.msp_id().to_string(),
        id_bytes: identity.certificate().to_vec(),
    };
    codec::encode("serialized identity", &serialized)
}

/// Build the common header from an encoded creator and a channel header.
pub fn build_header(
    creator: &[u8],
    channel_header: &ChannelHeader,
    nonce: &[u8],
) -> Result<Header> {
    if creator.is_empty() {
        return Err(SubmissionError::EmptyCreator);
    }

    let signature_header = SignatureHeader {
        creator: creator.to_vec(),
        nonce: nonce.to_vec(),
    };

    Ok(Header {
        channel_header: codec::encode("channel header", channel_header)?,
        signature_header: codec::encode("signature header", &signature_header)?,
    })
}

/// Build a channel header with the fixed protocol version.
///
/// An absent or empty `extension` is left out.
pub fn build_channel_header(
    header_type: HeaderType,
    tx_id: &str,
    channel_id: &str,
    timestamp: Timestamp,
    epoch: u64,
    extension: Option<Vec<u8>>,
) -> ChannelHeader {
    ChannelHeader {
        header_type,
        version: CHANNEL_HEADER_VERSION,
        timestamp,
        channel_id: channel_id.to_string(),
        tx_id: tx_id.to_string(),
        epoch,
        extension: extension.filter(|ext| !ext.is_empty()),
    }
}

/// Build a chaincode proposal.
///
/// The transient map is embedded only when it has entries.
pub fn build_proposal(
    cc_spec: &ChaincodeInvocationSpec,
    header: &Header,
    transient_map: Option<&TransientMap>,
) -> Result<Proposal> {
    let cc_payload = ChaincodeProposalPayload {
        input: codec::encode("chaincode invocation spec", cc_spec)?,
        transient_map: transient_map.filter(|map| !map.is_empty()).cloned(),
    };

    Ok(Proposal {
        header: header.to_bytes()?,
        payload: codec::encode("chaincode proposal payload", &cc_payload)?,
    })
}

/// Current time for a channel header.
pub fn current_timestamp() -> Timestamp {
    Timestamp::now()
}

/// Random nonce for a new transaction attempt.
pub fn generate_nonce() -> Vec<u8> {
    let mut nonce = vec![0u8; NONCE_LENGTH];
    rand::thread_rng().fill_bytes(&mut nonce);
    nonce
}

/// Transaction id: hex SHA-256 of `nonce || creator`.
pub fn compute_tx_id(nonce: &[u8], creator: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(nonce);
    hasher.update(creator);
    hex::encode(hasher.finalize())
}
