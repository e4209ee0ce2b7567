//! # Domain Entities
//!
//! Wire structures exchanged with peers and orderers.
//!
//! Nested structures that get signed (channel header, signature header,
//! proposal header and payload) are stored in their encoded form. Once a value
//! has been encoded it is never encoded again, so signatures stay valid.

use super::codec;
use super::errors::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Status code a peer returns for a successful endorsement.
pub const SUCCESS_STATUS: i32 = 200;

/// Version stamped on every channel header.
pub const CHANNEL_HEADER_VERSION: i32 = 1;

/// Transient data passed to the chaincode but kept out of the ledger.
///
/// Ordered so that the encoded payload is identical across runs.
pub type TransientMap = BTreeMap<String, Vec<u8>>;

// =============================================================================
// Headers
// =============================================================================

/// Kind of message a channel header describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderType {
    Message,
    Config,
    ConfigUpdate,
    EndorserTransaction,
    OrdererTransaction,
    DeliverSeekInfo,
    ChaincodePackage,
}

/// Wall-clock time with nanosecond precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl Timestamp {
    /// Current system time.
    pub fn now() -> Self {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            seconds: elapsed.as_secs() as i64,
            nanos: elapsed.subsec_nanos() as i32,
        }
    }
}

/// Channel-scoped part of a header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelHeader {
    pub header_type: HeaderType,
    pub version: i32,
    pub timestamp: Timestamp,
    pub channel_id: String,
    pub tx_id: String,
    pub epoch: u64,
    pub extension: Option<Vec<u8>>,
}

/// Creator identity and the nonce used to derive the transaction id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureHeader {
    pub creator: Vec<u8>,
    pub nonce: Vec<u8>,
}

/// Common header identifying one transaction attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub(crate) channel_header: Vec<u8>,
    pub(crate) signature_header: Vec<u8>,
}

impl Header {
    /// Encoded channel header bytes.
    pub fn channel_header_bytes(&self) -> &[u8] {
        &self.channel_header
    }

    /// Encoded signature header bytes.
    pub fn signature_header_bytes(&self) -> &[u8] {
        &self.signature_header
    }

    /// Decode the channel header.
    pub fn channel_header(&self) -> Result<ChannelHeader> {
        codec::decode("channel header", &self.channel_header)
    }

    /// Decode the signature header.
    pub fn signature_header(&self) -> Result<SignatureHeader> {
        codec::decode("signature header", &self.signature_header)
    }

    /// Encode the header.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        codec::encode("header", self)
    }

    /// Decode a header.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        codec::decode("header", bytes)
    }
}

// =============================================================================
// Identity
// =============================================================================

/// Identity of a client, as carried in `SignatureHeader::creator`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedIdentity {
    pub msp_id: String,
    pub id_bytes: Vec<u8>,
}

// =============================================================================
// Chaincode invocation
// =============================================================================

/// Language the target chaincode is written in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChaincodeType {
    #[default]
    Golang,
    Node,
    Car,
    Java,
}

/// Chaincode coordinates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeId {
    pub name: String,
    pub version: String,
    pub path: String,
}

/// Function name followed by its arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeInput {
    pub args: Vec<Vec<u8>>,
}

/// What to invoke and with which arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeSpec {
    pub chaincode_type: ChaincodeType,
    pub chaincode_id: ChaincodeId,
    pub input: ChaincodeInput,
}

/// Wrapper sent as the proposal input.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeInvocationSpec {
    pub chaincode_spec: ChaincodeSpec,
}

impl ChaincodeInvocationSpec {
    /// Invocation of `function(args..)` on chaincode `name`.
    pub fn invoke(name: impl Into<String>, function: &str, args: &[&[u8]]) -> Self {
        let mut input = vec![function.as_bytes().to_vec()];
        input.extend(args.iter().map(|arg| arg.to_vec()));

        Self {
            chaincode_spec: ChaincodeSpec {
                chaincode_type: ChaincodeType::Golang,
                chaincode_id: ChaincodeId {
                    name: name.into(),
                    ..Default::default()
                },
                input: ChaincodeInput { args: input },
            },
        }
    }
}

// =============================================================================
// Proposal
// =============================================================================

/// Payload of a chaincode proposal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeProposalPayload {
    /// Encoded `ChaincodeInvocationSpec`
    pub input: Vec<u8>,
    pub transient_map: Option<TransientMap>,
}

/// Proposal sent to endorsing peers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Encoded `Header`
    pub header: Vec<u8>,
    /// Encoded `ChaincodeProposalPayload`
    pub payload: Vec<u8>,
}

impl Proposal {
    /// A proposal with neither header nor payload counts as absent.
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.payload.is_empty()
    }

    /// Decode the chaincode payload.
    pub fn chaincode_payload(&self) -> Result<ChaincodeProposalPayload> {
        codec::decode("chaincode proposal payload", &self.payload)
    }
}

/// Proposal bytes plus the creator's signature over them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedProposal {
    pub proposal_bytes: Vec<u8>,
    pub signature: Vec<u8>,
}

impl SignedProposal {
    /// Decode the signed proposal.
    pub fn proposal(&self) -> Result<Proposal> {
        codec::decode("proposal", &self.proposal_bytes)
    }
}

// =============================================================================
// Endorsement
// =============================================================================

/// A peer's signature over the proposal response payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endorsement {
    /// Encoded identity of the endorsing peer
    pub endorser: Vec<u8>,
    pub signature: Vec<u8>,
}

/// Outcome of chaincode simulation on one peer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: i32,
    pub message: String,
    pub payload: Vec<u8>,
}

/// One peer's judgment on a proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndorsementResponse {
    pub version: i32,
    pub response: Response,
    /// Encoded proposal response payload the endorsement signs
    pub payload: Vec<u8>,
    pub endorsement: Endorsement,
}

impl EndorsementResponse {
    /// Whether the peer endorsed the proposal.
    pub fn is_success(&self) -> bool {
        self.response.status == SUCCESS_STATUS
    }
}

/// Endorsements gathered for one proposal, in arrival order.
///
/// Produced by the collector and consumed by the assembler; the fields cannot
/// be changed once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRequest {
    responses: Vec<EndorsementResponse>,
    proposal: Proposal,
    header: Header,
}

impl TransactionRequest {
    pub fn new(responses: Vec<EndorsementResponse>, proposal: Proposal, header: Header) -> Self {
        Self {
            responses,
            proposal,
            header,
        }
    }

    pub fn responses(&self) -> &[EndorsementResponse] {
        &self.responses
    }

    pub fn proposal(&self) -> &Proposal {
        &self.proposal
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn into_parts(self) -> (Vec<EndorsementResponse>, Proposal, Header) {
        (self.responses, self.proposal, self.header)
    }
}

// =============================================================================
// Commit payload
// =============================================================================

/// Endorsed chaincode result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeEndorsedAction {
    pub proposal_response_payload: Vec<u8>,
    pub endorsements: Vec<Endorsement>,
}

/// Proposal payload together with the endorsed result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeActionPayload {
    pub chaincode_proposal_payload: Vec<u8>,
    pub action: ChaincodeEndorsedAction,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionAction {
    /// Encoded `SignatureHeader` of the submitter
    pub header: Vec<u8>,
    /// Encoded `ChaincodeActionPayload`
    pub payload: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub actions: Vec<TransactionAction>,
}

/// Body of an envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub header: Header,
    pub data: Vec<u8>,
}

/// Signed unit handed to the ordering service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Encoded `Payload`
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

impl Envelope {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        codec::encode("envelope", self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        codec::decode("envelope", bytes)
    }
}

// =============================================================================
// Channel configuration
// =============================================================================

/// A signature collected on a channel configuration update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSignature {
    pub signature_header: Vec<u8>,
    pub signature: Vec<u8>,
}

/// Config update plus the signatures gathered for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigUpdateEnvelope {
    /// Encoded config update, the bytes members sign
    pub config_update: Vec<u8>,
    pub signatures: Vec<ConfigSignature>,
}
