//! Inbound Ports (Driving Ports / API)
//!
//! The operations a client drives to submit a chaincode transaction.

use super::handle::BroadcastHandle;
use super::outbound::{Orderer, Peer, SchedulerHint};
use crate::application::collector::EndorsementStream;
use crate::application::context::TransactionContext;
use crate::domain::entities::{
    ChaincodeInvocationSpec, Header, Proposal, TransactionRequest, TransientMap,
};
use crate::domain::errors::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Primary Transaction Submission API
#[async_trait]
pub trait TransactionSubmissionApi: Send + Sync {
    /// Build an endorser proposal for `cc_spec` on `channel_id`.
    ///
    /// Returns the proposal together with the header it embeds, which the
    /// commit payload reuses.
    fn build_proposal(
        &self,
        ctx: &TransactionContext,
        channel_id: &str,
        cc_spec: &ChaincodeInvocationSpec,
        transient_map: Option<&TransientMap>,
    ) -> Result<(Proposal, Header)>;

    /// Sign the proposal and send it to every peer.
    ///
    /// Returns immediately; the outcome arrives on the stream.
    fn send_transaction_proposal(
        &self,
        proposal: &Proposal,
        ctx: &TransactionContext,
        peers: &[Arc<dyn Peer>],
        scheduler: SchedulerHint,
    ) -> Result<EndorsementStream>;

    /// Wait for endorsements and apply the quorum rule.
    ///
    /// `Ok(None)` means the endorsements arrived but were rejected.
    async fn build_transaction_request(
        &self,
        stream: EndorsementStream,
        proposal: Proposal,
        header: Header,
    ) -> Result<Option<TransactionRequest>>;

    /// Assemble, sign and broadcast an endorsed transaction.
    ///
    /// Never fails directly: every failure, including malformed input, is
    /// the single error event on the returned handle.
    async fn send_transaction(
        &self,
        orderers: &[Arc<dyn Orderer>],
        request: Option<TransactionRequest>,
        ctx: &TransactionContext,
        scheduler: SchedulerHint,
    ) -> BroadcastHandle;
}
