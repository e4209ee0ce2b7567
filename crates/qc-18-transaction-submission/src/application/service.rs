//! Transaction Submission Service
//!
//! Main service implementing TransactionSubmissionApi.

use super::broadcaster::{selector_for, Broadcaster};
use super::collector::{EndorsementCollector, EndorsementStream};
use super::context::TransactionContext;
use super::signer::{sign_envelope_payload, sign_proposal};
use crate::adapters::fan_out::dispatch_proposal;
use crate::config::{ConfigError, SubmissionConfig};
use crate::domain::assembler::assemble;
use crate::domain::builder::{build_channel_header, build_header, build_proposal, current_timestamp};
use crate::domain::entities::{
    ChaincodeInvocationSpec, Header, HeaderType, Proposal, TransactionRequest, TransientMap,
};
use crate::domain::errors::{Result, SubmissionError};
use crate::domain::quorum::QuorumValidator;
use crate::ports::handle::BroadcastHandle;
use crate::ports::inbound::TransactionSubmissionApi;
use crate::ports::outbound::{Orderer, Peer, SchedulerHint};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Transaction Submission Service
///
/// Orchestrates the submission pipeline:
/// 1. Build and sign the proposal
/// 2. Fan out to endorsing peers
/// 3. Collect endorsements under a bounded wait
/// 4. Apply the quorum rule
/// 5. Assemble, sign and broadcast to one orderer
pub struct TransactionSubmissionService {
    config: SubmissionConfig,
    collector: EndorsementCollector,
    validator: QuorumValidator,
    broadcaster: Broadcaster,
}

impl TransactionSubmissionService {
    /// Create a new service with default config
    pub fn new() -> Self {
        Self::with_config(SubmissionConfig::default())
    }

    /// Create a service after validating `config`.
    pub fn try_with_config(config: SubmissionConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    /// Create a new service with custom config
    ///
    /// The config is used as given; see [`Self::try_with_config`].
    pub fn with_config(config: SubmissionConfig) -> Self {
        Self {
            collector: EndorsementCollector::from_config(&config),
            validator: QuorumValidator::from_config(&config.quorum),
            broadcaster: Broadcaster::new(selector_for(config.orderer_selection)),
            config,
        }
    }

    /// Create a service from explicitly built stages.
    pub fn with_components(
        config: SubmissionConfig,
        collector: EndorsementCollector,
        validator: QuorumValidator,
        broadcaster: Broadcaster,
    ) -> Self {
        Self {
            config,
            collector,
            validator,
            broadcaster,
        }
    }

    pub fn config(&self) -> &SubmissionConfig {
        &self.config
    }

    /// Run the whole pipeline for one chaincode invocation.
    ///
    /// Failures before the broadcast are reported on the returned handle,
    /// the same way broadcast failures are. Endorsements refused by the
    /// quorum rule are reported as [`SubmissionError::EndorsementRejected`].
    #[allow(clippy::too_many_arguments)]
    pub async fn submit(
        &self,
        ctx: &TransactionContext,
        channel_id: &str,
        cc_spec: &ChaincodeInvocationSpec,
        transient_map: Option<&TransientMap>,
        peers: &[Arc<dyn Peer>],
        orderers: &[Arc<dyn Orderer>],
        scheduler: SchedulerHint,
    ) -> BroadcastHandle {
        let request = match self
            .endorse(ctx, channel_id, cc_spec, transient_map, peers, scheduler.clone())
            .await
        {
            Ok(Some(request)) => request,
            Ok(None) => return BroadcastHandle::failed(SubmissionError::EndorsementRejected),
            Err(e) => return BroadcastHandle::failed(e),
        };

        self.send_transaction(orderers, Some(request), ctx, scheduler)
            .await
    }

    async fn endorse(
        &self,
        ctx: &TransactionContext,
        channel_id: &str,
        cc_spec: &ChaincodeInvocationSpec,
        transient_map: Option<&TransientMap>,
        peers: &[Arc<dyn Peer>],
        scheduler: SchedulerHint,
    ) -> Result<Option<TransactionRequest>> {
        let (proposal, header) = self.build_proposal(ctx, channel_id, cc_spec, transient_map)?;
        let stream = self.send_transaction_proposal(&proposal, ctx, peers, scheduler)?;
        self.build_transaction_request(stream, proposal, header).await
    }

    /// Check the request and orderer set in the documented order.
    fn check_submission(
        request: Option<TransactionRequest>,
        orderers: &[Arc<dyn Orderer>],
    ) -> Result<TransactionRequest> {
        let request = request.ok_or(SubmissionError::MissingTransactionRequest)?;
        if request.responses().is_empty() {
            return Err(SubmissionError::MissingProposalResponses);
        }
        if request.proposal().is_empty() {
            return Err(SubmissionError::MissingProposal);
        }
        if orderers.is_empty() {
            return Err(SubmissionError::NoOrderers);
        }
        Ok(request)
    }

    fn assemble_and_broadcast(
        &self,
        orderers: &[Arc<dyn Orderer>],
        request: &TransactionRequest,
        ctx: &TransactionContext,
        scheduler: SchedulerHint,
    ) -> Result<BroadcastHandle> {
        let payload = assemble(request)?;
        let envelope = sign_envelope_payload(ctx, payload)?;
        self.broadcaster.broadcast(envelope, orderers, scheduler)
    }
}

impl Default for TransactionSubmissionService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionSubmissionApi for TransactionSubmissionService {
    fn build_proposal(
        &self,
        ctx: &TransactionContext,
        channel_id: &str,
        cc_spec: &ChaincodeInvocationSpec,
        transient_map: Option<&TransientMap>,
    ) -> Result<(Proposal, Header)> {
        let channel_header = build_channel_header(
            HeaderType::EndorserTransaction,
            ctx.tx_id(),
            channel_id,
            current_timestamp(),
            0,
            None,
        );
        let header = build_header(ctx.creator(), &channel_header, ctx.nonce())?;
        let proposal = build_proposal(cc_spec, &header, transient_map)?;

        debug!(
            tx_id = %ctx.tx_id(),
            channel_id,
            chaincode = %cc_spec.chaincode_spec.chaincode_id.name,
            "Proposal built"
        );

        Ok((proposal, header))
    }

    fn send_transaction_proposal(
        &self,
        proposal: &Proposal,
        ctx: &TransactionContext,
        peers: &[Arc<dyn Peer>],
        scheduler: SchedulerHint,
    ) -> Result<EndorsementStream> {
        let signed = sign_proposal(ctx, proposal)?;

        info!(
            tx_id = %ctx.tx_id(),
            peer_count = peers.len(),
            "Sending transaction proposal"
        );

        Ok(dispatch_proposal(signed, peers.to_vec(), scheduler))
    }

    async fn build_transaction_request(
        &self,
        stream: EndorsementStream,
        proposal: Proposal,
        header: Header,
    ) -> Result<Option<TransactionRequest>> {
        let request = self.collector.collect(stream, proposal, header).await?;
        Ok(self.validator.validate(request))
    }

    async fn send_transaction(
        &self,
        orderers: &[Arc<dyn Orderer>],
        request: Option<TransactionRequest>,
        ctx: &TransactionContext,
        scheduler: SchedulerHint,
    ) -> BroadcastHandle {
        let request = match Self::check_submission(request, orderers) {
            Ok(request) => request,
            Err(e) => {
                warn!(tx_id = %ctx.tx_id(), error = %e, "Transaction rejected before broadcast");
                return BroadcastHandle::failed(e);
            }
        };

        match self.assemble_and_broadcast(orderers, &request, ctx, scheduler) {
            Ok(handle) => {
                info!(
                    tx_id = %ctx.tx_id(),
                    endorsements = request.responses().len(),
                    "Transaction sent to orderer"
                );
                handle
            }
            Err(e) => {
                warn!(tx_id = %ctx.tx_id(), error = %e, "Transaction submission failed");
                BroadcastHandle::failed(e)
            }
        }
    }
}
