//! # QC-18: Transaction Submission Subsystem
//!
//! Client-side pipeline that turns a chaincode invocation into an ordered
//! transaction: build a proposal, have peers endorse it, check the
//! endorsements against a quorum rule, assemble the commit payload and hand
//! the signed envelope to one ordering node.
//!
//! ## Pipeline
//!
//! ```text
//! build_proposal ─→ sign ─→ fan-out to peers ─→ collect (bounded wait)
//!                                                     │
//!    broadcast ←─ sign envelope ←─ assemble ←─ quorum check
//! ```
//!
//! The collector is the only stage that suspends. Everything after it either
//! returns a `Result` (pure stages) or reports on a [`BroadcastHandle`].
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! - **Domain**: entities, wire codec, builder, quorum policies, assembler
//! - **Ports**: Inbound (`TransactionSubmissionApi`) and Outbound (`Peer`,
//!   `Orderer`, `SigningIdentity`, `IdentityProvider`)
//! - **Application**: context, signer, collector, broadcaster, service
//! - **Adapters**: proposal fan-out, local Ed25519 identity
//!
//! ## Signing Contract
//!
//! Every signed message is encoded exactly once. The signature covers those
//! bytes and both are stored side by side, so a receiver verifies the bytes
//! it was sent without re-encoding anything.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;

pub use adapters::{dispatch_proposal, LocalSigningIdentity};
pub use application::service::TransactionSubmissionService;
pub use application::{
    Broadcaster, EndorsementCollector, EndorsementPublisher, EndorsementStream,
    TransactionContext,
};
pub use config::{ConfigError, OrdererSelection, QuorumConfig, SubmissionConfig};
pub use domain::entities::*;
pub use domain::errors::SubmissionError;
pub use domain::quorum::{QuorumPolicy, QuorumValidator, ThresholdPolicy, UnanimousPolicy};
pub use ports::{
    BroadcastEvent, BroadcastHandle, IdentityProvider, Orderer, Peer, PeerError, SchedulerHint,
    SigningError, SigningIdentity, TransactionSubmissionApi,
};
pub use telemetry::init_tracing;
