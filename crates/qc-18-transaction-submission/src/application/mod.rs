//! Application layer: stateful stages and the orchestration service.

pub mod broadcaster;
pub mod collector;
pub mod context;
pub mod service;
pub mod signer;

pub use broadcaster::{
    Broadcaster, FirstHealthySelector, OrdererSelector, RandomSelector, RoundRobinSelector,
};
pub use collector::{
    endorsement_slot, EndorsementCollector, EndorsementPublisher, EndorsementStream,
};
pub use context::TransactionContext;
pub use service::TransactionSubmissionService;
