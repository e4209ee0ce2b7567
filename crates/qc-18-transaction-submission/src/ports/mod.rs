//! Ports module for Transaction Submission
//!
//! Defines inbound (API) and outbound (SPI) port traits, plus the broadcast
//! notification handle shared by both sides.

pub mod handle;
pub mod inbound;
pub mod outbound;

pub use handle::{broadcast_channel, BroadcastEvent, BroadcastHandle, BroadcastNotifier};
pub use inbound::TransactionSubmissionApi;
pub use outbound::{
    IdentityProvider, Orderer, Peer, PeerError, SchedulerHint, SigningError, SigningIdentity,
};
