//! # Adapters Layer (Hexagonal Architecture)
//!
//! Proposal fan-out over the `Peer` port and a local Ed25519 signing
//! identity.

pub mod ed25519;
pub mod fan_out;

pub use ed25519::{verify_signature, LocalSigningIdentity};
pub use fan_out::dispatch_proposal;
