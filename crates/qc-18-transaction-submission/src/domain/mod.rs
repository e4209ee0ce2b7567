//! # Domain Layer
//!
//! Pure message building, encoding and decision logic with no I/O.

pub mod assembler;
pub mod builder;
pub mod codec;
pub mod config_tx;
pub mod entities;
pub mod errors;
pub mod quorum;
