//! # Wire Codec
//!
//! Every structure that is signed or transmitted goes through these two
//! functions, so there is exactly one byte layout per value.
//!
//! Encoding: bincode, fixed-width little-endian integers, bounded message size,
//! trailing bytes rejected. Signatures are computed over the output of
//! [`encode`] and the bytes are never re-encoded afterwards.

use super::errors::{Result, SubmissionError};
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Largest message the codec will produce or accept (100 MiB).
pub const MAX_MESSAGE_BYTES: u64 = 100 * 1024 * 1024;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(MAX_MESSAGE_BYTES)
        .reject_trailing_bytes()
}

/// Encode a value into its wire bytes.
pub fn encode<T: Serialize>(what: &'static str, value: &T) -> Result<Vec<u8>> {
    options()
        .serialize(value)
        .map_err(|source| SubmissionError::Serialization { what, source })
}

/// Decode wire bytes, mapping failures to [`SubmissionError::InvalidData`].
pub fn decode<T: DeserializeOwned>(what: &'static str, bytes: &[u8]) -> Result<T> {
    options()
        .deserialize(bytes)
        .map_err(|source| SubmissionError::InvalidData { what, source })
}
