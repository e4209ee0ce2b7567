//! Channel configuration helpers.

use super::codec;
use super::entities::{ConfigSignature, ConfigUpdateEnvelope, Envelope, Payload};
use super::errors::Result;
use tracing::{debug, error};

/// A config signature as supplied by a caller: already decoded, or still in
/// its encoded form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigSignatureInput {
    Decoded(ConfigSignature),
    Encoded(Vec<u8>),
}

impl From<ConfigSignature> for ConfigSignatureInput {
    fn from(signature: ConfigSignature) -> Self {
        ConfigSignatureInput::Decoded(signature)
    }
}

impl From<Vec<u8>> for ConfigSignatureInput {
    fn from(bytes: Vec<u8>) -> Self {
        ConfigSignatureInput::Encoded(bytes)
    }
}

/// Pull the encoded config update out of an encoded config envelope.
///
/// Decode failures at any level become `SubmissionError::InvalidData`.
pub fn extract_channel_config(envelope_bytes: &[u8]) -> Result<Vec<u8>> {
    debug!(len = envelope_bytes.len(), "Extracting channel config");

    let decoded = Envelope::from_bytes(envelope_bytes)
        .and_then(|envelope| codec::decode::<Payload>("payload", &envelope.payload))
        .and_then(|payload| {
            codec::decode::<ConfigUpdateEnvelope>("config update envelope", &payload.data)
        });

    match decoded {
        Ok(config_envelope) => Ok(config_envelope.config_update),
        Err(e) => {
            error!(error = %e, "Config envelope could not be decoded");
            Err(e)
        }
    }
}

/// Normalize a mix of decoded and encoded config signatures.
pub fn decode_config_signatures<I>(signatures: I) -> Result<Vec<ConfigSignature>>
where
    I: IntoIterator,
    I::Item: Into<ConfigSignatureInput>,
{
    signatures
        .into_iter()
        .map(|input| match input.into() {
            ConfigSignatureInput::Decoded(signature) => Ok(signature),
            ConfigSignatureInput::Encoded(bytes) => codec::decode("config signature", &bytes),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::{build_channel_header, build_header};
    use crate::domain::entities::{HeaderType, Timestamp};
    use crate::domain::errors::SubmissionError;

    fn config_envelope_bytes(config_update: &[u8]) -> Vec<u8> {
        let channel_header = build_channel_header(
            HeaderType::ConfigUpdate,
            "",
            "newchannel",
            Timestamp::default(),
            0,
            None,
        );
        let header = build_header(b"admin", &channel_header, b"nonce").unwrap();
        let update = ConfigUpdateEnvelope {
            config_update: config_update.to_vec(),
            signatures: vec![],
        };
        let payload = Payload {
            header,
            data: codec::encode("config update envelope", &update).unwrap(),
        };
        Envelope {
            payload: codec::encode("payload", &payload).unwrap(),
            signature: vec![],
        }
        .to_bytes()
        .unwrap()
    }

    #[test]
    fn test_extracts_config_update() {
        let bytes = config_envelope_bytes(b"config-update-bytes");
        assert_eq!(
            extract_channel_config(&bytes).unwrap(),
            b"config-update-bytes"
        );
    }

    #[test]
    fn test_corrupted_envelope_is_decode_error() {
        let mut bytes = config_envelope_bytes(b"config-update-bytes");
        bytes.truncate(bytes.len() / 2);

        assert!(matches!(
            extract_channel_config(&bytes),
            Err(SubmissionError::InvalidData { .. })
        ));
    }

    #[test]
    fn test_envelope_with_foreign_payload_is_decode_error() {
        let bytes = Envelope {
            payload: b"not a payload".to_vec(),
            signature: vec![],
        }
        .to_bytes()
        .unwrap();

        assert!(matches!(
            extract_channel_config(&bytes),
            Err(SubmissionError::InvalidData { what: "payload", .. })
        ));
    }

    #[test]
    fn test_decode_mixed_signatures() {
        let decoded = ConfigSignature {
            signature_header: b"hdr-a".to_vec(),
            signature: b"sig-a".to_vec(),
        };
        let encoded_sig = ConfigSignature {
            signature_header: b"hdr-b".to_vec(),
            signature: b"sig-b".to_vec(),
        };
        let encoded = codec::encode("config signature", &encoded_sig).unwrap();

        let result = decode_config_signatures(vec![
            ConfigSignatureInput::from(decoded.clone()),
            ConfigSignatureInput::from(encoded),
        ])
        .unwrap();

        assert_eq!(result, vec![decoded, encoded_sig]);
    }

    #[test]
    fn test_decode_garbage_signature_fails() {
        let result = decode_config_signatures(vec![vec![0x01u8, 0x02]]);
        assert!(matches!(
            result,
            Err(SubmissionError::InvalidData {
                what: "config signature",
                ..
            })
        ));
    }
}
