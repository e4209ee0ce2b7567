//! # Local Ed25519 Identity
//!
//! In-process signing identity backed by an Ed25519 key. The certificate is
//! the raw verifying key, so peers can check signatures without a PKI.

use crate::ports::outbound::{IdentityProvider, SigningError, SigningIdentity};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

/// Ed25519 key pair acting as both identity provider and signer.
pub struct LocalSigningIdentity {
    msp_id: String,
    signing_key: SigningKey,
    certificate: Vec<u8>,
}

impl LocalSigningIdentity {
    /// Identity with a fresh random key.
    pub fn generate(msp_id: impl Into<String>) -> Self {
        Self::from_key(msp_id.into(), SigningKey::generate(&mut rand::thread_rng()))
    }

    /// Identity with a key derived from a 32-byte seed.
    pub fn from_seed(msp_id: impl Into<String>, seed: [u8; 32]) -> Self {
        Self::from_key(msp_id.into(), SigningKey::from_bytes(&seed))
    }

    fn from_key(msp_id: String, signing_key: SigningKey) -> Self {
        let certificate = signing_key.verifying_key().to_bytes().to_vec();
        Self {
            msp_id,
            signing_key,
            certificate,
        }
    }

    /// Check a signature made by this identity.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        verify_signature(&self.certificate, message, signature)
    }
}

/// Check `signature` over `message` against a raw Ed25519 verifying key.
///
/// Malformed keys or signatures verify as `false`.
pub fn verify_signature(public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let Ok(key_bytes) = <[u8; 32]>::try_from(public_key) else {
        return false;
    };
    let Ok(key) = VerifyingKey::from_bytes(&key_bytes) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    key.verify(message, &signature).is_ok()
}

impl SigningIdentity for LocalSigningIdentity {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SigningError> {
        Ok(self.signing_key.sign(message).to_bytes().to_vec())
    }
}

impl IdentityProvider for LocalSigningIdentity {
    fn msp_id(&self) -> &str {
        &self.msp_id
    }

    fn certificate(&self) -> &[u8] {
        &self.certificate
    }
}
