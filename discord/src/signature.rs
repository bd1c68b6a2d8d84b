//! Ed25519 verification of interaction requests.
//!
//! Discord signs `timestamp ‖ body` with the application key and sends the
//! result hex-encoded in `X-Signature-Ed25519`.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};

use crate::DiscordError;

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

/// Checks interaction signatures against the application's public key.
#[derive(Clone, Debug)]
pub struct SignatureVerifier {
    key: VerifyingKey,
}

impl SignatureVerifier {
    pub fn new(key: VerifyingKey) -> Self {
        Self { key }
    }

    /// Parse the hex public key shown on the developer portal.
    pub fn from_hex(public_key: &str) -> Result<Self, DiscordError> {
        let bytes = hex::decode(public_key.trim())
            .map_err(|e| DiscordError::Signature(format!("not hex: {e}")))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| DiscordError::Signature("expected 32 bytes".into()))?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| DiscordError::Signature(e.to_string()))?;
        Ok(Self { key })
    }

    /// Returns `true` if `signature_hex` is valid for `timestamp ‖ body`.
    pub fn verify(&self, timestamp: &str, body: &[u8], signature_hex: &str) -> bool {
        let Ok(bytes) = hex::decode(signature_hex) else {
            return false;
        };
        let Ok(bytes) = <[u8; 64]>::try_from(bytes.as_slice()) else {
            return false;
        };
        let signature = Signature::from_bytes(&bytes);

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);
        self.key.verify(&message, &signature).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    fn keypair() -> (SigningKey, SignatureVerifier) {
        let signing = SigningKey::from_bytes(&[7u8; 32]);
        let verifier =
            SignatureVerifier::from_hex(&hex::encode(signing.verifying_key().to_bytes())).unwrap();
        (signing, verifier)
    }

    fn sign(key: &SigningKey, timestamp: &str, body: &[u8]) -> String {
        let mut message = timestamp.as_bytes().to_vec();
        message.extend_from_slice(body);
        hex::encode(key.sign(&message).to_bytes())
    }

    #[test]
    fn valid_signature_is_accepted() {
        let (key, verifier) = keypair();
        let sig = sign(&key, "1700000000", br#"{"type":1}"#);
        assert!(verifier.verify("1700000000", br#"{"type":1}"#, &sig));
    }

    #[test]
    fn tampered_body_or_timestamp_is_rejected() {
        let (key, verifier) = keypair();
        let sig = sign(&key, "1700000000", br#"{"type":1}"#);
        assert!(!verifier.verify("1700000000", br#"{"type":2}"#, &sig));
        assert!(!verifier.verify("1700000001", br#"{"type":1}"#, &sig));
    }

    #[test]
    fn malformed_signature_is_rejected() {
        let (_, verifier) = keypair();
        assert!(!verifier.verify("1", b"{}", "zz"));
        assert!(!verifier.verify("1", b"{}", "abcd"));
        assert!(!verifier.verify("1", b"{}", ""));
    }

    #[test]
    fn bad_public_keys_fail_to_parse() {
        assert!(SignatureVerifier::from_hex("not-hex").is_err());
        assert!(SignatureVerifier::from_hex("abcd").is_err());
    }
}
