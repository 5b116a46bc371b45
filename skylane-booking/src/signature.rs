use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 verifier for gateway webhook deliveries. The gateway signs the
/// raw request body with the shared endpoint secret and sends the result in
/// the signature header as `sha256=<hex>`.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: String,
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Constant-time verification of the signature header against the raw
    /// payload bytes. Any malformed header is treated as a failed signature.
    pub fn verify(&self, payload: &[u8], signature_header: &str) -> bool {
        let Some(signature_hex) = signature_header.strip_prefix("sha256=") else {
            return false;
        };
        let Ok(claimed) = hex::decode(signature_hex) else {
            return false;
        };
        self.compute(payload).ct_eq(&claimed).into()
    }

    /// Sign a payload the way the gateway would. Used by tests and by the
    /// local webhook replay tooling.
    pub fn sign(&self, payload: &[u8]) -> String {
        format!("sha256={}", hex::encode(self.compute(payload)))
    }

    fn compute(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_signature() {
        let verifier = SignatureVerifier::new("whsec_test");
        let body = br#"{"type":"payment_intent.succeeded"}"#;
        let header = verifier.sign(body);
        assert!(verifier.verify(body, &header));
    }

    #[test]
    fn rejects_wrong_secret() {
        let verifier = SignatureVerifier::new("whsec_test");
        let other = SignatureVerifier::new("whsec_other");
        let body = br#"{"type":"payment_intent.succeeded"}"#;
        assert!(!verifier.verify(body, &other.sign(body)));
    }

    #[test]
    fn rejects_tampered_payload() {
        let verifier = SignatureVerifier::new("whsec_test");
        let header = verifier.sign(br#"{"amount":100}"#);
        assert!(!verifier.verify(br#"{"amount":999}"#, &header));
    }

    #[test]
    fn rejects_malformed_headers() {
        let verifier = SignatureVerifier::new("whsec_test");
        let body = b"payload";
        assert!(!verifier.verify(body, "abcdef"));
        assert!(!verifier.verify(body, "sha256=nothex!!"));
        assert!(!verifier.verify(body, ""));
    }
}
