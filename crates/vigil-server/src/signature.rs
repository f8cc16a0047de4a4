use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Verify a webhook signature header against the raw request body.
///
/// The header carries `sha256=<hex-digest>` where the digest is
/// HMAC-SHA256 over the raw body with the shared secret. Comparison is
/// constant-time. An empty configured secret disables verification
/// (accept-all) — an explicit development weakening, never appropriate in
/// production.
///
/// # Examples
///
/// ```
/// use vigil_server::signature::verify_signature;
///
/// let body = br#"{"action":"opened"}"#;
/// let signed = vigil_server::signature::sign(b"s3cret", body);
/// assert!(verify_signature("s3cret", body, &signed));
/// assert!(!verify_signature("s3cret", body, "sha256=deadbeef"));
/// assert!(verify_signature("", body, ""));
/// ```
pub fn verify_signature(secret: &str, body: &[u8], signature_header: &str) -> bool {
    if secret.is_empty() {
        return true;
    }

    let Some(hex_digest) = signature_header.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(claimed) = hex::decode(hex_digest) else {
        return false;
    };

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    let expected = mac.finalize().into_bytes();

    if claimed.len() != expected.len() {
        return false;
    }
    expected.as_slice().ct_eq(claimed.as_slice()).into()
}

/// Compute the `sha256=<hex>` signature for a body. Used by tests and by
/// operators checking their webhook configuration.
pub fn sign(secret: &[u8], body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_signature_verifies() {
        let body = br#"{"action":"opened","number":1}"#;
        let header = sign(b"shared-secret", body);
        assert!(verify_signature("shared-secret", body, &header));
    }

    #[test]
    fn wrong_secret_fails() {
        let body = b"payload";
        let header = sign(b"other-secret", body);
        assert!(!verify_signature("shared-secret", body, &header));
    }

    #[test]
    fn mutated_body_fails() {
        let header = sign(b"shared-secret", b"payload");
        assert!(!verify_signature("shared-secret", b"payload2", &header));
    }

    #[test]
    fn missing_prefix_fails() {
        let body = b"payload";
        let header = sign(b"shared-secret", body);
        let bare = header.strip_prefix("sha256=").unwrap();
        assert!(!verify_signature("shared-secret", body, bare));
    }

    #[test]
    fn non_hex_digest_fails() {
        assert!(!verify_signature("shared-secret", b"payload", "sha256=not-hex!"));
    }

    #[test]
    fn empty_secret_accepts_anything() {
        assert!(verify_signature("", b"payload", ""));
        assert!(verify_signature("", b"payload", "sha256=garbage"));
    }

    #[test]
    fn truncated_digest_fails() {
        let body = b"payload";
        let header = sign(b"shared-secret", body);
        assert!(!verify_signature("shared-secret", body, &header[..header.len() - 4]));
    }
}
