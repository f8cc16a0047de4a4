use vigil_server::signature::{sign, verify_signature};

#[test]
fn body_signed_with_secret_verifies_against_same_secret() {
    let body = br#"{"action":"opened","pull_request":{"number":7}}"#;
    let header = sign(b"S", body);
    assert!(verify_signature("S", body, &header));
}

#[test]
fn signature_from_a_different_secret_is_rejected() {
    let body = br#"{"action":"opened"}"#;
    let header = sign(b"other", body);
    assert!(!verify_signature("S", body, &header));
}

#[test]
fn mutated_body_is_rejected() {
    let header = sign(b"S", br#"{"action":"opened"}"#);
    assert!(!verify_signature("S", br#"{"action":"reopened"}"#, &header));
}

#[test]
fn empty_configured_secret_disables_verification() {
    assert!(verify_signature("", b"anything", "sha256=bogus"));
}
