//! Tests for `fieldseal keygen`.

use crate::support::*;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

#[test]
fn test_keygen_aes_prints_32_byte_key() {
    let t = Test::new();

    let output = t.keygen("aes");
    assert_success(&output);
    let key = stdout(&output).trim().to_string();
    assert_eq!(STANDARD.decode(&key).unwrap().len(), 32);
}

#[test]
fn test_keygen_aes_keys_differ() {
    let t = Test::new();
    let first = stdout(&t.keygen("aes"));
    let second = stdout(&t.keygen("aes"));
    assert_ne!(first, second);
}

#[test]
fn test_keygen_age_prints_identity_and_recipient() {
    let t = Test::new();

    let output = t.keygen("age");
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("# public key: age1"));
    assert!(out.contains("AGE-SECRET-KEY-1"));
}

#[test]
fn test_keygen_unknown_kind_fails() {
    let t = Test::new();
    assert_failure(&t.keygen("rot13"));
}
