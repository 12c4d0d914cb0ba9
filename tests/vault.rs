//! Vault transit backend tests against a mock Vault server.

#![cfg(feature = "vault")]

mod support;
use support::*;

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use fieldseal::core::cipher::VaultTransit;
use fieldseal::error::{CipherError, Error};
use fieldseal::{EncryptingSerializer, EncryptionService, JsonSerializer, Serializer};
use serde_json::json;
use wiremock::matchers::{any, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

fn service(server: &MockServer) -> VaultTransit {
    VaultTransit::new(server.uri(), TOKEN).unwrap()
}

#[tokio::test]
async fn test_encrypt_uses_default_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/transit/encrypt/pii-key"))
        .and(header("X-Vault-Token", TOKEN))
        .and(body_json(json!({ "plaintext": STANDARD.encode("John Doe") })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "ciphertext": "vault:v1:abc" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let sealed = service(&server).encrypt("John Doe", None).await.unwrap();
    assert_eq!(sealed, "vault:v1:abc");
}

#[tokio::test]
async fn test_document_key_selects_transit_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/transit/encrypt/patient-7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "ciphertext": "vault:v1:xyz" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let sealed = service(&server)
        .encrypt("secret", Some("patient-7"))
        .await
        .unwrap();
    assert_eq!(sealed, "vault:v1:xyz");
}

#[tokio::test]
async fn test_custom_default_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/transit/encrypt/tenant-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "ciphertext": "vault:v1:t" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let service = service(&server).with_default_key("tenant-key");
    assert_eq!(service.default_key(), "tenant-key");
    assert_eq!(service.encrypt("x", None).await.unwrap(), "vault:v1:t");
}

#[tokio::test]
async fn test_encrypt_server_error_is_hard_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = service(&server).encrypt("x", None).await.unwrap_err();
    assert!(matches!(err, CipherError::EncryptionFailed(_)));
}

#[tokio::test]
async fn test_decrypt_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/transit/decrypt/pii-key"))
        .and(body_json(json!({ "ciphertext": "vault:v1:abc" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "plaintext": STANDARD.encode("John Doe") } })),
        )
        .mount(&server)
        .await;

    let plaintext = service(&server).try_decrypt("vault:v1:abc", None).await;
    assert_eq!(plaintext.as_deref(), Some("John Doe"));
}

#[tokio::test]
async fn test_decrypt_rejection_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/transit/decrypt/pii-key"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": ["invalid ciphertext: no prefix"]
        })))
        .mount(&server)
        .await;

    assert_eq!(service(&server).try_decrypt("plaintext", None).await, None);
}

#[tokio::test]
async fn test_drop_key_enables_deletion_then_deletes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/transit/keys/patient-7/config"))
        .and(body_json(json!({ "deletion_allowed": true })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/transit/keys/patient-7"))
        .and(header("X-Vault-Token", TOKEN))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    service(&server).drop_key("patient-7").await.unwrap();
}

#[tokio::test]
async fn test_drop_blank_key_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    service(&server).drop_key("  ").await.unwrap();
}

#[tokio::test]
async fn test_drop_key_failure_is_key_operation_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = service(&server).drop_key("patient-7").await.unwrap_err();
    assert!(matches!(err, CipherError::KeyOperation { .. }));
}

#[tokio::test]
async fn test_serializer_write_fails_when_vault_is_down() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let serializer = EncryptingSerializer::new(
        JsonSerializer::new(),
        Arc::new(person_rules()),
        Arc::new(service(&server)),
    );
    let err = serializer.to_json(&john_doe()).await.unwrap_err();
    assert!(matches!(err, Error::Encrypt { .. }));
}

const ESCAPING_KEY: &str = "../../sys/policy/x";

/// Mounts a catch-all that must never be hit.
async fn refuse_all(server: &MockServer) {
    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "ciphertext": "vault:v1:leak" } })),
        )
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_encrypt_rejects_key_outside_transit_mount() {
    let server = MockServer::start().await;
    refuse_all(&server).await;

    let service = service(&server);
    let err = service.encrypt("secret", Some(ESCAPING_KEY)).await.unwrap_err();
    assert!(matches!(err, CipherError::InvalidKey(_)));
    assert!(service.encrypt("secret", Some("a/b")).await.is_err());
}

#[tokio::test]
async fn test_decrypt_with_invalid_key_is_none() {
    let server = MockServer::start().await;
    refuse_all(&server).await;

    let plaintext = service(&server)
        .try_decrypt("vault:v1:abc", Some(ESCAPING_KEY))
        .await;
    assert_eq!(plaintext, None);
}

#[tokio::test]
async fn test_drop_key_rejects_key_outside_transit_mount() {
    let server = MockServer::start().await;
    refuse_all(&server).await;

    let err = service(&server).drop_key(ESCAPING_KEY).await.unwrap_err();
    assert!(matches!(err, CipherError::InvalidKey(_)));
}

#[tokio::test]
async fn test_invalid_default_key_is_rejected() {
    let server = MockServer::start().await;
    refuse_all(&server).await;

    let service = service(&server).with_default_key("keys/pii-key");
    let err = service.encrypt("secret", None).await.unwrap_err();
    assert!(matches!(err, CipherError::InvalidKey(_)));
}

#[tokio::test]
async fn test_document_key_outside_transit_mount_aborts_write() {
    let server = MockServer::start().await;
    refuse_all(&server).await;

    let serializer = EncryptingSerializer::new(
        JsonSerializer::new(),
        Arc::new(patient_rules()),
        Arc::new(service(&server)),
    );
    let err = serializer.to_json(&patient(ESCAPING_KEY)).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Encrypt {
            source: CipherError::InvalidKey(_),
            ..
        }
    ));
}
