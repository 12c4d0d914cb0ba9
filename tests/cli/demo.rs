//! Tests for `fieldseal demo`.

use crate::support::*;

#[test]
fn test_demo_without_config_uses_ephemeral_age_key() {
    let t = Test::new();

    let output = t.demo();
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("ephemeral age key"));
    assert!(out.contains("BEGIN AGE ENCRYPTED FILE"));
    assert!(out.contains("all fields restored"));
    assert!(out.contains("protected fields are unreadable"));
}

#[test]
fn test_demo_with_aes_config() {
    let t = Test::with_config(&aes_config());

    let output = t.demo();
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("Anytown"));
    assert!(out.contains("all fields restored"));
    assert!(out.contains("no per-document keys"));
}

#[test]
fn test_demo_verbose_logs_to_stderr() {
    let t = Test::with_config(&aes_config());

    let output = t.cmd().args(["demo", "--verbose"]).output().unwrap();
    assert_success(&output);
    assert_stderr_contains(&output, "field encryption enabled");
}
