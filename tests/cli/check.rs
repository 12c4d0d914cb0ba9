//! Tests for `fieldseal check`.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_check_aes_config() {
    let t = Test::with_config(&aes_config());

    let output = t.check();
    assert_success(&output);
    assert_stdout_contains(&output, "aes");
    assert_stdout_contains(&output, "round trip ok");
}

#[test]
fn test_check_generated_age_config() {
    let t = Test::new();
    let keygen = stdout(&t.keygen("age"));
    let identity = keygen
        .lines()
        .find(|l| l.starts_with("AGE-SECRET-KEY-"))
        .unwrap();
    t.write_config(&format!(
        "[cipher]\nbackend = \"age\"\n\n[age]\nidentity = \"{}\"\n",
        identity
    ));

    let output = t.check();
    assert_success(&output);
    assert_stdout_contains(&output, "age");
}

#[test]
fn test_check_without_config_fails_with_hint() {
    let t = Test::new();

    t.cmd()
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"))
        .stderr(predicate::str::contains("fieldseal.toml"));
}

#[test]
fn test_check_invalid_key_fails() {
    let t = Test::with_config("[cipher]\nbackend = \"aes\"\n\n[aes]\nkey = \"c2hvcnQ=\"\n");

    let output = t.check();
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid key");
}

#[test]
fn test_check_explicit_config_path() {
    let t = Test::new();
    let path = t.dir.path().join("other.toml");
    std::fs::write(&path, aes_config()).unwrap();

    t.cmd()
        .args(["check", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("round trip ok"));
}
