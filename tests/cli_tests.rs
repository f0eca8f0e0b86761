//! End-to-end tests for the pageverdict binary
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn verdict(args: &[&str]) -> serde_json::Value {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("pageverdict");
    let output = cmd.args(args).output().unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_healthy_session_is_up_without_down_evidence() {
    let doc = verdict(&[&fixture("healthy_session.json")]);
    assert_eq!(doc["classifier"], "classification_pipeline");
    assert_eq!(doc["status"], "up");
    assert_eq!(doc["statusConfidence"], 0.0);
    assert!(doc.get("abstained").is_none());
    assert!(doc.get("blocked").is_none());

    let constituents = doc["constituents"].as_array().unwrap();
    assert_eq!(constituents.len(), 8);
    assert!(constituents.iter().all(|c| c["status"] == "up"));

    // A clean capture is no evidence either way
    assert_eq!(constituents[1]["classifier"], "error");
    assert_eq!(constituents[1]["abstained"], true);
    assert_eq!(constituents[1]["reason"], "no errors recorded");
}

#[test]
fn test_healthy_session_derived_status_is_up() {
    let doc = verdict(&[&fixture("healthy_session.json"), "--derive-status"]);
    assert_eq!(doc["status"], "up");
    assert_eq!(doc["statusConfidence"], 0.0);
}

#[test]
fn test_blockpage_session_is_blocked() {
    let doc = verdict(&[&fixture("blockpage_session.json")]);
    assert_eq!(doc["status"], "down");
    assert_eq!(doc["blocked"], true);

    let block_page = doc["constituents"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["classifier"] == "block_page")
        .unwrap();
    assert_eq!(block_page["status"], "down");
    assert_eq!(block_page["statusConfidence"], 1.0);
    assert_eq!(block_page["blocked"], true);
}

#[test]
fn test_reset_session_region_fingerprint() {
    let doc = verdict(&[&fixture("reset_session.json"), "--derive-status"]);
    assert_eq!(doc["status"], "down");
    assert_eq!(doc["statusConfidence"], 1.0);
    assert_eq!(doc["blocked"], true);

    let error = &doc["constituents"][1];
    assert_eq!(error["classifier"], "error");
    assert_eq!(error["blocked"], true);

    // No baseline: comparison classifiers abstain but stay in the tree
    let page_length = &doc["constituents"][2];
    assert_eq!(page_length["abstained"], true);
    assert_eq!(page_length["reason"], "no baseline");
}

#[test]
fn test_captcha_session_is_inconclusive() {
    let doc = verdict(&[&fixture("captcha_session.json")]);
    assert_eq!(doc["status"], "up");
    assert_eq!(doc["statusConfidence"], 0.0);
    assert_eq!(doc["abstained"], true);
    assert_eq!(doc["reason"], "inconclusive: Cloudflare captcha challenge");
    assert_eq!(doc["constituents"].as_array().unwrap().len(), 8);
}

#[test]
fn test_text_format() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("pageverdict");
    cmd.arg(fixture("blockpage_session.json"))
        .arg("--format")
        .arg("text");

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("⛔ classification_pipeline DOWN"))
        .stdout(predicate::str::contains("  ⛔ block_page DOWN (1.000) - blocked"))
        .stdout(predicate::str::contains("differing_domain UP (0.000) - abstained"));
}

#[test]
fn test_session_from_stdin() {
    let session = std::fs::read(fixture("reset_session.json")).unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("pageverdict");
    cmd.arg("-")
        .write_stdin(session)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"blocked\": true"));
}

#[test]
fn test_sequential_matches_parallel() {
    let parallel = verdict(&[&fixture("blockpage_session.json")]);
    let sequential = verdict(&[&fixture("blockpage_session.json"), "--sequential"]);
    assert_eq!(parallel, sequential);
}

#[test]
fn test_malformed_session_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("pageverdict");
    cmd.arg(fixture("malformed_session.json"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("malformed session document"))
        .stderr(predicate::str::contains("missing \"url\""));
}

#[test]
fn test_missing_session_file_fails() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("pageverdict");
    cmd.arg(fixture("does_not_exist.json"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load session"));
}

#[test]
fn test_print_config() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("pageverdict");
    cmd.arg("--print-config");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("# config 2024.06-1 sha256:"))
        .stdout(predicate::str::contains("# signatures"))
        .stdout(predicate::str::contains("root = \"classification_pipeline\""));
}

#[test]
fn test_custom_config_and_signatures() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(
        config,
        r#"
version = "tiny-1"
root = "tiny"

[[pipeline]]
name = "tiny"
status = "threshold"
members = [{{ classifier = "block_page" }}]
"#
    )
    .unwrap();
    config.flush().unwrap();

    let mut signatures = NamedTempFile::new().unwrap();
    writeln!(
        signatures,
        r#"
version = "custom"

[[body]]
literal = true
pattern = "The city council approved"
"#
    )
    .unwrap();
    signatures.flush().unwrap();

    let config_path = config.path().to_str().unwrap().to_string();
    let signatures_path = signatures.path().to_str().unwrap().to_string();
    let doc = verdict(&[
        &fixture("healthy_session.json"),
        "--config",
        &config_path,
        "--signatures",
        &signatures_path,
    ]);
    assert_eq!(doc["classifier"], "tiny");
    assert_eq!(doc["status"], "down");
    assert_eq!(doc["blocked"], true);
    assert_eq!(doc["constituents"].as_array().unwrap().len(), 1);
}

#[test]
fn test_cyclic_config_rejected() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(
        config,
        r#"
version = "bad"
root = "a"

[[pipeline]]
name = "a"
members = [{{ pipeline = "b" }}]

[[pipeline]]
name = "b"
members = [{{ pipeline = "a" }}]
"#
    )
    .unwrap();
    config.flush().unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("pageverdict");
    cmd.arg(fixture("healthy_session.json"))
        .arg("--config")
        .arg(config.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cycle"));
}
