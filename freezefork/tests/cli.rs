use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

/// Writes a CAD part file plus a document descriptor referencing it (and one
/// unresolvable reference), returning the descriptor path.
fn write_descriptor(dir: &Path) -> std::path::PathBuf {
    let assembly = dir.join("gripper.SLDASM");
    fs::write(&assembly, b"assembly bytes").unwrap();
    let part = dir.join("jaw.sldprt");
    fs::write(&part, b"part bytes").unwrap();

    let descriptor = serde_json::json!({
        "title": "gripper.SLDASM",
        "path": assembly,
        "kind": "assembly",
        "references": [part, ""],
    });
    let descriptor_path = dir.join("gripper.doc.json");
    fs::write(
        &descriptor_path,
        serde_json::to_string_pretty(&descriptor).unwrap(),
    )
    .unwrap();
    descriptor_path
}

#[test]
fn scan_prints_classified_dependencies() {
    let dir = tempdir().unwrap();
    let descriptor = write_descriptor(dir.path());

    let mut cmd = Command::cargo_bin("freezefork").unwrap();
    cmd.arg("scan").arg("--document").arg(&descriptor);

    cmd.assert()
        .success()
        .stdout(
            predicate::str::contains("jaw.sldprt")
                .and(predicate::str::contains("\"part\""))
                .and(predicate::str::contains("Unknown"))
                .and(predicate::str::contains("\"missing\"")),
        );
}

#[test]
fn package_creates_directory_with_sidecar() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    let descriptor = write_descriptor(dir.path());

    let mut cmd = Command::cargo_bin("freezefork").unwrap();
    cmd.arg("package")
        .arg("--document")
        .arg(&descriptor)
        .arg("--output-root")
        .arg(out.path());

    let output = cmd.assert().success().get_output().stdout.clone();
    let package_dir = std::path::PathBuf::from(String::from_utf8(output).unwrap().trim());
    assert!(package_dir.join("assembly_info.json").is_file());
    assert!(package_dir.join("gripper.SLDASM").is_file());
    assert!(package_dir.join("jaw.sldprt").is_file());
}

#[test]
fn manifest_prints_sha256_digests() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("jaw.sldprt"), b"hello").unwrap();

    let mut cmd = Command::cargo_bin("freezefork").unwrap();
    cmd.arg("manifest").arg(dir.path());

    cmd.assert().success().stdout(predicate::str::contains(
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
    ));
}

#[test]
fn health_against_unreachable_vault_exits_nonzero() {
    let mut cmd = Command::cargo_bin("freezefork").unwrap();
    cmd.arg("--api-url")
        .arg("http://127.0.0.1:1/api/v1")
        .arg("health");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unreachable"));
}
