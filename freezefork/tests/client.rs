use std::fs;

use freezefork::client::VaultClient;
use freezefork_core::contract::{VaultApi, VaultError};
use tempfile::tempdir;

/// No listener on port 1, so any request that actually goes out fails with a
/// transport error. Used to prove which calls never hit the network.
const UNREACHABLE: &str = "http://127.0.0.1:1/api/v1";

#[tokio::test]
async fn health_probe_on_unreachable_vault_returns_false() {
    let client = VaultClient::new(UNREACHABLE).unwrap();
    assert!(!client.check_health().await);
}

#[tokio::test]
async fn upload_with_no_eligible_files_fails_before_any_request() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("assembly_info.json"), b"{}").unwrap();
    fs::write(dir.path().join("notes.txt"), b"not cad").unwrap();

    let client = VaultClient::new(UNREACHABLE).unwrap();
    let result = client
        .upload_assembly("proj-1", dir.path(), "msg", "author")
        .await;

    // A transport error here would mean a request was sent despite the
    // empty selection.
    assert!(matches!(result, Err(VaultError::NoEligibleFiles)));
}

#[tokio::test]
async fn list_projects_on_unreachable_vault_is_a_transport_error() {
    let client = VaultClient::new(UNREACHABLE).unwrap();
    let result = client.list_projects().await;
    assert!(matches!(result, Err(VaultError::Transport(_))));
}
