//! End-to-end tests driving the in-process server with the real HTTP client.

use std::fs;
use std::sync::Arc;

use tempfile::tempdir;

use freezefork::client::VaultClient;
use freezefork_core::contract::{VaultApi, VaultError};
use freezefork_server::api::create_router;
use freezefork_server::store::VaultStore;

/// Serves a seeded store on an ephemeral port, returning a client bound to
/// it. The server task lives as long as the test runtime.
async fn spawn_vault() -> VaultClient {
    let store = Arc::new(VaultStore::seeded());
    let app = create_router(store);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    VaultClient::new(format!("http://{addr}/api/v1")).unwrap()
}

#[tokio::test]
async fn health_reports_healthy() {
    let client = spawn_vault().await;
    assert!(client.check_health().await);
}

#[tokio::test]
async fn seeded_projects_are_listed() {
    let client = spawn_vault().await;
    let projects = client.list_projects().await.unwrap();
    assert_eq!(projects.len(), 3);
    assert_eq!(projects[0].name, "Robotic Arm Assembly");
    assert_eq!(projects[0].branches.len(), 3);
}

#[tokio::test]
async fn created_project_gets_next_id_and_shows_up_in_listing() {
    let client = spawn_vault().await;
    let project = client
        .create_project("Gripper Jig", Some("fixture tooling"))
        .await
        .unwrap();
    assert_eq!(project.id, "proj-4");
    assert_eq!(project.description, "fixture tooling");

    let projects = client.list_projects().await.unwrap();
    assert!(projects.iter().any(|p| p.id == "proj-4"));
}

#[tokio::test]
async fn unknown_project_has_empty_commit_history() {
    let client = spawn_vault().await;
    let commits = client.list_commits("proj-999").await.unwrap();
    assert!(commits.is_empty());
}

#[tokio::test]
async fn seeded_history_is_served() {
    let client = spawn_vault().await;
    let commits = client.list_commits("proj-1").await.unwrap();
    assert_eq!(commits.len(), 10);
    assert_eq!(commits[0].id, "commit-1");
    assert!(commits[0].parents.is_empty());
    assert_eq!(commits[1].parents, vec!["commit-1".to_string()]);
}

#[tokio::test]
async fn uploaded_package_round_trips_through_commit_and_download() {
    let client = spawn_vault().await;
    let project = client.create_project("Gripper", None).await.unwrap();

    // A package directory: two CAD files plus the sidecar the upload skips.
    let package = tempdir().unwrap();
    fs::write(package.path().join("gripper.sldasm"), b"assembly bytes").unwrap();
    fs::write(package.path().join("jaw.sldprt"), b"part bytes").unwrap();
    fs::write(package.path().join("assembly_info.json"), b"{}").unwrap();

    let receipt = client
        .upload_assembly(&project.id, package.path(), "first drop", "Test User")
        .await
        .unwrap();
    assert_eq!(receipt.commit.id, "commit-1");
    assert_eq!(receipt.files_uploaded, 2);
    assert_eq!(receipt.commit.author, "Test User");

    let commits = client.list_commits(&project.id).await.unwrap();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].files.len(), 2);

    let dest = tempdir().unwrap();
    let target = dest.path().join("jaw.sldprt");
    client
        .download_commit_file(&project.id, &receipt.commit.id, "jaw.sldprt", &target)
        .await
        .unwrap();
    assert_eq!(fs::read(target).unwrap(), b"part bytes");
}

#[tokio::test]
async fn download_commit_files_fetches_every_recorded_file() {
    let client = spawn_vault().await;
    let project = client.create_project("Gripper", None).await.unwrap();

    let package = tempdir().unwrap();
    fs::write(package.path().join("base.sldprt"), b"base").unwrap();
    fs::write(package.path().join("arm.step"), b"arm").unwrap();
    let receipt = client
        .upload_assembly(&project.id, package.path(), "msg", "a")
        .await
        .unwrap();

    let dest = tempdir().unwrap();
    let downloaded = client
        .download_commit_files(&project.id, &receipt.commit.id, dest.path())
        .await
        .unwrap();
    assert_eq!(downloaded, 2);
    assert_eq!(fs::read(dest.path().join("base.sldprt")).unwrap(), b"base");
    assert_eq!(fs::read(dest.path().join("arm.step")).unwrap(), b"arm");
}

#[tokio::test]
async fn commit_archive_is_a_zip() {
    let client = spawn_vault().await;
    let project = client.create_project("Gripper", None).await.unwrap();

    let package = tempdir().unwrap();
    fs::write(package.path().join("base.sldprt"), b"base").unwrap();
    let receipt = client
        .upload_assembly(&project.id, package.path(), "msg", "a")
        .await
        .unwrap();

    let dest = tempdir().unwrap();
    let archive = dest.path().join("commit.zip");
    client
        .download_commit_archive(&project.id, &receipt.commit.id, &archive)
        .await
        .unwrap();

    let bytes = fs::read(archive).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[tokio::test]
async fn upload_to_unknown_project_is_a_404_with_detail() {
    let client = spawn_vault().await;

    let package = tempdir().unwrap();
    fs::write(package.path().join("base.sldprt"), b"base").unwrap();

    let result = client
        .upload_assembly("proj-999", package.path(), "msg", "a")
        .await;
    match result {
        Err(VaultError::Api { status, detail }) => {
            assert_eq!(status, 404);
            assert!(detail.contains("proj-999"));
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_commit_file_is_a_404() {
    let client = spawn_vault().await;
    let dest = tempdir().unwrap();
    let result = client
        .download_commit_file("proj-1", "commit-1", "nope.sldprt", &dest.path().join("x"))
        .await;
    assert!(matches!(result, Err(VaultError::Api { status: 404, .. })));
}

#[tokio::test]
async fn standalone_file_upload_assigns_sequential_ids() {
    let client = spawn_vault().await;

    let dir = tempdir().unwrap();
    let file = dir.path().join("bracket.sldprt");
    fs::write(&file, b"bracket bytes").unwrap();

    let first = client.upload_single_file(&file).await.unwrap();
    assert_eq!(first.id, "file-1");
    assert_eq!(first.name, "bracket.sldprt");
    assert_eq!(first.size, 13);

    let second = client.upload_single_file(&file).await.unwrap();
    assert_eq!(second.id, "file-2");
}
