//! Reqwest implementation of the vault API contract.
//!
//! Failure policy: every method maps transport and HTTP failures into a
//! [`VaultError`] and logs them; nothing in here panics or crashes the
//! caller. Timeouts are reported separately from other transport errors
//! because large binary uploads hit them. File handles are owned buffers and
//! guards, so cleanup is unconditional on every exit path.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use tracing::{error, info, warn};

use freezefork_core::contract::{VaultApi, VaultError};
use freezefork_core::model::{Commit, Project, UploadReceipt, UploadedFile};
use freezefork_core::package;

/// Default API base URL when neither the flag nor the environment sets one.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8124/api/v1";

/// Client-side deadline for assembly uploads. Generous because packages
/// carry large binary CAD files.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Deadline for single-file uploads.
const FILE_UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

pub struct VaultClient {
    base_url: String,
    http: reqwest::Client,
}

impl VaultClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, VaultError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("freezefork/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VaultError::Transport(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Base URL from `FREEZEFORK_API_URL`, falling back to the default.
    pub fn from_env() -> Result<Self, VaultError> {
        let base_url =
            std::env::var("FREEZEFORK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Download every file recorded on a commit into `dest_dir`. Per-file
    /// failures are logged and skipped; the call succeeds when at least one
    /// file landed.
    pub async fn download_commit_files(
        &self,
        project_id: &str,
        commit_id: &str,
        dest_dir: &Path,
    ) -> Result<usize, VaultError> {
        let commits = self.list_commits(project_id).await?;
        let commit = commits
            .into_iter()
            .find(|c| c.id == commit_id)
            .ok_or_else(|| VaultError::UnexpectedResponse(format!("commit {commit_id} not found")))?;

        fs::create_dir_all(dest_dir)?;
        let mut downloaded = 0usize;
        for file in &commit.files {
            let dest = dest_dir.join(&file.name);
            match self
                .download_commit_file(project_id, commit_id, &file.name, &dest)
                .await
            {
                Ok(()) => {
                    info!(name = %file.name, "Downloaded commit file");
                    downloaded += 1;
                }
                Err(e) => {
                    warn!(name = %file.name, error = %e, "Failed to download commit file, skipping");
                }
            }
        }
        info!(downloaded, dest = %dest_dir.display(), "Commit download finished");
        Ok(downloaded)
    }

    async fn stream_to_file(&self, url: String, dest: &Path) -> Result<(), VaultError> {
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(map_request_error)?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        let mut file = fs::File::create(dest)?;
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_request_error)?;
            file.write_all(&chunk)?;
        }
        Ok(())
    }
}

#[async_trait]
impl VaultApi for VaultClient {
    async fn check_health(&self) -> bool {
        match self.http.get(self.url("health")).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!(base_url = %self.base_url, "API connection successful");
                true
            }
            Ok(resp) => {
                warn!(status = %resp.status(), "API health probe returned non-success status");
                false
            }
            Err(e) => {
                warn!(error = %e, base_url = %self.base_url, "API connection failed");
                false
            }
        }
    }

    async fn list_projects(&self) -> Result<Vec<Project>, VaultError> {
        let resp = self
            .http
            .get(self.url("projects"))
            .send()
            .await
            .map_err(map_request_error)?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        let projects: Vec<Project> = resp
            .json()
            .await
            .map_err(|e| VaultError::UnexpectedResponse(e.to_string()))?;
        info!(count = projects.len(), "Fetched projects");
        Ok(projects)
    }

    async fn create_project<'a>(
        &self,
        name: &str,
        description: Option<&'a str>,
    ) -> Result<Project, VaultError> {
        let body = serde_json::json!({
            "name": name,
            "description": description.unwrap_or(""),
        });
        let resp = self
            .http
            .post(self.url("projects"))
            .json(&body)
            .send()
            .await
            .map_err(map_request_error)?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        let project: Project = resp
            .json()
            .await
            .map_err(|e| VaultError::UnexpectedResponse(e.to_string()))?;
        info!(id = %project.id, name = %project.name, "Created project");
        Ok(project)
    }

    async fn list_commits(&self, project_id: &str) -> Result<Vec<Commit>, VaultError> {
        let resp = self
            .http
            .get(self.url(&format!("projects/{project_id}/commits")))
            .send()
            .await
            .map_err(map_request_error)?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        let commits: Vec<Commit> = resp
            .json()
            .await
            .map_err(|e| VaultError::UnexpectedResponse(e.to_string()))?;
        info!(project_id, count = commits.len(), "Fetched commits");
        Ok(commits)
    }

    async fn upload_assembly(
        &self,
        project_id: &str,
        package_dir: &Path,
        message: &str,
        author: &str,
    ) -> Result<UploadReceipt, VaultError> {
        info!(project_id, package_dir = %package_dir.display(), "Starting assembly upload");

        let files = package::eligible_files(package_dir)?;
        if files.is_empty() {
            error!(package_dir = %package_dir.display(), "No CAD files found to upload");
            return Err(VaultError::NoEligibleFiles);
        }

        let mut form = Form::new()
            .text("message", message.to_string())
            .text("author", author.to_string())
            .text("branch", "main");
        for path in &files {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unnamed".to_string());
            let bytes = fs::read(path)?;
            info!(name = %name, size = bytes.len(), "Preparing file part");
            let part = Part::bytes(bytes)
                .file_name(name)
                .mime_str("application/octet-stream")
                .map_err(|e| VaultError::Transport(e.to_string()))?;
            form = form.part("files", part);
        }

        let resp = self
            .http
            .post(self.url(&format!("projects/{project_id}/commits")))
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await
            .map_err(map_request_error)?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        let receipt: UploadReceipt = resp
            .json()
            .await
            .map_err(|e| VaultError::UnexpectedResponse(e.to_string()))?;
        info!(
            commit_id = %receipt.commit.id,
            files_uploaded = receipt.files_uploaded,
            "Upload completed"
        );
        Ok(receipt)
    }

    async fn download_commit_file(
        &self,
        project_id: &str,
        commit_id: &str,
        filename: &str,
        dest: &Path,
    ) -> Result<(), VaultError> {
        let url = self.url(&format!(
            "projects/{project_id}/commits/{commit_id}/files/{filename}"
        ));
        self.stream_to_file(url, dest).await
    }

    async fn download_commit_archive(
        &self,
        project_id: &str,
        commit_id: &str,
        dest: &Path,
    ) -> Result<(), VaultError> {
        info!(project_id, commit_id, dest = %dest.display(), "Downloading commit archive");
        let url = self.url(&format!("projects/{project_id}/commits/{commit_id}/archive"));
        self.stream_to_file(url, dest).await
    }

    async fn upload_single_file(&self, path: &Path) -> Result<UploadedFile, VaultError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());
        let bytes = fs::read(path)?;
        let part = Part::bytes(bytes)
            .file_name(name)
            .mime_str("application/octet-stream")
            .map_err(|e| VaultError::Transport(e.to_string()))?;
        let form = Form::new().part("file", part);

        let resp = self
            .http
            .post(self.url("files/upload"))
            .multipart(form)
            .timeout(FILE_UPLOAD_TIMEOUT)
            .send()
            .await
            .map_err(map_request_error)?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        let uploaded: UploadedFile = resp
            .json()
            .await
            .map_err(|e| VaultError::UnexpectedResponse(e.to_string()))?;
        info!(id = %uploaded.id, "File uploaded");
        Ok(uploaded)
    }
}

fn map_request_error(e: reqwest::Error) -> VaultError {
    if e.is_timeout() {
        error!("Request timed out, files may be too large");
        VaultError::Timeout
    } else {
        VaultError::Transport(e.to_string())
    }
}

/// Extract the structured `detail` field from an error body, falling back to
/// the raw response text.
async fn error_from_response(resp: reqwest::Response) -> VaultError {
    let status = resp.status().as_u16();
    let text = resp.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str().map(str::to_string)))
        .unwrap_or(text);
    error!(status, detail = %detail, "Vault returned an error response");
    VaultError::Api { status, detail }
}
