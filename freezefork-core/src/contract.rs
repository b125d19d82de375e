//! Contracts between the pipeline and its two external collaborators: the
//! CAD host application and the vault backend.
//!
//! Both traits are annotated for `mockall`, so tests of the scanner and the
//! publish pipeline run against canned hosts and vaults instead of a live
//! CAD process or a network endpoint. Real implementations: [`crate::host::DescriptorHost`]
//! for `CadHost`, and the reqwest client in the `freezefork` crate for
//! `VaultApi`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::model::{Commit, Project, UploadReceipt, UploadedFile};

/// Kind of document the host reports as active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Part,
    Assembly,
    Drawing,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Part => f.write_str("part"),
            DocumentKind::Assembly => f.write_str("assembly"),
            DocumentKind::Drawing => f.write_str("drawing"),
        }
    }
}

/// Handle to an opened document, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CadDocument {
    /// Display title of the document window.
    pub title: String,
    /// Absolute path of the document file; may be empty for never-saved
    /// documents.
    pub path: PathBuf,
    pub doc_type: DocumentKind,
}

/// Resolution flags passed to the host's dependency enumeration.
///
/// The host offers a third filter (excluding suppressed components) that this
/// caller never sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyFlags {
    /// Traverse references transitively, not just the top level.
    pub all_levels: bool,
    /// Ask the host to search its configured locations for references whose
    /// recorded path no longer resolves.
    pub search_missing: bool,
}

impl Default for DependencyFlags {
    fn default() -> Self {
        Self {
            all_levels: true,
            search_missing: true,
        }
    }
}

/// Failure talking to the CAD host.
#[derive(Debug)]
pub enum HostError {
    /// The host application is not running or its document source could not
    /// be opened.
    Unavailable(String),
    /// The host was reached but a call into its object model failed.
    Api(String),
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostError::Unavailable(msg) => write!(f, "CAD host unavailable: {msg}"),
            HostError::Api(msg) => write!(f, "CAD host call failed: {msg}"),
        }
    }
}

impl std::error::Error for HostError {}

/// Capability surface of the CAD host application.
///
/// Purely observational: implementations must not mutate the host's state.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait CadHost: Send + Sync {
    /// The currently active document, or `None` when no document is open.
    fn active_document(&self) -> Result<Option<CadDocument>, HostError>;

    /// All file paths the document references, direct and transitive, as
    /// resolved by the host under the given flags. Unresolvable references
    /// come back as empty strings.
    fn dependency_paths(
        &self,
        doc: &CadDocument,
        flags: DependencyFlags,
    ) -> Result<Vec<String>, HostError>;
}

/// Failure talking to the vault backend.
#[derive(Debug)]
pub enum VaultError {
    /// The request exceeded the client-side deadline. Reported separately
    /// from other transport failures because large binary uploads hit it.
    Timeout,
    /// Connection-level failure: DNS, refused, TLS, broken stream.
    Transport(String),
    /// The backend answered with a non-2xx status. `detail` carries the
    /// structured error body when one was parseable, the raw text otherwise.
    Api { status: u16, detail: String },
    /// A 2xx response whose body did not match the expected shape.
    UnexpectedResponse(String),
    /// The package directory contains no uploadable CAD files; no request
    /// was sent.
    NoEligibleFiles,
    /// Local filesystem failure while preparing or persisting transfer data.
    Io(std::io::Error),
}

impl std::fmt::Display for VaultError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VaultError::Timeout => f.write_str("request timed out"),
            VaultError::Transport(msg) => write!(f, "transport error: {msg}"),
            VaultError::Api { status, detail } => {
                write!(f, "vault returned status {status}: {detail}")
            }
            VaultError::UnexpectedResponse(msg) => {
                write!(f, "unexpected response from vault: {msg}")
            }
            VaultError::NoEligibleFiles => {
                f.write_str("no CAD files found to upload in the package directory")
            }
            VaultError::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for VaultError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VaultError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for VaultError {
    fn from(e: std::io::Error) -> Self {
        VaultError::Io(e)
    }
}

/// Operations against the vault backend. Implemented by the reqwest client
/// in the `freezefork` crate and by test mocks.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait VaultApi: Send + Sync {
    /// Connectivity probe against the health endpoint. Never errors: an
    /// unreachable or unhealthy backend yields `false`.
    async fn check_health(&self) -> bool;

    /// All projects held by the vault.
    async fn list_projects(&self) -> Result<Vec<Project>, VaultError>;

    /// Create a project with the given name and optional description.
    async fn create_project<'a>(
        &self,
        name: &str,
        description: Option<&'a str>,
    ) -> Result<Project, VaultError>;

    /// Commit history of a project. An unknown id yields an empty sequence,
    /// not an error.
    async fn list_commits(&self, project_id: &str) -> Result<Vec<Commit>, VaultError>;

    /// Upload a package directory's CAD files as one commit.
    async fn upload_assembly(
        &self,
        project_id: &str,
        package_dir: &Path,
        message: &str,
        author: &str,
    ) -> Result<UploadReceipt, VaultError>;

    /// Stream one named file of a commit into `dest`.
    async fn download_commit_file(
        &self,
        project_id: &str,
        commit_id: &str,
        filename: &str,
        dest: &Path,
    ) -> Result<(), VaultError>;

    /// Stream a whole commit as an archive into `dest`.
    async fn download_commit_archive(
        &self,
        project_id: &str,
        commit_id: &str,
        dest: &Path,
    ) -> Result<(), VaultError>;

    /// Upload a single file outside any commit.
    async fn upload_single_file(&self, path: &Path) -> Result<UploadedFile, VaultError>;
}
