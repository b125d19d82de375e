//! High-level pipeline: scan the active assembly, package it, upload it as a
//! commit.
//!
//! One sequential coordinator replaces the original plugin's fire-and-forget
//! background threads: every step runs to completion before the next starts,
//! so there is no shared "current assembly / current package" state to race
//! on. Each failed step returns immediately with a distinct error variant;
//! callers log and surface it, nothing panics.

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::contract::{CadHost, DependencyFlags, DocumentKind, HostError, VaultApi, VaultError};
use crate::model::AssemblyInfo;
use crate::package::{self, PackageError};
use crate::scanner::{self, ScanError};

/// What to publish and where.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub project_id: String,
    pub message: String,
    pub author: String,
    /// Root directory under which the package directory is created.
    pub output_root: PathBuf,
}

/// Outcome of a successful publish run.
#[derive(Debug)]
pub struct PublishReport {
    pub assembly: AssemblyInfo,
    pub package_dir: PathBuf,
    pub commit_id: String,
    pub files_uploaded: u64,
}

#[derive(Debug)]
pub enum PublishError {
    Host(HostError),
    /// No document is open in the host.
    NoActiveDocument,
    /// The active document is not an assembly.
    NotAnAssembly(DocumentKind),
    Scan(ScanError),
    Package(PackageError),
    Upload(VaultError),
}

impl std::fmt::Display for PublishError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishError::Host(e) => write!(f, "{e}"),
            PublishError::NoActiveDocument => f.write_str("no active document in the CAD host"),
            PublishError::NotAnAssembly(kind) => {
                write!(f, "active document is a {kind}, not an assembly")
            }
            PublishError::Scan(e) => write!(f, "{e}"),
            PublishError::Package(e) => write!(f, "{e}"),
            PublishError::Upload(e) => write!(f, "upload failed: {e}"),
        }
    }
}

impl std::error::Error for PublishError {}

/// Run the full pipeline: active document → scan → package → upload.
pub async fn publish<H, V>(
    host: &H,
    vault: &V,
    request: &PublishRequest,
) -> Result<PublishReport, PublishError>
where
    H: CadHost + ?Sized,
    V: VaultApi + ?Sized,
{
    info!(project_id = %request.project_id, "Starting publish pipeline");

    let doc = host
        .active_document()
        .map_err(PublishError::Host)?
        .ok_or(PublishError::NoActiveDocument)?;
    if doc.doc_type != DocumentKind::Assembly {
        error!(doc_type = %doc.doc_type, title = %doc.title, "Active document is not an assembly");
        return Err(PublishError::NotAnAssembly(doc.doc_type));
    }

    let assembly =
        scanner::scan(host, &doc, DependencyFlags::default()).map_err(PublishError::Scan)?;
    let missing = assembly.missing_dependencies().count();
    if missing > 0 {
        warn!(missing, "Publishing with unresolved references");
    }
    info!(
        name = %assembly.name,
        dependencies = assembly.dependencies.len(),
        "Assembly scanned"
    );

    let package_dir =
        package::build_package(&assembly, &request.output_root).map_err(PublishError::Package)?;
    info!(package_dir = %package_dir.display(), "Package created");

    let receipt = vault
        .upload_assembly(
            &request.project_id,
            &package_dir,
            &request.message,
            &request.author,
        )
        .await
        .map_err(PublishError::Upload)?;
    info!(
        commit_id = %receipt.commit.id,
        files_uploaded = receipt.files_uploaded,
        "Upload completed"
    );

    Ok(PublishReport {
        assembly,
        package_dir,
        commit_id: receipt.commit.id,
        files_uploaded: receipt.files_uploaded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{CadDocument, MockCadHost, MockVaultApi};
    use crate::model::{Commit, UploadReceipt};
    use std::fs;
    use std::io::Write;
    use std::path::Path;

    fn assembly_on_disk(dir: &Path) -> CadDocument {
        let main = dir.join("arm.SLDASM");
        fs::File::create(&main).unwrap().write_all(b"asm").unwrap();
        CadDocument {
            title: "arm.SLDASM".into(),
            path: main,
            doc_type: DocumentKind::Assembly,
        }
    }

    fn receipt(commit_id: &str, files: u64) -> UploadReceipt {
        UploadReceipt {
            commit: Commit {
                id: commit_id.into(),
                message: "msg".into(),
                timestamp: "2025-08-12T10:00:00Z".into(),
                author: "Test".into(),
                branch: "main".into(),
                x: 50,
                y: 50,
                parents: vec![],
                files: vec![],
            },
            files_uploaded: files,
        }
    }

    #[tokio::test]
    async fn full_pipeline_reports_commit_and_package() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let doc = assembly_on_disk(src.path());
        let part = src.path().join("joint.sldprt");
        fs::File::create(&part).unwrap().write_all(b"part").unwrap();
        let part_path = part.to_string_lossy().into_owned();

        let mut host = MockCadHost::new();
        let doc_clone = doc.clone();
        host.expect_active_document()
            .return_once(move || Ok(Some(doc_clone)));
        host.expect_dependency_paths()
            .return_once(move |_, _| Ok(vec![part_path]));

        let mut vault = MockVaultApi::new();
        vault
            .expect_upload_assembly()
            .withf(|project_id, package_dir, message, author| {
                project_id == "proj-1"
                    && package_dir.join("arm.SLDASM").is_file()
                    && message == "first upload"
                    && author == "Test User"
            })
            .return_once(|_, _, _, _| Ok(receipt("commit-11", 2)));

        let request = PublishRequest {
            project_id: "proj-1".into(),
            message: "first upload".into(),
            author: "Test User".into(),
            output_root: out.path().to_path_buf(),
        };
        let report = publish(&host, &vault, &request).await.unwrap();

        assert_eq!(report.commit_id, "commit-11");
        assert_eq!(report.files_uploaded, 2);
        assert_eq!(report.assembly.dependencies.len(), 1);
        assert!(report.package_dir.join("joint.sldprt").is_file());
    }

    #[tokio::test]
    async fn no_active_document_aborts_before_scanning() {
        let mut host = MockCadHost::new();
        host.expect_active_document().return_once(|| Ok(None));
        let vault = MockVaultApi::new();

        let request = PublishRequest {
            project_id: "proj-1".into(),
            message: "m".into(),
            author: "a".into(),
            output_root: PathBuf::from("/tmp"),
        };
        let result = publish(&host, &vault, &request).await;
        assert!(matches!(result, Err(PublishError::NoActiveDocument)));
    }

    #[tokio::test]
    async fn non_assembly_document_is_rejected() {
        let mut host = MockCadHost::new();
        host.expect_active_document().return_once(|| {
            Ok(Some(CadDocument {
                title: "bracket.sldprt".into(),
                path: PathBuf::from("/tmp/bracket.sldprt"),
                doc_type: DocumentKind::Part,
            }))
        });
        let vault = MockVaultApi::new();

        let request = PublishRequest {
            project_id: "proj-1".into(),
            message: "m".into(),
            author: "a".into(),
            output_root: PathBuf::from("/tmp"),
        };
        let result = publish(&host, &vault, &request).await;
        assert!(matches!(
            result,
            Err(PublishError::NotAnAssembly(DocumentKind::Part))
        ));
    }

    #[tokio::test]
    async fn upload_failure_surfaces_as_upload_error() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let doc = assembly_on_disk(src.path());

        let mut host = MockCadHost::new();
        let doc_clone = doc.clone();
        host.expect_active_document()
            .return_once(move || Ok(Some(doc_clone)));
        host.expect_dependency_paths()
            .return_once(|_, _| Ok(vec![]));

        let mut vault = MockVaultApi::new();
        vault
            .expect_upload_assembly()
            .return_once(|_, _, _, _| Err(VaultError::Timeout));

        let request = PublishRequest {
            project_id: "proj-1".into(),
            message: "m".into(),
            author: "a".into(),
            output_root: out.path().to_path_buf(),
        };
        let result = publish(&host, &vault, &request).await;
        assert!(matches!(
            result,
            Err(PublishError::Upload(VaultError::Timeout))
        ));
    }
}
