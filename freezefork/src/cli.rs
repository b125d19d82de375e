//! CLI interface for freezefork: command parsing, argument validation and
//! the async entrypoint used by both `main()` and integration tests.
//!
//! All pipeline logic lives in `freezefork-core`; this module is strictly
//! CLI glue. Each subcommand runs to completion inside the single
//! coordinating task before control returns to the user — user actions are
//! sequential by construction.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use freezefork_core::contract::{CadHost, DependencyFlags, DocumentKind, VaultApi};
use freezefork_core::host::DescriptorHost;
use freezefork_core::manifest::directory_manifest;
use freezefork_core::package::build_package;
use freezefork_core::publish::{publish, PublishRequest};
use freezefork_core::scanner::scan;

use crate::client::{VaultClient, DEFAULT_API_URL};

/// Author used when the OS username variable is absent.
const FALLBACK_AUTHOR: &str = "SolidWorks User";

/// CLI for freezefork: package the active CAD assembly and publish it as a
/// commit to a freezefork vault.
#[derive(Parser)]
#[clap(
    name = "freezefork",
    version,
    about = "Package a CAD assembly with its dependencies and publish it as a commit"
)]
pub struct Cli {
    /// Base URL of the vault API (falls back to FREEZEFORK_API_URL, then the
    /// built-in default)
    #[clap(long)]
    pub api_url: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe the vault health endpoint
    Health,
    /// List all projects in the vault
    Projects,
    /// Create a new project
    CreateProject {
        #[clap(long)]
        name: String,
        #[clap(long)]
        description: Option<String>,
    },
    /// List a project's commit history
    Commits {
        #[clap(long)]
        project: String,
    },
    /// Scan a document descriptor and print the assembly info
    Scan {
        /// Path to the document descriptor JSON
        #[clap(long)]
        document: PathBuf,
    },
    /// Scan a document and materialize its package directory
    Package {
        #[clap(long)]
        document: PathBuf,
        /// Directory under which the package directory is created
        #[clap(long)]
        output_root: PathBuf,
    },
    /// Print the SHA-256 manifest of a package directory
    Manifest {
        dir: PathBuf,
    },
    /// Scan, package and upload the assembly as a commit
    Publish {
        #[clap(long)]
        document: PathBuf,
        #[clap(long)]
        project: String,
        #[clap(long)]
        message: String,
        /// Commit author; defaults to the OS username
        #[clap(long)]
        author: Option<String>,
        #[clap(long)]
        output_root: Option<PathBuf>,
    },
    /// Download one named file from a commit
    DownloadFile {
        #[clap(long)]
        project: String,
        #[clap(long)]
        commit: String,
        #[clap(long)]
        file: String,
        #[clap(long)]
        dest: PathBuf,
    },
    /// Download every file recorded on a commit into a directory
    DownloadCommit {
        #[clap(long)]
        project: String,
        #[clap(long)]
        commit: String,
        #[clap(long)]
        dest: PathBuf,
    },
    /// Download a whole commit as a zip archive
    DownloadArchive {
        #[clap(long)]
        project: String,
        #[clap(long)]
        commit: String,
        #[clap(long)]
        dest: PathBuf,
    },
    /// Upload a single file outside any commit
    UploadFile {
        path: PathBuf,
    },
}

/// Async CLI entrypoint, extracted for integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    let api_url = cli
        .api_url
        .or_else(|| std::env::var("FREEZEFORK_API_URL").ok())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let vault = VaultClient::new(api_url).map_err(|e| anyhow!("client setup failed: {e}"))?;

    match cli.command {
        Commands::Health => {
            if vault.check_health().await {
                println!("vault reachable: {}", vault.base_url());
                Ok(())
            } else {
                Err(anyhow!("vault unreachable: {}", vault.base_url()))
            }
        }
        Commands::Projects => {
            let projects = vault
                .list_projects()
                .await
                .map_err(|e| anyhow!("failed to list projects: {e}"))?;
            println!("{}", serde_json::to_string_pretty(&projects)?);
            Ok(())
        }
        Commands::CreateProject { name, description } => {
            let project = vault
                .create_project(&name, description.as_deref())
                .await
                .map_err(|e| anyhow!("failed to create project: {e}"))?;
            println!("{}", serde_json::to_string_pretty(&project)?);
            Ok(())
        }
        Commands::Commits { project } => {
            let commits = vault
                .list_commits(&project)
                .await
                .map_err(|e| anyhow!("failed to list commits: {e}"))?;
            println!("{}", serde_json::to_string_pretty(&commits)?);
            Ok(())
        }
        Commands::Scan { document } => {
            let info = scan_descriptor(&document)?;
            println!("{}", serde_json::to_string_pretty(&info)?);
            Ok(())
        }
        Commands::Package {
            document,
            output_root,
        } => {
            let info = scan_descriptor(&document)?;
            let package_dir = build_package(&info, &output_root)
                .map_err(|e| anyhow!("packaging failed: {e}"))?;
            println!("{}", package_dir.display());
            Ok(())
        }
        Commands::Manifest { dir } => {
            let manifest =
                directory_manifest(&dir).with_context(|| format!("digesting {}", dir.display()))?;
            println!("{}", serde_json::to_string_pretty(&manifest)?);
            Ok(())
        }
        Commands::Publish {
            document,
            project,
            message,
            author,
            output_root,
        } => {
            let host = DescriptorHost::from_file(&document).map_err(|e| anyhow!("{e}"))?;
            let request = PublishRequest {
                project_id: project,
                message,
                author: author.unwrap_or_else(default_author),
                output_root: output_root.unwrap_or_else(default_output_root),
            };
            let report = publish(&host, &vault, &request)
                .await
                .map_err(|e| anyhow!("publish failed: {e}"))?;
            info!(package_dir = %report.package_dir.display(), "Publish pipeline finished");
            println!(
                "published {} as {} ({} files)",
                report.assembly.name, report.commit_id, report.files_uploaded
            );
            Ok(())
        }
        Commands::DownloadFile {
            project,
            commit,
            file,
            dest,
        } => {
            vault
                .download_commit_file(&project, &commit, &file, &dest)
                .await
                .map_err(|e| anyhow!("download failed: {e}"))?;
            println!("{}", dest.display());
            Ok(())
        }
        Commands::DownloadCommit {
            project,
            commit,
            dest,
        } => {
            let downloaded = vault
                .download_commit_files(&project, &commit, &dest)
                .await
                .map_err(|e| anyhow!("download failed: {e}"))?;
            println!("downloaded {downloaded} files to {}", dest.display());
            Ok(())
        }
        Commands::DownloadArchive {
            project,
            commit,
            dest,
        } => {
            vault
                .download_commit_archive(&project, &commit, &dest)
                .await
                .map_err(|e| anyhow!("archive download failed: {e}"))?;
            println!("{}", dest.display());
            Ok(())
        }
        Commands::UploadFile { path } => {
            let uploaded = vault
                .upload_single_file(&path)
                .await
                .map_err(|e| anyhow!("upload failed: {e}"))?;
            println!("{}", serde_json::to_string_pretty(&uploaded)?);
            Ok(())
        }
    }
}

/// Scan the document described by a descriptor file, enforcing that it is an
/// assembly.
fn scan_descriptor(document: &PathBuf) -> Result<freezefork_core::model::AssemblyInfo> {
    let host = DescriptorHost::from_file(document).map_err(|e| anyhow!("{e}"))?;
    let doc = host
        .active_document()
        .map_err(|e| anyhow!("{e}"))?
        .ok_or_else(|| anyhow!("no active document"))?;
    if doc.doc_type != DocumentKind::Assembly {
        return Err(anyhow!("active document is a {}, not an assembly", doc.doc_type));
    }
    scan(&host, &doc, DependencyFlags::default()).map_err(|e| anyhow!("{e}"))
}

/// Commit author prefilled from the OS username variable, read once.
fn default_author() -> String {
    std::env::var("USERNAME").unwrap_or_else(|_| FALLBACK_AUTHOR.to_string())
}

fn default_output_root() -> PathBuf {
    std::env::temp_dir().join("freezefork").join("packages")
}
