//! Dependency scanner: turns a host document handle into an [`AssemblyInfo`].

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::contract::{CadDocument, CadHost, DependencyFlags, HostError};
use crate::model::{AssemblyInfo, DependencyRecord, FileKind, FileTreeNode};

/// Scan failure. The scanner is all-or-nothing: a host error never yields a
/// partial [`AssemblyInfo`].
#[derive(Debug)]
pub enum ScanError {
    Host(HostError),
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::Host(e) => write!(f, "scan failed: {e}"),
        }
    }
}

impl std::error::Error for ScanError {}

impl From<HostError> for ScanError {
    fn from(e: HostError) -> Self {
        ScanError::Host(e)
    }
}

/// Enumerate and classify everything `doc` references.
///
/// Reads the document's own path and title as the package root, asks the
/// host for the transitive dependency list, and classifies each reported
/// path against the filesystem. Missing references are kept as records with
/// `exists == false` so callers can report them. Purely observational.
pub fn scan<H>(host: &H, doc: &CadDocument, flags: DependencyFlags) -> Result<AssemblyInfo, ScanError>
where
    H: CadHost + ?Sized,
{
    info!(title = %doc.title, path = %doc.path.display(), "Scanning assembly dependencies");

    let paths = host.dependency_paths(doc, flags)?;
    debug!(count = paths.len(), "Host reported dependency paths");

    let dependencies: Vec<DependencyRecord> = paths.iter().map(|p| classify(p)).collect();

    let missing = dependencies.iter().filter(|d| !d.exists).count();
    if missing > 0 {
        warn!(missing, total = dependencies.len(), "Assembly has unresolved references");
    }

    let assembly_path = doc.path.to_string_lossy().into_owned();
    let files = FileTreeNode {
        name: doc.title.clone(),
        path: assembly_path.clone(),
        kind: FileKind::Assembly,
        children: dependencies
            .iter()
            .map(|d| FileTreeNode {
                name: d.name.clone(),
                path: d.path.clone(),
                kind: d.kind,
                children: Vec::new(),
            })
            .collect(),
    };

    Ok(AssemblyInfo {
        name: doc.title.clone(),
        path: assembly_path,
        kind: FileKind::Assembly,
        dependencies,
        files,
    })
}

/// Classify one host-reported path into a dependency record.
fn classify(raw: &str) -> DependencyRecord {
    if raw.is_empty() {
        return DependencyRecord {
            path: String::new(),
            name: "Unknown".to_string(),
            size: 0,
            kind: FileKind::Missing,
            exists: false,
        };
    }

    let path = Path::new(raw);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Unknown".to_string());

    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => DependencyRecord {
            path: raw.to_string(),
            name,
            size: meta.len(),
            kind: FileKind::from_path(path),
            exists: true,
        },
        _ => DependencyRecord {
            path: raw.to_string(),
            name,
            size: 0,
            kind: FileKind::Missing,
            exists: false,
        },
    }
}
