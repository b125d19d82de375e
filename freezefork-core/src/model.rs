//! Data model shared by the scanner, package builder, client and server.
//!
//! Wire shapes (field names and casing) match the freezefork REST API, so
//! these types serialize both into `assembly_info.json` sidecars and into
//! API payloads without adapters.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Classification of a file referenced by an assembly.
///
/// `Missing` is not derived from the extension: a dependency whose path is
/// empty or absent on disk is always `Missing`, whatever its name suggests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Part,
    Assembly,
    Drawing,
    Step,
    Iges,
    Unknown,
    Missing,
}

impl FileKind {
    /// Derive the kind from a path's extension, case-insensitively.
    pub fn from_path(path: &Path) -> Self {
        let ext = match path.extension() {
            Some(ext) => ext.to_string_lossy().to_lowercase(),
            None => return FileKind::Unknown,
        };
        match ext.as_str() {
            "sldprt" => FileKind::Part,
            "sldasm" => FileKind::Assembly,
            "slddrw" => FileKind::Drawing,
            "step" | "stp" => FileKind::Step,
            "iges" | "igs" => FileKind::Iges,
            _ => FileKind::Unknown,
        }
    }

    /// Whether this kind is in the CAD set that gets uploaded.
    pub fn is_cad(self) -> bool {
        matches!(
            self,
            FileKind::Part | FileKind::Assembly | FileKind::Drawing | FileKind::Step | FileKind::Iges
        )
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FileKind::Part => "part",
            FileKind::Assembly => "assembly",
            FileKind::Drawing => "drawing",
            FileKind::Step => "step",
            FileKind::Iges => "iges",
            FileKind::Unknown => "unknown",
            FileKind::Missing => "missing",
        };
        f.write_str(s)
    }
}

/// One file referenced by an assembly, as resolved by the host.
///
/// Records with `exists == false` are retained so callers can report missing
/// references; they always carry `size == 0` and `kind == Missing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    /// Absolute path as reported by the host; empty when the host could not
    /// resolve the reference at all.
    pub path: String,
    /// Base filename, or `"Unknown"` when the path is empty.
    pub name: String,
    /// Byte length on disk; 0 when unresolved.
    pub size: u64,
    pub kind: FileKind,
    pub exists: bool,
}

/// Nested tree view of an assembly's files. Redundant with the flat
/// dependency list, kept because the sidecar format carries both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTreeNode {
    pub name: String,
    pub path: String,
    pub kind: FileKind,
    #[serde(default)]
    pub children: Vec<FileTreeNode>,
}

/// Everything the scanner learned about an assembly. Immutable once built;
/// persisted only as the `assembly_info.json` sidecar of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyInfo {
    pub name: String,
    pub path: String,
    /// Always `assembly` for a scanned document.
    pub kind: FileKind,
    pub dependencies: Vec<DependencyRecord>,
    pub files: FileTreeNode,
}

impl AssemblyInfo {
    /// Dependencies the host reported but that are absent on disk.
    pub fn missing_dependencies(&self) -> impl Iterator<Item = &DependencyRecord> {
        self.dependencies.iter().filter(|d| !d.exists)
    }
}

/// A branch of a project's commit history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub commit_count: u64,
    pub color: String,
}

/// A project held by the vault backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub last_modified: String,
    pub branches: Vec<Branch>,
    pub total_commits: u64,
    pub contributors: Vec<String>,
}

/// A file recorded against a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitFile {
    pub name: String,
    pub size: u64,
}

/// One node of a project's history graph. `x`/`y` are layout hints for
/// graphical rendering, not semantic data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    pub message: String,
    pub timestamp: String,
    pub author: String,
    pub branch: String,
    pub x: i64,
    pub y: i64,
    pub parents: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<CommitFile>,
}

/// Response of a successful assembly upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub commit: Commit,
    pub files_uploaded: u64,
}

/// Response of a single-file upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    pub name: String,
    pub size: u64,
}

/// One entry of a directory manifest: per-file SHA-256 digest, kept for
/// future deduplication. The upload path does not consume these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDigest {
    pub name: String,
    pub size: u64,
    pub kind: FileKind,
    pub sha256: String,
    pub path: String,
}
