//! Order-preserving directory manifest with per-file SHA-256 digests.
//!
//! Kept for future deduplication against the vault; the upload path does not
//! consume it.

use std::fs::{self, File};
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::model::{FileDigest, FileKind};

/// Digest every top-level plain file of `dir`, in directory enumeration
/// order. JSON files (the package sidecar among them) and subdirectories are
/// skipped.
pub fn directory_manifest(dir: &Path) -> std::io::Result<Vec<FileDigest>> {
    let mut digests = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() {
            continue;
        }
        if path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
        {
            continue;
        }
        let meta = entry.metadata()?;
        let sha256 = hash_file(&path)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        debug!(name = %name, size = meta.len(), "Digested file");
        digests.push(FileDigest {
            name,
            size: meta.len(),
            kind: FileKind::from_path(&path),
            sha256,
            path: path.to_string_lossy().into_owned(),
        });
    }
    Ok(digests)
}

/// Streaming SHA-256 of one file, hex-encoded.
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}
