//! Package builder: materialize an assembly and its resolved dependencies
//! into a flat, self-contained directory plus a JSON sidecar.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::model::{AssemblyInfo, FileKind};

/// Name of the metadata sidecar written into every package directory.
pub const SIDECAR_NAME: &str = "assembly_info.json";

#[derive(Debug)]
pub enum PackageError {
    Io(std::io::Error),
    Serialize(serde_json::Error),
}

impl std::fmt::Display for PackageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackageError::Io(e) => write!(f, "package io error: {e}"),
            PackageError::Serialize(e) => write!(f, "sidecar serialization failed: {e}"),
        }
    }
}

impl std::error::Error for PackageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PackageError::Io(e) => Some(e),
            PackageError::Serialize(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for PackageError {
    fn from(e: std::io::Error) -> Self {
        PackageError::Io(e)
    }
}

impl From<serde_json::Error> for PackageError {
    fn from(e: serde_json::Error) -> Self {
        PackageError::Serialize(e)
    }
}

/// Copy the main document and every resolved dependency into a fresh package
/// directory under `output_root`, flat (no nesting), and write the
/// [`SIDECAR_NAME`] sidecar.
///
/// Best-effort, never atomic: a failed copy of one file is logged and
/// skipped, and the call still succeeds as long as the directory and the
/// sidecar were written. Dependencies sharing a base name overwrite
/// last-writer-wins. Copies preserve permissions but not modification
/// times.
pub fn build_package(info: &AssemblyInfo, output_root: &Path) -> Result<PathBuf, PackageError> {
    fs::create_dir_all(output_root)?;

    let package_dir = output_root.join(package_dir_name(&info.name));
    fs::create_dir_all(&package_dir)?;
    info!(package_dir = %package_dir.display(), "Creating assembly package");

    // Main document. An empty or vanished path is skipped, not an error.
    let main_path = Path::new(&info.path);
    if !info.path.is_empty() && main_path.is_file() {
        if let Some(base) = main_path.file_name() {
            if let Err(e) = fs::copy(main_path, package_dir.join(base)) {
                warn!(error = ?e, path = %main_path.display(), "Failed to copy main document");
            }
        }
    } else {
        debug!(path = %info.path, "Main document path empty or absent, skipping copy");
    }

    let mut copied = 0usize;
    for dep in info.dependencies.iter().filter(|d| d.exists) {
        let src = Path::new(&dep.path);
        let Some(base) = src.file_name() else {
            warn!(path = %dep.path, "Dependency path has no base name, skipping");
            continue;
        };
        let dest = package_dir.join(base);
        if dest.exists() {
            warn!(name = %base.to_string_lossy(), "Base name collision in package, overwriting");
        }
        match fs::copy(src, &dest) {
            Ok(_) => {
                debug!(name = %dep.name, size = dep.size, "Copied dependency");
                copied += 1;
            }
            Err(e) => {
                warn!(error = ?e, path = %dep.path, "Failed to copy dependency, skipping");
            }
        }
    }

    let sidecar = serde_json::to_string_pretty(info)?;
    fs::write(package_dir.join(SIDECAR_NAME), sidecar)?;

    info!(
        copied,
        total = info.dependencies.len(),
        package_dir = %package_dir.display(),
        "Package created"
    );
    Ok(package_dir)
}

/// Read the sidecar of an existing package back into an [`AssemblyInfo`].
pub fn load_assembly_info(package_dir: &Path) -> Result<AssemblyInfo, PackageError> {
    let raw = fs::read_to_string(package_dir.join(SIDECAR_NAME))?;
    Ok(serde_json::from_str(&raw)?)
}

/// Top-level plain files of a package whose extension is in the CAD set.
/// The sidecar and any other non-CAD file are never eligible; subdirectories
/// are not descended into.
pub fn eligible_files(package_dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(package_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() {
            continue;
        }
        if FileKind::from_path(&path).is_cad() {
            files.push(path);
        }
    }
    Ok(files)
}

/// Unique package directory name: readable timestamp plus a random suffix.
/// The suffix removes the same-second collision ambiguity that a bare
/// timestamp would have.
fn package_dir_name(assembly_name: &str) -> String {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{stamp}_{}", sanitise(assembly_name), &suffix[..8])
}

fn sanitise(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "assembly".to_string()
    } else {
        cleaned
    }
}
