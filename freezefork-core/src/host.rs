//! File-backed [`CadHost`] implementation.
//!
//! A live CAD session exposes its active document over a COM object model;
//! that integration is out of scope here. `DescriptorHost` stands in for it:
//! a JSON document descriptor carries exactly what the live host would
//! report — the document's title, path, kind and the reference list,
//! including references the host could not resolve (empty strings).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::contract::{CadDocument, CadHost, DependencyFlags, DocumentKind, HostError};

/// On-disk shape of a document descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentDescriptor {
    pub title: String,
    pub path: PathBuf,
    pub kind: DocumentKind,
    #[serde(default)]
    pub references: Vec<String>,
}

/// `CadHost` backed by a descriptor file instead of a live CAD process.
pub struct DescriptorHost {
    descriptor: DocumentDescriptor,
}

impl DescriptorHost {
    /// Read a descriptor file. Any read or parse failure means the "host"
    /// is unavailable.
    pub fn from_file(path: &Path) -> Result<Self, HostError> {
        info!(descriptor = %path.display(), "Opening document descriptor");
        let raw = fs::read_to_string(path).map_err(|e| {
            HostError::Unavailable(format!("cannot read descriptor {}: {e}", path.display()))
        })?;
        let descriptor: DocumentDescriptor = serde_json::from_str(&raw).map_err(|e| {
            HostError::Unavailable(format!("cannot parse descriptor {}: {e}", path.display()))
        })?;
        Ok(Self { descriptor })
    }

    pub fn new(descriptor: DocumentDescriptor) -> Self {
        Self { descriptor }
    }
}

impl CadHost for DescriptorHost {
    fn active_document(&self) -> Result<Option<CadDocument>, HostError> {
        Ok(Some(CadDocument {
            title: self.descriptor.title.clone(),
            path: self.descriptor.path.clone(),
            doc_type: self.descriptor.kind,
        }))
    }

    fn dependency_paths(
        &self,
        _doc: &CadDocument,
        flags: DependencyFlags,
    ) -> Result<Vec<String>, HostError> {
        debug!(
            all_levels = flags.all_levels,
            search_missing = flags.search_missing,
            count = self.descriptor.references.len(),
            "Returning descriptor reference list"
        );
        Ok(self.descriptor.references.clone())
    }
}
