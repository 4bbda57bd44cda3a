//! # Collection Manifest
//!
//! JSON map from original file names to the content-hashed names they were
//! collected as:
//!
//! ```json
//! { "files": { "css/site.css": "css/5d41402abc4b2a76....css" } }
//! ```
//!
//! References found in pages or stylesheets are rewritten through the
//! manifest. External references (anything with a scheme, protocol-relative
//! URLs, fragments and `data:` URIs) are never touched. A reference to a file
//! the manifest does not know is a [`MissingReferencedFile`]; callers log it
//! and leave the reference as written.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use dedupe_core::NamespacePrefix;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A referenced file is not present in the manifest.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("referenced file {name:?} is not in the manifest (reference {reference:?})")]
pub struct MissingReferencedFile {
    /// The reference as written.
    pub reference: String,
    /// The file name looked up.
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub files: BTreeMap<String, String>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("failed to encode manifest")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write manifest: {}", path.display()))
    }

    pub fn insert(&mut self, original: impl Into<String>, stored: impl Into<String>) {
        self.files.insert(original.into(), stored.into());
    }

    pub fn stored_name(&self, original: &str) -> Option<&str> {
        self.files.get(original).map(String::as_str)
    }

    /// Rewrite `reference` to the URL of its content-hashed file under
    /// `prefix`.
    ///
    /// Returns `Ok(None)` for external references. Query strings and
    /// fragments after the file name are carried over unchanged.
    pub fn substitute(
        &self,
        reference: &str,
        prefix: &NamespacePrefix,
    ) -> Result<Option<String>, MissingReferencedFile> {
        if is_external(reference) {
            return Ok(None);
        }
        let split = reference
            .find(|c: char| c == '?' || c == '#')
            .unwrap_or(reference.len());
        let (path, suffix) = reference.split_at(split);
        let name = path.trim_start_matches('/');

        match self.stored_name(name) {
            Some(stored) => Ok(Some(format!("{}{suffix}", prefix.join(stored)))),
            None => Err(MissingReferencedFile {
                reference: reference.to_string(),
                name: name.to_string(),
            }),
        }
    }
}

/// References that point outside the collected tree.
pub fn is_external(reference: &str) -> bool {
    let reference = reference.trim();
    reference.is_empty()
        || reference.starts_with("//")
        || reference.starts_with('#')
        || reference.starts_with("data:")
        || url::Url::parse(reference).is_ok()
}
