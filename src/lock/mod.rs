//! Lock file data structures and decoding
//!
//! A lock file is the ecosystem resolver's record of exact versions and
//! fetch locations. It is read once per run per handler and immutable
//! thereafter.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VendoError};

pub mod module;

pub use module::{Author, Autoload, DistRef, InstallationSource, Module, SourceRef};

/// Decoded lock file: root metadata plus the primary and development
/// module lists, in lock order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LockFile {
    /// Opaque hash used by the owning ecosystem for change detection
    #[serde(rename = "content-hash", default, skip_serializing_if = "String::is_empty")]
    pub content_hash: String,

    #[serde(rename = "packages", default)]
    pub modules: Vec<Module>,

    #[serde(rename = "packages-dev", default)]
    pub dev_modules: Vec<Module>,
}

impl LockFile {
    /// Decode a lock file from disk
    ///
    /// A missing file is `LockFileMissing` (callers that ran `detect`
    /// first never see it); malformed JSON is `DecodeFailed`.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(VendoError::LockFileMissing {
                path: path.display().to_string(),
            });
        }

        let contents = fs::read_to_string(path).map_err(|e| VendoError::DecodeFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&contents).map_err(|e| VendoError::DecodeFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Primary then development modules, preserving lock-file order
    pub fn all_modules(&self) -> Vec<Module> {
        let mut all = Vec::with_capacity(self.modules.len() + self.dev_modules.len());
        all.extend(self.modules.iter().cloned());
        all.extend(self.dev_modules.iter().cloned());
        all
    }

    /// Total module count across both lists
    pub fn len(&self) -> usize {
        self.modules.len() + self.dev_modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.dev_modules.is_empty()
    }
}
