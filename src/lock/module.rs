//! Locked module data structures
//!
//! One `Module` is one locked dependency exactly as the ecosystem's
//! resolver wrote it: a dist (archive) reference, a source (VCS)
//! reference, constraint maps and free-form metadata. The installer
//! never re-resolves any of it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How a module ended up on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallationSource {
    /// Not installed yet
    #[default]
    #[serde(rename = "")]
    Unset,
    /// Extracted from a packaged archive
    Dist,
    /// Checked out from version control
    Source,
}

/// An archive-based fetch location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistRef {
    /// Archive kind; only "zip" is installable
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub url: String,

    /// Revision the archive was packaged from
    #[serde(default)]
    pub reference: String,

    /// Ecosystem-provided checksum, carried but not re-verified
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub shasum: String,
}

/// A version-control fetch location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceRef {
    /// VCS kind; only "git" is installable
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub url: String,

    /// Exact revision to check out
    #[serde(default)]
    pub reference: String,
}

/// Autoload rules a module declares for the class-map index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Autoload {
    /// PSR-4 namespace prefix -> directory root within the module
    #[serde(rename = "psr-4", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub psr4: BTreeMap<String, String>,
}

/// A module author, kept for the installed-state artifact
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub homepage: String,
}

/// One locked dependency
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Module {
    /// Unique within a lock file's module list
    pub name: String,

    /// Raw version string as written by the ecosystem
    #[serde(default)]
    pub version: String,

    /// Canonical render, populated after a successful install
    #[serde(rename = "version_normalized", default, skip_serializing_if = "String::is_empty")]
    pub version_normalized: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist: Option<DistRef>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub require: BTreeMap<String, String>,

    #[serde(rename = "require-dev", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub require_dev: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub conflict: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub replace: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub suggest: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Autoload::is_empty")]
    pub autoload: Autoload,

    /// Module kind as declared by the ecosystem (e.g. "library")
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub license: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<Author>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    /// Release timestamp, carried verbatim
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub time: String,

    #[serde(rename = "notification-url", default, skip_serializing_if = "String::is_empty")]
    pub notification_url: String,

    /// Set on install success
    #[serde(
        rename = "installation-source",
        default,
        skip_serializing_if = "InstallationSource::is_unset"
    )]
    pub installation_source: InstallationSource,

    /// Local to a run, never persisted
    #[serde(skip)]
    pub installed: bool,
}

impl Autoload {
    pub fn is_empty(&self) -> bool {
        self.psr4.is_empty()
    }
}

impl InstallationSource {
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }
}

impl Module {
    /// Whether the dist reference is an installable archive
    pub fn has_zip_dist(&self) -> bool {
        self.dist.as_ref().is_some_and(|d| d.kind == "zip")
    }

    /// Whether the source reference is an installable checkout
    pub fn has_git_source(&self) -> bool {
        self.source.as_ref().is_some_and(|s| s.kind == "git")
    }
}
