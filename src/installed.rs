//! Installed-state registry
//!
//! Persisted record of what a previous run installed, keyed by module
//! name. Loaded at run start (absence is an empty registry, not an
//! error), updated in memory behind a lock, and flushed to
//! `vendor/installed.json` exactly once after the pipeline barrier.
//! The durable form is a flat array to match the conventional artifact
//! shape.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VendoError};
use crate::lock::InstallationSource;

/// On-disk artifact path relative to the project root
pub const REGISTRY_PATH: &str = "vendor/installed.json";

/// One persisted entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstalledRecord {
    pub name: String,
    /// Normalized version when normalization succeeded, raw otherwise
    pub version: String,
    #[serde(rename = "installation-source", default)]
    pub installation_source: InstallationSource,
}

/// Thread-safe installed-state registry
#[derive(Debug)]
pub struct Registry {
    path: PathBuf,
    records: Mutex<BTreeMap<String, InstalledRecord>>,
}

impl Registry {
    /// Load the registry for a project root; a missing artifact yields
    /// an empty registry.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(REGISTRY_PATH);

        let records = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|e| VendoError::StateReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            let list: Vec<InstalledRecord> =
                serde_json::from_str(&contents).map_err(|e| VendoError::StateReadFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            // Last-write-wins on duplicate names in the artifact
            list.into_iter().map(|r| (r.name.clone(), r)).collect()
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// Whether `name` is already recorded at exactly `version`
    ///
    /// Drives the idempotent short-circuit: unchanged modules do no
    /// network or filesystem work on re-runs.
    pub fn is_current(&self, name: &str, version: &str) -> bool {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(name)
            .is_some_and(|r| r.version == version)
    }

    /// Current record for a module, if any
    pub fn get(&self, name: &str) -> Option<InstalledRecord> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Insert or replace a record (last-write-wins on name collision)
    pub fn upsert(&self, record: InstalledRecord) {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(record.name.clone(), record);
    }

    /// Number of recorded modules
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of current records, sorted by name
    pub fn snapshot(&self) -> Vec<InstalledRecord> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Write the full registry atomically (temp file + rename)
    ///
    /// Called exactly once per run, after all install jobs drained.
    pub fn flush(&self) -> Result<()> {
        let list = self.snapshot();

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| VendoError::io(parent.display().to_string(), e))?;
        }

        let json =
            serde_json::to_string_pretty(&list).map_err(|e| VendoError::StateWriteFailed {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| VendoError::StateWriteFailed {
            path: tmp.display().to_string(),
            reason: e.to_string(),
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| VendoError::StateWriteFailed {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(name: &str, version: &str) -> InstalledRecord {
        InstalledRecord {
            name: name.to_string(),
            version: version.to_string(),
            installation_source: InstallationSource::Dist,
        }
    }

    #[test]
    fn test_load_absent_is_empty() {
        let temp = tempdir().unwrap();
        let registry = Registry::load(temp.path()).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_upsert_and_is_current() {
        let temp = tempdir().unwrap();
        let registry = Registry::load(temp.path()).unwrap();

        registry.upsert(record("acme/widget", "1.0.0.0"));
        assert!(registry.is_current("acme/widget", "1.0.0.0"));
        assert!(!registry.is_current("acme/widget", "2.0.0.0"));
        assert!(!registry.is_current("acme/other", "1.0.0.0"));
    }

    #[test]
    fn test_upsert_last_write_wins() {
        let temp = tempdir().unwrap();
        let registry = Registry::load(temp.path()).unwrap();

        registry.upsert(record("acme/widget", "1.0.0.0"));
        registry.upsert(record("acme/widget", "2.0.0.0"));
        assert_eq!(registry.len(), 1);
        assert!(registry.is_current("acme/widget", "2.0.0.0"));
    }

    #[test]
    fn test_flush_and_reload_round_trip() {
        let temp = tempdir().unwrap();
        let registry = Registry::load(temp.path()).unwrap();
        registry.upsert(record("acme/widget", "1.0.0.0"));
        registry.upsert(record("acme/base", "2.1.0.0"));
        registry.flush().unwrap();

        let reloaded = Registry::load(temp.path()).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.is_current("acme/widget", "1.0.0.0"));
        assert!(reloaded.is_current("acme/base", "2.1.0.0"));
    }

    #[test]
    fn test_flush_writes_flat_array() {
        let temp = tempdir().unwrap();
        let registry = Registry::load(temp.path()).unwrap();
        registry.upsert(record("acme/widget", "1.0.0.0"));
        registry.flush().unwrap();

        let contents = fs::read_to_string(temp.path().join(REGISTRY_PATH)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert!(parsed.is_array());
        assert_eq!(parsed.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_artifact_is_an_error() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("vendor")).unwrap();
        fs::write(temp.path().join(REGISTRY_PATH), "{oops").unwrap();
        let err = Registry::load(temp.path()).unwrap_err();
        assert!(matches!(err, VendoError::StateReadFailed { .. }));
    }

    #[test]
    fn test_concurrent_upserts() {
        let temp = tempdir().unwrap();
        let registry = std::sync::Arc::new(Registry::load(temp.path()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    registry.upsert(InstalledRecord {
                        name: format!("acme/mod-{i}"),
                        version: "1.0.0.0".to_string(),
                        installation_source: InstallationSource::Dist,
                    });
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(registry.len(), 8);
    }
}
