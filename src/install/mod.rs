//! Per-module install strategy
//!
//! State machine: `Pending -> TryDist -> {Installed | TrySource ->
//! {Installed | Failed}}`. The archive path is preferred; any dist
//! error degrades to the version-control path instead of failing.
//! Failure on the source path (or having neither usable reference) is
//! terminal for the module, and only for that module.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Result, VendoError};
use crate::events::{Event, Observer};
use crate::installed::Registry;
use crate::lock::{InstallationSource, Module};
use crate::version::Version;

pub mod dist;
pub mod source;

/// Shared, cloneable context handed to every install job
#[derive(Clone)]
pub struct InstallContext {
    pub root: PathBuf,
    pub client: reqwest::blocking::Client,
    pub registry: Arc<Registry>,
    pub observer: Arc<dyn Observer>,
}

impl InstallContext {
    pub fn new(root: PathBuf, registry: Arc<Registry>, observer: Arc<dyn Observer>) -> Self {
        Self {
            root,
            client: dist::http_client(),
            registry,
            observer,
        }
    }
}

/// Materialize one module onto disk
///
/// On success the module comes back with `installed`,
/// `installation_source` and (when normalization succeeds)
/// `version_normalized` populated. Unchanged modules short-circuit
/// against the registry and do no network or filesystem work.
pub fn install_module(ctx: &InstallContext, mut module: Module) -> Result<Module> {
    let canonical = canonical_version(&module);

    if ctx.registry.is_current(&module.name, &canonical) {
        ctx.observer.on_event(&Event::JobSkipped {
            module: module.name.clone(),
            version: canonical.clone(),
        });
        module.installed = true;
        module.version_normalized = canonical;
        if let Some(record) = ctx.registry.get(&module.name) {
            module.installation_source = record.installation_source;
        }
        return Ok(module);
    }

    let installed_from = try_dist_then_source(ctx, &module)?;
    module.installation_source = installed_from;
    module.installed = true;

    match Version::parse(&module.version) {
        Ok(version) => module.version_normalized = version.to_string(),
        Err(e) => {
            // Files stay in place; only the clean version report is lost
            ctx.observer.on_event(&Event::VersionWarning {
                module: module.name.clone(),
                reason: e.to_string(),
            });
        }
    }

    Ok(module)
}

/// The fallback branch, named so it is testable on its own
fn try_dist_then_source(ctx: &InstallContext, module: &Module) -> Result<InstallationSource> {
    if module.has_zip_dist() {
        match dist::install(&ctx.client, &ctx.root, module) {
            Ok(()) => return Ok(InstallationSource::Dist),
            Err(e) => {
                // Deliberate fallback, not a terminal error; surfaced
                // only when no source path remains
                if !module.has_git_source() {
                    return Err(e);
                }
            }
        }
    }

    if module.has_git_source() {
        source::install(&ctx.root, module)?;
        return Ok(InstallationSource::Source);
    }

    Err(VendoError::UnsupportedSourceKind {
        module: module.name.clone(),
    })
}

/// Registry key for the idempotence check: the normalized render when
/// the version parses, the raw string otherwise
fn canonical_version(module: &Module) -> String {
    Version::parse(&module.version)
        .map(|v| v.to_string())
        .unwrap_or_else(|_| module.version.clone())
}
