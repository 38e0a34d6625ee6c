//! Ecosystem handler abstraction
//!
//! Each supported ecosystem implements [`EcosystemHandler`]; the
//! orchestrator is written only against the trait. Handlers are passed
//! in explicitly as a [`HandlerSet`] rather than self-registering into
//! process-wide state.

use std::path::Path;
use std::process::Command;

use crate::error::{Result, VendoError};
use crate::lock::{LockFile, Module};

pub mod composer;
pub mod yarn;

pub use composer::ComposerHandler;
pub use yarn::YarnHandler;

/// Per-ecosystem capability: detect a project, enumerate its locked
/// modules, finalize after installation.
pub trait EcosystemHandler: Send + Sync {
    /// Stable identifier used in logs and event reporting
    fn name(&self) -> &'static str;

    /// Whether this ecosystem's lock file is present at the root.
    /// Cheap file-existence check, no side effects.
    fn detect(&self, root: &Path) -> bool;

    /// Decode the ecosystem's lock file; must not touch shared state on
    /// failure.
    fn decode_lock(&self, root: &Path) -> Result<LockFile>;

    /// Primary then development modules in lock-file order. An empty
    /// sequence is valid (degenerate handlers contribute no modules).
    fn list_modules(&self, root: &Path) -> Result<Vec<Module>> {
        Ok(self.decode_lock(root)?.all_modules())
    }

    /// Runs after all modules from all handlers finished installing.
    /// Failure is reported, never retried, and rolls nothing back.
    fn finalize(&self, root: &Path) -> Result<()>;
}

/// The set of handlers active for a process, in registration order
pub struct HandlerSet {
    handlers: Vec<Box<dyn EcosystemHandler>>,
}

impl HandlerSet {
    /// An empty set; extend with [`HandlerSet::register`]
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// All built-in ecosystems
    pub fn builtin() -> Self {
        let mut set = Self::new();
        set.register(Box::new(ComposerHandler));
        set.register(Box::new(YarnHandler));
        set
    }

    pub fn register(&mut self, handler: Box<dyn EcosystemHandler>) {
        self.handlers.push(handler);
    }

    /// Handlers whose lock file exists at `root`
    pub fn detect(&self, root: &Path) -> Vec<&dyn EcosystemHandler> {
        self.handlers
            .iter()
            .map(AsRef::as_ref)
            .filter(|h| h.detect(root))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerSet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Run an ecosystem-native finalize command in the project root
///
/// stdout/stderr are inherited so the tool's own output reaches the
/// terminal; a non-zero exit or spawn failure becomes `FinalizeFailed`.
pub(crate) fn run_finalize_command(
    handler: &str,
    root: &Path,
    program: &str,
    args: &[&str],
) -> Result<()> {
    let status = Command::new(program)
        .args(args)
        .current_dir(root)
        .status()
        .map_err(|e| VendoError::FinalizeFailed {
            handler: handler.to_string(),
            reason: format!("failed to run '{program}': {e}"),
        })?;

    if !status.success() {
        return Err(VendoError::FinalizeFailed {
            handler: handler.to_string(),
            reason: format!("'{program}' exited with {status}"),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_set_has_both_ecosystems() {
        let set = HandlerSet::builtin();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_detect_empty_root_matches_nothing() {
        let temp = tempdir().unwrap();
        let set = HandlerSet::builtin();
        assert!(set.detect(temp.path()).is_empty());
    }

    #[test]
    fn test_detect_composer_root() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("composer.lock"), "{}").unwrap();

        let set = HandlerSet::builtin();
        let active = set.detect(temp.path());
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name(), "composer");
    }

    #[test]
    fn test_detect_both_ecosystems() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("composer.lock"), "{}").unwrap();
        fs::write(temp.path().join("yarn.lock"), "").unwrap();

        let set = HandlerSet::builtin();
        let names: Vec<_> = set.detect(temp.path()).iter().map(|h| h.name()).collect();
        assert_eq!(names, vec!["composer", "yarn"]);
    }

    #[test]
    fn test_run_finalize_command_failure() {
        let temp = tempdir().unwrap();
        let err = run_finalize_command("test", temp.path(), "vendo-no-such-tool", &[]).unwrap_err();
        assert!(matches!(err, VendoError::FinalizeFailed { .. }));
    }

    #[test]
    fn test_run_finalize_command_success() {
        let temp = tempdir().unwrap();
        assert!(run_finalize_command("test", temp.path(), "true", &[]).is_ok());
    }
}
