//! Composer (PHP) ecosystem handler
//!
//! Full-capability handler: decodes `composer.lock` into modules and
//! regenerates the native autoloader after installation.

use std::path::Path;

use crate::error::Result;
use crate::handler::{EcosystemHandler, run_finalize_command};
use crate::lock::LockFile;

const LOCK_FILE: &str = "composer.lock";

/// Handler for Composer projects
#[derive(Debug, Default)]
pub struct ComposerHandler;

impl EcosystemHandler for ComposerHandler {
    fn name(&self) -> &'static str {
        "composer"
    }

    fn detect(&self, root: &Path) -> bool {
        root.join(LOCK_FILE).exists()
    }

    fn decode_lock(&self, root: &Path) -> Result<LockFile> {
        LockFile::read(&root.join(LOCK_FILE))
    }

    fn finalize(&self, root: &Path) -> Result<()> {
        run_finalize_command(self.name(), root, "composer", &["dump-autoload"])
    }
}
