//! Yarn (JavaScript) ecosystem handler
//!
//! Degenerate handler: it detects `yarn.lock` and hands the actual
//! install to the native tool in finalize. It contributes no modules to
//! the pipeline; yarn's lock format is not a module source here.

use std::path::Path;

use crate::error::Result;
use crate::handler::{EcosystemHandler, run_finalize_command};
use crate::lock::LockFile;

const LOCK_FILE: &str = "yarn.lock";

/// Handler for Yarn projects
#[derive(Debug, Default)]
pub struct YarnHandler;

impl EcosystemHandler for YarnHandler {
    fn name(&self) -> &'static str {
        "yarn"
    }

    fn detect(&self, root: &Path) -> bool {
        root.join(LOCK_FILE).exists()
    }

    fn decode_lock(&self, _root: &Path) -> Result<LockFile> {
        Ok(LockFile::default())
    }

    fn finalize(&self, root: &Path) -> Result<()> {
        run_finalize_command(self.name(), root, "yarn", &[])
    }
}
