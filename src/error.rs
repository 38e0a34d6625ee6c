//! Error types and handling for Vendo
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for Vendo operations
#[derive(Error, Diagnostic, Debug)]
pub enum VendoError {
    // Lock file errors
    #[error("Failed to decode lock file: {path}")]
    #[diagnostic(
        code(vendo::lock::decode_failed),
        help("Check that the lock file is valid JSON produced by the ecosystem's resolver")
    )]
    DecodeFailed { path: String, reason: String },

    #[error("Lock file not found: {path}")]
    #[diagnostic(
        code(vendo::lock::not_found),
        help("Run the ecosystem's resolver first to produce a lock file")
    )]
    LockFileMissing { path: String },

    // Dist install errors (recovered by the source fallback)
    #[error("Failed to fetch archive for '{module}': {url}")]
    #[diagnostic(code(vendo::dist::fetch_failed))]
    FetchFailed {
        module: String,
        url: String,
        reason: String,
    },

    #[error("Failed to extract archive for '{module}'")]
    #[diagnostic(code(vendo::dist::extract_failed))]
    ExtractFailed { module: String, reason: String },

    // Source install errors (terminal for the module)
    #[error("Failed to clone repository: {url}")]
    #[diagnostic(
        code(vendo::vcs::clone_failed),
        help("Check that URL is correct and you have access to the repository")
    )]
    VcsCloneFailed { url: String, reason: String },

    #[error("Failed to checkout revision '{revision}': {reason}")]
    #[diagnostic(code(vendo::vcs::checkout_failed))]
    VcsCheckoutFailed { revision: String, reason: String },

    #[error("Module '{module}' has no usable dist or source reference")]
    #[diagnostic(
        code(vendo::install::unsupported_source_kind),
        help("Only 'zip' dist references and 'git' source references are supported")
    )]
    UnsupportedSourceKind { module: String },

    // Version errors
    #[error("Invalid version '{version}': {reason}")]
    #[diagnostic(
        code(vendo::version::invalid),
        help("Versions must be numeric dotted components, optionally 'v'-prefixed, or a 'dev-' reference")
    )]
    InvalidVersion { version: String, reason: String },

    // Installed-state registry errors
    #[error("Failed to read installed-state registry: {path}")]
    #[diagnostic(code(vendo::state::read_failed))]
    StateReadFailed { path: String, reason: String },

    #[error("Failed to write installed-state registry: {path}")]
    #[diagnostic(code(vendo::state::write_failed))]
    StateWriteFailed { path: String, reason: String },

    // Finalize errors
    #[error("Finalize command for handler '{handler}' failed")]
    #[diagnostic(
        code(vendo::finalize::failed),
        help("Installed modules are kept; re-run once the underlying tool works again")
    )]
    FinalizeFailed { handler: String, reason: String },

    // File system errors
    #[error("File system error at '{path}': {source}")]
    #[diagnostic(code(vendo::fs::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl VendoError {
    /// Wrap an `std::io::Error` with the path it occurred on
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for Vendo operations
pub type Result<T> = std::result::Result<T, VendoError>;
