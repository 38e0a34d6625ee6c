//! Command implementations behind the CLI

pub mod completions;
pub mod install;
pub mod version;
