//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Vendo - concurrent vendor-directory installer
#[derive(Parser, Debug)]
#[command(
    name = "vendo",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Concurrent vendor-directory installer for pre-resolved lock files",
    long_about = "Vendo materializes every module from a project's lock files (Composer, Yarn) \
                  into the vendor directory, in parallel, with a dist-archive-first and \
                  version-control-fallback strategy. It performs no dependency resolution: \
                  the lock file is trusted input.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  vendo install                  \x1b[90m# Install from lock files in the current directory\x1b[0m\n    \
                  vendo install --root ./app     \x1b[90m# Install for a different project root\x1b[0m\n    \
                  vendo install --jobs 8         \x1b[90m# Cap the worker pool\x1b[0m\n"
)]
pub struct Cli {
    /// Project root (defaults to current directory)
    #[arg(long, short = 'r', global = true, env = "VENDO_ROOT")]
    pub root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install all locked modules into the vendor directory
    Install(InstallArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the install command
#[derive(Parser, Debug)]
pub struct InstallArgs {
    /// Worker pool size (default: 4x logical CPU count)
    #[arg(long, short = 'j')]
    pub jobs: Option<usize>,
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
