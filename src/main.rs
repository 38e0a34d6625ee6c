//! Vendo - concurrent vendor-directory installer
//!
//! Given pre-resolved lock files (Composer, Yarn), vendo downloads and
//! materializes every locked module into `vendor/`, tracks installed
//! state for idempotent re-runs and builds a PSR-4 class-map index.

use clap::Parser;

mod classmap;
mod cli;
mod commands;
mod error;
mod events;
mod handler;
mod install;
mod installed;
mod lock;
mod pipeline;
mod progress;
mod project;
mod version;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Install(args) => commands::install::run(cli.root, cli.verbose, &args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(&args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
