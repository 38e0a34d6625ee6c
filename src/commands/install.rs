//! Install command: run the full pipeline for a project root

use std::path::PathBuf;
use std::sync::Arc;

use console::style;

use crate::cli::InstallArgs;
use crate::error::Result;
use crate::handler::HandlerSet;
use crate::progress::ProgressDisplay;
use crate::project::Project;

pub fn run(root: Option<PathBuf>, verbose: bool, args: &InstallArgs) -> Result<()> {
    let root = match root {
        Some(path) => path,
        None => std::env::current_dir().map_err(|e| crate::error::VendoError::io(".", e))?,
    };

    let display = Arc::new(ProgressDisplay::new(verbose));
    let project = Project::new(root, HandlerSet::builtin(), display.clone());

    let summary = project.install(args.jobs)?;
    display.finish();

    if summary.handlers.is_empty() {
        println!("{}", style("No lock files found, nothing to install").yellow());
        return Ok(());
    }

    for (handler, error) in &summary.decode_errors {
        eprintln!("{} {}: {}", style("Error").red().bold(), handler, error);
    }
    for (handler, error) in &summary.finalize_errors {
        eprintln!("{} {}: {}", style("Error").red().bold(), handler, error);
    }

    if summary.failed > 0 {
        println!(
            "{} {} installed, {} failed (re-run to retry failed modules)",
            style("Done with errors:").yellow().bold(),
            summary.installed,
            summary.failed
        );
    } else {
        println!(
            "{} {} modules installed ({})",
            style("Done:").green().bold(),
            summary.installed,
            summary.handlers.join(", ")
        );
    }

    Ok(())
}
