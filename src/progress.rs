//! Progress bar display for install runs
//!
//! Implements the core's [`Observer`] seam over `indicatif`; the engine
//! itself never touches the terminal.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::events::{Event, Observer};

/// Progress display for a run
pub struct ProgressDisplay {
    bar: ProgressBar,
    verbose: bool,
}

impl ProgressDisplay {
    /// Total job count is unknown until handlers enumerate their lock
    /// files, so the bar grows as `ModulesEnumerated` events arrive.
    pub fn new(verbose: bool) -> Self {
        let bar = ProgressBar::new(0);
        let bar_style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(bar_style);

        Self { bar, verbose }
    }

    /// Finish the bar, leaving failure lines on screen
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Observer for ProgressDisplay {
    fn on_event(&self, event: &Event) {
        match event {
            Event::HandlerDetected { handler } => {
                self.bar
                    .println(format!("{} {}", style("Detected").green().bold(), handler));
            }
            Event::ModulesEnumerated { handler, count } => {
                self.bar.inc_length(*count as u64);
                if self.verbose {
                    self.bar
                        .println(format!("{handler}: {count} locked modules"));
                }
            }
            Event::JobStarted { module } => {
                self.bar.set_message(module.clone());
            }
            Event::JobSucceeded { module, .. } => {
                if self.verbose {
                    self.bar.println(format!("  {module}"));
                }
                self.bar.inc(1);
            }
            // Skipped modules still flow through the result stream and
            // arrive as JobSucceeded; that event owns the bar step.
            Event::JobSkipped { module, .. } => {
                if self.verbose {
                    self.bar.println(format!("  {module} (up to date)"));
                }
            }
            Event::JobFailed { module, reason } => {
                self.bar.println(format!(
                    "{} {}: {}",
                    style("Failed").red().bold(),
                    module,
                    reason
                ));
                self.bar.inc(1);
            }
            Event::VersionWarning { module, reason } => {
                self.bar.println(format!(
                    "{} {}: {}",
                    style("Warning").yellow().bold(),
                    module,
                    reason
                ));
            }
            Event::FinalizeStarted { handler } => {
                self.bar.set_message(format!("finalizing {handler}"));
            }
            Event::FinalizeFinished { handler, ok } => {
                if !ok {
                    self.bar.println(format!(
                        "{} finalize for {}",
                        style("Failed").red().bold(),
                        handler
                    ));
                }
            }
        }
    }
}
