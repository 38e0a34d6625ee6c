//! Install events emitted by the core
//!
//! The engine holds no UI state; it reports discrete events to an
//! observer (progress bar, plain logger, test probe).

use crate::lock::InstallationSource;

/// Discrete events emitted during a run
#[derive(Debug, Clone)]
pub enum Event {
    /// An ecosystem handler matched the project root
    HandlerDetected { handler: String },
    /// A handler finished decoding its lock file
    ModulesEnumerated { handler: String, count: usize },
    /// A worker picked up a module install job
    JobStarted { module: String },
    /// A module was materialized on disk
    JobSucceeded {
        module: String,
        source: InstallationSource,
    },
    /// A module was skipped; the registry already has this version
    JobSkipped { module: String, version: String },
    /// A module failed terminally; siblings are unaffected
    JobFailed { module: String, reason: String },
    /// Version normalization failed after file placement succeeded
    VersionWarning { module: String, reason: String },
    /// A handler's finalize command is starting
    FinalizeStarted { handler: String },
    /// A handler's finalize command completed
    FinalizeFinished { handler: String, ok: bool },
}

/// Sink for install events; implementations must tolerate concurrent
/// calls from worker threads.
pub trait Observer: Send + Sync {
    fn on_event(&self, event: &Event);
}

/// Observer that discards everything
#[derive(Debug, Default)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn on_event(&self, _event: &Event) {}
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// Records every event for assertions
    #[derive(Default)]
    pub struct RecordingObserver {
        pub events: Mutex<Vec<Event>>,
    }

    impl Observer for RecordingObserver {
        fn on_event(&self, event: &Event) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    impl RecordingObserver {
        pub fn failures(&self) -> Vec<String> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter_map(|e| match e {
                    Event::JobFailed { module, .. } => Some(module.clone()),
                    _ => None,
                })
                .collect()
        }
    }
}
