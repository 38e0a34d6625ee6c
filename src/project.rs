//! Project orchestration
//!
//! Ties the pieces together for one run: detect applicable handlers,
//! feed every locked module through the shared pipeline, hold the
//! global barrier, run each handler's finalize step, and flush the
//! installed-state registry and class-map index.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::classmap::ClassMap;
use crate::error::{Result, VendoError};
use crate::events::{Event, Observer};
use crate::handler::{EcosystemHandler, HandlerSet};
use crate::install::{InstallContext, install_module};
use crate::installed::{InstalledRecord, Registry};
use crate::pipeline::{Job, Pipeline, default_pool_size};

/// What a run accomplished; failures are contained, never propagated
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Handlers that matched the project root
    pub handlers: Vec<String>,
    /// Modules merged into the registry (installed or current)
    pub installed: usize,
    /// Modules that failed terminally
    pub failed: usize,
    /// Handler-level decode failures, reported per handler
    pub decode_errors: Vec<(String, VendoError)>,
    /// Finalize failures, reported per handler
    pub finalize_errors: Vec<(String, VendoError)>,
}

/// A project root with its configured handler set
pub struct Project {
    root: PathBuf,
    handlers: HandlerSet,
    observer: Arc<dyn Observer>,
}

/// Counts terminal job failures while forwarding everything
struct FailureCounter {
    inner: Arc<dyn Observer>,
    failed: AtomicUsize,
}

impl Observer for FailureCounter {
    fn on_event(&self, event: &Event) {
        if matches!(event, Event::JobFailed { .. }) {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        self.inner.on_event(event);
    }
}

impl Project {
    /// Handlers are injected explicitly; nothing self-registers.
    pub fn new(root: impl Into<PathBuf>, handlers: HandlerSet, observer: Arc<dyn Observer>) -> Self {
        Self {
            root: root.into(),
            handlers,
            observer,
        }
    }

    /// Install every locked module from every detected handler
    ///
    /// Per-module and per-handler failures are contained and reported
    /// through the summary; only registry I/O errors abort the run.
    pub fn install(&self, pool_size: Option<usize>) -> Result<RunSummary> {
        let observer = Arc::new(FailureCounter {
            inner: self.observer.clone(),
            failed: AtomicUsize::new(0),
        });

        let active = self.handlers.detect(&self.root);
        for handler in &active {
            observer.on_event(&Event::HandlerDetected {
                handler: handler.name().to_string(),
            });
        }

        let registry = Arc::new(Registry::load(&self.root)?);
        let classmap = Arc::new(Mutex::new(ClassMap::new()));
        let installed_count = Arc::new(AtomicUsize::new(0));

        let ctx = InstallContext::new(self.root.clone(), registry.clone(), observer.clone());

        let pipeline = {
            let registry = registry.clone();
            let classmap = classmap.clone();
            let installed_count = installed_count.clone();
            let root = self.root.clone();

            // Sole aggregator: registry and index mutation is serialized here
            Pipeline::spawn(
                pool_size.unwrap_or_else(default_pool_size),
                observer.clone(),
                move |module| {
                    let version = if module.version_normalized.is_empty() {
                        module.version.clone()
                    } else {
                        module.version_normalized.clone()
                    };
                    registry.upsert(InstalledRecord {
                        name: module.name.clone(),
                        version,
                        installation_source: module.installation_source,
                    });

                    if !module.autoload.is_empty() {
                        let contribution = ClassMap::from_installed_module(&root, &module);
                        classmap
                            .lock()
                            .unwrap_or_else(std::sync::PoisonError::into_inner)
                            .merge(contribution);
                    }

                    installed_count.fetch_add(1, Ordering::Relaxed);
                },
            )
        };

        let decode_errors = Mutex::new(Vec::new());
        let mut enumerated: Vec<&dyn EcosystemHandler> = Vec::new();

        // Each handler enqueues from its own producer thread; the queue
        // closes only after all of them finished.
        let enumerated_names: Vec<String> = thread::scope(|scope| {
            let mut producers = Vec::new();
            for handler in &active {
                let sender = pipeline.handle();
                let ctx = ctx.clone();
                let observer = observer.clone();
                let decode_errors = &decode_errors;
                producers.push(scope.spawn(move || match handler.list_modules(&ctx.root) {
                    Ok(modules) => {
                        observer.on_event(&Event::ModulesEnumerated {
                            handler: handler.name().to_string(),
                            count: modules.len(),
                        });
                        for module in modules {
                            let ctx = ctx.clone();
                            let name = module.name.clone();
                            sender.enqueue(Job::new(name, move || install_module(&ctx, module)));
                        }
                        Some(handler.name().to_string())
                    }
                    Err(e) => {
                        decode_errors
                            .lock()
                            .unwrap_or_else(std::sync::PoisonError::into_inner)
                            .push((handler.name().to_string(), e));
                        None
                    }
                }));
            }
            producers
                .into_iter()
                .filter_map(|p| p.join().ok().flatten())
                .collect()
        });
        for handler in &active {
            if enumerated_names.iter().any(|n| n == handler.name()) {
                enumerated.push(*handler);
            }
        }

        // Global barrier: every module from every handler completes
        // before any finalize step runs
        pipeline.wait();

        let finalize_errors = Mutex::new(Vec::new());
        thread::scope(|scope| {
            for handler in &enumerated {
                let observer = observer.clone();
                let root = self.root.as_path();
                let finalize_errors = &finalize_errors;
                scope.spawn(move || {
                    observer.on_event(&Event::FinalizeStarted {
                        handler: handler.name().to_string(),
                    });
                    let result = handler.finalize(root);
                    observer.on_event(&Event::FinalizeFinished {
                        handler: handler.name().to_string(),
                        ok: result.is_ok(),
                    });
                    if let Err(e) = result {
                        finalize_errors
                            .lock()
                            .unwrap_or_else(std::sync::PoisonError::into_inner)
                            .push((handler.name().to_string(), e));
                    }
                });
            }
        });

        registry.flush()?;
        let classmap = classmap
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if !classmap.is_empty() {
            classmap.flush(&self.root)?;
        }

        Ok(RunSummary {
            handlers: active.iter().map(|h| h.name().to_string()).collect(),
            installed: installed_count.load(Ordering::Relaxed),
            failed: observer.failed.load(Ordering::Relaxed),
            decode_errors: decode_errors
                .into_inner()
                .unwrap_or_else(std::sync::PoisonError::into_inner),
            finalize_errors: finalize_errors
                .into_inner()
                .unwrap_or_else(std::sync::PoisonError::into_inner),
        })
    }
}
