//! Concurrent install pipeline
//!
//! A fixed pool of worker threads drains a shared bounded job queue;
//! completed modules flow through a bounded result channel to a single
//! aggregator. Producers block when the job queue is full; that is the
//! only flow-control mechanism. A failed job is logged and dropped from
//! the result stream without aborting sibling jobs.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::error::Result;
use crate::events::{Event, Observer};
use crate::lock::Module;

/// Pool size multiplier over available parallelism
pub const POOL_MULTIPLIER: usize = 4;

/// Job queue capacity per worker
const QUEUE_DEPTH_PER_WORKER: usize = 2;

/// One install job: the module name for reporting plus the closure that
/// materializes it
pub struct Job {
    name: String,
    run: Box<dyn FnOnce() -> Result<Module> + Send>,
}

impl Job {
    pub fn new(name: impl Into<String>, run: impl FnOnce() -> Result<Module> + Send + 'static) -> Self {
        Self {
            name: name.into(),
            run: Box::new(run),
        }
    }
}

/// Default worker count: 4x logical CPUs, never below one
pub fn default_pool_size() -> usize {
    thread::available_parallelism()
        .map(|n| n.get() * POOL_MULTIPLIER)
        .unwrap_or(POOL_MULTIPLIER)
        .max(1)
}

/// Running pipeline; producers enqueue through [`Pipeline::handle`] and
/// [`Pipeline::wait`] drives the drain-and-join barrier.
pub struct Pipeline {
    jobs: Sender<Job>,
    workers: Vec<JoinHandle<()>>,
    aggregator: JoinHandle<()>,
}

impl Pipeline {
    /// Spawn workers and the aggregator; workers start before any job
    /// is enqueued.
    ///
    /// `on_installed` runs on the aggregator thread only, so all
    /// registry and index mutation stays serialized.
    pub fn spawn(
        pool_size: usize,
        observer: Arc<dyn Observer>,
        mut on_installed: impl FnMut(Module) + Send + 'static,
    ) -> Self {
        let pool_size = pool_size.max(1);
        let (job_tx, job_rx) = bounded::<Job>(pool_size * QUEUE_DEPTH_PER_WORKER);
        let (result_tx, result_rx) = bounded::<Module>(pool_size * QUEUE_DEPTH_PER_WORKER);

        let workers = (0..pool_size)
            .map(|_| {
                let jobs = job_rx.clone();
                let results = result_tx.clone();
                let observer = observer.clone();
                thread::spawn(move || worker_loop(&jobs, &results, observer.as_ref()))
            })
            .collect();

        // Workers hold the only result senders; once they all exit the
        // aggregator's receiver disconnects and it drains out.
        drop(result_tx);

        let aggregator = thread::spawn(move || {
            for module in &result_rx {
                on_installed(module);
            }
        });

        Self {
            jobs: job_tx,
            workers,
            aggregator,
        }
    }

    /// A producer-side handle to the job queue; enqueue blocks when the
    /// queue is full.
    pub fn handle(&self) -> JobSender {
        JobSender {
            jobs: self.jobs.clone(),
        }
    }

    /// Close the queue and block until every job drained, all workers
    /// exited and the aggregator consumed every result.
    pub fn wait(self) {
        let Self {
            jobs,
            workers,
            aggregator,
        } = self;

        // Producer-side barrier: dropping the last sender closes the queue
        drop(jobs);

        for worker in workers {
            let _ = worker.join();
        }
        let _ = aggregator.join();
    }
}

/// Cloneable producer handle
#[derive(Clone)]
pub struct JobSender {
    jobs: Sender<Job>,
}

impl JobSender {
    /// Enqueue a job, blocking while the queue is full
    pub fn enqueue(&self, job: Job) {
        // Send only fails when all workers are gone, which means wait()
        // already ran; nothing left to do with the job then.
        let _ = self.jobs.send(job);
    }
}

fn worker_loop(jobs: &Receiver<Job>, results: &Sender<Module>, observer: &dyn Observer) {
    for job in jobs {
        observer.on_event(&Event::JobStarted {
            module: job.name.clone(),
        });

        match (job.run)() {
            Ok(module) => {
                observer.on_event(&Event::JobSucceeded {
                    module: module.name.clone(),
                    source: module.installation_source,
                });
                let _ = results.send(module);
            }
            Err(e) => {
                // Reported exactly once, dropped from the result stream
                observer.on_event(&Event::JobFailed {
                    module: job.name,
                    reason: e.to_string(),
                });
            }
        }
    }
}
