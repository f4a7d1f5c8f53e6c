//! Batch orchestration.
//!
//! Every path becomes one [`FileTask`] handed to the [`Rewriter`] on a
//! fixed-size Rayon pool. Tasks are independent: a failing file is recorded
//! and the batch carries on. The only shared state is the [`ResultSink`].

use std::path::PathBuf;
use std::thread;

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_WORKERS_CAP, DEFAULT_WORKERS_PER_CPU, MAX_WORKERS};
use crate::error::{Error, Result};
use crate::file::Rewriter;
use crate::types::{BatchResult, FileTask, ProcessorMode};
use crate::ui::progress::Bar;

pub mod sink;

pub use sink::ResultSink;

/// Runs rewrites across a bounded worker pool.
pub struct Orchestrator {
    workers: usize,
}

impl Orchestrator {
    /// Creates an orchestrator with `requested` workers, or the default.
    pub fn new(requested: Option<usize>) -> Result<Self> {
        Ok(Self { workers: Self::resolve_workers(requested)? })
    }

    /// Validates a requested worker count.
    ///
    /// Zero is rejected, anything above [`MAX_WORKERS`] is clamped, and no
    /// request means `min(32, 2 x available parallelism)`.
    pub fn resolve_workers(requested: Option<usize>) -> Result<usize> {
        match requested {
            Some(0) => Err(Error::InvalidWorkerCount),
            Some(n) if n > MAX_WORKERS => {
                warn!(requested = n, max = MAX_WORKERS, "worker count clamped");
                Ok(MAX_WORKERS)
            }
            Some(n) => Ok(n),
            None => Ok(Self::default_workers()),
        }
    }

    /// `min(32, 2 x available parallelism)`, or 2 when the CPU count is unknown.
    pub fn default_workers() -> usize {
        let cpus = thread::available_parallelism().map(|p| p.get()).unwrap_or(1);
        (cpus * DEFAULT_WORKERS_PER_CPU).min(DEFAULT_WORKERS_CAP)
    }

    /// Rewrites every path and returns the aggregated outcome.
    ///
    /// Only failing to start the pool is an error; per-file errors end up in
    /// [`BatchResult::failed`].
    pub fn run(&self, paths: Vec<PathBuf>, mode: ProcessorMode, rewriter: &Rewriter<'_>, progress: Option<&Bar>) -> Result<BatchResult> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("sealdir-worker-{i}"))
            .build()
            .map_err(|e| Error::WorkerPool(e.to_string()))?;

        info!(files = paths.len(), workers = self.workers, mode = mode.name(), "starting batch");

        let sink = ResultSink::new();
        pool.install(|| {
            paths.into_par_iter().for_each(|path| {
                let task = FileTask::new(path, mode);
                match rewriter.rewrite(&task) {
                    Ok(report) => sink.success(task.path, report),
                    Err(e) => {
                        warn!(path = %task.path.display(), "{e}");
                        sink.failure(task.path, e.to_string());
                    }
                }

                if let Some(bar) = progress {
                    bar.add(1);
                }
            });
        });

        let result = sink.into_inner();
        debug!(succeeded = result.succeeded.len(), failed = result.failed.len(), "batch finished");
        Ok(result)
    }
}
