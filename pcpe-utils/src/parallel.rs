//! Parallel processing utilities: a batch-scoped worker pool and the
//! archive dispatcher built on it.

use crate::report::{ArchiveOutcome, BatchReport};
use pcpe_bio::{process_archive, ArchiveReport};
use pcpe_core::config::OutputConfig;
use pcpe_core::{ArchiveFile, Config, PcpeError, PcpeResult};
use rayon::prelude::*;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Per-archive work executed by the dispatcher
pub type ArchiveTask = dyn Fn(&Path, &Config) -> PcpeResult<ArchiveReport> + Send + Sync;

/// Callback invoked once for every finished archive, successful or not
pub type CompletionNotifier = dyn Fn(&ArchiveOutcome) + Send + Sync;

/// Get the number of available CPU cores
pub fn get_available_cores() -> usize {
    num_cpus::get()
}

/// Resolve a configured thread count (0 = all available cores)
pub fn resolve_thread_count(threads: usize) -> usize {
    if threads == 0 {
        get_available_cores()
    } else {
        threads
    }
}

/// A bounded pool owned by one batch of work.
///
/// The pool is not installed globally; its threads are released when it is dropped.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    pub fn new(threads: usize) -> PcpeResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(resolve_thread_count(threads))
            .thread_name(|i| format!("pcpe-worker-{}", i))
            .build()
            .map_err(|e| PcpeError::Other(format!("Failed to build worker pool: {}", e)))?;
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `f` on every item and return the results in input order once all tasks finished
    pub fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        self.pool.install(|| items.par_iter().map(&f).collect())
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// For each path, the earlier path whose output files it would overwrite
fn output_conflicts<P: AsRef<Path>>(paths: &[P], output: &OutputConfig) -> Vec<Option<PathBuf>> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    paths
        .iter()
        .map(|p| {
            let path = p.as_ref();
            let files = ArchiveFile::new(path, output);
            let earlier = [&files.id_path, &files.seq_path]
                .into_iter()
                .find_map(|out| claimed.get(out).map(|e| e.to_path_buf()));
            if earlier.is_none() {
                claimed.insert(files.id_path, path);
                claimed.insert(files.seq_path, path);
            }
            earlier
        })
        .collect()
}

/// Fans the archive pipeline out over a list of paths.
///
/// A single path runs on the calling thread. Several paths run as independent
/// tasks on a [`WorkerPool`] created for the batch and dropped before
/// [`Dispatcher::dispatch`] returns. A failing or panicking archive never stops
/// its siblings: every outcome is collected into the [`BatchReport`]. A path
/// whose outputs coincide with those of an earlier path fails with
/// [`PcpeError::InvalidInput`] without being read.
pub struct Dispatcher {
    config: Config,
    task: Arc<ArchiveTask>,
    notifier: Arc<CompletionNotifier>,
}

impl Dispatcher {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            task: Arc::new(|path: &Path, config: &Config| process_archive(path, config)),
            notifier: Arc::new(|outcome: &ArchiveOutcome| {
                if outcome.is_success() {
                    info!("Read file {}", outcome.path.display());
                }
            }),
        }
    }

    /// Replace the per-archive work
    pub fn with_task<F>(mut self, task: F) -> Self
    where
        F: Fn(&Path, &Config) -> PcpeResult<ArchiveReport> + Send + Sync + 'static,
    {
        self.task = Arc::new(task);
        self
    }

    pub fn with_notifier<F>(mut self, notifier: F) -> Self
    where
        F: Fn(&ArchiveOutcome) + Send + Sync + 'static,
    {
        self.notifier = Arc::new(notifier);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dispatch<P: AsRef<Path> + Sync>(&self, paths: &[P]) -> PcpeResult<BatchReport> {
        if paths.is_empty() {
            return Err(PcpeError::InvalidInput(
                "no archives to process".to_string(),
            ));
        }

        let start = Instant::now();
        let jobs: Vec<(&Path, Option<PathBuf>)> = paths
            .iter()
            .map(|p| p.as_ref())
            .zip(output_conflicts(paths, &self.config.output))
            .collect();

        let outcomes = if jobs.len() == 1 {
            let (path, overwrites) = &jobs[0];
            vec![self.run_one(path, overwrites.as_deref())]
        } else {
            let pool = WorkerPool::new(self.config.performance.threads)?;
            info!(
                "Processing {} archives on {} workers",
                jobs.len(),
                pool.threads()
            );
            let outcomes = pool.map(&jobs, |(path, overwrites)| {
                self.run_one(path, overwrites.as_deref())
            });
            drop(pool);
            outcomes
        };

        let report = BatchReport::new(outcomes, start.elapsed());
        debug!(
            "Batch finished: {} succeeded, {} failed",
            report.succeeded().count(),
            report.failures().count()
        );
        Ok(report)
    }

    fn run_one(&self, path: &Path, overwrites: Option<&Path>) -> ArchiveOutcome {
        let result = match overwrites {
            Some(earlier) => Err(PcpeError::InvalidInput(format!(
                "{} would overwrite the outputs of {}",
                path.display(),
                earlier.display()
            ))),
            None => self.run_task(path),
        };

        if let Err(e) = &result {
            error!("Failed to process {}: {}", path.display(), e);
        }

        let outcome = ArchiveOutcome {
            path: path.to_path_buf(),
            result,
        };
        (self.notifier)(&outcome);
        outcome
    }

    fn run_task(&self, path: &Path) -> PcpeResult<ArchiveReport> {
        let task = &self.task;
        match panic::catch_unwind(AssertUnwindSafe(|| task(path, &self.config))) {
            Ok(result) => result,
            Err(payload) => Err(PcpeError::Worker {
                path: path.to_path_buf(),
                message: panic_message(payload),
            }),
        }
    }
}
