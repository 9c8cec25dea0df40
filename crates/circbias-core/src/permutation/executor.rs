//! Pluggable replicate executors.
//!
//! An executor receives the child seeds of one batch and a job that turns a
//! child seed into an optional replicate value. Every executor returns
//! outcomes in submission order, so the replicate vector depends only on the
//! master seed, never on scheduling.

use std::panic::{self, AssertUnwindSafe};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostics, Warning};
use crate::error::BiasError;

/// A replicate job: child seed in, value out (`None` on failure).
pub type ReplicateJob<'a> = dyn Fn(u64) -> Option<f64> + Sync + 'a;

/// Execution backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Run replicates one after another on the calling thread.
    Sequential,
    /// Run replicates on a dedicated rayon pool.
    Threads,
    /// Run replicates in worker processes.
    Processes,
}

impl Backend {
    /// Lowercase backend name.
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Sequential => "sequential",
            Backend::Threads => "threads",
            Backend::Processes => "processes",
        }
    }
}

/// Requested backend and worker count.
///
/// `workers == 0` lets the thread pool pick the number of logical CPUs;
/// `workers == 1` always runs sequentially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parallelism {
    /// Requested backend.
    pub backend: Backend,
    /// Requested worker count.
    pub workers: usize,
}

impl Default for Parallelism {
    fn default() -> Self {
        Self::sequential()
    }
}

impl Parallelism {
    /// Run on the calling thread.
    pub fn sequential() -> Self {
        Self {
            backend: Backend::Sequential,
            workers: 1,
        }
    }

    /// Run on a pool of `workers` threads.
    pub fn threads(workers: usize) -> Self {
        Self {
            backend: Backend::Threads,
            workers,
        }
    }

    /// Run on `workers` processes.
    pub fn processes(workers: usize) -> Self {
        Self {
            backend: Backend::Processes,
            workers,
        }
    }
}

/// Runs a batch of replicate jobs.
pub trait ReplicateExecutor {
    /// Run `job` once per seed, returning outcomes in seed order.
    fn run(&self, seeds: &[u64], job: &ReplicateJob<'_>) -> Vec<Option<f64>>;

    /// Backend this executor actually uses.
    fn backend(&self) -> Backend;
}

/// Runs every replicate on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialExecutor;

impl ReplicateExecutor for SequentialExecutor {
    fn run(&self, seeds: &[u64], job: &ReplicateJob<'_>) -> Vec<Option<f64>> {
        seeds.iter().map(|&seed| job(seed)).collect()
    }

    fn backend(&self) -> Backend {
        Backend::Sequential
    }
}

/// Runs replicates on a dedicated rayon thread pool.
#[cfg(feature = "parallel")]
pub struct ThreadPoolExecutor {
    pool: rayon::ThreadPool,
}

#[cfg(feature = "parallel")]
impl ThreadPoolExecutor {
    /// Build a pool with `workers` threads (0 = one per logical CPU).
    pub fn new(workers: usize) -> Result<Self, BiasError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("circbias-worker-{}", i))
            .build()
            .map_err(|e| BiasError::BackendUnavailable {
                backend: Backend::Threads.name().to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { pool })
    }

    /// Number of threads in the pool.
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }
}

#[cfg(feature = "parallel")]
impl ReplicateExecutor for ThreadPoolExecutor {
    fn run(&self, seeds: &[u64], job: &ReplicateJob<'_>) -> Vec<Option<f64>> {
        // Indexed collect keeps submission order.
        self.pool
            .install(|| seeds.par_iter().map(|&seed| job(seed)).collect())
    }

    fn backend(&self) -> Backend {
        Backend::Threads
    }
}

/// Build the executor for `parallelism`, degrading to sequential when the
/// requested backend cannot be provided.
pub fn build_executor(
    parallelism: &Parallelism,
    diagnostics: &mut Diagnostics,
) -> Box<dyn ReplicateExecutor> {
    match parallelism.backend {
        Backend::Sequential => Box::new(SequentialExecutor),
        _ if parallelism.workers == 1 => Box::new(SequentialExecutor),
        Backend::Threads => threads_or_sequential(parallelism.workers, diagnostics),
        Backend::Processes => {
            diagnostics.push(Warning::BackendUnavailable {
                requested: Backend::Processes.name().to_string(),
                reason: "replicate jobs borrow in-process data and cannot be sent to another process"
                    .to_string(),
            });
            Box::new(SequentialExecutor)
        }
    }
}

#[cfg(feature = "parallel")]
fn threads_or_sequential(workers: usize, diagnostics: &mut Diagnostics) -> Box<dyn ReplicateExecutor> {
    match ThreadPoolExecutor::new(workers) {
        Ok(executor) => Box::new(executor),
        Err(BiasError::BackendUnavailable { backend, reason }) => {
            diagnostics.push(Warning::BackendUnavailable {
                requested: backend,
                reason,
            });
            Box::new(SequentialExecutor)
        }
        Err(other) => {
            diagnostics.push(Warning::BackendUnavailable {
                requested: Backend::Threads.name().to_string(),
                reason: other.to_string(),
            });
            Box::new(SequentialExecutor)
        }
    }
}

#[cfg(not(feature = "parallel"))]
fn threads_or_sequential(_workers: usize, diagnostics: &mut Diagnostics) -> Box<dyn ReplicateExecutor> {
    diagnostics.push(Warning::BackendUnavailable {
        requested: Backend::Threads.name().to_string(),
        reason: "built without the `parallel` feature".to_string(),
    });
    Box::new(SequentialExecutor)
}

/// Run one replicate, mapping errors, panics and non-finite values to `None`.
pub fn guarded<F>(f: F) -> Option<f64>
where
    F: FnOnce() -> Result<f64, BiasError>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) if value.is_finite() => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_job(seed: u64) -> Option<f64> {
        if seed % 7 == 0 {
            None
        } else {
            Some((seed as f64).powi(2))
        }
    }

    #[test]
    fn test_sequential_preserves_order() {
        let seeds: Vec<u64> = (0..20).collect();
        let out = SequentialExecutor.run(&seeds, &square_job);
        assert_eq!(out.len(), 20);
        assert_eq!(out[0], None);
        assert_eq!(out[3], Some(9.0));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_thread_pool_matches_sequential() {
        let seeds: Vec<u64> = (0..500).map(|i| i * 31 + 5).collect();
        let expected = SequentialExecutor.run(&seeds, &square_job);
        for workers in [2, 4] {
            let executor = ThreadPoolExecutor::new(workers).unwrap();
            assert_eq!(executor.workers(), workers);
            assert_eq!(executor.run(&seeds, &square_job), expected);
        }
    }

    #[test]
    fn test_processes_degrade_with_warning() {
        let mut diag = Diagnostics::new();
        let executor = build_executor(&Parallelism::processes(4), &mut diag);
        assert_eq!(executor.backend(), Backend::Sequential);
        assert!(diag.contains(|w| matches!(
            w,
            Warning::BackendUnavailable { requested, .. } if requested == "processes"
        )));
    }

    #[test]
    fn test_single_worker_is_sequential_without_warning() {
        let mut diag = Diagnostics::new();
        let executor = build_executor(&Parallelism::threads(1), &mut diag);
        assert_eq!(executor.backend(), Backend::Sequential);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_guarded_maps_failures() {
        assert_eq!(guarded(|| Ok(1.5)), Some(1.5));
        assert_eq!(guarded(|| Ok(f64::NAN)), None);
        assert_eq!(guarded(|| Err(BiasError::computation("boom"))), None);
        assert_eq!(guarded(|| panic!("boom")), None);
    }
}
