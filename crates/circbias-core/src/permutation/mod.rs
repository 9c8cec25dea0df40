//! Permutation engine.
//!
//! Builds a null distribution for any metric by recomputing it on permuted
//! data, then compares the observed value against it. Three null modes are
//! supported (see [`NullMode`]):
//!
//! - **shuffle**: permute the time axis of the performance matrix
//! - **label-shuffle-fast**: permute labels against fixed predictions
//! - **retrain**: permute labels and refit a fresh model per replicate
//!
//! # Reproducibility
//!
//! The master seed derives one child seed per replicate *before* dispatch
//! (`counter_rng_seed(seed, i)`), and every executor returns outcomes in
//! submission order. The replicate vector is therefore bit-identical across
//! backends and worker counts for a deterministic metric.
//!
//! # Failures
//!
//! A replicate whose metric returns an error, panics, or produces a
//! non-finite value is dropped and counted in `n_failed`. If nothing
//! survives the run fails with [`BiasError::AllReplicatesFailed`].

mod executor;
mod metric;
mod problem;
mod stopping;

pub use executor::{
    build_executor, guarded, Backend, Parallelism, ReplicateExecutor, ReplicateJob,
    SequentialExecutor,
};
#[cfg(feature = "parallel")]
pub use executor::ThreadPoolExecutor;
pub use metric::{LabelMetric, MatrixMetric, Model, ModelFactory};
pub use problem::{Alternative, NullMode, NullProblem};
pub use stopping::{p_value_standard_error, AdaptiveStopping};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CONFIDENCE_LEVEL, DEFAULT_PERMUTATIONS};
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::BiasError;
use crate::statistics::{counter_rng_seed, mean, percentile_interval, resolve_seed};

/// Permutation-test settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PermutationConfig {
    /// Maximum number of replicates.
    pub n_permutations: usize,
    /// Backend and worker count.
    pub parallelism: Parallelism,
    /// Master seed; `None` draws one from OS entropy.
    pub seed: Option<u64>,
    /// Optional early-stopping rule.
    pub adaptive: Option<AdaptiveStopping>,
    /// Level of the percentile interval over the replicates.
    pub confidence_level: f64,
    /// P-value direction; `None` uses the null mode's default.
    pub alternative: Option<Alternative>,
}

impl Default for PermutationConfig {
    fn default() -> Self {
        Self {
            n_permutations: DEFAULT_PERMUTATIONS,
            parallelism: Parallelism::default(),
            seed: None,
            adaptive: None,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            alternative: None,
        }
    }
}

impl PermutationConfig {
    /// Settings with `n_permutations` replicates and a fixed seed.
    pub fn seeded(n_permutations: usize, seed: u64) -> Self {
        Self {
            n_permutations,
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Use `parallelism` for replicate execution.
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Enable adaptive stopping.
    pub fn with_adaptive(mut self, adaptive: AdaptiveStopping) -> Self {
        self.adaptive = Some(adaptive);
        self
    }

    /// Override the p-value direction.
    pub fn with_alternative(mut self, alternative: Alternative) -> Self {
        self.alternative = Some(alternative);
        self
    }

    /// Check replicate budget, interval level and stopping rule.
    pub fn validate(&self) -> Result<(), BiasError> {
        if self.n_permutations == 0 {
            return Err(BiasError::configuration("n_permutations", "must be >= 1"));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(BiasError::configuration(
                "confidence_level",
                format!("must be in (0, 1), got {}", self.confidence_level),
            ));
        }
        if let Some(adaptive) = &self.adaptive {
            adaptive.validate()?;
        }
        Ok(())
    }
}

/// Outcome of a permutation test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermutationResult {
    /// Null mode used.
    pub null_mode: NullMode,
    /// Metric on the unpermuted data.
    pub observed: f64,
    /// Successful replicate values, in submission order.
    pub replicates: Vec<f64>,
    /// `(b + 1) / (m + 1)` where `b` counts replicates at least as extreme.
    pub p_value: f64,
    /// Direction used for `p_value`.
    pub alternative: Alternative,
    /// Lower percentile bound of the replicates.
    pub ci_lower: f64,
    /// Upper percentile bound of the replicates.
    pub ci_upper: f64,
    /// Replicates that produced a finite value.
    pub n_successful: usize,
    /// Replicates dropped.
    pub n_failed: usize,
    /// Adaptive stopping reached its precision target.
    pub converged: bool,
    /// Master seed used.
    pub seed: u64,
    /// Backend that actually ran the replicates.
    pub backend_used: Backend,
}

/// Run a permutation test.
pub fn permutation_test(
    problem: &NullProblem<'_>,
    config: &PermutationConfig,
    diagnostics: &mut Diagnostics,
) -> Result<PermutationResult, BiasError> {
    config.validate()?;
    problem.validate()?;

    let observed = problem.observed()?;
    if !observed.is_finite() {
        return Err(BiasError::computation(format!(
            "metric evaluated to {} on the unpermuted data",
            observed
        )));
    }

    let alternative = config
        .alternative
        .unwrap_or_else(|| problem.default_alternative());
    let seed = resolve_seed(config.seed);
    let executor = build_executor(&config.parallelism, diagnostics);
    let job = |child_seed: u64| guarded(|| problem.replicate(child_seed));

    let batch_size = config
        .adaptive
        .map_or(config.n_permutations, |rule| rule.batch_size);
    let mut replicates = Vec::with_capacity(config.n_permutations);
    let mut attempted = 0usize;
    let mut converged = false;

    while attempted < config.n_permutations {
        let end = (attempted + batch_size).min(config.n_permutations);
        let seeds: Vec<u64> = (attempted..end)
            .map(|i| counter_rng_seed(seed, i as u64))
            .collect();
        replicates.extend(executor.run(&seeds, &job).into_iter().flatten());
        attempted = end;

        if let Some(rule) = &config.adaptive {
            let extreme = count_extreme(observed, &replicates, alternative);
            if rule.is_converged(attempted, replicates.len(), extreme) {
                converged = true;
                break;
            }
        }
    }

    let n_failed = attempted - replicates.len();
    if replicates.is_empty() {
        return Err(BiasError::AllReplicatesFailed { attempted });
    }
    if n_failed > 0 {
        diagnostics.push(Warning::ReplicatesFailed {
            failed: n_failed,
            attempted,
        });
    }

    let extreme = count_extreme(observed, &replicates, alternative);
    let (ci_lower, ci_upper) = percentile_interval(&replicates, config.confidence_level);

    Ok(PermutationResult {
        null_mode: problem.mode(),
        observed,
        p_value: (extreme + 1) as f64 / (replicates.len() + 1) as f64,
        alternative,
        ci_lower,
        ci_upper,
        n_successful: replicates.len(),
        n_failed,
        converged,
        seed,
        backend_used: executor.backend(),
        replicates,
    })
}

/// Number of replicates at least as extreme as `observed`.
fn count_extreme(observed: f64, replicates: &[f64], alternative: Alternative) -> usize {
    match alternative {
        Alternative::TwoSided => {
            let center = mean(replicates);
            let threshold = (observed - center).abs();
            replicates
                .iter()
                .filter(|r| (*r - center).abs() >= threshold)
                .count()
        }
        Alternative::Greater => replicates.iter().filter(|&&r| r >= observed).count(),
        Alternative::Less => replicates.iter().filter(|&&r| r <= observed).count(),
    }
}
