//! Nonparametric bootstrap over the time axis.
//!
//! Each replicate draws T period indices with replacement and applies them to
//! every array in the bundle at once, so the joint (P, C, Θ) structure that
//! ρ_PC depends on survives resampling.
//!
//! # Algorithm
//!
//! 1. Evaluate the statistic on the original data (errors propagate)
//! 2. For each replicate `i`, seed a generator from `counter_rng_seed(seed, i)`,
//!    draw indices and evaluate; errors, panics and non-finite values drop the replicate
//! 3. Percentile interval, population standard error and an anchored two-sided p-value

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BOOTSTRAP_ITERATIONS, DEFAULT_CONFIDENCE_LEVEL, MIN_BOOTSTRAP_ITERATIONS,
    RECOMMENDED_BOOTSTRAP_ITERATIONS,
};
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::BiasError;
use crate::indicators::Indicator;
use crate::permutation::guarded;
use crate::statistics::{
    bootstrap_indices, mean, percentile_interval, replicate_rng, resolve_seed, std_dev,
};
use crate::types::EvaluationData;

/// Bootstrap settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Number of replicates (≥ 100).
    pub n_bootstrap: usize,
    /// Percentile-interval level in (0, 1).
    pub confidence_level: f64,
    /// Master seed; `None` draws one from OS entropy.
    pub seed: Option<u64>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            n_bootstrap: DEFAULT_BOOTSTRAP_ITERATIONS,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            seed: None,
        }
    }
}

impl BootstrapConfig {
    /// Settings with `n_bootstrap` replicates and a fixed seed.
    pub fn seeded(n_bootstrap: usize, seed: u64) -> Self {
        Self {
            n_bootstrap,
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Check replicate count and interval level.
    pub fn validate(&self) -> Result<(), BiasError> {
        if self.n_bootstrap < MIN_BOOTSTRAP_ITERATIONS {
            return Err(BiasError::configuration(
                "n_bootstrap",
                format!(
                    "must be >= {}, got {}",
                    MIN_BOOTSTRAP_ITERATIONS, self.n_bootstrap
                ),
            ));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(BiasError::configuration(
                "confidence_level",
                format!("must be in (0, 1), got {}", self.confidence_level),
            ));
        }
        Ok(())
    }
}

/// What the observed statistic's deviation is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullAnchor {
    /// The mean of the bootstrap replicates.
    BootstrapMean,
    /// A fixed null value.
    Value(f64),
}

/// Bootstrap summary for one statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BootstrapRecord {
    /// Statistic on the original data.
    pub point_estimate: f64,
    /// Lower percentile bound.
    pub ci_lower: f64,
    /// Upper percentile bound.
    pub ci_upper: f64,
    /// Two-sided bootstrap p-value.
    pub p_value: f64,
    /// Population standard deviation of the replicates.
    pub std_error: f64,
    /// Replicates requested.
    pub n_bootstrap: usize,
    /// Replicates dropped after errors or non-finite values.
    pub n_failed: usize,
    /// Master seed used.
    pub seed: u64,
}

/// Bootstrap an arbitrary statistic of the input bundle.
///
/// The p-value is the share of replicates whose distance from the replicate
/// mean is at least the observed statistic's distance from `anchor`.
pub fn bootstrap_statistic<F>(
    statistic: F,
    data: &EvaluationData,
    config: &BootstrapConfig,
    anchor: NullAnchor,
    diagnostics: &mut Diagnostics,
) -> Result<BootstrapRecord, BiasError>
where
    F: Fn(&EvaluationData) -> Result<f64, BiasError> + Sync,
{
    config.validate()?;
    if config.n_bootstrap < RECOMMENDED_BOOTSTRAP_ITERATIONS {
        diagnostics.push(Warning::LowReplicateCount {
            requested: config.n_bootstrap,
            recommended: RECOMMENDED_BOOTSTRAP_ITERATIONS,
        });
    }

    let observed = statistic(data)?;
    if !observed.is_finite() {
        return Err(BiasError::computation(format!(
            "statistic evaluated to {} on the original data",
            observed
        )));
    }

    let seed = resolve_seed(config.seed);
    let t = data.time_periods();
    let replicate = |i: usize| {
        let mut rng = replicate_rng(seed, i as u64);
        let indices = bootstrap_indices(&mut rng, t);
        guarded(|| statistic(&data.select_periods(&indices)))
    };

    #[cfg(feature = "parallel")]
    let outcomes: Vec<Option<f64>> = (0..config.n_bootstrap)
        .into_par_iter()
        .map(replicate)
        .collect();

    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<Option<f64>> = (0..config.n_bootstrap).map(replicate).collect();

    let replicates: Vec<f64> = outcomes.into_iter().flatten().collect();
    let n_failed = config.n_bootstrap - replicates.len();
    if replicates.is_empty() {
        return Err(BiasError::AllReplicatesFailed {
            attempted: config.n_bootstrap,
        });
    }

    Ok(summarize(observed, &replicates, config, anchor, n_failed, seed))
}

/// Bootstrap one indicator with its default null anchor.
pub fn bootstrap_indicator(
    indicator: Indicator,
    data: &EvaluationData,
    config: &BootstrapConfig,
    diagnostics: &mut Diagnostics,
) -> Result<BootstrapRecord, BiasError> {
    bootstrap_statistic(
        |d: &EvaluationData| indicator.evaluate(d, &mut Diagnostics::new()),
        data,
        config,
        indicator.default_null_anchor(),
        diagnostics,
    )
}

fn summarize(
    observed: f64,
    replicates: &[f64],
    config: &BootstrapConfig,
    anchor: NullAnchor,
    n_failed: usize,
    seed: u64,
) -> BootstrapRecord {
    let center = mean(replicates);
    let reference = match anchor {
        NullAnchor::BootstrapMean => center,
        NullAnchor::Value(v) => v,
    };
    let observed_deviation = (observed - reference).abs();
    let extreme = replicates
        .iter()
        .filter(|r| (*r - center).abs() >= observed_deviation)
        .count();
    let (ci_lower, ci_upper) = percentile_interval(replicates, config.confidence_level);

    BootstrapRecord {
        point_estimate: observed,
        ci_lower,
        ci_upper,
        p_value: extreme as f64 / replicates.len() as f64,
        std_error: std_dev(replicates),
        n_bootstrap: config.n_bootstrap,
        n_failed,
        seed,
    }
}
