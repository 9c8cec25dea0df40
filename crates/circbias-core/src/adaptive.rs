//! Data-driven thresholds from shuffle-mode null distributions.
//!
//! Each indicator is recomputed on `n_simulations` time-shuffled copies of the
//! performance matrix. τ_psi and τ_rho are the upper `quantile` of the PSI and
//! |ρ_PC| nulls; τ_ccs is the lower `1 - quantile` of the CCS null. Under the
//! null of no bias each flag then fires with probability about `1 - quantile`.
//!
//! CCS reads only the constraint matrix, which the shuffle leaves in place, so
//! its null is a point mass at the observed score and τ_ccs equals it.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ADAPTIVE_QUANTILE, DEFAULT_ADAPTIVE_SIMULATIONS};
use crate::decision::Thresholds;
use crate::diagnostics::Diagnostics;
use crate::error::BiasError;
use crate::indicators::{AbsIndicator, Indicator};
use crate::permutation::{
    permutation_test, Alternative, MatrixMetric, NullProblem, Parallelism, PermutationConfig,
    PermutationResult,
};
use crate::statistics::{compute_quantile, resolve_seed};
use crate::types::{EvaluationData, Matrix};

/// Settings for [`adaptive_thresholds`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveThresholdConfig {
    /// Null quantile in (0, 1).
    pub quantile: f64,
    /// Shuffled replicates per indicator.
    pub n_simulations: usize,
    /// Master seed; `None` draws one from OS entropy.
    pub seed: Option<u64>,
    /// Backend for the shuffle runs.
    pub parallelism: Parallelism,
}

impl Default for AdaptiveThresholdConfig {
    fn default() -> Self {
        Self {
            quantile: DEFAULT_ADAPTIVE_QUANTILE,
            n_simulations: DEFAULT_ADAPTIVE_SIMULATIONS,
            seed: None,
            parallelism: Parallelism::default(),
        }
    }
}

impl AdaptiveThresholdConfig {
    /// Check quantile and simulation count.
    pub fn validate(&self) -> Result<(), BiasError> {
        if !(self.quantile > 0.0 && self.quantile < 1.0) {
            return Err(BiasError::configuration(
                "adaptive_quantile",
                format!("must be in (0, 1), got {}", self.quantile),
            ));
        }
        if self.n_simulations == 0 {
            return Err(BiasError::configuration(
                "n_adaptive_simulations",
                "must be >= 1",
            ));
        }
        Ok(())
    }
}

/// Thresholds derived from null distributions, with the runs behind them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveThresholds {
    /// Derived threshold triple.
    pub thresholds: Thresholds,
    /// Quantile used.
    pub quantile: f64,
    /// Replicates requested per indicator.
    pub n_simulations: usize,
    /// Master seed used for all three runs.
    pub seed: u64,
    /// PSI null run (one-sided, greater).
    pub psi_null: PermutationResult,
    /// CCS null run (one-sided, less).
    pub ccs_null: PermutationResult,
    /// |ρ_PC| null run (one-sided, greater).
    pub rho_null: PermutationResult,
}

/// Derive thresholds from shuffle-mode nulls of all three indicators.
///
/// When the bundle carries Θ, the PSI null shuffles the (T, K) proxy matrix so
/// it measures the same quantity as the observed PSI.
pub fn adaptive_thresholds(
    data: &EvaluationData,
    config: &AdaptiveThresholdConfig,
    diagnostics: &mut Diagnostics,
) -> Result<AdaptiveThresholds, BiasError> {
    config.validate()?;
    let seed = resolve_seed(config.seed);
    let base = PermutationConfig {
        n_permutations: config.n_simulations,
        parallelism: config.parallelism,
        seed: Some(seed),
        ..PermutationConfig::default()
    };

    let psi_proxy = data.params.as_ref().map(|theta| theta.proxy_matrix());
    let psi_source = psi_proxy.as_ref().unwrap_or(&data.performance);

    let psi_null = shuffle_null(
        &Indicator::Psi,
        psi_source,
        data,
        base.with_alternative(Alternative::Greater),
        diagnostics,
    )?;
    let ccs_null = shuffle_null(
        &Indicator::Ccs,
        &data.performance,
        data,
        base.with_alternative(Alternative::Less),
        diagnostics,
    )?;
    let rho_null = shuffle_null(
        &AbsIndicator(Indicator::RhoPc),
        &data.performance,
        data,
        base.with_alternative(Alternative::Greater),
        diagnostics,
    )?;

    let q = config.quantile;
    let thresholds = Thresholds {
        psi: compute_quantile(&mut psi_null.replicates.clone(), q),
        ccs: compute_quantile(&mut ccs_null.replicates.clone(), 1.0 - q),
        rho_pc: compute_quantile(&mut rho_null.replicates.clone(), q),
    };

    Ok(AdaptiveThresholds {
        thresholds,
        quantile: q,
        n_simulations: config.n_simulations,
        seed,
        psi_null,
        ccs_null,
        rho_null,
    })
}

/// One shuffle run; backend warnings repeated across runs are recorded once.
fn shuffle_null(
    metric: &dyn MatrixMetric,
    performance: &Matrix,
    data: &EvaluationData,
    config: PermutationConfig,
    diagnostics: &mut Diagnostics,
) -> Result<PermutationResult, BiasError> {
    let problem = NullProblem::shuffle(metric, performance, &data.constraints);
    let mut local = Diagnostics::new();
    let result = permutation_test(&problem, &config, &mut local);
    diagnostics.extend_unique(local);
    result
}
