//! Adaptive early stopping for permutation tests.
//!
//! Replicates run in batches. After each batch, once at least
//! `min_permutations` replicates have been attempted, the binomial standard
//! error of the running p-value estimate `sqrt(p̂(1 - p̂) / m)` is compared
//! against `precision`; the run stops as soon as it drops below.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PERMUTATION_BATCH;
use crate::error::BiasError;

/// Adaptive stopping rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveStopping {
    /// Replicates per batch.
    pub batch_size: usize,
    /// Replicates attempted before convergence is first checked.
    pub min_permutations: usize,
    /// Target standard error of the p-value estimate.
    pub precision: f64,
}

impl Default for AdaptiveStopping {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_PERMUTATION_BATCH,
            min_permutations: DEFAULT_PERMUTATION_BATCH,
            precision: 0.01,
        }
    }
}

impl AdaptiveStopping {
    /// Stopping rule with the given precision and default batching.
    pub fn with_precision(precision: f64) -> Self {
        Self {
            precision,
            ..Self::default()
        }
    }

    /// Check batch size and precision.
    pub fn validate(&self) -> Result<(), BiasError> {
        if self.batch_size == 0 {
            return Err(BiasError::configuration("batch_size", "must be >= 1"));
        }
        if !(self.precision > 0.0 && self.precision.is_finite()) {
            return Err(BiasError::configuration(
                "precision",
                format!("must be a positive finite number, got {}", self.precision),
            ));
        }
        Ok(())
    }

    /// True once enough replicates ran and the estimate is precise enough.
    pub fn is_converged(&self, attempted: usize, successful: usize, extreme: usize) -> bool {
        if attempted < self.min_permutations || successful == 0 {
            return false;
        }
        p_value_standard_error(extreme, successful) < self.precision
    }
}

/// Binomial standard error of the raw proportion `extreme / m`.
pub fn p_value_standard_error(extreme: usize, m: usize) -> f64 {
    if m == 0 {
        return f64::INFINITY;
    }
    let p = extreme as f64 / m as f64;
    (p * (1.0 - p) / m as f64).sqrt()
}
