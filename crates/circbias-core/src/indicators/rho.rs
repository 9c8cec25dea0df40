//! Performance-Constraint Correlation.
//!
//! Pearson correlation between the per-period mean performance and a
//! variance-weighted per-period constraint summary. Columns that never move
//! get no weight; when nothing moves the summary falls back to the plain
//! row mean.

use crate::constants::{MIN_PERIODS_FOR_CORRELATION, STATIC_CONSTRAINT_VARIANCE};
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::BiasError;
use crate::statistics::{column, pearson, row_means, variance};
use crate::types::Matrix;

/// Variance-weighted constraint summary c̄ₜ.
///
/// Returns the summary and whether the unweighted fallback was taken.
pub fn weighted_constraint_summary(constraints: &Matrix) -> (Vec<f64>, Option<f64>) {
    let weights: Vec<f64> = (0..constraints.ncols())
        .map(|j| variance(&column(constraints, j)))
        .collect();
    let total: f64 = weights.iter().sum();

    if !(total >= STATIC_CONSTRAINT_VARIANCE) {
        return (row_means(constraints), Some(total));
    }

    let summary = constraints
        .row_iter()
        .map(|row| {
            row.iter()
                .zip(&weights)
                .map(|(c, w)| c * (w / total))
                .sum::<f64>()
        })
        .collect();
    (summary, None)
}

/// Compute ρ_PC for `performance` (T, K) and `constraints` (T, p).
///
/// Fewer than three periods returns 0 with an `InsufficientPeriodsForCorrelation`
/// warning. Zero variance on either side returns 0.
pub fn rho_pc(
    performance: &Matrix,
    constraints: &Matrix,
    diagnostics: &mut Diagnostics,
) -> Result<f64, BiasError> {
    let t = performance.nrows();
    if constraints.nrows() != t {
        return Err(BiasError::mismatch("constraints", "rows", t, constraints.nrows()));
    }
    if performance.ncols() == 0 || constraints.ncols() == 0 {
        return Err(BiasError::shape(
            "performance",
            "rho_pc needs at least one algorithm and one constraint",
        ));
    }
    if t < MIN_PERIODS_FOR_CORRELATION {
        diagnostics.push(Warning::InsufficientPeriodsForCorrelation { time_periods: t });
        return Ok(0.0);
    }

    let perf = row_means(performance);
    let (summary, fallback) = weighted_constraint_summary(constraints);
    if let Some(total_variance) = fallback {
        diagnostics.push(Warning::StaticConstraints { total_variance });
    }

    if perf.iter().chain(&summary).any(|v| !v.is_finite()) {
        return Err(BiasError::computation("rho_pc inputs overflowed"));
    }

    let r = pearson(&perf, &summary);
    Ok(if r.is_nan() { 0.0 } else { r })
}
