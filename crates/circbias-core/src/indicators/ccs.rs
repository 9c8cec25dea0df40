//! Constraint-Consistency Score.
//!
//! Each constraint column contributes `1 / (1 + cv)` where `cv` is its
//! coefficient of variation; exactly constant columns contribute 1 and
//! varying zero-mean columns contribute 0. CCS is the mean contribution.

use crate::constants::ZERO_MEAN_RELATIVE_TOLERANCE;
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::BiasError;
use crate::statistics::{column, is_constant, mean, std_dev};
use crate::types::Matrix;

use super::Indicator;

/// Contribution of a single constraint column, or `None` for a zero-mean column.
fn column_consistency(values: &[f64]) -> Option<f64> {
    if is_constant(values) {
        return Some(1.0);
    }
    let m = mean(values);
    let scale = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if m.abs() <= ZERO_MEAN_RELATIVE_TOLERANCE * scale {
        return None;
    }
    let cv = std_dev(values) / m.abs();
    Some(1.0 / (1.0 + cv))
}

/// Compute CCS for `constraints` (T, p).
///
/// A single period returns 1 and records a `DegenerateTimeSeries` warning.
pub fn ccs(constraints: &Matrix, diagnostics: &mut Diagnostics) -> Result<f64, BiasError> {
    let (t, p) = constraints.shape();
    if p == 0 {
        return Err(BiasError::shape("constraints", "CCS needs at least one constraint"));
    }
    if t < 2 {
        diagnostics.push(Warning::DegenerateTimeSeries {
            indicator: Indicator::Ccs,
            time_periods: t,
        });
        return Ok(1.0);
    }

    let mut total = 0.0;
    for j in 0..p {
        match column_consistency(&column(constraints, j)) {
            Some(score) => total += score,
            None => diagnostics.push(Warning::ZeroMeanConstraint { column: j }),
        }
    }
    let value = total / p as f64;

    if !value.is_finite() {
        return Err(BiasError::computation(format!("CCS evaluated to {}", value)));
    }
    Ok(value)
}
