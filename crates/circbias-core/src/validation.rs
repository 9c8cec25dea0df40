//! Input validation for performance, constraint and parameter arrays.
//!
//! Checks run in a fixed order and stop at the first failure:
//! 1. P: at least `min_time_periods` rows, at least `min_algorithms` columns, all finite.
//! 2. C: same row count as P, at least `min_constraints` columns, all finite.
//! 3. Θ (optional): first two axes equal to P's shape, all finite.
//!
//! No coercion happens here; the tabular conversion layer feeds only
//! fully-formed arrays.

use serde::{Deserialize, Serialize};

use crate::constants::{MIN_ALGORITHMS, MIN_CONSTRAINTS, MIN_TIME_PERIODS};
use crate::error::BiasError;
use crate::types::{EvaluationData, Matrix, ParamTensor};

/// Minimum sample sizes enforced by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleLimits {
    /// Minimum number of periods T.
    pub min_time_periods: usize,
    /// Minimum number of algorithms K.
    pub min_algorithms: usize,
    /// Minimum number of constraints p.
    pub min_constraints: usize,
}

impl Default for SampleLimits {
    fn default() -> Self {
        Self {
            min_time_periods: MIN_TIME_PERIODS,
            min_algorithms: MIN_ALGORITHMS,
            min_constraints: MIN_CONSTRAINTS,
        }
    }
}

impl SampleLimits {
    /// Reject limits below the hard floors (T ≥ 2, K ≥ 1, p ≥ 1).
    pub fn validate(&self) -> Result<(), BiasError> {
        if self.min_time_periods < MIN_TIME_PERIODS {
            return Err(BiasError::configuration(
                "min_time_periods",
                format!("must be >= {}, got {}", MIN_TIME_PERIODS, self.min_time_periods),
            ));
        }
        if self.min_algorithms < MIN_ALGORITHMS {
            return Err(BiasError::configuration(
                "min_algorithms",
                format!("must be >= {}, got {}", MIN_ALGORITHMS, self.min_algorithms),
            ));
        }
        if self.min_constraints < MIN_CONSTRAINTS {
            return Err(BiasError::configuration(
                "min_constraints",
                format!("must be >= {}, got {}", MIN_CONSTRAINTS, self.min_constraints),
            ));
        }
        Ok(())
    }
}

/// Validate a bundle of inputs.
pub fn validate(data: &EvaluationData, limits: &SampleLimits) -> Result<(), BiasError> {
    validate_inputs(
        &data.performance,
        &data.constraints,
        data.params.as_ref(),
        limits,
    )
}

/// Validate P, C and optional Θ against each other and against `limits`.
pub fn validate_inputs(
    performance: &Matrix,
    constraints: &Matrix,
    params: Option<&ParamTensor>,
    limits: &SampleLimits,
) -> Result<(), BiasError> {
    let (t, k) = performance.shape();
    if k < limits.min_algorithms {
        return Err(BiasError::shape(
            "performance",
            format!("expected at least {} algorithm column(s), got {}", limits.min_algorithms, k),
        ));
    }
    if t < limits.min_time_periods {
        return Err(BiasError::InsufficientData {
            name: "performance".into(),
            required: limits.min_time_periods,
            actual: t,
        });
    }
    check_finite_matrix("performance", performance)?;

    if constraints.nrows() != t {
        return Err(BiasError::mismatch("constraints", "rows", t, constraints.nrows()));
    }
    if constraints.ncols() < limits.min_constraints {
        return Err(BiasError::shape(
            "constraints",
            format!(
                "expected at least {} constraint column(s), got {}",
                limits.min_constraints,
                constraints.ncols()
            ),
        ));
    }
    check_finite_matrix("constraints", constraints)?;

    if let Some(theta) = params {
        let (tp, kp, _) = theta.shape();
        if tp != t {
            return Err(BiasError::mismatch("params", "periods", t, tp));
        }
        if kp != k {
            return Err(BiasError::mismatch("params", "algorithms", k, kp));
        }
        check_finite_params(theta)?;
    }

    Ok(())
}

/// Validate a pair of label vectors (and optional group vector) for label-based tests.
pub fn validate_labels(
    y_true: &[f64],
    y_pred: &[f64],
    groups: Option<&[usize]>,
) -> Result<(), BiasError> {
    if y_true.is_empty() {
        return Err(BiasError::shape("y_true", "expected at least one label"));
    }
    if y_pred.len() != y_true.len() {
        return Err(BiasError::mismatch("y_pred", "length", y_true.len(), y_pred.len()));
    }
    if let Some(groups) = groups {
        if groups.len() != y_true.len() {
            return Err(BiasError::mismatch("groups", "length", y_true.len(), groups.len()));
        }
    }
    check_finite_slice("y_true", y_true)?;
    check_finite_slice("y_pred", y_pred)
}

fn check_finite_matrix(name: &str, m: &Matrix) -> Result<(), BiasError> {
    for t in 0..m.nrows() {
        for j in 0..m.ncols() {
            if !m[(t, j)].is_finite() {
                return Err(BiasError::NonFinite {
                    name: name.into(),
                    location: format!("row {}, column {}", t, j),
                });
            }
        }
    }
    Ok(())
}

fn check_finite_params(theta: &ParamTensor) -> Result<(), BiasError> {
    let (_, k, q) = theta.shape();
    match theta.as_slice().iter().position(|v| !v.is_finite()) {
        None => Ok(()),
        Some(flat) => Err(BiasError::NonFinite {
            name: "params".into(),
            location: format!(
                "period {}, algorithm {}, parameter {}",
                flat / (k * q),
                (flat / q) % k,
                flat % q
            ),
        }),
    }
}

pub(crate) fn check_finite_slice(name: &str, values: &[f64]) -> Result<(), BiasError> {
    match values.iter().position(|v| !v.is_finite()) {
        None => Ok(()),
        Some(i) => Err(BiasError::NonFinite {
            name: name.into(),
            location: format!("index {}", i),
        }),
    }
}
