//! Type aliases and input containers.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::BiasError;

/// Dense real matrix. Rows are evaluation periods.
pub type Matrix = DMatrix<f64>;

/// Build a matrix from row-oriented data.
///
/// Fails with [`BiasError::Shape`] when there are no rows, no columns, or the
/// rows have differing lengths.
pub fn matrix_from_rows(name: &str, rows: &[Vec<f64>]) -> Result<Matrix, BiasError> {
    let Some(first) = rows.first() else {
        return Err(BiasError::shape(name, "expected at least one row"));
    };
    let ncols = first.len();
    if ncols == 0 {
        return Err(BiasError::shape(name, "expected at least one column"));
    }
    if let Some((row, bad)) = rows.iter().enumerate().find(|(_, r)| r.len() != ncols) {
        return Err(BiasError::shape(
            name,
            format!(
                "ragged rows: row 0 has {} columns, row {} has {}",
                ncols,
                row,
                bad.len()
            ),
        ));
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(Matrix::from_row_slice(rows.len(), ncols, &flat))
}

/// Per-period, per-algorithm hyperparameter tensor of shape (T, K, q).
///
/// Stored row-major: entry `(t, k, j)` lives at `(t * K + k) * q + j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamTensor {
    periods: usize,
    algorithms: usize,
    params: usize,
    data: Vec<f64>,
}

impl ParamTensor {
    /// Create a tensor from row-major data.
    pub fn new(
        periods: usize,
        algorithms: usize,
        params: usize,
        data: Vec<f64>,
    ) -> Result<Self, BiasError> {
        if periods == 0 || algorithms == 0 || params == 0 {
            return Err(BiasError::shape(
                "params",
                format!(
                    "every axis must be non-empty, got ({}, {}, {})",
                    periods, algorithms, params
                ),
            ));
        }
        let expected = periods
            .checked_mul(algorithms)
            .and_then(|n| n.checked_mul(params))
            .ok_or_else(|| BiasError::shape("params", "tensor size overflows usize"))?;
        if data.len() != expected {
            return Err(BiasError::shape(
                "params",
                format!(
                    "({}, {}, {}) needs {} values, got {}",
                    periods,
                    algorithms,
                    params,
                    expected,
                    data.len()
                ),
            ));
        }
        Ok(Self {
            periods,
            algorithms,
            params,
            data,
        })
    }

    /// Build a tensor from nested `[t][k][j]` vectors.
    pub fn from_nested(values: &[Vec<Vec<f64>>]) -> Result<Self, BiasError> {
        let periods = values.len();
        let algorithms = values.first().map_or(0, Vec::len);
        let params = values
            .first()
            .and_then(|row| row.first())
            .map_or(0, Vec::len);

        let mut data = Vec::with_capacity(periods * algorithms * params);
        for (t, row) in values.iter().enumerate() {
            if row.len() != algorithms {
                return Err(BiasError::shape(
                    "params",
                    format!("period {} has {} algorithms, expected {}", t, row.len(), algorithms),
                ));
            }
            for (k, cell) in row.iter().enumerate() {
                if cell.len() != params {
                    return Err(BiasError::shape(
                        "params",
                        format!(
                            "cell ({}, {}) has {} parameters, expected {}",
                            t,
                            k,
                            cell.len(),
                            params
                        ),
                    ));
                }
                data.extend_from_slice(cell);
            }
        }
        Self::new(periods, algorithms, params, data)
    }

    /// Shape as (T, K, q).
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.periods, self.algorithms, self.params)
    }

    /// Entry at `(t, k, j)`.
    #[inline]
    pub fn get(&self, t: usize, k: usize, j: usize) -> f64 {
        self.data[(t * self.algorithms + k) * self.params + j]
    }

    /// Parameter vector at `(t, k)`.
    #[inline]
    pub fn cell(&self, t: usize, k: usize) -> &[f64] {
        let start = (t * self.algorithms + k) * self.params;
        &self.data[start..start + self.params]
    }

    /// Scalar proxy at `(t, k)`: the mean over the parameter axis.
    pub fn proxy(&self, t: usize, k: usize) -> f64 {
        let cell = self.cell(t, k);
        cell.iter().sum::<f64>() / cell.len() as f64
    }

    /// (T, K) matrix of per-cell proxies.
    pub fn proxy_matrix(&self) -> Matrix {
        Matrix::from_fn(self.periods, self.algorithms, |t, k| self.proxy(t, k))
    }

    /// Raw row-major values.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// New tensor whose period axis is `indices` applied to this one.
    pub fn select_periods(&self, indices: &[usize]) -> Self {
        let stride = self.algorithms * self.params;
        let mut data = Vec::with_capacity(indices.len() * stride);
        for &t in indices {
            data.extend_from_slice(&self.data[t * stride..(t + 1) * stride]);
        }
        Self {
            periods: indices.len(),
            algorithms: self.algorithms,
            params: self.params,
            data,
        }
    }
}

/// Owned bundle of the arrays one detection call works on.
///
/// Resampling engines apply a single index vector to the time axis of every
/// array at once, which keeps the joint (P, C, Θ) structure intact.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationData {
    /// Performance matrix P, shape (T, K).
    pub performance: Matrix,
    /// Constraint matrix C, shape (T, p).
    pub constraints: Matrix,
    /// Optional parameter tensor Θ, shape (T, K, q).
    pub params: Option<ParamTensor>,
}

impl EvaluationData {
    /// Bundle P and C without parameters.
    pub fn new(performance: Matrix, constraints: Matrix) -> Self {
        Self {
            performance,
            constraints,
            params: None,
        }
    }

    /// Attach a parameter tensor.
    pub fn with_params(mut self, params: ParamTensor) -> Self {
        self.params = Some(params);
        self
    }

    /// Number of periods T.
    pub fn time_periods(&self) -> usize {
        self.performance.nrows()
    }

    /// Number of algorithms K.
    pub fn num_algorithms(&self) -> usize {
        self.performance.ncols()
    }

    /// Number of constraints p.
    pub fn num_constraints(&self) -> usize {
        self.constraints.ncols()
    }

    /// New bundle with `indices` applied to the time axis of every array.
    pub fn select_periods(&self, indices: &[usize]) -> Self {
        Self {
            performance: self.performance.select_rows(indices.iter()),
            constraints: self.constraints.select_rows(indices.iter()),
            params: self.params.as_ref().map(|p| p.select_periods(indices)),
        }
    }
}
