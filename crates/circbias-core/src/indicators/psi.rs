//! Parameter-Stability Index.
//!
//! PSI = mean over algorithms of the mean absolute change of a parameter
//! proxy between consecutive periods. The proxy is the mean of Θ over its
//! parameter axis when Θ is supplied, otherwise the performance score itself.

use crate::diagnostics::{Diagnostics, Warning};
use crate::error::BiasError;
use crate::types::{Matrix, ParamTensor};

use super::Indicator;

/// Compute PSI for `performance` (T, K), optionally overriding the proxy with `params`.
///
/// A single period returns 0 and records a `DegenerateTimeSeries` warning.
pub fn psi(
    performance: &Matrix,
    params: Option<&ParamTensor>,
    diagnostics: &mut Diagnostics,
) -> Result<f64, BiasError> {
    let (t, k) = performance.shape();
    if k == 0 {
        return Err(BiasError::shape("performance", "PSI needs at least one algorithm"));
    }
    if let Some(theta) = params {
        let (tp, kp, _) = theta.shape();
        if tp != t {
            return Err(BiasError::mismatch("params", "periods", t, tp));
        }
        if kp != k {
            return Err(BiasError::mismatch("params", "algorithms", k, kp));
        }
    }
    if t < 2 {
        diagnostics.push(Warning::DegenerateTimeSeries {
            indicator: Indicator::Psi,
            time_periods: t,
        });
        return Ok(0.0);
    }

    let proxy = |period: usize, algo: usize| match params {
        Some(theta) => theta.proxy(period, algo),
        None => performance[(period, algo)],
    };

    let mut total = 0.0;
    for algo in 0..k {
        let mut drift = 0.0;
        for period in 1..t {
            drift += (proxy(period, algo) - proxy(period - 1, algo)).abs();
        }
        total += drift / (t - 1) as f64;
    }
    let value = total / k as f64;

    if !value.is_finite() {
        return Err(BiasError::computation(format!("PSI evaluated to {}", value)));
    }
    Ok(value)
}
