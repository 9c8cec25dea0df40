//! Quantile computation with linear interpolation between order statistics.
//!
//! Uses the Hyndman & Fan Type 7 definition (the default of most numeric
//! environments), so percentile intervals match what callers reproduce
//! elsewhere:
//!
//! ```text
//! h = (n - 1) * p
//! q = x[floor(h)] + (h - floor(h)) * (x[ceil(h)] - x[floor(h)])
//! ```
//!
//! # Input Requirements
//!
//! All input data must be finite. The resampling engines drop non-finite
//! replicates before any quantile is taken; in debug builds this is checked.
//!
//! # Reference
//!
//! Hyndman, R. J. & Fan, Y. (1996). "Sample quantiles in statistical packages."
//! The American Statistician 50(4):361–365.

/// Debug assertion that all values in the slice are finite.
#[inline]
fn debug_assert_finite(data: &[f64]) {
    debug_assert!(
        data.iter().all(|x| x.is_finite()),
        "quantile input must be finite (no NaN or infinity)"
    );
}

#[inline]
fn interpolation_point(n: usize, p: f64) -> (usize, usize, f64) {
    let h = (n - 1) as f64 * p;
    let lo = (h.floor() as usize).min(n - 1);
    let hi = (h.ceil() as usize).min(n - 1);
    (lo, hi, h - lo as f64)
}

/// Compute a single quantile from a mutable slice.
///
/// Uses `select_nth_unstable_by()` for O(n) expected time. The slice is
/// partially reordered as a side effect.
///
/// # Panics
///
/// Panics if `data` is empty or if `p` is outside [0, 1].
pub fn compute_quantile(data: &mut [f64], p: f64) -> f64 {
    assert!(!data.is_empty(), "Cannot compute quantile of empty slice");
    assert!(
        (0.0..=1.0).contains(&p),
        "Quantile probability must be in [0, 1]"
    );
    debug_assert_finite(data);

    let n = data.len();
    if n == 1 {
        return data[0];
    }

    let (lo, hi, frac) = interpolation_point(n, p);
    let cmp = |a: &f64, b: &f64| a.total_cmp(b);

    let (_, &mut lo_val, upper) = data.select_nth_unstable_by(lo, cmp);
    if hi == lo {
        return lo_val;
    }
    // The element at `hi` is the minimum of the partition above `lo`.
    let hi_val = upper.iter().copied().fold(f64::INFINITY, f64::min);
    lo_val + frac * (hi_val - lo_val)
}

/// Compute a quantile from an already sorted slice.
///
/// # Panics
///
/// Panics if `sorted` is empty or if `p` is outside [0, 1].
pub fn compute_quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    assert!(!sorted.is_empty(), "Cannot compute quantile of empty slice");
    assert!(
        (0.0..=1.0).contains(&p),
        "Quantile probability must be in [0, 1]"
    );
    debug_assert!(
        sorted.windows(2).all(|w| w[0] <= w[1]),
        "compute_quantile_sorted requires sorted input"
    );

    let (lo, hi, frac) = interpolation_point(sorted.len(), p);
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// Two-sided percentile interval at `level` (e.g. 0.95 → 2.5% and 97.5%).
///
/// Returns `(lower, upper)`. The input is copied and sorted once.
///
/// # Panics
///
/// Panics if `data` is empty or `level` is outside (0, 1).
pub fn percentile_interval(data: &[f64], level: f64) -> (f64, f64) {
    assert!(
        level > 0.0 && level < 1.0,
        "Interval level must be in (0, 1)"
    );
    let alpha = 1.0 - level;
    let mut sorted = data.to_vec();
    debug_assert_finite(&sorted);
    sorted.sort_by(|a, b| a.total_cmp(b));
    (
        compute_quantile_sorted(&sorted, alpha / 2.0),
        compute_quantile_sorted(&sorted, 1.0 - alpha / 2.0),
    )
}
