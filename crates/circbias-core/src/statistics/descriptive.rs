//! Descriptive statistics over slices and matrix columns.
//!
//! Variances and standard deviations are population moments (divisor n),
//! matching the conventions the indicator definitions are stated in.

use crate::types::Matrix;

/// Arithmetic mean. Returns NaN for an empty slice.
#[inline]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (divisor n). Returns NaN for an empty slice.
pub fn variance(values: &[f64]) -> f64 {
    let m = mean(values);
    if !m.is_finite() {
        return f64::NAN;
    }
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divisor n).
#[inline]
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Pearson correlation of two equally long series.
///
/// Returns NaN when either side is constant or the lengths differ;
/// callers decide how to map that. Constant series are detected exactly,
/// before any rounding in the mean can fake a tiny variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.is_empty() || is_constant(x) || is_constant(y) {
        return f64::NAN;
    }
    let mx = mean(x);
    let my = mean(y);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    (sxy / denom).clamp(-1.0, 1.0)
}

/// Column `j` of `m` copied into a vector.
#[inline]
pub fn column(m: &Matrix, j: usize) -> Vec<f64> {
    m.column(j).iter().copied().collect()
}

/// Mean of each row of `m`.
pub fn row_means(m: &Matrix) -> Vec<f64> {
    let ncols = m.ncols() as f64;
    m.row_iter().map(|row| row.sum() / ncols).collect()
}

/// True when every entry of the slice equals the first one exactly.
#[inline]
pub fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::matrix_from_rows;

    #[test]
    fn test_mean_and_population_variance() {
        let x = [100.0, 200.0, 300.0, 400.0];
        assert_eq!(mean(&x), 250.0);
        assert_eq!(variance(&x), 12_500.0);
        assert!((std_dev(&x) - 111.803_398_874_989_48).abs() < 1e-9);
    }

    #[test]
    fn test_empty_is_nan() {
        assert!(mean(&[]).is_nan());
        assert!(variance(&[]).is_nan());
    }

    #[test]
    fn test_pearson_perfect_and_degenerate() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        let neg = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &neg) + 1.0).abs() < 1e-12);
        assert!(pearson(&x, &[1.0, 1.0, 1.0, 1.0]).is_nan());
        assert!(pearson(&x, &[1.0]).is_nan());
    }

    #[test]
    fn test_row_means_and_column() {
        let m = matrix_from_rows("m", &[vec![1.0, 3.0], vec![2.0, 6.0]]).unwrap();
        assert_eq!(row_means(&m), vec![2.0, 4.0]);
        assert_eq!(column(&m, 1), vec![3.0, 6.0]);
    }

    #[test]
    fn test_is_constant() {
        assert!(is_constant(&[0.7, 0.7, 0.7]));
        assert!(is_constant(&[1.0]));
        assert!(!is_constant(&[0.7, 0.7000001]));
    }
}
