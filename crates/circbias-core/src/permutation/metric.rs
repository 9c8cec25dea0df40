//! Metric and model interfaces for the permutation engine.
//!
//! Two metric shapes exist, matching the two families of null problems:
//! [`MatrixMetric`] for (performance, constraints) pairs and [`LabelMetric`]
//! for (y_true, y_pred) pairs. Plain closures implement both, so ad-hoc
//! statistics need no wrapper type:
//!
//! ```ignore
//! let mean_gap = |p: &Matrix, c: &Matrix| p.mean() - c.mean();
//! let accuracy = |y: &[f64], yhat: &[f64]| { /* ... */ 0.0 };
//! ```

use crate::error::BiasError;
use crate::types::Matrix;

/// Statistic of a (performance, constraints) pair.
pub trait MatrixMetric: Sync {
    /// Evaluate the statistic. Non-finite values count as failed replicates.
    fn compute(&self, performance: &Matrix, constraints: &Matrix) -> Result<f64, BiasError>;
}

impl<F> MatrixMetric for F
where
    F: Fn(&Matrix, &Matrix) -> f64 + Sync,
{
    fn compute(&self, performance: &Matrix, constraints: &Matrix) -> Result<f64, BiasError> {
        Ok(self(performance, constraints))
    }
}

/// Statistic of a (y_true, y_pred) pair.
pub trait LabelMetric: Sync {
    /// Evaluate the statistic. Non-finite values count as failed replicates.
    fn compute(&self, y_true: &[f64], y_pred: &[f64]) -> Result<f64, BiasError>;
}

impl<F> LabelMetric for F
where
    F: Fn(&[f64], &[f64]) -> f64 + Sync,
{
    fn compute(&self, y_true: &[f64], y_pred: &[f64]) -> Result<f64, BiasError> {
        Ok(self(y_true, y_pred))
    }
}

/// A model refitted on every retrain-mode replicate.
pub trait Model {
    /// Fit on feature rows `features` and targets `labels`.
    fn fit(&mut self, features: &Matrix, labels: &[f64]) -> Result<(), BiasError>;

    /// Predict one value per feature row.
    fn predict(&self, features: &Matrix) -> Result<Vec<f64>, BiasError>;
}

/// Produces fresh, untrained models.
///
/// Each replicate builds its own model inside the worker that runs it, so
/// models themselves never cross threads.
pub trait ModelFactory: Sync {
    /// Create an untrained model.
    fn create(&self) -> Box<dyn Model>;
}

impl<F, M> ModelFactory for F
where
    F: Fn() -> M + Sync,
    M: Model + 'static,
{
    fn create(&self) -> Box<dyn Model> {
        Box::new(self())
    }
}

/// Fit a fresh model and predict on the same rows.
pub(crate) fn fit_predict(
    factory: &dyn ModelFactory,
    features: &Matrix,
    labels: &[f64],
) -> Result<Vec<f64>, BiasError> {
    let mut model = factory.create();
    model.fit(features, labels)?;
    let predictions = model.predict(features)?;
    if predictions.len() != labels.len() {
        return Err(BiasError::mismatch(
            "predictions",
            "length",
            labels.len(),
            predictions.len(),
        ));
    }
    Ok(predictions)
}
