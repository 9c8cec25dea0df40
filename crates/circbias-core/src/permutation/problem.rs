//! Null problems: what gets permuted and what gets measured.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::error::BiasError;
use crate::statistics::{gather, permutation, stratified_permutation};
use crate::types::Matrix;
use crate::validation::{check_finite_slice, validate_inputs, validate_labels, SampleLimits};

use super::metric::{fit_predict, LabelMetric, MatrixMetric, ModelFactory};

/// How the null distribution is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullMode {
    /// Permute the time axis of the performance matrix.
    Shuffle,
    /// Permute labels, refit a fresh model and re-predict.
    Retrain,
    /// Permute labels against the original predictions.
    LabelShuffleFast,
}

/// Direction of the permutation p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alternative {
    /// Distance from the replicate mean, in either direction.
    TwoSided,
    /// Replicates at least as large as the observed value.
    Greater,
    /// Replicates at most as large as the observed value.
    Less,
}

/// A permutation problem: the metric, the data it reads, and the null mode.
#[derive(Clone, Copy)]
pub enum NullProblem<'a> {
    /// Permute the rows of `performance`; `constraints` keeps its order.
    Shuffle {
        /// Statistic of (performance, constraints).
        metric: &'a dyn MatrixMetric,
        /// Performance matrix (T, K).
        performance: &'a Matrix,
        /// Constraint matrix (T, p).
        constraints: &'a Matrix,
    },
    /// Permute `y_true` against fixed `y_pred`.
    LabelShuffleFast {
        /// Statistic of (y_true, y_pred).
        metric: &'a dyn LabelMetric,
        /// Ground-truth labels.
        y_true: &'a [f64],
        /// Predictions.
        y_pred: &'a [f64],
        /// Optional strata; labels only move within their group.
        groups: Option<&'a [usize]>,
    },
    /// Permute `labels`, refit a fresh model on `features`, re-predict.
    Retrain {
        /// Statistic of (labels, predictions).
        metric: &'a dyn LabelMetric,
        /// Produces untrained models.
        factory: &'a dyn ModelFactory,
        /// Feature rows, one per label.
        features: &'a Matrix,
        /// Targets.
        labels: &'a [f64],
        /// Optional strata; labels only move within their group.
        groups: Option<&'a [usize]>,
    },
}

impl<'a> NullProblem<'a> {
    /// Time-shuffle problem over (performance, constraints).
    pub fn shuffle(
        metric: &'a dyn MatrixMetric,
        performance: &'a Matrix,
        constraints: &'a Matrix,
    ) -> Self {
        NullProblem::Shuffle {
            metric,
            performance,
            constraints,
        }
    }

    /// Label shuffle against fixed predictions.
    pub fn label_shuffle_fast(
        metric: &'a dyn LabelMetric,
        y_true: &'a [f64],
        y_pred: &'a [f64],
    ) -> Self {
        NullProblem::LabelShuffleFast {
            metric,
            y_true,
            y_pred,
            groups: None,
        }
    }

    /// Label shuffle with a model refit per replicate.
    pub fn retrain(
        metric: &'a dyn LabelMetric,
        factory: &'a dyn ModelFactory,
        features: &'a Matrix,
        labels: &'a [f64],
    ) -> Self {
        NullProblem::Retrain {
            metric,
            factory,
            features,
            labels,
            groups: None,
        }
    }

    /// Restrict label permutations to within `strata`. No effect in shuffle mode.
    pub fn with_groups(self, strata: &'a [usize]) -> Self {
        match self {
            NullProblem::LabelShuffleFast {
                metric,
                y_true,
                y_pred,
                ..
            } => NullProblem::LabelShuffleFast {
                metric,
                y_true,
                y_pred,
                groups: Some(strata),
            },
            NullProblem::Retrain {
                metric,
                factory,
                features,
                labels,
                ..
            } => NullProblem::Retrain {
                metric,
                factory,
                features,
                labels,
                groups: Some(strata),
            },
            shuffle @ NullProblem::Shuffle { .. } => shuffle,
        }
    }

    /// Null mode of this problem.
    pub fn mode(&self) -> NullMode {
        match self {
            NullProblem::Shuffle { .. } => NullMode::Shuffle,
            NullProblem::LabelShuffleFast { .. } => NullMode::LabelShuffleFast,
            NullProblem::Retrain { .. } => NullMode::Retrain,
        }
    }

    /// Default p-value direction: two-sided for shuffle, greater for label modes.
    pub fn default_alternative(&self) -> Alternative {
        match self {
            NullProblem::Shuffle { .. } => Alternative::TwoSided,
            NullProblem::LabelShuffleFast { .. } | NullProblem::Retrain { .. } => {
                Alternative::Greater
            }
        }
    }

    /// Check shapes and finiteness of the problem's inputs.
    pub fn validate(&self) -> Result<(), BiasError> {
        match *self {
            NullProblem::Shuffle {
                performance,
                constraints,
                ..
            } => validate_inputs(performance, constraints, None, &SampleLimits::default()),
            NullProblem::LabelShuffleFast {
                y_true,
                y_pred,
                groups,
                ..
            } => validate_labels(y_true, y_pred, groups),
            NullProblem::Retrain {
                features,
                labels,
                groups,
                ..
            } => {
                if labels.is_empty() {
                    return Err(BiasError::shape("labels", "expected at least one label"));
                }
                if features.nrows() != labels.len() {
                    return Err(BiasError::mismatch(
                        "features",
                        "rows",
                        labels.len(),
                        features.nrows(),
                    ));
                }
                if let Some(groups) = groups {
                    if groups.len() != labels.len() {
                        return Err(BiasError::mismatch(
                            "groups",
                            "length",
                            labels.len(),
                            groups.len(),
                        ));
                    }
                }
                check_finite_slice("labels", labels)?;
                check_finite_slice("features", features.as_slice())
            }
        }
    }

    /// Statistic on the unpermuted data.
    pub fn observed(&self) -> Result<f64, BiasError> {
        match *self {
            NullProblem::Shuffle {
                metric,
                performance,
                constraints,
            } => metric.compute(performance, constraints),
            NullProblem::LabelShuffleFast {
                metric,
                y_true,
                y_pred,
                ..
            } => metric.compute(y_true, y_pred),
            NullProblem::Retrain {
                metric,
                factory,
                features,
                labels,
                ..
            } => {
                let predictions = fit_predict(factory, features, labels)?;
                metric.compute(labels, &predictions)
            }
        }
    }

    /// Statistic on one permuted replicate, drawn from `child_seed`.
    pub fn replicate(&self, child_seed: u64) -> Result<f64, BiasError> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(child_seed);
        match *self {
            NullProblem::Shuffle {
                metric,
                performance,
                constraints,
            } => {
                let order = permutation(&mut rng, performance.nrows());
                let shuffled = performance.select_rows(order.iter());
                metric.compute(&shuffled, constraints)
            }
            NullProblem::LabelShuffleFast {
                metric,
                y_true,
                y_pred,
                groups,
            } => {
                let order = label_order(&mut rng, y_true.len(), groups);
                metric.compute(&gather(y_true, &order), y_pred)
            }
            NullProblem::Retrain {
                metric,
                factory,
                features,
                labels,
                groups,
            } => {
                let order = label_order(&mut rng, labels.len(), groups);
                let shuffled = gather(labels, &order);
                let predictions = fit_predict(factory, features, &shuffled)?;
                metric.compute(&shuffled, &predictions)
            }
        }
    }
}

impl std::fmt::Debug for NullProblem<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NullProblem")
            .field("mode", &self.mode())
            .finish_non_exhaustive()
    }
}

fn label_order(rng: &mut Xoshiro256PlusPlus, n: usize, groups: Option<&[usize]>) -> Vec<usize> {
    match groups {
        Some(strata) => stratified_permutation(rng, strata),
        None => permutation(rng, n),
    }
}
