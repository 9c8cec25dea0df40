//! Statistical core for circular-reasoning-bias detection.
//!
//! Given a longitudinal evaluation log (performance of K algorithms over T
//! periods plus the evaluation constraints active in each period), this crate
//! computes three indicators and combines them into a verdict:
//!
//! - **PSI** (Parameter-Stability Index): mean absolute change of a parameter
//!   proxy between consecutive periods
//! - **CCS** (Constraint-Consistency Score): mean of `1 / (1 + cv)` over constraints
//! - **ρ_PC** (Performance-Constraint Correlation): Pearson correlation between
//!   mean performance and a variance-weighted constraint summary
//!
//! Around the kernel sit a 2-of-3 majority-vote rule, a time-axis bootstrap,
//! a generic permutation engine (shuffle, label-shuffle and retrain nulls with
//! pluggable executors), and an adaptive-threshold builder on top of it.
//!
//! # Features
//!
//! - `parallel` (default): rayon thread-pool executor and parallel bootstrap
//!
//! # Usage
//!
//! This crate is typically used through the `circbias` crate, which adds the
//! detector façade, configuration, tabular loading and JSON output.
//!
//! ```ignore
//! use circbias_core::{
//!     decision::{decide, Thresholds},
//!     diagnostics::Diagnostics,
//!     indicators::IndicatorScores,
//!     types::{matrix_from_rows, EvaluationData},
//! };
//!
//! let data = EvaluationData::new(performance, constraints);
//! let mut diagnostics = Diagnostics::new();
//! let scores = IndicatorScores::compute(&data, &mut diagnostics)?;
//! let decision = decide(&scores, &Thresholds::default());
//! ```

pub mod adaptive;
pub mod bootstrap;
pub mod constants;
pub mod decision;
pub mod diagnostics;
pub mod error;
pub mod indicators;
pub mod permutation;
pub mod statistics;
pub mod types;
pub mod validation;

// Re-export commonly used items at crate root
pub use adaptive::{adaptive_thresholds, AdaptiveThresholdConfig, AdaptiveThresholds};
pub use bootstrap::{
    bootstrap_indicator, bootstrap_statistic, BootstrapConfig, BootstrapRecord, NullAnchor,
};
pub use decision::{decide, Decision, Thresholds};
pub use diagnostics::{Diagnostics, Warning, WarningSeverity};
pub use error::{BiasError, ErrorKind, ErrorRecord};
pub use indicators::{AbsIndicator, Indicator, IndicatorScores};
pub use permutation::{
    permutation_test, AdaptiveStopping, Alternative, Backend, LabelMetric, MatrixMetric, Model,
    ModelFactory, NullMode, NullProblem, Parallelism, PermutationConfig, PermutationResult,
};
pub use types::{matrix_from_rows, EvaluationData, Matrix, ParamTensor};
pub use validation::{validate, validate_inputs, validate_labels, SampleLimits};
