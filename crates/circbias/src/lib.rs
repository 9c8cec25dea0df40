//! # circbias
//!
//! Detect circular reasoning bias in longitudinal evaluation logs.
//!
//! When an evaluation protocol and the systems it measures co-evolve (budgets
//! grow, datasets change, hyperparameters are retuned against the benchmark),
//! reported performance can rise for reasons unrelated to the systems
//! themselves. This crate scores a log of K algorithms over T periods with
//! three indicators and reports bias when at least two of them fire:
//! - **PSI**: how much the algorithms' parameters move between periods
//! - **CCS**: how consistent the evaluation constraints stay over time
//! - **ρ_PC**: how strongly mean performance tracks the constraints
//!
//! Optional paths add bootstrap confidence intervals and thresholds derived
//! from shuffle-mode null distributions.
//!
//! ## Quick Start
//!
//! ```ignore
//! use circbias::{BiasDetector, DetectOptions, DetectionConfig};
//! use circbias::data::load_evaluation_csv;
//! use std::path::Path;
//!
//! let table = load_evaluation_csv(Path::new("evaluations.csv"))?;
//! let detector = BiasDetector::new(DetectionConfig::default())?;
//! let result = detector.detect_table(&table, &DetectOptions::new().enable_bootstrap().seed(42))?;
//!
//! println!("{}", circbias::output::to_json_pretty(&result)?);
//! ```
//!
//! ## Logging
//!
//! Pipeline steps are reported through `tracing`: `debug` for each step,
//! `warn` for each diagnostic, `info` for the verdict. Install any subscriber
//! to see them.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
mod detector;
mod result;

// Functional modules
pub mod data;
pub mod output;

// Re-exports for public API
pub use config::{
    current_config, reset_config, set_config, update_config, ConfigOption, DetectionConfig,
};
pub use detector::{BiasDetector, DetectOptions};
pub use result::{AdaptiveFields, BootstrapFields, DetectionResult, PsiProxy, ResultMetadata};

// Re-export the statistical core for direct use
pub use circbias_core::{
    adaptive_thresholds, bootstrap_indicator, bootstrap_statistic, decide, matrix_from_rows,
    permutation_test, validate, AbsIndicator, AdaptiveStopping, AdaptiveThresholdConfig,
    Alternative, Backend, BiasError, BootstrapConfig, BootstrapRecord, Decision, Diagnostics,
    ErrorKind, ErrorRecord, EvaluationData, Indicator, IndicatorScores, LabelMetric, Matrix,
    MatrixMetric, Model, ModelFactory, NullMode, NullProblem, Parallelism, ParamTensor,
    PermutationConfig, PermutationResult, SampleLimits, Thresholds, Warning, WarningSeverity,
};
