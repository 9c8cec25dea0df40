//! Structured diagnostics collected during a detection call.
//!
//! Warnings never change results. They are accumulated in a [`Diagnostics`]
//! collector that is handed back alongside the result record, so callers
//! (and tests) can inspect exactly which degenerate paths were taken.

use serde::{Deserialize, Serialize};

use crate::indicators::Indicator;

/// How much a warning should affect trust in the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningSeverity {
    /// Worth knowing, but the result is sound.
    Informational,
    /// The reported value hit a degenerate path and should be read with care.
    ResultUndermining,
}

/// A single diagnostic emitted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Fewer than two periods reached an indicator that needs consecutive pairs.
    ///
    /// **Severity**: ResultUndermining
    DegenerateTimeSeries {
        /// Indicator that returned its degenerate value.
        indicator: Indicator,
        /// Number of periods seen.
        time_periods: usize,
    },

    /// Pearson correlation needs at least three periods; ρ_PC was set to 0.
    ///
    /// **Severity**: ResultUndermining
    InsufficientPeriodsForCorrelation {
        /// Number of periods seen.
        time_periods: usize,
    },

    /// A non-constant constraint column has zero mean; its CV is undefined.
    ///
    /// **Severity**: ResultUndermining
    ZeroMeanConstraint {
        /// Zero-based column index.
        column: usize,
    },

    /// Every constraint column is static; ρ_PC used the unweighted constraint mean.
    ///
    /// **Severity**: Informational
    StaticConstraints {
        /// Sum of per-column variances.
        total_variance: f64,
    },

    /// Fewer bootstrap replicates than recommended; intervals may be wide.
    ///
    /// **Severity**: Informational
    LowReplicateCount {
        /// Replicates requested.
        requested: usize,
        /// Recommended minimum.
        recommended: usize,
    },

    /// A parallel backend was requested but the run fell back to sequential.
    ///
    /// **Severity**: Informational
    BackendUnavailable {
        /// Backend requested.
        requested: String,
        /// Why it could not be used.
        reason: String,
    },

    /// Some replicates raised errors or returned non-finite values and were dropped.
    ///
    /// **Severity**: Informational
    ReplicatesFailed {
        /// Replicates dropped.
        failed: usize,
        /// Replicates attempted.
        attempted: usize,
    },
}

impl Warning {
    /// Get the severity of this warning.
    pub fn severity(&self) -> WarningSeverity {
        match self {
            Warning::DegenerateTimeSeries { .. }
            | Warning::InsufficientPeriodsForCorrelation { .. }
            | Warning::ZeroMeanConstraint { .. } => WarningSeverity::ResultUndermining,
            Warning::StaticConstraints { .. }
            | Warning::LowReplicateCount { .. }
            | Warning::BackendUnavailable { .. }
            | Warning::ReplicatesFailed { .. } => WarningSeverity::Informational,
        }
    }

    /// Get a human-readable description of the warning.
    pub fn description(&self) -> String {
        match self {
            Warning::DegenerateTimeSeries {
                indicator,
                time_periods,
            } => format!(
                "{} computed on {} period(s); returned its degenerate value",
                indicator.name(),
                time_periods
            ),
            Warning::InsufficientPeriodsForCorrelation { time_periods } => format!(
                "rho_pc needs at least 3 periods for a Pearson correlation, got {}; returned 0",
                time_periods
            ),
            Warning::ZeroMeanConstraint { column } => format!(
                "constraint column {} varies but has zero mean; it contributes 0 to CCS",
                column
            ),
            Warning::StaticConstraints { total_variance } => format!(
                "all constraints are static (total variance {:.3e}); rho_pc used the unweighted constraint mean",
                total_variance
            ),
            Warning::LowReplicateCount {
                requested,
                recommended,
            } => format!(
                "{} bootstrap replicates requested; at least {} recommended, intervals may be wide",
                requested, recommended
            ),
            Warning::BackendUnavailable { requested, reason } => format!(
                "{} backend unavailable ({}); ran sequentially",
                requested, reason
            ),
            Warning::ReplicatesFailed { failed, attempted } => {
                format!("{} of {} replicates failed and were dropped", failed, attempted)
            }
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description())
    }
}

/// Collector for warnings emitted during one call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning.
    pub fn push(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    /// Move every warning from `other` into this collector.
    pub fn extend(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }

    /// Move warnings from `other` that are not already recorded.
    pub fn extend_unique(&mut self, other: Diagnostics) {
        for warning in other.warnings {
            if !self.warnings.contains(&warning) {
                self.warnings.push(warning);
            }
        }
    }

    /// Warnings in emission order.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Iterate over warnings in emission order.
    pub fn iter(&self) -> std::slice::Iter<'_, Warning> {
        self.warnings.iter()
    }

    /// Number of warnings recorded.
    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// True when any recorded warning undermines the result.
    pub fn has_result_undermining(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| w.severity() == WarningSeverity::ResultUndermining)
    }

    /// True when a warning matching `predicate` was recorded.
    pub fn contains(&self, predicate: impl Fn(&Warning) -> bool) -> bool {
        self.warnings.iter().any(predicate)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Warning;
    type IntoIter = std::slice::Iter<'a, Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.warnings.iter()
    }
}
