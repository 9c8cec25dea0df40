//! The detection result record.
//!
//! Serialized keys are stable: the nine score and decision fields and
//! `metadata` are always present. Bootstrap fields (`{indicator}_ci_lower`,
//! `{indicator}_ci_upper`, `{indicator}_pvalue`, `{indicator}_std_error`,
//! `bootstrap_enabled`, `n_bootstrap`) appear only when the bootstrap ran, and
//! the adaptive-threshold fields only when thresholds were derived from data.

use serde::{Deserialize, Serialize};

use circbias_core::{
    BootstrapRecord, Decision, Diagnostics, Indicator, IndicatorScores, Thresholds,
};

/// Outcome of one detection call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Parameter-Stability Index.
    pub psi_score: f64,
    /// Constraint-Consistency Score.
    pub ccs_score: f64,
    /// Performance-Constraint Correlation.
    pub rho_pc_score: f64,

    /// PSI exceeded its threshold.
    pub psi_bias: bool,
    /// CCS fell below its threshold.
    pub ccs_bias: bool,
    /// |ρ_PC| exceeded its threshold.
    pub rho_pc_bias: bool,
    /// At least two of the three flags fired.
    pub overall_bias: bool,
    /// Number of flags raised.
    pub bias_votes: u8,
    /// `bias_votes / 3`.
    pub confidence: f64,

    /// Per-indicator bootstrap summaries, when the bootstrap ran.
    #[serde(flatten)]
    pub bootstrap: Option<BootstrapFields>,

    /// Null-distribution summaries, when adaptive thresholds were used.
    #[serde(flatten)]
    pub adaptive: Option<AdaptiveFields>,

    /// Shapes, names and settings of the call.
    pub metadata: ResultMetadata,

    /// Warnings recorded during the call.
    #[serde(default)]
    pub diagnostics: Diagnostics,
}

impl DetectionResult {
    /// The three indicator scores.
    pub fn scores(&self) -> IndicatorScores {
        IndicatorScores {
            psi: self.psi_score,
            ccs: self.ccs_score,
            rho_pc: self.rho_pc_score,
        }
    }

    /// The decision fields as a [`Decision`].
    pub fn decision(&self) -> Decision {
        Decision {
            psi_flag: self.psi_bias,
            ccs_flag: self.ccs_bias,
            rho_flag: self.rho_pc_bias,
            votes: self.bias_votes,
            overall: self.overall_bias,
            confidence: self.confidence,
        }
    }

    /// Flag for one indicator.
    pub fn flag(&self, indicator: Indicator) -> bool {
        match indicator {
            Indicator::Psi => self.psi_bias,
            Indicator::Ccs => self.ccs_bias,
            Indicator::RhoPc => self.rho_pc_bias,
        }
    }

    /// True if the bootstrap ran.
    pub fn bootstrap_enabled(&self) -> bool {
        self.bootstrap.is_some()
    }
}

/// Bootstrap fields, flattened into the result record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BootstrapFields {
    /// PSI interval lower bound.
    pub psi_ci_lower: f64,
    /// PSI interval upper bound.
    pub psi_ci_upper: f64,
    /// PSI bootstrap p-value.
    pub psi_pvalue: f64,
    /// PSI bootstrap standard error.
    pub psi_std_error: f64,

    /// CCS interval lower bound.
    pub ccs_ci_lower: f64,
    /// CCS interval upper bound.
    pub ccs_ci_upper: f64,
    /// CCS bootstrap p-value.
    pub ccs_pvalue: f64,
    /// CCS bootstrap standard error.
    pub ccs_std_error: f64,

    /// ρ_PC interval lower bound.
    pub rho_pc_ci_lower: f64,
    /// ρ_PC interval upper bound.
    pub rho_pc_ci_upper: f64,
    /// ρ_PC bootstrap p-value.
    pub rho_pc_pvalue: f64,
    /// ρ_PC bootstrap standard error.
    pub rho_pc_std_error: f64,

    /// Always `true` when present.
    pub bootstrap_enabled: bool,
    /// Replicates requested per indicator.
    pub n_bootstrap: usize,
}

impl BootstrapFields {
    /// Collect the three per-indicator records.
    pub fn from_records(psi: &BootstrapRecord, ccs: &BootstrapRecord, rho: &BootstrapRecord) -> Self {
        Self {
            psi_ci_lower: psi.ci_lower,
            psi_ci_upper: psi.ci_upper,
            psi_pvalue: psi.p_value,
            psi_std_error: psi.std_error,
            ccs_ci_lower: ccs.ci_lower,
            ccs_ci_upper: ccs.ci_upper,
            ccs_pvalue: ccs.p_value,
            ccs_std_error: ccs.std_error,
            rho_pc_ci_lower: rho.ci_lower,
            rho_pc_ci_upper: rho.ci_upper,
            rho_pc_pvalue: rho.p_value,
            rho_pc_std_error: rho.std_error,
            bootstrap_enabled: true,
            n_bootstrap: psi.n_bootstrap,
        }
    }

    /// `(ci_lower, ci_upper, p_value)` for one indicator.
    pub fn interval(&self, indicator: Indicator) -> (f64, f64, f64) {
        match indicator {
            Indicator::Psi => (self.psi_ci_lower, self.psi_ci_upper, self.psi_pvalue),
            Indicator::Ccs => (self.ccs_ci_lower, self.ccs_ci_upper, self.ccs_pvalue),
            Indicator::RhoPc => (self.rho_pc_ci_lower, self.rho_pc_ci_upper, self.rho_pc_pvalue),
        }
    }
}

/// Adaptive-threshold fields, flattened into the result record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveFields {
    /// Null quantile the thresholds were read at.
    pub adaptive_quantile: f64,
    /// Shuffled replicates per indicator.
    pub n_adaptive_simulations: usize,
    /// Permutation p-value of the observed PSI (greater).
    pub psi_permutation_pvalue: f64,
    /// Permutation p-value of the observed CCS (less).
    pub ccs_permutation_pvalue: f64,
    /// Permutation p-value of the observed |ρ_PC| (greater).
    pub rho_pc_permutation_pvalue: f64,
}

/// Where the PSI proxy came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PsiProxy {
    /// Performance matrix; PSI and ρ_PC then share an input.
    Performance,
    /// Mean of the supplied parameter tensor.
    Parameters,
}

/// Metadata section of the result record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// T.
    pub time_periods: usize,
    /// K.
    pub num_algorithms: usize,
    /// p.
    pub num_constraints: usize,
    /// Column labels of P; `Algorithm_1..K` unless supplied.
    pub algorithm_names: Vec<String>,
    /// Column labels of C; `Constraint_1..p` unless supplied.
    pub constraint_names: Vec<String>,
    /// Thresholds the decision used.
    pub thresholds: Thresholds,
    /// Thresholds came from null distributions.
    pub adaptive_thresholds_enabled: bool,
    /// Source of the PSI proxy.
    pub psi_proxy: PsiProxy,
    /// Master seed of the resampling steps, if any ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Period labels, when the input was a table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub periods: Option<Vec<i64>>,
}

/// `prefix_1..n` default labels.
pub(crate) fn default_names(prefix: &str, n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("{}_{}", prefix, i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(base: f64) -> BootstrapRecord {
        BootstrapRecord {
            point_estimate: base,
            ci_lower: base - 0.1,
            ci_upper: base + 0.1,
            p_value: 0.5,
            std_error: 0.05,
            n_bootstrap: 500,
            n_failed: 0,
            seed: 42,
        }
    }

    #[test]
    fn test_default_names() {
        assert_eq!(default_names("Algorithm", 2), vec!["Algorithm_1", "Algorithm_2"]);
        assert!(default_names("Constraint", 0).is_empty());
    }

    #[test]
    fn test_bootstrap_fields_from_records() {
        let fields = BootstrapFields::from_records(&record(0.2), &record(0.9), &record(-0.3));
        assert!(fields.bootstrap_enabled);
        assert_eq!(fields.n_bootstrap, 500);
        let (lo, hi, p) = fields.interval(Indicator::Ccs);
        assert!((lo - 0.8).abs() < 1e-12);
        assert!((hi - 1.0).abs() < 1e-12);
        assert_eq!(p, 0.5);
        assert!((fields.rho_pc_ci_lower + 0.4).abs() < 1e-12);
    }
}
