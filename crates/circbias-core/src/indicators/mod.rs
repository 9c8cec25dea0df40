//! Indicator kernel: PSI, CCS and ρ_PC.
//!
//! All three are pure functions of the input arrays. Degenerate inputs
//! (too few periods, static or zero-mean constraints) never fail; they return
//! the documented fallback value and record a [`Warning`](crate::diagnostics::Warning).
//! Arithmetic that leaves the finite range surfaces as
//! [`BiasError::Computation`].

mod ccs;
mod psi;
mod rho;

pub use ccs::ccs;
pub use psi::psi;
pub use rho::{rho_pc, weighted_constraint_summary};

use serde::{Deserialize, Serialize};

use crate::bootstrap::NullAnchor;
use crate::diagnostics::Diagnostics;
use crate::error::BiasError;
use crate::permutation::MatrixMetric;
use crate::types::{EvaluationData, Matrix};

/// One of the three bias indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    /// Parameter-Stability Index.
    Psi,
    /// Constraint-Consistency Score.
    Ccs,
    /// Performance-Constraint Correlation.
    RhoPc,
}

impl Indicator {
    /// All indicators in reporting order.
    pub const ALL: [Indicator; 3] = [Indicator::Psi, Indicator::Ccs, Indicator::RhoPc];

    /// Stable key used in result records (`"psi"`, `"ccs"`, `"rho_pc"`).
    pub fn name(&self) -> &'static str {
        match self {
            Indicator::Psi => "psi",
            Indicator::Ccs => "ccs",
            Indicator::RhoPc => "rho_pc",
        }
    }

    /// Evaluate this indicator on a bundle of inputs.
    ///
    /// PSI uses Θ when the bundle carries one.
    pub fn evaluate(
        &self,
        data: &EvaluationData,
        diagnostics: &mut Diagnostics,
    ) -> Result<f64, BiasError> {
        match self {
            Indicator::Psi => psi(&data.performance, data.params.as_ref(), diagnostics),
            Indicator::Ccs => ccs(&data.constraints, diagnostics),
            Indicator::RhoPc => rho_pc(&data.performance, &data.constraints, diagnostics),
        }
    }

    /// Value a bootstrap p-value measures the observed statistic against.
    ///
    /// PSI is tested against no instability (0), CCS against perfect
    /// consistency (1), ρ_PC against the bootstrap mean.
    pub fn default_null_anchor(&self) -> NullAnchor {
        match self {
            Indicator::Psi => NullAnchor::Value(0.0),
            Indicator::Ccs => NullAnchor::Value(1.0),
            Indicator::RhoPc => NullAnchor::BootstrapMean,
        }
    }
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl MatrixMetric for Indicator {
    fn compute(&self, performance: &Matrix, constraints: &Matrix) -> Result<f64, BiasError> {
        let mut scratch = Diagnostics::new();
        match self {
            Indicator::Psi => psi(performance, None, &mut scratch),
            Indicator::Ccs => ccs(constraints, &mut scratch),
            Indicator::RhoPc => rho_pc(performance, constraints, &mut scratch),
        }
    }
}

/// Absolute value of an indicator, used for the two-sided |ρ_PC| null.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsIndicator(pub Indicator);

impl MatrixMetric for AbsIndicator {
    fn compute(&self, performance: &Matrix, constraints: &Matrix) -> Result<f64, BiasError> {
        self.0.compute(performance, constraints).map(f64::abs)
    }
}

/// Scores of all three indicators on one input bundle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorScores {
    /// PSI, ≥ 0.
    pub psi: f64,
    /// CCS, in [0, 1].
    pub ccs: f64,
    /// ρ_PC, in [-1, 1].
    pub rho_pc: f64,
}

impl IndicatorScores {
    /// Evaluate every indicator on `data`, recording warnings into `diagnostics`.
    pub fn compute(data: &EvaluationData, diagnostics: &mut Diagnostics) -> Result<Self, BiasError> {
        Ok(Self {
            psi: Indicator::Psi.evaluate(data, diagnostics)?,
            ccs: Indicator::Ccs.evaluate(data, diagnostics)?,
            rho_pc: Indicator::RhoPc.evaluate(data, diagnostics)?,
        })
    }

    /// Score of a single indicator.
    pub fn get(&self, indicator: Indicator) -> f64 {
        match indicator {
            Indicator::Psi => self.psi,
            Indicator::Ccs => self.ccs,
            Indicator::RhoPc => self.rho_pc,
        }
    }
}
