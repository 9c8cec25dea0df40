//! Threshold rule: per-indicator flags and the 2-of-3 majority vote.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CCS_THRESHOLD, DEFAULT_PSI_THRESHOLD, DEFAULT_RHO_PC_THRESHOLD, INDICATOR_COUNT,
    MAJORITY_VOTES,
};
use crate::error::BiasError;
use crate::indicators::IndicatorScores;

/// Threshold triple (τ_psi, τ_ccs, τ_rho).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Upper bound on acceptable PSI, in (0, 1).
    pub psi: f64,
    /// Lower bound on acceptable CCS, in (0, 1].
    pub ccs: f64,
    /// Upper bound on acceptable |ρ_PC|, in [0, 1].
    pub rho_pc: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            psi: DEFAULT_PSI_THRESHOLD,
            ccs: DEFAULT_CCS_THRESHOLD,
            rho_pc: DEFAULT_RHO_PC_THRESHOLD,
        }
    }
}

impl Thresholds {
    /// Create a threshold triple. Use [`validate`](Self::validate) to check ranges.
    pub fn new(psi: f64, ccs: f64, rho_pc: f64) -> Self {
        Self { psi, ccs, rho_pc }
    }

    /// Check each threshold against its legal range.
    pub fn validate(&self) -> Result<(), BiasError> {
        if !(self.psi > 0.0 && self.psi < 1.0) {
            return Err(BiasError::configuration(
                "psi_threshold",
                format!("must be in (0, 1), got {}", self.psi),
            ));
        }
        if !(self.ccs > 0.0 && self.ccs <= 1.0) {
            return Err(BiasError::configuration(
                "ccs_threshold",
                format!("must be in (0, 1], got {}", self.ccs),
            ));
        }
        if !(0.0..=1.0).contains(&self.rho_pc) {
            return Err(BiasError::configuration(
                "rho_pc_threshold",
                format!("must be in [0, 1], got {}", self.rho_pc),
            ));
        }
        Ok(())
    }
}

/// Outcome of the threshold rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// PSI above its threshold.
    pub psi_flag: bool,
    /// CCS below its threshold.
    pub ccs_flag: bool,
    /// |ρ_PC| above its threshold.
    pub rho_flag: bool,
    /// Number of flags raised (0–3).
    pub votes: u8,
    /// At least two flags raised.
    pub overall: bool,
    /// `votes / 3`.
    pub confidence: f64,
}

/// Apply the threshold rule to a set of scores.
pub fn decide(scores: &IndicatorScores, thresholds: &Thresholds) -> Decision {
    let psi_flag = scores.psi > thresholds.psi;
    // Inverted: low consistency is the bad direction.
    let ccs_flag = scores.ccs < thresholds.ccs;
    let rho_flag = scores.rho_pc.abs() > thresholds.rho_pc;

    let votes = psi_flag as u8 + ccs_flag as u8 + rho_flag as u8;
    Decision {
        psi_flag,
        ccs_flag,
        rho_flag,
        votes,
        overall: votes >= MAJORITY_VOTES,
        confidence: f64::from(votes) / f64::from(INDICATOR_COUNT),
    }
}
