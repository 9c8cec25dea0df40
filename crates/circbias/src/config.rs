//! Detection configuration and the process-wide default.
//!
//! [`DetectionConfig`] is an explicit value threaded through
//! [`BiasDetector`](crate::BiasDetector). A process-wide default is kept for
//! convenience: [`BiasDetector::from_global`](crate::BiasDetector::from_global)
//! reads it once at the start of every call, and [`set_config`] replaces it
//! atomically after validation.

use std::sync::{OnceLock, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use circbias_core::constants::{
    DEFAULT_ADAPTIVE_QUANTILE, DEFAULT_ADAPTIVE_SIMULATIONS, DEFAULT_BOOTSTRAP_ITERATIONS,
    DEFAULT_CONFIDENCE_LEVEL, MIN_BOOTSTRAP_ITERATIONS,
};
use circbias_core::{
    AdaptiveThresholdConfig, BiasError, BootstrapConfig, Parallelism, SampleLimits, Thresholds,
};

/// Configuration for [`BiasDetector`](crate::BiasDetector).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    // =========================================================================
    // Decision rule
    // =========================================================================
    /// Default threshold triple. Default: (0.15, 0.85, 0.5).
    pub thresholds: Thresholds,

    // =========================================================================
    // Bootstrap
    // =========================================================================
    /// Bootstrap replicates per indicator. Must be >= 100. Default: 1,000.
    ///
    /// Below 1,000 the bootstrap still runs but records a low-replicate warning.
    pub n_bootstrap: usize,

    /// Confidence level of the percentile intervals, in (0, 1). Default: 0.95.
    pub confidence_level: f64,

    /// Master seed for every resampling step.
    ///
    /// `None` draws a fresh seed from OS entropy on each call; the drawn seed is
    /// reported in the result metadata so the run can be replayed.
    pub random_seed: Option<u64>,

    // =========================================================================
    // Validation
    // =========================================================================
    /// Minimum T, K and p accepted by the validator.
    pub limits: SampleLimits,

    // =========================================================================
    // Adaptive thresholds
    // =========================================================================
    /// Null quantile for adaptive thresholds. Default: 0.95.
    pub adaptive_quantile: f64,

    /// Shuffled replicates per indicator for adaptive thresholds. Default: 1,000.
    pub n_adaptive_simulations: usize,

    /// Backend used for the shuffle runs. Default: sequential.
    pub parallelism: Parallelism,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),

            n_bootstrap: DEFAULT_BOOTSTRAP_ITERATIONS,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            random_seed: None,

            limits: SampleLimits::default(),

            adaptive_quantile: DEFAULT_ADAPTIVE_QUANTILE,
            n_adaptive_simulations: DEFAULT_ADAPTIVE_SIMULATIONS,
            parallelism: Parallelism::default(),
        }
    }
}

impl DetectionConfig {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a quick configuration for development.
    ///
    /// - 200 bootstrap replicates (records a low-replicate warning)
    /// - 200 null simulations per indicator
    pub fn quick() -> Self {
        Self {
            n_bootstrap: 200,
            n_adaptive_simulations: 200,
            ..Default::default()
        }
    }

    /// Create a thorough configuration for reporting.
    ///
    /// - 5,000 bootstrap replicates
    /// - 5,000 null simulations per indicator
    pub fn thorough() -> Self {
        Self {
            n_bootstrap: 5_000,
            n_adaptive_simulations: 5_000,
            ..Default::default()
        }
    }

    /// Set the threshold triple.
    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the bootstrap replicate count.
    pub fn n_bootstrap(mut self, n: usize) -> Self {
        self.n_bootstrap = n;
        self
    }

    /// Set the confidence level.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    /// Fix the master seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Set the backend for adaptive-threshold simulations.
    pub fn parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Check every field against its legal range.
    pub fn validate(&self) -> Result<(), BiasError> {
        self.thresholds.validate()?;
        if self.n_bootstrap < MIN_BOOTSTRAP_ITERATIONS {
            return Err(BiasError::configuration(
                "n_bootstrap",
                format!(
                    "must be >= {}, got {}",
                    MIN_BOOTSTRAP_ITERATIONS, self.n_bootstrap
                ),
            ));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(BiasError::configuration(
                "confidence_level",
                format!("must be in (0, 1), got {}", self.confidence_level),
            ));
        }
        self.limits.validate()?;
        self.adaptive_config().validate()
    }

    /// Apply one recognized option, validating before the change is kept.
    pub fn apply(&mut self, option: ConfigOption) -> Result<(), BiasError> {
        let mut candidate = *self;
        match option {
            ConfigOption::PsiThreshold(v) => candidate.thresholds.psi = v,
            ConfigOption::CcsThreshold(v) => candidate.thresholds.ccs = v,
            ConfigOption::RhoPcThreshold(v) => candidate.thresholds.rho_pc = v,
            ConfigOption::NBootstrap(n) => candidate.n_bootstrap = n,
            ConfigOption::ConfidenceLevel(v) => candidate.confidence_level = v,
            ConfigOption::RandomSeed(seed) => candidate.random_seed = seed,
        }
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    /// Bootstrap settings derived from this configuration.
    pub fn bootstrap_config(&self) -> BootstrapConfig {
        BootstrapConfig {
            n_bootstrap: self.n_bootstrap,
            confidence_level: self.confidence_level,
            seed: self.random_seed,
        }
    }

    /// Adaptive-threshold settings derived from this configuration.
    pub fn adaptive_config(&self) -> AdaptiveThresholdConfig {
        AdaptiveThresholdConfig {
            quantile: self.adaptive_quantile,
            n_simulations: self.n_adaptive_simulations,
            seed: self.random_seed,
            parallelism: self.parallelism,
        }
    }
}

/// A recognized configuration option and its new value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "option", content = "value")]
pub enum ConfigOption {
    /// `psi_threshold` in (0, 1).
    PsiThreshold(f64),
    /// `ccs_threshold` in (0, 1].
    CcsThreshold(f64),
    /// `rho_pc_threshold` in [0, 1].
    RhoPcThreshold(f64),
    /// `n_bootstrap` >= 100.
    NBootstrap(usize),
    /// `confidence_level` in (0, 1).
    ConfidenceLevel(f64),
    /// `random_seed`, or `None` for entropy.
    RandomSeed(Option<u64>),
}

impl ConfigOption {
    /// Name of the option as it appears in error records.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigOption::PsiThreshold(_) => "psi_threshold",
            ConfigOption::CcsThreshold(_) => "ccs_threshold",
            ConfigOption::RhoPcThreshold(_) => "rho_pc_threshold",
            ConfigOption::NBootstrap(_) => "n_bootstrap",
            ConfigOption::ConfidenceLevel(_) => "confidence_level",
            ConfigOption::RandomSeed(_) => "random_seed",
        }
    }
}

static GLOBAL_CONFIG: OnceLock<RwLock<DetectionConfig>> = OnceLock::new();

fn global() -> &'static RwLock<DetectionConfig> {
    GLOBAL_CONFIG.get_or_init(|| RwLock::new(DetectionConfig::default()))
}

/// Snapshot of the process-wide default configuration.
pub fn current_config() -> DetectionConfig {
    *global().read().unwrap_or_else(PoisonError::into_inner)
}

/// Replace the process-wide default after validating it.
pub fn set_config(config: DetectionConfig) -> Result<(), BiasError> {
    config.validate()?;
    *global().write().unwrap_or_else(PoisonError::into_inner) = config;
    Ok(())
}

/// Apply options to the process-wide default; nothing changes if any fails.
pub fn update_config<I>(options: I) -> Result<DetectionConfig, BiasError>
where
    I: IntoIterator<Item = ConfigOption>,
{
    let mut guard = global().write().unwrap_or_else(PoisonError::into_inner);
    let mut candidate = *guard;
    for option in options {
        candidate.apply(option)?;
    }
    *guard = candidate;
    Ok(candidate)
}

/// Restore the process-wide default to [`DetectionConfig::default`].
pub fn reset_config() {
    *global().write().unwrap_or_else(PoisonError::into_inner) = DetectionConfig::default();
}
