//! Numeric constants and defaults used throughout the crate.

/// Default deterministic seed for RNG operations in tests and examples.
///
/// The value `0x63697263` is "circ" encoded in ASCII.
pub const DEFAULT_SEED: u64 = 0x6369_7263;

// =============================================================================
// Decision thresholds
// =============================================================================

/// Default upper bound on acceptable PSI.
pub const DEFAULT_PSI_THRESHOLD: f64 = 0.15;

/// Default lower bound on acceptable CCS.
pub const DEFAULT_CCS_THRESHOLD: f64 = 0.85;

/// Default upper bound on acceptable |ρ_PC|.
pub const DEFAULT_RHO_PC_THRESHOLD: f64 = 0.5;

/// Number of indicator flags that must fire for an overall positive verdict.
pub const MAJORITY_VOTES: u8 = 2;

/// Number of indicators taking part in the vote.
pub const INDICATOR_COUNT: u8 = 3;

// =============================================================================
// Indicator kernel
// =============================================================================

/// Total constraint variance below which ρ_PC falls back to an unweighted mean.
pub const STATIC_CONSTRAINT_VARIANCE: f64 = 1e-10;

/// A constraint column is zero-mean when its mean magnitude is below this
/// fraction of its largest absolute entry.
pub const ZERO_MEAN_RELATIVE_TOLERANCE: f64 = 1e-12;

/// Minimum number of periods for a Pearson correlation.
pub const MIN_PERIODS_FOR_CORRELATION: usize = 3;

// =============================================================================
// Resampling defaults
// =============================================================================

/// Default number of bootstrap replicates.
pub const DEFAULT_BOOTSTRAP_ITERATIONS: usize = 1000;

/// Hard lower bound on bootstrap replicates.
pub const MIN_BOOTSTRAP_ITERATIONS: usize = 100;

/// Below this many bootstrap replicates a `LowReplicateCount` warning is emitted.
pub const RECOMMENDED_BOOTSTRAP_ITERATIONS: usize = 1000;

/// Default confidence level for percentile intervals.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Default number of permutations for a permutation test.
pub const DEFAULT_PERMUTATIONS: usize = 1000;

/// Default batch size for adaptive stopping.
pub const DEFAULT_PERMUTATION_BATCH: usize = 100;

/// Default quantile of the null distribution used for adaptive thresholds.
pub const DEFAULT_ADAPTIVE_QUANTILE: f64 = 0.95;

/// Default number of null simulations for adaptive thresholds.
pub const DEFAULT_ADAPTIVE_SIMULATIONS: usize = 1000;

// =============================================================================
// Sample floors
// =============================================================================

/// Minimum number of evaluation periods.
pub const MIN_TIME_PERIODS: usize = 2;

/// Minimum number of algorithms.
pub const MIN_ALGORITHMS: usize = 1;

/// Minimum number of constraint columns.
pub const MIN_CONSTRAINTS: usize = 1;
