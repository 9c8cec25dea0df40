//! Statistical building blocks.
//!
//! - Descriptive moments and Pearson correlation (population convention)
//! - Type 7 quantiles and percentile intervals
//! - Counter-seeded resampling: bootstrap indices, permutations, stratified permutations

mod descriptive;
mod quantile;
mod resample;

pub use descriptive::{column, is_constant, mean, pearson, row_means, std_dev, variance};
pub use quantile::{compute_quantile, compute_quantile_sorted, percentile_interval};
pub use resample::{
    bootstrap_indices, counter_rng_seed, gather, permutation, replicate_rng, resolve_seed,
    stratified_permutation,
};
