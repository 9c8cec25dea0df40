//! Resampling primitives shared by the bootstrap and permutation engines.
//!
//! Every replicate gets its own generator seeded from `counter_rng_seed(master, i)`.
//! Replicate `i` therefore draws the same stream no matter how replicates are
//! batched or which worker runs them.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Derive the child seed for replicate `counter` from `master`.
///
/// SplitMix64 finalizer over `master + (counter + 1) * golden`, so
/// neighbouring counters produce uncorrelated streams.
#[inline]
pub fn counter_rng_seed(master: u64, counter: u64) -> u64 {
    let mut z = master.wrapping_add(counter.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Generator for replicate `counter` under `master`.
#[inline]
pub fn replicate_rng(master: u64, counter: u64) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(counter_rng_seed(master, counter))
}

/// Resolve an optional seed, drawing one from OS entropy when absent.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| rand::rng().next_u64())
}

/// Draw `n` indices uniformly with replacement from `0..n`.
pub fn bootstrap_indices<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<usize> {
    (0..n).map(|_| rng.random_range(0..n)).collect()
}

/// Uniform random permutation of `0..n`.
pub fn permutation<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices
}

/// Random permutation of `0..groups.len()` that only exchanges positions
/// sharing the same group label.
///
/// Groups are visited in ascending label order, which keeps the draw
/// sequence deterministic for a given generator.
pub fn stratified_permutation<R: Rng + ?Sized>(rng: &mut R, groups: &[usize]) -> Vec<usize> {
    let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &g) in groups.iter().enumerate() {
        members.entry(g).or_default().push(i);
    }

    let mut out: Vec<usize> = (0..groups.len()).collect();
    for positions in members.values() {
        let mut shuffled = positions.clone();
        shuffled.shuffle(rng);
        for (&slot, &source) in positions.iter().zip(&shuffled) {
            out[slot] = source;
        }
    }
    out
}

/// Apply an index vector to a slice.
#[inline]
pub fn gather(values: &[f64], indices: &[usize]) -> Vec<f64> {
    indices.iter().map(|&i| values[i]).collect()
}
