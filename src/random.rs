//! Seeded randomness for reproducible request generation.
//!
//! All sampling in this crate goes through a single [`RandomContext`] owned
//! by the engine. Every draw advances the shared generator state, so for a
//! fixed seed the full request sequence is reproducible bit-for-bit as long
//! as each code path performs its draws in a fixed order.
//!
//! [`Distribution`] provides weighted categorical selection over that
//! context: labels are kept in definition order and selected by a uniform
//! draw over the cumulative weight range, so equal cumulative boundaries
//! break ties toward the earlier label.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution as _, Pareto};
use uuid::Uuid;

const ASCII_LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const ASCII_DIGITS: &[u8] = b"0123456789";

/// Shape parameter for order-size draws. Most orders stay small but the
/// tail is long.
const ORDER_SIZE_SHAPE: f64 = 2.0;

/// Error type for weighted distribution construction.
#[derive(Debug, thiserror::Error)]
pub enum DistributionError {
    /// The weight table had no entries.
    #[error("Distribution has no entries")]
    Empty,

    /// A label carried a zero weight.
    #[error("Label '{0}' has zero weight")]
    ZeroWeight(String),
}

/// Seeded random source, explicitly owned by the run.
pub struct RandomContext {
    rng: StdRng,
    pareto: Pareto<f64>,
    seed: u64,
}

impl RandomContext {
    /// Create a context from a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            pareto: Pareto::new(1.0, ORDER_SIZE_SHAPE).expect("invalid Pareto parameters"),
            seed,
        }
    }

    /// Mint a fresh nonzero seed from OS entropy. Used when the configured
    /// seed is 0, so the chosen seed can be reported and replayed.
    pub fn fresh_seed() -> u64 {
        rand::rng().random_range(1..u64::MAX)
    }

    /// The seed this context was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform integer in `[0, n)`. `n` must be at least 1.
    pub fn uniform_int(&mut self, n: u64) -> u64 {
        self.rng.random_range(0..n)
    }

    /// Heavy-tailed positive real from a Pareto distribution with shape 2,
    /// shifted so the support starts at 0.
    pub fn pareto(&mut self) -> f64 {
        self.pareto.sample(&mut self.rng) - 1.0
    }

    /// Random ASCII letter, either case.
    pub fn letter(&mut self) -> char {
        let idx = self.uniform_int(ASCII_LETTERS.len() as u64) as usize;
        ASCII_LETTERS[idx] as char
    }

    /// Random ASCII digit.
    pub fn digit(&mut self) -> char {
        let idx = self.uniform_int(ASCII_DIGITS.len() as u64) as usize;
        ASCII_DIGITS[idx] as char
    }

    /// Random UUID v4 drawn from this context rather than OS entropy, so
    /// generated identifiers replay with the seed.
    pub fn uuid(&mut self) -> Uuid {
        let mut bytes = [0u8; 16];
        self.rng.fill(&mut bytes);
        uuid::Builder::from_random_bytes(bytes).into_uuid()
    }
}

impl std::fmt::Debug for RandomContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomContext")
            .field("seed", &self.seed)
            .finish()
    }
}

/// Weighted categorical distribution over labels of type `T`.
///
/// Entries keep their definition order and store cumulative weights, so
/// selection is a single uniform draw followed by a scan for the first
/// entry whose cumulative weight exceeds the draw.
#[derive(Debug, Clone)]
pub struct Distribution<T> {
    entries: Vec<(T, u64)>,
    total_weight: u64,
}

impl<T> Distribution<T> {
    /// Build a distribution from `(label, weight)` pairs. Weights must be
    /// positive; an empty table or a zero weight is a configuration error.
    pub fn new<I>(weights: I) -> Result<Self, DistributionError>
    where
        I: IntoIterator<Item = (T, u64)>,
        T: std::fmt::Display,
    {
        let mut total_weight = 0u64;
        let mut entries = Vec::new();
        for (label, weight) in weights {
            if weight == 0 {
                return Err(DistributionError::ZeroWeight(label.to_string()));
            }
            total_weight += weight;
            entries.push((label, total_weight));
        }
        if entries.is_empty() {
            return Err(DistributionError::Empty);
        }
        Ok(Self {
            entries,
            total_weight,
        })
    }

    /// Select a label proportionally to its weight.
    pub fn select(&self, ctx: &mut RandomContext) -> &T {
        let n = ctx.uniform_int(self.total_weight);
        for (label, cumulative) in &self.entries {
            if n < *cumulative {
                return label;
            }
        }
        unreachable!("draw {n} outside cumulative range {}", self.total_weight)
    }
}
