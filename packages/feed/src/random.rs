//! Injectable randomness for the feed simulation.
//!
//! Every randomized choice the generator makes goes through
//! [`RandomSource`], so tests can replay an exact sequence of draws with
//! [`SequenceRandom`] while production uses [`StdRandom`].

use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng as _};

/// A source of uniformly distributed values in `[0, 1)`.
pub trait RandomSource: Send {
    /// Returns the next value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;
}

/// [`RandomSource`] backed by the `rand` standard generator.
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    /// Creates a generator seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a reproducible generator from a fixed seed.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for StdRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }
}

/// [`RandomSource`] that replays a fixed list of values, wrapping around
/// when exhausted. An empty list always yields `0.0`.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f64>,
    position: usize,
}

impl SequenceRandom {
    /// Creates a source that replays `values` in order.
    #[must_use]
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            position: 0,
        }
    }

    /// Number of values drawn so far.
    #[must_use]
    pub const fn draws(&self) -> usize {
        self.position
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value
    }
}

/// Picks an index into a slice of length `len` (must be non-zero).
pub(crate) fn pick_index(rng: &mut dyn RandomSource, len: usize) -> usize {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let idx = (rng.next_f64() * len as f64) as usize;
    idx.min(len.saturating_sub(1))
}

/// Returns a value in `[-spread / 2, spread / 2)`.
pub(crate) fn jitter(rng: &mut dyn RandomSource, spread: f64) -> f64 {
    (rng.next_f64() - 0.5) * spread
}

/// Returns a value in `[base, base + range)`.
pub(crate) fn in_range(rng: &mut dyn RandomSource, base: f64, range: f64) -> f64 {
    rng.next_f64().mul_add(range, base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_replays_and_wraps() {
        let mut rng = SequenceRandom::new([0.1, 0.9]);
        assert!((rng.next_f64() - 0.1).abs() < f64::EPSILON);
        assert!((rng.next_f64() - 0.9).abs() < f64::EPSILON);
        assert!((rng.next_f64() - 0.1).abs() < f64::EPSILON);
        assert_eq!(rng.draws(), 3);
    }

    #[test]
    fn pick_index_stays_in_bounds() {
        let mut rng = SequenceRandom::new([0.0, 0.5, 0.999_999, 1.0]);
        assert_eq!(pick_index(&mut rng, 4), 0);
        assert_eq!(pick_index(&mut rng, 4), 2);
        assert_eq!(pick_index(&mut rng, 4), 3);
        assert_eq!(pick_index(&mut rng, 4), 3);
    }

    #[test]
    fn seeded_generators_are_reproducible() {
        let mut a = StdRandom::from_seed(42);
        let mut b = StdRandom::from_seed(42);
        for _ in 0..16 {
            let value = a.next_f64();
            assert!((0.0..1.0).contains(&value));
            assert!((value - b.next_f64()).abs() < f64::EPSILON);
        }
    }
}
