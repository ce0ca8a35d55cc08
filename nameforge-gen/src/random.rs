//! Injectable randomness
//!
//! Every random decision in the pipeline goes through `RandomSource` so a
//! seeded source makes a whole run reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Source of uniform random numbers
pub trait RandomSource: Send + Sync {
    /// Uniform float in `[0, 1)`
    fn next_f64(&self) -> f64;

    /// Uniform integer in `[0, n)`; returns 0 when `n == 0`
    fn below(&self, n: usize) -> usize;
}

/// Convenience draws built on `RandomSource`
pub trait RandomExt: RandomSource {
    /// True with probability `p`
    fn chance(&self, p: f64) -> bool {
        if p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.next_f64() < p
    }

    fn pick<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            items.get(self.below(items.len()))
        }
    }

    /// Uniform integer in `[lo, hi]`
    fn range_inclusive(&self, lo: usize, hi: usize) -> usize {
        if hi <= lo {
            return lo;
        }
        lo + self.below(hi - lo + 1)
    }

    /// Index drawn proportionally to `weights`; None when all weights are zero
    fn weighted_index(&self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| w.is_finite() && **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }

        let mut target = self.next_f64() * total;
        let mut last_positive = None;
        for (i, w) in weights.iter().enumerate() {
            if !w.is_finite() || *w <= 0.0 {
                continue;
            }
            last_positive = Some(i);
            if target < *w {
                return Some(i);
            }
            target -= w;
        }
        last_positive
    }

    /// Fisher-Yates shuffle
    fn shuffle<T>(&self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}

impl<R: RandomSource + ?Sized> RandomExt for R {}

/// `StdRng`-backed source, seeded or from entropy
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut guard = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&self) -> f64 {
        self.with_rng(|rng| rng.gen::<f64>())
    }

    fn below(&self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.with_rng(|rng| rng.gen_range(0..n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let a = SeededRandom::from_seed(42);
        let b = SeededRandom::from_seed(42);
        let seq_a: Vec<usize> = (0..20).map(|_| a.below(1000)).collect();
        let seq_b: Vec<usize> = (0..20).map(|_| b.below(1000)).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn test_below_zero_is_zero() {
        let rng = SeededRandom::from_seed(1);
        assert_eq!(rng.below(0), 0);
    }

    #[test]
    fn test_range_inclusive_bounds() {
        let rng = SeededRandom::from_seed(7);
        for _ in 0..500 {
            let n = rng.range_inclusive(4, 10);
            assert!((4..=10).contains(&n));
        }
        assert_eq!(rng.range_inclusive(5, 5), 5);
    }

    #[test]
    fn test_weighted_index_skips_zero_weights() {
        let rng = SeededRandom::from_seed(3);
        for _ in 0..200 {
            let idx = rng.weighted_index(&[0.0, 2.0, 0.0, 1.0]).unwrap();
            assert!(idx == 1 || idx == 3);
        }
        assert_eq!(rng.weighted_index(&[0.0, 0.0]), None);
        assert_eq!(rng.weighted_index(&[]), None);
    }

    #[test]
    fn test_chance_extremes() {
        let rng = SeededRandom::from_seed(9);
        assert!(!rng.chance(0.0));
        assert!(rng.chance(1.0));
    }

    #[test]
    fn test_trait_object_helpers() {
        let rng: std::sync::Arc<dyn RandomSource> = std::sync::Arc::new(SeededRandom::from_seed(5));
        let items = ["a", "b", "c"];
        assert!(rng.pick(&items).is_some());
        let mut shuffled = vec![1, 2, 3, 4, 5];
        rng.shuffle(&mut shuffled);
        shuffled.sort();
        assert_eq!(shuffled, vec![1, 2, 3, 4, 5]);
    }
}
