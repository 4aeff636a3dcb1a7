//! Uniform random selection behind a small trait.
//!
//! The run picks twice: once over eligible books, once over extracted
//! sentences. Tests swap in a fixed selector to make runs deterministic.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Chooses an index in `0..len`
pub trait Selector: Send {
    /// Pick an index. Callers guarantee `len >= 1`.
    fn select(&mut self, len: usize) -> usize;
}

/// Uniform selection backed by `StdRng`
#[derive(Debug)]
pub struct RandomSelector {
    rng: StdRng,
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSelector {
    /// Entropy-seeded selector
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible selector (`--seed`)
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Selector for RandomSelector {
    fn select(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Always returns the same position, clamped to the last element
#[derive(Debug, Clone, Copy)]
pub struct FixedSelector(pub usize);

impl Selector for FixedSelector {
    fn select(&mut self, len: usize) -> usize {
        self.0.min(len - 1)
    }
}

/// Pick one element, or `None` when there is nothing to pick from
pub fn choose<'a, T>(selector: &mut dyn Selector, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(selector.select(items.len()))
}
