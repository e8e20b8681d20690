//! Edge-toggle proposal policies.

use rand::Rng;

use crate::error::{ErgmError, Result};

/// Chooses the next vertex pair to toggle.
pub trait ProposalPolicy {
    /// A pair `(i, j)` over `n` vertices. Callers guarantee `n >= 2`.
    fn propose<R: Rng + ?Sized>(&mut self, n: usize, rng: &mut R) -> (usize, usize);
}

/// Uniform over ordered pairs `i ≠ j`.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformPairs;

impl ProposalPolicy for UniformPairs {
    #[inline]
    fn propose<R: Rng + ?Sized>(&mut self, n: usize, rng: &mut R) -> (usize, usize) {
        let i = rng.gen_range(0..n);
        let mut j = rng.gen_range(0..n - 1);
        if j >= i {
            j += 1;
        }
        (i, j)
    }
}

/// Fixed list of pairs, cycled in order.
#[derive(Clone, Debug)]
pub struct Schedule {
    pairs: Vec<(usize, usize)>,
    next: usize,
}

impl Schedule {
    pub fn new(pairs: Vec<(usize, usize)>) -> Result<Self> {
        if pairs.is_empty() {
            return Err(ErgmError::config("proposal schedule is empty"));
        }
        Ok(Self { pairs, next: 0 })
    }
}

impl ProposalPolicy for Schedule {
    fn propose<R: Rng + ?Sized>(&mut self, _n: usize, _rng: &mut R) -> (usize, usize) {
        let pair = self.pairs[self.next];
        self.next = (self.next + 1) % self.pairs.len();
        pair
    }
}
