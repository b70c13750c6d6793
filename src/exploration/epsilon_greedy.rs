use rand::Rng;

use crate::{error::Result, util::ensure_interval};

use super::Choice;

/// Epsilon greedy exploration policy with a multiplicatively decaying epsilon threshold
#[derive(Debug, Clone, PartialEq)]
pub struct EpsilonGreedy {
    epsilon: f64,
}

impl EpsilonGreedy {
    /// Initialize epsilon greedy policy with a starting exploration rate
    ///
    /// Fails if `epsilon` is not in the interval `[0,1]`
    pub fn new(epsilon: f64) -> Result<Self> {
        ensure_interval!(epsilon, 0.0, 1.0);
        Ok(Self { epsilon })
    }

    /// Current exploration rate
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Invoke epsilon greedy policy, exploring with probability epsilon
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Choice {
        if rng.gen::<f64>() < self.epsilon {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }

    /// Scale epsilon by `rate`
    ///
    /// The rate is not checked here, callers keep it in `(0,1]`.
    pub fn decay(&mut self, rate: f64) {
        self.epsilon *= rate;
    }
}
