use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Uniform};

use crate::{
    env::{DiscreteActionSpace, Environment, StateKey},
    error::{Error, Result},
    exp::Exp,
};

/// Action that keeps the score ticking over with a small reward
pub const IDLE: i64 = 0;
/// Action that tries to boost the score with a larger, more variable reward
pub const BOOST: i64 = 1;

pub const DEFAULT_TOTAL_STEPS: u32 = 20;

/// State of a [`BoostGame`] episode
///
/// Only `step` identifies the state for learning, `score` is the running total of rewards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GameState {
    pub step: u32,
    pub score: f64,
}

impl StateKey for GameState {
    type Key = u32;

    fn key(&self) -> u32 {
        self.step
    }
}

/// A fixed-length episodic game with two actions
///
/// Each step pays a uniformly drawn integer reward: `[0,4]` for [`IDLE`] and `[5,24]` for [`BOOST`].
/// The episode ends once `total_steps` steps have been taken. Any other action is rejected.
pub struct BoostGame<R: Rng = StdRng> {
    total_steps: u32,
    state: GameState,
    idle: Uniform<i64>,
    boost: Uniform<i64>,
    rng: R,
}

impl BoostGame<StdRng> {
    /// Initialize a game drawing rewards from a [`StdRng`] seeded from `seed`
    pub fn seeded(total_steps: u32, seed: u64) -> Result<Self> {
        Self::new(total_steps, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> BoostGame<R> {
    /// Initialize a new game with episodes of `total_steps` steps
    ///
    /// Fails if `total_steps` is zero
    pub fn new(total_steps: u32, rng: R) -> Result<Self> {
        if total_steps == 0 {
            return Err(Error::InvalidTotalSteps);
        }
        Ok(Self::build(total_steps, rng))
    }

    /// Initialize a new game with episodes of [`DEFAULT_TOTAL_STEPS`] steps
    pub fn with_default_steps(rng: R) -> Self {
        Self::build(DEFAULT_TOTAL_STEPS, rng)
    }

    fn build(total_steps: u32, rng: R) -> Self {
        Self {
            total_steps,
            state: GameState::default(),
            idle: Uniform::new_inclusive(0, 4),
            boost: Uniform::new_inclusive(5, 24),
            rng,
        }
    }

    pub fn total_steps(&self) -> u32 {
        self.total_steps
    }

    /// The current state, without advancing the episode
    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state.step >= self.total_steps
    }
}

impl<R: Rng> Environment for BoostGame<R> {
    type State = GameState;
    type Action = i64;

    fn step(&mut self, action: Self::Action) -> Result<Exp<Self>> {
        if self.is_done() {
            return Err(Error::EpisodeFinished);
        }
        let reward = match action {
            BOOST => self.boost.sample(&mut self.rng),
            IDLE => self.idle.sample(&mut self.rng),
            action => return Err(Error::InvalidAction { action }),
        } as f64;

        let state = self.state;
        self.state = GameState {
            step: state.step + 1,
            score: state.score + reward,
        };

        Ok(Exp {
            state,
            action,
            reward,
            next_state: self.state,
            done: self.is_done(),
        })
    }

    fn reset(&mut self) -> Self::State {
        self.state = GameState::default();
        self.state
    }
}

impl<R: Rng> DiscreteActionSpace for BoostGame<R> {
    fn actions(&self) -> Vec<Self::Action> {
        vec![IDLE, BOOST]
    }
}
