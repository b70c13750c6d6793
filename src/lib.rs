//! Tabular Q-learning over a synthetic episodic game.
//!
//! A [`Trainer`](trainer::Trainer) resets an [`Environment`](env::Environment), lets a
//! [`QTableAgent`](algo::QTableAgent) pick actions epsilon-greedily, feeds every transition back
//! into the agent's value table, and decays exploration once per episode.

/// Implemented RL algorithms
pub mod algo;

/// Environment
pub mod env;

/// Error types
pub mod error;

/// Transitions
pub mod exp;

/// Exploration policies
pub mod exploration;

/// Testing environments
pub mod gym;

/// Episode orchestration
pub mod trainer;

mod util;
