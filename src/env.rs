use crate::{algo::tabular::TableKey, error::Result, exp::Exp};

/// Represents a Markov decision process, defining the dynamics of an environment
/// in which an agent can operate.
///
/// This base trait represents the common case of a discrete-time, finite-horizon MDP with one agent.
/// An episode starts at [`reset`](Environment::reset) and runs until a step reports `done`.
pub trait Environment: Sized {
    /// A representation of the state of the environment to be passed to an agent
    type State: Clone;

    /// A representation of an action that an agent can take to affect the environment
    type Action: Clone;

    /// Update the environment in response to an action taken by an agent
    ///
    /// **Returns** the resulting transition, or an error if the action is unsupported
    /// or the episode has already finished
    fn step(&mut self, action: Self::Action) -> Result<Exp<Self>>;

    /// Reset the environment to an initial state, discarding any episode in progress
    ///
    /// **Returns** the state
    fn reset(&mut self) -> Self::State;
}

/// An environment with a finite, ordered set of actions
pub trait DiscreteActionSpace: Environment {
    /// Get the actions the environment accepts, in a fixed order
    fn actions(&self) -> Vec<Self::Action>;
}

/// A state that can be reduced to a key for tabular value lookup
///
/// Only the part of the state relevant to learning should feed the key, which keeps the table bounded.
pub trait StateKey {
    type Key: TableKey;

    fn key(&self) -> Self::Key;
}
