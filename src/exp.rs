use std::fmt;

use crate::env::Environment;

/// Represents a single experience or transition in the environment
pub struct Exp<E: Environment> {
    /// The state of the environment before taking the action
    pub state: E::State,
    /// The action taken in the given state
    pub action: E::Action,
    /// The reward received after taking the action
    pub reward: f64,
    /// The state of the environment after the action is taken, terminal or not
    pub next_state: E::State,
    /// Whether `next_state` ends the episode
    pub done: bool,
}

impl<E: Environment> Clone for Exp<E> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            action: self.action.clone(),
            reward: self.reward,
            next_state: self.next_state.clone(),
            done: self.done,
        }
    }
}

impl<E> fmt::Debug for Exp<E>
where
    E: Environment,
    E::State: fmt::Debug,
    E::Action: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exp")
            .field("state", &self.state)
            .field("action", &self.action)
            .field("reward", &self.reward)
            .field("next_state", &self.next_state)
            .field("done", &self.done)
            .finish()
    }
}
