use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    env::{Environment, StateKey},
    error::{Error, Result},
    exp::Exp,
    exploration::{Choice, EpsilonGreedy},
    util::ensure_interval,
};

use super::TableKey;

type Key<E> = <<E as Environment>::State as StateKey>::Key;

/// Configuration for the [`QTableAgent`]
#[derive(Debug, Clone, PartialEq)]
pub struct QTableAgentConfig<A> {
    /// The action set, in the order used to break ties between equal Q values
    pub actions: Vec<A>,
    pub alpha: f64,
    pub gamma: f64,
    pub epsilon: f64,
}

impl Default for QTableAgentConfig<i64> {
    fn default() -> Self {
        Self {
            actions: vec![0, 1],
            alpha: 0.1,
            gamma: 0.99,
            epsilon: 1.0,
        }
    }
}

/// A single learned value, as listed by [`QTableAgent::entries`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QEntry<K, A> {
    pub key: K,
    pub action: A,
    pub value: f64,
}

/// A simple Q-learning agent that utilizes a Q-table to learn its environment
///
/// ### Generics
/// - `E` - The [`Environment`] in which the agent will learn
///     - States are reduced to a [`StateKey`] so that a Q value is recorded per key and action pair
///     - Actions must be [`TableKey`]s to be used as keys in a [`HashMap`] and listed in order
/// - `R` - The random number generator driving exploration
pub struct QTableAgent<E, R = StdRng>
where
    E: Environment,
    E::State: StateKey,
    E::Action: TableKey,
    R: Rng,
{
    q_table: HashMap<(Key<E>, E::Action), f64>,
    actions: Vec<E::Action>,
    exploration: EpsilonGreedy,
    alpha: f64, // learning rate
    gamma: f64, // discount factor
    rng: R,
}

impl<E> QTableAgent<E, StdRng>
where
    E: Environment,
    E::State: StateKey,
    E::Action: TableKey,
{
    /// Initialize a new agent exploring with a [`StdRng`] seeded from `seed`
    pub fn seeded(config: QTableAgentConfig<E::Action>, seed: u64) -> Result<Self> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<E, R> QTableAgent<E, R>
where
    E: Environment,
    E::State: StateKey,
    E::Action: TableKey,
    R: Rng,
{
    /// Initialize a new `QTableAgent`
    ///
    /// ### Parameters
    /// - `config.actions` - The action set - must be non-empty and free of duplicates
    /// - `config.alpha` - The learning rate - must be in the interval `(0,1]`
    /// - `config.gamma` - The discount factor - must be in the interval `[0,1]`
    /// - `config.epsilon` - The initial exploration rate - must be in the interval `[0,1]`
    /// - `rng` - Source of randomness for exploration
    pub fn new(config: QTableAgentConfig<E::Action>, rng: R) -> Result<Self> {
        if config.actions.is_empty() {
            return Err(Error::EmptyActionSet);
        }
        let mut seen = HashSet::with_capacity(config.actions.len());
        if let Some(action) = config.actions.iter().find(|&&a| !seen.insert(a)) {
            return Err(Error::DuplicateAction {
                action: format!("{action:?}"),
            });
        }
        ensure_interval!(config.alpha, open 0.0, 1.0);
        ensure_interval!(config.gamma, 0.0, 1.0);

        Ok(Self {
            q_table: HashMap::new(),
            actions: config.actions,
            exploration: EpsilonGreedy::new(config.epsilon)?,
            alpha: config.alpha,
            gamma: config.gamma,
            rng,
        })
    }

    pub fn actions(&self) -> &[E::Action] {
        &self.actions
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn epsilon(&self) -> f64 {
        self.exploration.epsilon()
    }

    /// Number of state action pairs recorded so far
    pub fn len(&self) -> usize {
        self.q_table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q_table.is_empty()
    }

    /// Get the Q value for a state action pair, recording a default of `0.0` for unseen pairs
    pub fn get_q(&mut self, state: &E::State, action: E::Action) -> f64 {
        *self.q_table.entry((state.key(), action)).or_insert(0.0)
    }

    /// Overwrite the Q value for a state action pair
    pub fn set_q(&mut self, state: &E::State, action: E::Action, value: f64) {
        self.q_table.insert((state.key(), action), value);
    }

    /// Choose an action for the given state using the epsilon greedy policy
    pub fn act(&mut self, state: &E::State) -> E::Action {
        match self.exploration.choose(&mut self.rng) {
            Choice::Explore => {
                let action = self.actions[self.rng.gen_range(0..self.actions.len())];
                log::trace!("explore: {action:?}");
                action
            }
            Choice::Exploit => self.greedy(state),
        }
    }

    /// The action with the highest Q value in the given state
    ///
    /// Ties go to the earliest action in the action set.
    pub fn greedy(&mut self, state: &E::State) -> E::Action {
        let key = state.key();
        let Self {
            q_table, actions, ..
        } = self;
        actions
            .iter()
            .map(|&a| (a, *q_table.entry((key, a)).or_insert(0.0)))
            .reduce(|best, candidate| if candidate.1 > best.1 { candidate } else { best })
            .map(|(action, _)| action)
            .expect("There is always at least one action available")
    }

    /// Learn from a single transition
    pub fn learn(&mut self, exp: &Exp<E>) {
        self.update(&exp.state, exp.action, exp.reward, &exp.next_state, exp.done);
    }

    /// One-step Q-learning update
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max<sub>a'</sub> Q(s',a') - Q(s,a)], with the bootstrap term
    /// dropped when `s'` is terminal.
    pub fn update(
        &mut self,
        state: &E::State,
        action: E::Action,
        reward: f64,
        next_state: &E::State,
        done: bool,
    ) {
        let q_value = self.get_q(state, action);
        let max_next_q = if done { 0.0 } else { self.max_q(next_state) };
        let new_q_value = q_value + self.alpha * (reward + self.gamma * max_next_q - q_value);
        self.set_q(state, action, new_q_value);
    }

    fn max_q(&mut self, state: &E::State) -> f64 {
        let key = state.key();
        let Self {
            q_table, actions, ..
        } = self;
        actions
            .iter()
            .map(|&a| *q_table.entry((key, a)).or_insert(0.0))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Scale the exploration rate by `rate`, once per finished episode
    pub fn decay_epsilon(&mut self, rate: f64) {
        self.exploration.decay(rate);
    }

    /// All recorded values, sorted by state key then action
    pub fn entries(&self) -> Vec<QEntry<Key<E>, E::Action>> {
        let mut entries = self
            .q_table
            .iter()
            .map(|(&(key, action), &value)| QEntry { key, action, value })
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| (a.key, a.action).cmp(&(b.key, b.action)));
        entries
    }

    /// A printable listing of the table with one `key|action: value` line per entry
    pub fn table_report(&self) -> QTableReport<Key<E>, E::Action> {
        QTableReport {
            entries: self.entries(),
        }
    }
}

/// Sorted snapshot of a Q-table, see [`QTableAgent::table_report`]
#[derive(Debug, Clone, PartialEq)]
pub struct QTableReport<K, A> {
    pub entries: Vec<QEntry<K, A>>,
}

impl<K: fmt::Display, A: fmt::Display> fmt::Display for QTableReport<K, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for QEntry { key, action, value } in &self.entries {
            writeln!(f, "{key}|{action}: {value:.3}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::env::tests::{MockEnv, MOCK_STEPS};
    use crate::env::{DiscreteActionSpace, Environment};

    use super::*;

    type Agent = QTableAgent<MockEnv>;

    fn config(epsilon: f64) -> QTableAgentConfig<i64> {
        QTableAgentConfig {
            actions: MockEnv::new().actions(),
            alpha: 0.1,
            gamma: 0.99,
            epsilon,
        }
    }

    #[test]
    fn config_validation() {
        let empty = QTableAgentConfig {
            actions: vec![],
            ..config(0.5)
        };
        assert_eq!(Agent::seeded(empty, 0).err(), Some(Error::EmptyActionSet));

        let duplicate = QTableAgentConfig {
            actions: vec![0, 1, 0],
            ..config(0.5)
        };
        assert_eq!(
            Agent::seeded(duplicate, 0).err(),
            Some(Error::DuplicateAction {
                action: "0".into()
            })
        );

        for (alpha, gamma, epsilon) in [(0.0, 0.5, 0.5), (1.5, 0.5, 0.5), (0.5, -0.1, 0.5), (0.5, 0.5, 2.0)] {
            let bad = QTableAgentConfig {
                alpha,
                gamma,
                ..config(epsilon)
            };
            assert!(
                matches!(Agent::seeded(bad, 0), Err(Error::OutOfRange { .. })),
                "({alpha}, {gamma}, {epsilon}) rejected"
            );
        }

        let edge = QTableAgentConfig {
            alpha: 1.0,
            gamma: 0.0,
            ..config(0.0)
        };
        assert!(Agent::seeded(edge, 0).is_ok(), "Closed bounds accepted");
    }

    #[test]
    fn q_values_default_to_zero() {
        let mut agent = Agent::seeded(config(1.0), 0).unwrap();
        assert!(agent.is_empty());
        for state in 0..5 {
            for action in [0, 1, 2] {
                assert_eq!(agent.get_q(&state, action), 0.0, "Unseen pair is zero");
            }
        }
        assert_eq!(agent.len(), 15, "Lookups record defaults");

        agent.set_q(&1, 2, -42.5);
        assert_eq!(agent.get_q(&1, 2), -42.5, "Values are stored unbounded");
    }

    #[test]
    fn terminal_update() {
        let mut agent = Agent::seeded(config(1.0), 0).unwrap();
        agent.update(&0, 1, 10.0, &1, true);
        assert!((agent.get_q(&0, 1) - 1.0).abs() < 1e-9, "0 + 0.1 * (10 + 0 - 0)");
    }

    #[test]
    fn bootstrapped_update() {
        let mut agent = Agent::seeded(config(1.0), 0).unwrap();
        agent.set_q(&1, 0, 2.0);
        agent.set_q(&1, 2, 5.0);
        agent.set_q(&0, 1, 1.0);

        agent.update(&0, 1, 3.0, &1, false);
        let expected = 1.0 + 0.1 * (3.0 + 0.99 * 5.0 - 1.0);
        assert!((agent.get_q(&0, 1) - expected).abs() < 1e-9, "Bootstraps off max next value");
    }

    #[test]
    fn terminal_update_ignores_next_values() {
        let mut agent = Agent::seeded(config(1.0), 0).unwrap();
        agent.set_q(&1, 2, 100.0);
        agent.update(&0, 0, 4.0, &1, true);
        assert!((agent.get_q(&0, 0) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn terminal_update_leaves_next_state_unrecorded() {
        let mut agent = Agent::seeded(config(1.0), 0).unwrap();
        agent.update(&(MOCK_STEPS - 1), 1, 1.0, &MOCK_STEPS, true);
        assert_eq!(agent.len(), 1, "Only the updated pair is recorded");
        assert!(
            agent.entries().iter().all(|e| e.key < MOCK_STEPS),
            "Terminal state key never read"
        );

        agent.update(&0, 1, 1.0, &1, false);
        assert_eq!(agent.len(), 2 + 3, "Bootstrapping records every next-state action");
    }

    #[test]
    fn update_is_off_policy() {
        // Same maximum in the next state, different greedy actions
        let mut agent = Agent::seeded(config(0.0), 0).unwrap();
        agent.set_q(&1, 0, 1.0);
        agent.set_q(&1, 1, 8.0);
        agent.set_q(&1, 2, 3.0);
        assert_eq!(agent.greedy(&1), 1);

        let mut sarsa_like = Agent::seeded(config(0.0), 0).unwrap();
        sarsa_like.set_q(&1, 0, 8.0);
        sarsa_like.set_q(&1, 1, 1.0);
        sarsa_like.set_q(&1, 2, 3.0);
        assert_eq!(sarsa_like.greedy(&1), 0);

        agent.update(&0, 2, 1.0, &1, false);
        sarsa_like.update(&0, 2, 1.0, &1, false);
        assert_eq!(
            agent.get_q(&0, 2),
            sarsa_like.get_q(&0, 2),
            "Target depends only on the maximum, not on which action holds it"
        );
    }

    #[test]
    fn greedy_tie_break_prefers_first_action() {
        let mut agent = Agent::seeded(config(0.0), 0).unwrap();
        assert_eq!(agent.act(&0), 0, "All zero, first action wins");

        agent.set_q(&0, 1, 2.0);
        agent.set_q(&0, 2, 2.0);
        assert_eq!(agent.act(&0), 1, "Earliest maximum wins");

        let reordered = QTableAgentConfig {
            actions: vec![2, 1, 0],
            ..config(0.0)
        };
        let mut agent = Agent::seeded(reordered, 0).unwrap();
        agent.set_q(&0, 1, 2.0);
        agent.set_q(&0, 2, 2.0);
        assert_eq!(agent.act(&0), 2, "Order follows the configured action set");
    }

    #[test]
    fn exploration_covers_action_set() {
        let mut agent = Agent::seeded(config(1.0), 11).unwrap();
        agent.set_q(&0, 0, 100.0);
        let mut counts = [0; 3];
        for _ in 0..3000 {
            counts[agent.act(&0) as usize] += 1;
        }
        for count in counts {
            assert!(count > 800, "Explored uniformly: {counts:?}");
        }
    }

    #[test]
    fn seeded_agents_are_reproducible() {
        let mut a = Agent::seeded(config(0.5), 3).unwrap();
        let mut b = Agent::seeded(config(0.5), 3).unwrap();
        let xs = (0..100).map(|s| a.act(&s)).collect::<Vec<_>>();
        let ys = (0..100).map(|s| b.act(&s)).collect::<Vec<_>>();
        assert_eq!(xs, ys);
    }

    #[test]
    fn learn_applies_transition() {
        let mut env = MockEnv::new();
        let mut agent = Agent::seeded(config(0.0), 0).unwrap();
        env.reset();
        let dones = (0..MOCK_STEPS)
            .map(|_| {
                let exp = env.step(2).unwrap();
                agent.learn(&exp);
                exp.done
            })
            .collect::<Vec<_>>();
        assert_eq!(dones, [false, false, true]);
        assert!((agent.get_q(&(MOCK_STEPS - 1), 2) - 0.2).abs() < 1e-9, "Terminal step learned");
        assert!((agent.get_q(&0, 2) - 0.2).abs() < 1e-9, "Earlier steps saw zero next values");
    }

    #[test]
    fn decay_epsilon_scales() {
        let mut agent = Agent::seeded(config(1.0), 0).unwrap();
        agent.decay_epsilon(0.5);
        agent.decay_epsilon(0.5);
        assert_eq!(agent.epsilon(), 0.25);
    }

    #[test]
    fn entries_are_sorted() {
        let mut agent = Agent::seeded(config(1.0), 0).unwrap();
        agent.set_q(&10, 1, 1.5);
        agent.set_q(&2, 2, -0.25);
        agent.set_q(&2, 0, 3.0);

        let entries = agent.entries();
        let keys = entries.iter().map(|e| (e.key, e.action)).collect::<Vec<_>>();
        assert_eq!(keys, [(2, 0), (2, 2), (10, 1)], "Sorted by key then action");

        assert_eq!(
            agent.table_report().to_string(),
            "2|0: 3.000\n2|2: -0.250\n10|1: 1.500\n"
        );
    }
}
