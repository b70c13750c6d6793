use rand::{rngs::StdRng, Rng};

use crate::{
    algo::{tabular::TableKey, QTableAgent},
    env::{Environment, StateKey},
    error::Result,
    exp::Exp,
    util::ensure_interval,
};

/// Configuration for the [`Trainer`]
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    /// Number of episodes run by [`Trainer::train`]
    pub episodes: u32,
    /// Factor applied to epsilon after every episode, in `(0,1]`
    pub epsilon_decay: f64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            episodes: 100,
            epsilon_decay: 0.99,
        }
    }
}

/// Statistics for one finished episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    /// 1-based episode number
    pub episode: u32,
    pub steps: u32,
    pub total_reward: f64,
    /// Exploration rate after the end-of-episode decay
    pub epsilon: f64,
}

/// Summaries of every episode of a training run, in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingReport {
    pub episodes: Vec<EpisodeSummary>,
}

impl TrainingReport {
    pub fn mean_reward(&self) -> Option<f64> {
        if self.episodes.is_empty() {
            return None;
        }
        let total: f64 = self.episodes.iter().map(|e| e.total_reward).sum();
        Some(total / self.episodes.len() as f64)
    }

    /// The episode with the highest total reward, earliest first on ties
    pub fn best(&self) -> Option<&EpisodeSummary> {
        self.episodes
            .iter()
            .reduce(|best, e| if e.total_reward > best.total_reward { e } else { best })
    }

    pub fn final_epsilon(&self) -> Option<f64> {
        self.episodes.last().map(|e| e.epsilon)
    }
}

type StepHook<'a, E> = Box<dyn FnMut(&Exp<E>) + 'a>;

/// Drives a [`QTableAgent`] through repeated episodes of an [`Environment`]
///
/// Every episode resets the environment, alternates action selection, environment steps and
/// value updates until the environment reports `done`, then decays the agent's epsilon once.
/// `'a` bounds the optional step hook, so hooks may borrow from the caller.
pub struct Trainer<'a, E, R = StdRng>
where
    E: Environment,
    E::State: StateKey,
    E::Action: TableKey,
    R: Rng,
{
    env: E,
    agent: QTableAgent<E, R>,
    config: TrainerConfig,
    episode: u32,
    hook: Option<StepHook<'a, E>>,
}

impl<'a, E, R> Trainer<'a, E, R>
where
    E: Environment,
    E::State: StateKey,
    E::Action: TableKey,
    R: Rng,
{
    /// Pair an environment with an agent
    ///
    /// Fails if `config.epsilon_decay` is not in `(0,1]`
    pub fn new(env: E, agent: QTableAgent<E, R>, config: TrainerConfig) -> Result<Self> {
        ensure_interval!(config.epsilon_decay, open 0.0, 1.0);
        Ok(Self {
            env,
            agent,
            config,
            episode: 0,
            hook: None,
        })
    }

    /// Register a callback run after every transition has been learned
    ///
    /// The hook observes transitions only, e.g. for rendering or pacing.
    pub fn with_step_hook(mut self, hook: impl FnMut(&Exp<E>) + 'a) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn agent(&self) -> &QTableAgent<E, R> {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut QTableAgent<E, R> {
        &mut self.agent
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    /// Number of episodes completed so far
    pub fn episodes_run(&self) -> u32 {
        self.episode
    }

    pub fn into_parts(self) -> (E, QTableAgent<E, R>) {
        (self.env, self.agent)
    }

    /// Run a single episode to completion
    pub fn run_episode(&mut self) -> Result<EpisodeSummary> {
        let episode = self.episode + 1;
        let mut state = self.env.reset();
        let mut steps = 0;
        let mut total_reward = 0.0;

        loop {
            let action = self.agent.act(&state);
            let exp = self.env.step(action)?;
            self.agent.learn(&exp);
            steps += 1;
            total_reward += exp.reward;
            log::debug!(
                "episode {episode} step {steps}: action {:?}, reward {}",
                exp.action,
                exp.reward
            );

            if let Some(hook) = self.hook.as_mut() {
                hook(&exp);
            }
            if exp.done {
                break;
            }
            state = exp.next_state;
        }

        self.agent.decay_epsilon(self.config.epsilon_decay);
        self.episode = episode;

        let summary = EpisodeSummary {
            episode,
            steps,
            total_reward,
            epsilon: self.agent.epsilon(),
        };
        log::info!(
            "Episode {episode} finished with total reward: {total_reward} and epsilon: {:.3}",
            summary.epsilon
        );
        Ok(summary)
    }

    /// Run the configured number of episodes
    pub fn train(&mut self) -> Result<TrainingReport> {
        log::info!("Starting training for {} episodes", self.config.episodes);
        let mut report = TrainingReport {
            episodes: Vec::with_capacity(self.config.episodes as usize),
        };
        for _ in 0..self.config.episodes {
            report.episodes.push(self.run_episode()?);
        }

        log::info!(
            "Training completed with {} learned values, mean reward {:.3}",
            self.agent.len(),
            report.mean_reward().unwrap_or_default()
        );
        for entry in self.agent.entries() {
            log::debug!("{:?}|{:?}: {:.3}", entry.key, entry.action, entry.value);
        }
        Ok(report)
    }
}
