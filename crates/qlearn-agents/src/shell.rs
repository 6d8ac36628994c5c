//! Episode bookkeeping around an [`Agent`]
//!
//! The shell plays the part of the base reinforcement-learning harness: it
//! remembers the last state and action, turns observations into learning
//! updates, accumulates rewards per episode, and switches learning off once
//! the configured number of training episodes has been played.

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use qlearn_core::{Action, Agent, State, Trajectory, Transition};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// Outcome of one finished episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Episode ID
    pub id: Uuid,
    /// One-based position of the episode in the run
    pub index: usize,
    /// Total reward
    pub reward: f64,
    /// Discounted return from the first step
    pub discounted_return: f64,
    /// Number of observed transitions
    pub steps: usize,
    /// Whether the episode counted towards training
    pub training: bool,
    /// Start time
    pub start_time: DateTime<Utc>,
    /// End time
    pub end_time: DateTime<Utc>,
}

/// Episode lifecycle wrapper for any agent
pub struct ReinforcementShell<G, S, A> {
    agent: G,
    last_state: Option<S>,
    last_action: Option<A>,
    trajectory: Trajectory<S, A>,
    episode_id: Uuid,
    episode_start: DateTime<Utc>,
    episodes_so_far: usize,
    accum_train_rewards: f64,
    accum_test_rewards: f64,
    window_rewards: f64,
    window_start: DateTime<Utc>,
    _marker: PhantomData<fn() -> (S, A)>,
}

impl<G, S, A> ReinforcementShell<G, S, A>
where
    G: Agent<S, A>,
    S: State,
    A: Action,
{
    /// Wrap an agent; the first episode is started immediately
    pub fn new(agent: G) -> Self {
        let now = Utc::now();
        let mut shell = Self {
            agent,
            last_state: None,
            last_action: None,
            trajectory: Trajectory::new(),
            episode_id: Uuid::new_v4(),
            episode_start: now,
            episodes_so_far: 0,
            accum_train_rewards: 0.0,
            accum_test_rewards: 0.0,
            window_rewards: 0.0,
            window_start: now,
            _marker: PhantomData,
        };
        shell.start_episode();
        shell
    }

    /// Wrapped agent
    #[must_use]
    pub fn agent(&self) -> &G {
        &self.agent
    }

    /// Mutable wrapped agent
    pub fn agent_mut(&mut self) -> &mut G {
        &mut self.agent
    }

    /// Unwrap the agent
    #[must_use]
    pub fn into_inner(self) -> G {
        self.agent
    }

    /// Episodes finished so far
    #[must_use]
    pub fn episodes_so_far(&self) -> usize {
        self.episodes_so_far
    }

    /// Whether the current episode still counts as training
    #[must_use]
    pub fn is_in_training(&self) -> bool {
        self.episodes_so_far < self.agent.config().num_training
    }

    /// Whether training is over
    #[must_use]
    pub fn is_in_testing(&self) -> bool {
        !self.is_in_training()
    }

    /// Transitions observed in the current episode
    #[must_use]
    pub fn trajectory(&self) -> &Trajectory<S, A> {
        &self.trajectory
    }

    /// Mean reward over finished training episodes, `0.0` before the first
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_train_reward(&self) -> f64 {
        let episodes = self.episodes_so_far.min(self.agent.config().num_training);
        if episodes == 0 {
            0.0
        } else {
            self.accum_train_rewards / episodes as f64
        }
    }

    /// Mean reward over finished testing episodes, `0.0` before the first
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_test_reward(&self) -> f64 {
        let episodes = self
            .episodes_so_far
            .saturating_sub(self.agent.config().num_training);
        if episodes == 0 {
            0.0
        } else {
            self.accum_test_rewards / episodes as f64
        }
    }

    /// Begin a new episode
    pub fn start_episode(&mut self) {
        if self.episodes_so_far == 0 {
            info!(
                agent = self.agent.name(),
                training_episodes = self.agent.config().num_training,
                "beginning training"
            );
        }
        self.last_state = None;
        self.last_action = None;
        self.trajectory = Trajectory::new();
        self.episode_id = Uuid::new_v4();
        self.episode_start = Utc::now();
        self.agent.on_episode_start();
    }

    /// Pick an action through the agent and remember it
    pub fn action(&mut self, state: &S) -> Option<A> {
        let action = self.agent.action(state);
        if let Some(action) = &action {
            self.do_action(state, action);
        }
        action
    }

    /// Remember the action taken in `state` for the next observation
    pub fn do_action(&mut self, state: &S, action: &A) {
        self.last_state = Some(state.clone());
        self.last_action = Some(action.clone());
    }

    /// Record a transition and let the agent learn from it
    pub fn observe_transition(&mut self, state: &S, action: &A, next_state: &S, reward: f64) {
        let transition = Transition::new(state.clone(), action.clone(), next_state.clone(), reward);
        self.agent.observe(&transition);
        self.trajectory.push(transition);
    }

    /// Observe arriving in `state` after the remembered action, earning `reward`
    ///
    /// Does nothing when no action is pending.
    pub fn observation_function(&mut self, state: &S, reward: f64) {
        if let (Some(last_state), Some(last_action)) =
            (self.last_state.take(), self.last_action.take())
        {
            self.observe_transition(&last_state, &last_action, state, reward);
        }
    }

    /// Close the current episode and update the training/testing tallies
    ///
    /// Once the configured number of training episodes is reached, epsilon
    /// and alpha are set to `0.0`: no more exploration and no more learning.
    pub fn stop_episode(&mut self) -> EpisodeSummary {
        let num_training = self.agent.config().num_training;
        let training = self.episodes_so_far < num_training;
        let reward = self.trajectory.total_reward;
        if training {
            self.accum_train_rewards += reward;
        } else {
            self.accum_test_rewards += reward;
        }
        self.episodes_so_far += 1;
        if self.episodes_so_far >= num_training {
            let config = self.agent.config_mut();
            config.epsilon = 0.0;
            config.alpha = 0.0;
        }
        self.window_rewards += reward;

        let summary = EpisodeSummary {
            id: self.episode_id,
            index: self.episodes_so_far,
            reward,
            discounted_return: self
                .trajectory
                .discounted_return(self.agent.config().gamma),
            steps: self.trajectory.len(),
            training,
            start_time: self.episode_start,
            end_time: Utc::now(),
        };
        debug!(
            episode = summary.index,
            reward = summary.reward,
            steps = summary.steps,
            training,
            "episode finished"
        );
        summary
    }

    /// End-of-episode hook: observe the terminal step, stop, and report
    pub fn final_state(&mut self, state: &S, reward: f64) -> EpisodeSummary {
        self.observation_function(state, reward);
        let summary = self.stop_episode();

        let config = self.agent.config();
        let num_training = config.num_training;
        let interval = config.report_interval.max(1);
        if self.episodes_so_far % interval == 0 {
            self.report(interval, num_training);
        }
        if self.episodes_so_far == num_training {
            info!(
                agent = self.agent.name(),
                "training done (turning off epsilon and alpha)"
            );
            self.agent.on_training_complete();
        }
        summary
    }

    #[allow(clippy::cast_precision_loss)]
    fn report(&mut self, interval: usize, num_training: usize) {
        let window_average = self.window_rewards / interval as f64;
        let elapsed = Utc::now() - self.window_start;
        if self.episodes_so_far <= num_training {
            info!(
                completed = self.episodes_so_far,
                total = num_training,
                average_reward = self.average_train_reward(),
                window_average,
                elapsed_ms = elapsed.num_milliseconds(),
                "training status"
            );
        } else {
            info!(
                completed = self.episodes_so_far - num_training,
                average_reward = self.average_test_reward(),
                window_average,
                elapsed_ms = elapsed.num_milliseconds(),
                "testing status"
            );
        }
        self.window_rewards = 0.0;
        self.window_start = Utc::now();
    }
}

impl<G, S, A> std::fmt::Debug for ReinforcementShell<G, S, A>
where
    G: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReinforcementShell")
            .field("agent", &self.agent)
            .field("episodes_so_far", &self.episodes_so_far)
            .field("accum_train_rewards", &self.accum_train_rewards)
            .field("accum_test_rewards", &self.accum_test_rewards)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{QLearningAgent, SarsaAgent};
    use approx::assert_relative_eq;
    use qlearn_core::AgentConfig;

    fn two_step(state: &u8) -> Vec<char> {
        if *state < 2 {
            vec!['f']
        } else {
            Vec::new()
        }
    }

    fn play(shell: &mut ReinforcementShell<QLearningAgent<u8, char>, u8, char>) -> EpisodeSummary {
        shell.start_episode();
        let mut state = 0u8;
        while shell.action(&state).is_some() {
            let next = state + 1;
            if two_step(&next).is_empty() {
                return shell.final_state(&next, 1.0);
            }
            shell.observation_function(&next, 0.0);
            state = next;
        }
        unreachable!("corridor always ends in the terminal state")
    }

    fn shell(num_training: usize) -> ReinforcementShell<QLearningAgent<u8, char>, u8, char> {
        let config = AgentConfig::default()
            .with_alpha(0.5)
            .with_gamma(1.0)
            .with_num_training(num_training)
            .with_report_interval(2);
        ReinforcementShell::new(QLearningAgent::new(config, two_step).unwrap().with_seed(0))
    }

    #[test]
    fn test_episode_feeds_updates() {
        let mut shell = shell(5);
        let summary = play(&mut shell);
        assert_eq!(summary.index, 1);
        assert_eq!(summary.steps, 2);
        assert!(summary.training);
        assert_relative_eq!(summary.reward, 1.0);
        assert_relative_eq!(shell.agent().q_value(&1, &'f'), 0.5);
    }

    #[test]
    fn test_training_switches_off_learning() {
        let mut shell = shell(3);
        for _ in 0..3 {
            assert!(shell.is_in_training());
            play(&mut shell);
        }
        assert!(shell.is_in_testing());
        assert_eq!(shell.agent().config().epsilon, 0.0);
        assert_eq!(shell.agent().config().alpha, 0.0);

        let frozen = shell.agent().q_value(&1, &'f');
        let summary = play(&mut shell);
        assert!(!summary.training);
        assert_eq!(shell.agent().q_value(&1, &'f'), frozen);
        assert_relative_eq!(shell.average_train_reward(), 1.0);
        assert_relative_eq!(shell.average_test_reward(), 1.0);
    }

    #[test]
    fn test_observation_without_pending_action_is_ignored() {
        let mut shell = shell(1);
        shell.observation_function(&1, 10.0);
        assert!(shell.trajectory().is_empty());
        assert!(shell.agent().q_table().is_empty());
    }

    #[test]
    fn test_start_episode_resets_sarsa_cache() {
        let config = AgentConfig::default().with_num_training(1);
        let agent = SarsaAgent::new(config, two_step).unwrap().with_seed(0);
        let mut shell = ReinforcementShell::new(agent);
        shell.observe_transition(&0, &'f', &1, 0.0);
        assert!(shell.agent().next_action().is_some());
        shell.start_episode();
        assert!(shell.agent().next_action().is_none());
        assert!(shell.trajectory().is_empty());
    }
}
