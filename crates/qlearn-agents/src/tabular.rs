//! Shared scaffold for the tabular agents
//!
//! Q-learning, SARSA, Expected SARSA and Dyna-Q all own the same pieces: a
//! Q-table, hyperparameters, a legal-action source and a random number
//! generator. [`TabularCore`] bundles them together with the lookup,
//! tie-break and exploration logic so each agent only contributes its
//! bootstrap target.

use std::fmt;

use qlearn_core::{
    Action, ActionPartition, AgentConfig, EpsilonGreedy, LegalActions, QTable, Result, State,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// Epsilon-greedy choice over `legal` under the value function `q`
///
/// When not exploring, `preferred` wins if it is one of the legal actions;
/// otherwise the greedy action is drawn uniformly among near-ties.
pub(crate) fn epsilon_greedy<A, R, Q>(
    rng: &mut R,
    epsilon: f64,
    legal: &[A],
    preferred: Option<A>,
    q: Q,
) -> Option<A>
where
    A: Action,
    R: Rng + ?Sized,
    Q: Fn(&A) -> f64,
{
    EpsilonGreedy::new(epsilon).select(rng, legal, |rng| match preferred {
        Some(action) if legal.contains(&action) => Some(action),
        _ => greedy(rng, legal, q),
    })
}

/// Greedy choice over `legal` under `q`, ties broken uniformly at random
pub(crate) fn greedy<A, R, Q>(rng: &mut R, legal: &[A], q: Q) -> Option<A>
where
    A: Action,
    R: Rng + ?Sized,
    Q: Fn(&A) -> f64,
{
    let scored = legal
        .iter()
        .map(|action| (action.clone(), q(action)))
        .collect();
    ActionPartition::new(scored)?.choose_best(rng)
}

/// Q-table, hyperparameters, action source and RNG of a tabular agent
pub struct TabularCore<S, A, R = StdRng> {
    q_table: QTable<S, A>,
    config: AgentConfig,
    actions: Box<dyn LegalActions<S, A>>,
    rng: R,
}

impl<S, A> TabularCore<S, A, StdRng>
where
    S: State,
    A: Action,
{
    /// Create a core with an entropy-seeded RNG
    ///
    /// # Errors
    ///
    /// Returns `RLError::InvalidHyperparameter` or `RLError::Config` when
    /// `config` does not validate.
    pub fn new(config: AgentConfig, actions: impl LegalActions<S, A> + 'static) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            q_table: QTable::new(),
            config,
            actions: Box::new(actions),
            rng: StdRng::from_entropy(),
        })
    }
}

impl<S, A, R> TabularCore<S, A, R>
where
    S: State,
    A: Action,
    R: Rng,
{
    /// Replace the random source
    pub fn with_rng<R2: Rng>(self, rng: R2) -> TabularCore<S, A, R2> {
        TabularCore {
            q_table: self.q_table,
            config: self.config,
            actions: self.actions,
            rng,
        }
    }

    /// Replace the random source with a seeded `StdRng`
    pub fn with_seed(self, seed: u64) -> TabularCore<S, A, StdRng> {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    /// Learned Q-values
    pub fn q_table(&self) -> &QTable<S, A> {
        &self.q_table
    }

    /// Hyperparameters
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Mutable hyperparameters
    pub fn config_mut(&mut self) -> &mut AgentConfig {
        &mut self.config
    }

    /// Random source, shared by exploration, tie-breaks and planning
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Legal actions at `state`
    pub fn legal_actions(&self, state: &S) -> Vec<A> {
        self.actions.legal_actions(state)
    }

    /// Stored estimate or `0.0`
    pub fn q_value(&self, state: &S, action: &A) -> f64 {
        self.q_table.get(state, action)
    }

    /// Greedy/other split of the legal actions at `state`
    pub fn partition(&self, state: &S) -> Option<ActionPartition<A>> {
        let scored = self
            .legal_actions(state)
            .into_iter()
            .map(|action| {
                let value = self.q_table.get(state, &action);
                (action, value)
            })
            .collect();
        ActionPartition::new(scored)
    }

    /// `max_a Q(state, a)`, `0.0` at terminal states
    pub fn value(&self, state: &S) -> f64 {
        self.partition(state)
            .map_or(0.0, |partition| partition.max_value)
    }

    /// Greedy action with random tie-break, `None` at terminal states
    pub fn greedy_action(&mut self, state: &S) -> Option<A> {
        let legal = self.legal_actions(state);
        let q_table = &self.q_table;
        greedy(&mut self.rng, &legal, |action| q_table.get(state, action))
    }

    /// Epsilon-greedy action, preferring `preferred` over the greedy choice
    pub fn epsilon_greedy(&mut self, state: &S, preferred: Option<A>) -> Option<A> {
        let legal = self.legal_actions(state);
        let q_table = &self.q_table;
        epsilon_greedy(
            &mut self.rng,
            self.config.epsilon,
            &legal,
            preferred,
            |action| q_table.get(state, action),
        )
    }

    /// Q-learning backup `Q ← (1-α)·Q + α·(r + γ·V(s'))`
    pub fn q_learning_update(&mut self, state: &S, action: &A, next_state: &S, reward: f64) {
        let alpha = self.config.alpha;
        let current = self.q_value(state, action);
        let sample = reward + self.config.gamma * self.value(next_state);
        let updated = (1.0 - alpha) * current + alpha * sample;
        trace!(?state, ?action, current, sample, updated, "q-learning backup");
        self.q_table.set(state.clone(), action.clone(), updated);
    }

    /// TD step toward `target`: `Q ← Q + α·(target - Q)`
    pub fn td_update(&mut self, state: &S, action: &A, target: f64) {
        let current = self.q_value(state, action);
        let td_error = target - current;
        let updated = current + self.config.alpha * td_error;
        trace!(?state, ?action, target, td_error, updated, "td backup");
        self.q_table.set(state.clone(), action.clone(), updated);
    }
}

impl<S, A, R> fmt::Debug for TabularCore<S, A, R>
where
    S: fmt::Debug,
    A: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabularCore")
            .field("q_table", &self.q_table)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn chain(state: &u8) -> Vec<char> {
        if *state >= 3 {
            Vec::new()
        } else {
            vec!['l', 'r']
        }
    }

    fn core(config: AgentConfig) -> TabularCore<u8, char> {
        TabularCore::new(config, chain).unwrap().with_seed(11)
    }

    #[test]
    fn test_terminal_value_and_action() {
        let mut core = core(AgentConfig::default());
        assert_eq!(core.value(&3), 0.0);
        assert!(core.greedy_action(&3).is_none());
        assert!(core.epsilon_greedy(&3, Some('l')).is_none());
    }

    #[test]
    fn test_q_learning_backup() {
        let mut core = core(AgentConfig::default().with_alpha(0.5).with_gamma(1.0));
        core.q_learning_update(&0, &'r', &1, 10.0);
        assert_relative_eq!(core.q_value(&0, &'r'), 5.0);
    }

    #[test]
    fn test_preferred_action_must_be_legal() {
        let mut core = core(AgentConfig::default().with_epsilon(0.0));
        core.td_update(&0, &'l', 1.0);
        // 'x' is never legal, so the greedy action is used instead.
        assert_eq!(core.epsilon_greedy(&0, Some('x')), Some('l'));
        assert_eq!(core.epsilon_greedy(&0, Some('r')), Some('r'));
    }
}
