//! Expected SARSA agent

use qlearn_core::{Action, Agent, AgentConfig, LegalActions, QTable, Result, State};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::trace;

use crate::tabular::TabularCore;

/// Expected SARSA agent
///
/// Bootstraps on the expected next-state value under the agent's own
/// epsilon-greedy policy rather than on a sampled next action:
///
/// `Q(s,a) ← Q(s,a) + α·(r + γ·E[s'] - Q(s,a))`
///
/// See [`ExpectedSarsaAgent::expected_value`] for how `E[s']` weighs the
/// greedy and non-greedy actions.
#[derive(Debug)]
pub struct ExpectedSarsaAgent<S, A, R = StdRng> {
    core: TabularCore<S, A, R>,
}

impl<S, A> ExpectedSarsaAgent<S, A, StdRng>
where
    S: State,
    A: Action,
{
    /// Create a new Expected SARSA agent
    ///
    /// # Errors
    ///
    /// Returns `RLError::InvalidHyperparameter` or `RLError::Config` when
    /// `config` does not validate.
    pub fn new(
        config: AgentConfig,
        actions: impl LegalActions<S, A> + 'static,
    ) -> Result<Self> {
        Ok(Self {
            core: TabularCore::new(config, actions)?,
        })
    }
}

impl<S, A, R> ExpectedSarsaAgent<S, A, R>
where
    S: State,
    A: Action,
    R: Rng,
{
    /// Replace the random source
    pub fn with_rng<R2: Rng>(self, rng: R2) -> ExpectedSarsaAgent<S, A, R2> {
        ExpectedSarsaAgent {
            core: self.core.with_rng(rng),
        }
    }

    /// Use a seeded `StdRng` for reproducible runs
    pub fn with_seed(self, seed: u64) -> ExpectedSarsaAgent<S, A, StdRng> {
        ExpectedSarsaAgent {
            core: self.core.with_seed(seed),
        }
    }

    /// Learned Q-values
    pub fn q_table(&self) -> &QTable<S, A> {
        self.core.q_table()
    }

    /// Greedy actions at `state`, empty when terminal
    pub fn best_actions(&self, state: &S) -> Vec<A> {
        self.core
            .partition(state)
            .map(|partition| partition.best_actions())
            .unwrap_or_default()
    }

    /// Expected Q-value of `state` under the epsilon-greedy policy
    ///
    /// With `N` legal actions, each non-greedy action is taken with
    /// probability `ε/N` and each of the `|best|` greedy actions with
    /// `(1-ε)/|best| + ε/N`. Terminal states are worth `0.0`.
    pub fn expected_value(&self, state: &S) -> f64 {
        self.core
            .partition(state)
            .map_or(0.0, |partition| {
                partition.expected_value(self.core.config().epsilon)
            })
    }
}

impl<S, A, R> Agent<S, A> for ExpectedSarsaAgent<S, A, R>
where
    S: State,
    A: Action,
    R: Rng,
{
    fn name(&self) -> &str {
        "Expected SARSA"
    }

    fn legal_actions(&self, state: &S) -> Vec<A> {
        self.core.legal_actions(state)
    }

    fn q_value(&self, state: &S, action: &A) -> f64 {
        self.core.q_value(state, action)
    }

    fn value(&self, state: &S) -> f64 {
        self.core.value(state)
    }

    fn action(&mut self, state: &S) -> Option<A> {
        self.core.epsilon_greedy(state, None)
    }

    fn policy(&mut self, state: &S) -> Option<A> {
        self.core.greedy_action(state)
    }

    fn update(&mut self, state: &S, action: &A, next_state: &S, reward: f64) {
        let expected = self.expected_value(next_state);
        let target = reward + self.core.config().gamma * expected;
        trace!(expected, "expected sarsa look-ahead");
        self.core.td_update(state, action, target);
    }

    fn config(&self) -> &AgentConfig {
        self.core.config()
    }

    fn config_mut(&mut self) -> &mut AgentConfig {
        self.core.config_mut()
    }
}
