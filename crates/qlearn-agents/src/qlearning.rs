//! Q-learning agent (off-policy TD control)

use qlearn_core::{Action, Agent, AgentConfig, LegalActions, QTable, Result, State};
use rand::rngs::StdRng;
use rand::Rng;

use crate::tabular::TabularCore;

/// Q-learning agent
///
/// Learns Q* by always bootstrapping on the maximum next-state value,
/// regardless of the action actually taken next:
///
/// `Q(s,a) ← (1-α)·Q(s,a) + α·(r + γ·max_a' Q(s',a'))`
#[derive(Debug)]
pub struct QLearningAgent<S, A, R = StdRng> {
    core: TabularCore<S, A, R>,
}

impl<S, A> QLearningAgent<S, A, StdRng>
where
    S: State,
    A: Action,
{
    /// Create a new Q-learning agent
    ///
    /// # Arguments
    ///
    /// * `config` - Hyperparameters (epsilon, alpha, gamma)
    /// * `actions` - Source of the legal actions of each state
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

impl<S, A, R> QLearningAgent<S, A, R>
where
    S: State,
    A: Action,
    R: Rng,
{
    /// Replace the random source
    pub fn with_rng<R2: Rng>(self, rng: R2) -> QLearningAgent<S, A, R2> {
        QLearningAgent {
            core: self.core.with_rng(rng),
        }
    }

    /// Use a seeded `StdRng` for reproducible runs
    pub fn with_seed(self, seed: u64) -> QLearningAgent<S, A, StdRng> {
        QLearningAgent {
            core: self.core.with_seed(seed),
        }
    }

    /// Learned Q-values
    pub fn q_table(&self) -> &QTable<S, A> {
        self.core.q_table()
    }
}

impl<S, A, R> Agent<S, A> for QLearningAgent<S, A, R>
where
    S: State,
    A: Action,
    R: Rng,
{
    fn name(&self) -> &str {
        "Q-Learning"
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
        self.core.q_learning_update(state, action, next_state, reward);
    }

    fn config(&self) -> &AgentConfig {
        self.core.config()
    }

    fn config_mut(&mut self) -> &mut AgentConfig {
        self.core.config_mut()
    }
}
