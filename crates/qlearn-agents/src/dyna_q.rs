//! Dyna-Q agent (Q-learning with model-based planning)

use qlearn_core::{Action, Agent, AgentConfig, LegalActions, QTable, Result, State};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::trace;

use crate::model::Model;
use crate::tabular::TabularCore;

/// Dyna-Q agent
///
/// Every real transition gets a Q-learning backup and is written to a
/// one-step [`Model`]. Then `planning_steps` simulated backups replay pairs
/// drawn uniformly, with replacement, from everything the model has seen.
/// Planning only ever mutates the Q-table. With zero planning steps the
/// agent is plain Q-learning.
#[derive(Debug)]
pub struct DynaQAgent<S, A, R = StdRng> {
    core: TabularCore<S, A, R>,
    model: Model<S, A>,
}

impl<S, A> DynaQAgent<S, A, StdRng>
where
    S: State,
    A: Action,
{
    /// Create a new Dyna-Q agent planning `config.planning_steps` times per update
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
            model: Model::new(),
        })
    }
}

impl<S, A, R> DynaQAgent<S, A, R>
where
    S: State,
    A: Action,
    R: Rng,
{
    /// Replace the random source
    pub fn with_rng<R2: Rng>(self, rng: R2) -> DynaQAgent<S, A, R2> {
        DynaQAgent {
            core: self.core.with_rng(rng),
            model: self.model,
        }
    }

    /// Use a seeded `StdRng` for reproducible runs
    pub fn with_seed(self, seed: u64) -> DynaQAgent<S, A, StdRng> {
        DynaQAgent {
            core: self.core.with_seed(seed),
            model: self.model,
        }
    }

    /// Learned Q-values
    pub fn q_table(&self) -> &QTable<S, A> {
        self.core.q_table()
    }

    /// Environment model built from real transitions
    pub fn model(&self) -> &Model<S, A> {
        &self.model
    }

    /// Simulated backups per real transition
    pub fn planning_steps(&self) -> usize {
        self.core.config().planning_steps
    }

    /// Change the number of simulated backups per real transition
    pub fn set_planning_steps(&mut self, steps: usize) {
        self.core.config_mut().planning_steps = steps;
    }

    /// Replay `steps` transitions sampled from the model
    ///
    /// A no-op while the model is empty.
    pub fn plan(&mut self, steps: usize) {
        if self.model.is_empty() {
            return;
        }
        for _ in 0..steps {
            let Some((state, action, next_state, reward)) =
                self.model.sample(self.core.rng_mut())
            else {
                break;
            };
            self.core
                .q_learning_update(state, action, next_state, reward);
        }
        trace!(steps, model_size = self.model.len(), "planning sweep");
    }
}

impl<S, A, R> Agent<S, A> for DynaQAgent<S, A, R>
where
    S: State,
    A: Action,
    R: Rng,
{
    fn name(&self) -> &str {
        "Dyna-Q"
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
        self.core
            .q_learning_update(state, action, next_state, reward);
        self.model.record(state, action, next_state, reward);
        self.plan(self.planning_steps());
    }

    fn config(&self) -> &AgentConfig {
        self.core.config()
    }

    fn config_mut(&mut self) -> &mut AgentConfig {
        self.core.config_mut()
    }
}
