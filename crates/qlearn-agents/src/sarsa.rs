//! SARSA agent (on-policy TD control)

use qlearn_core::{Action, Agent, AgentConfig, LegalActions, QTable, Result, State};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::trace;

use crate::tabular::TabularCore;

/// SARSA agent
///
/// Each update picks the look-ahead action `a' = policy(s')`, bootstraps on
/// it and caches it:
///
/// `Q(s,a) ← Q(s,a) + α·(r + γ·Q(s',a') - Q(s,a))`
///
/// The next [`Agent::action`] call returns the cached action unless the
/// exploration coin comes up, so the bootstrap action and the action taken
/// agree whenever the agent exploits. An exploratory move does not refresh
/// the cache, which makes this an approximation of strict on-policy SARSA.
/// The cache is only used when it is legal in the queried state and is
/// cleared at the start of every episode.
#[derive(Debug)]
pub struct SarsaAgent<S, A, R = StdRng> {
    core: TabularCore<S, A, R>,
    next_action: Option<A>,
}

impl<S, A> SarsaAgent<S, A, StdRng>
where
    S: State,
    A: Action,
{
    /// Create a new SARSA agent
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
            next_action: None,
        })
    }
}

impl<S, A, R> SarsaAgent<S, A, R>
where
    S: State,
    A: Action,
    R: Rng,
{
    /// Replace the random source
    pub fn with_rng<R2: Rng>(self, rng: R2) -> SarsaAgent<S, A, R2> {
        SarsaAgent {
            core: self.core.with_rng(rng),
            next_action: self.next_action,
        }
    }

    /// Use a seeded `StdRng` for reproducible runs
    pub fn with_seed(self, seed: u64) -> SarsaAgent<S, A, StdRng> {
        SarsaAgent {
            core: self.core.with_seed(seed),
            next_action: self.next_action,
        }
    }

    /// Learned Q-values
    pub fn q_table(&self) -> &QTable<S, A> {
        self.core.q_table()
    }

    /// Look-ahead action cached by the last update
    pub fn next_action(&self) -> Option<&A> {
        self.next_action.as_ref()
    }
}

impl<S, A, R> Agent<S, A> for SarsaAgent<S, A, R>
where
    S: State,
    A: Action,
    R: Rng,
{
    fn name(&self) -> &str {
        "SARSA"
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
        let cached = self.next_action.clone();
        self.core.epsilon_greedy(state, cached)
    }

    fn policy(&mut self, state: &S) -> Option<A> {
        self.core.greedy_action(state)
    }

    fn update(&mut self, state: &S, action: &A, next_state: &S, reward: f64) {
        let next_action = self.core.greedy_action(next_state);
        let next_q = next_action
            .as_ref()
            .map_or(0.0, |a| self.core.q_value(next_state, a));
        let target = reward + self.core.config().gamma * next_q;
        trace!(?next_action, next_q, "sarsa look-ahead");
        self.core.td_update(state, action, target);
        self.next_action = next_action;
    }

    fn config(&self) -> &AgentConfig {
        self.core.config()
    }

    fn config_mut(&mut self) -> &mut AgentConfig {
        self.core.config_mut()
    }

    fn on_episode_start(&mut self) {
        self.next_action = None;
    }
}
