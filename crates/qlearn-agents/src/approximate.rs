//! Approximate Q-learning with a linear value model

use std::fmt;

use qlearn_core::{
    Action, Agent, AgentConfig, FeatureExtractor, LegalActions, Result, State, Weights,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::tabular::{epsilon_greedy, greedy};

/// Linear approximate Q-learning agent
///
/// `Q(s,a) = Σ_f w[f]·feature[f](s,a)`. Each update takes one gradient step
/// on the squared TD error:
///
/// ```text
/// difference = (r + γ·max_a' Q(s',a')) - Q(s,a)
/// w[f]      += α·difference·feature[f](s,a)   for every feature of (s,a)
/// ```
///
/// [`AgentConfig::pacman`] holds the hyperparameters this agent is usually
/// run with.
pub struct ApproximateQAgent<S, A, R = StdRng> {
    weights: Weights,
    extractor: Box<dyn FeatureExtractor<S, A>>,
    actions: Box<dyn LegalActions<S, A>>,
    config: AgentConfig,
    rng: R,
}

impl<S, A> ApproximateQAgent<S, A, StdRng>
where
    S: State,
    A: Action,
{
    /// Create a new approximate Q-learning agent
    ///
    /// # Arguments
    ///
    /// * `config` - Hyperparameters (epsilon, alpha, gamma)
    /// * `actions` - Source of the legal actions of each state
    /// * `extractor` - Feature extractor, called for every queried pair
    ///
    /// # Errors
    ///
    /// Returns `RLError::InvalidHyperparameter` or `RLError::Config` when
    /// `config` does not validate.
    pub fn new(
        config: AgentConfig,
        actions: impl LegalActions<S, A> + 'static,
        extractor: impl FeatureExtractor<S, A> + 'static,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            weights: Weights::new(),
            extractor: Box::new(extractor),
            actions: Box::new(actions),
            config,
            rng: StdRng::from_entropy(),
        })
    }
}

impl<S, A, R> ApproximateQAgent<S, A, R>
where
    S: State,
    A: Action,
    R: Rng,
{
    /// Replace the random source
    pub fn with_rng<R2: Rng>(self, rng: R2) -> ApproximateQAgent<S, A, R2> {
        ApproximateQAgent {
            weights: self.weights,
            extractor: self.extractor,
            actions: self.actions,
            config: self.config,
            rng,
        }
    }

    /// Use a seeded `StdRng` for reproducible runs
    pub fn with_seed(self, seed: u64) -> ApproximateQAgent<S, A, StdRng> {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    /// Learned feature weights
    pub fn weights(&self) -> &Weights {
        &self.weights
    }
}

impl<S, A, R> Agent<S, A> for ApproximateQAgent<S, A, R>
where
    S: State,
    A: Action,
    R: Rng,
{
    fn name(&self) -> &str {
        "Approximate Q-Learning"
    }

    fn legal_actions(&self, state: &S) -> Vec<A> {
        self.actions.legal_actions(state)
    }

    fn q_value(&self, state: &S, action: &A) -> f64 {
        self.weights
            .dot(&self.extractor.features(state, action))
    }

    fn action(&mut self, state: &S) -> Option<A> {
        let legal = self.legal_actions(state);
        let weights = &self.weights;
        let extractor = &self.extractor;
        epsilon_greedy(&mut self.rng, self.config.epsilon, &legal, None, |action| {
            weights.dot(&extractor.features(state, action))
        })
    }

    fn policy(&mut self, state: &S) -> Option<A> {
        let legal = self.legal_actions(state);
        let weights = &self.weights;
        let extractor = &self.extractor;
        greedy(&mut self.rng, &legal, |action| {
            weights.dot(&extractor.features(state, action))
        })
    }

    fn update(&mut self, state: &S, action: &A, next_state: &S, reward: f64) {
        let features = self.extractor.features(state, action);
        let current = self.weights.dot(&features);
        let difference = (reward + self.config.gamma * self.value(next_state)) - current;
        let step = self.config.alpha * difference;
        trace!(?state, ?action, current, difference, "approximate backup");
        for (feature, value) in features.iter() {
            self.weights.add(feature.clone(), step * value);
        }
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut AgentConfig {
        &mut self.config
    }

    fn on_training_complete(&self) {
        let mut weights: Vec<_> = self.weights.iter().collect();
        weights.sort_by(|a, b| a.0.cmp(b.0));
        debug!(?weights, "final feature weights");
    }
}

impl<S, A, R> fmt::Debug for ApproximateQAgent<S, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApproximateQAgent")
            .field("weights", &self.weights)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
