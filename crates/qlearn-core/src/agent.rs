//! The agent contract exposed to a driving harness

use crate::config::{check_alpha, check_epsilon, check_gamma};
use crate::{ActionPartition, AgentConfig, Result, Transition};

/// Core agent trait
///
/// A harness selects moves with [`Agent::action`] and feeds every observed
/// transition back through [`Agent::update`]. An agent never calls `update`
/// on itself. The read-only queries (`q_value`, `value`, `policy`) are there
/// for introspection and tests.
pub trait Agent<S, A> {
    /// Short human readable algorithm name
    fn name(&self) -> &str;

    /// Legal actions at `state`, empty when terminal
    fn legal_actions(&self, state: &S) -> Vec<A>;

    /// Current estimate of `Q(state, action)`
    fn q_value(&self, state: &S, action: &A) -> f64;

    /// Choose the action to take in `state`, `None` when terminal
    fn action(&mut self, state: &S) -> Option<A>;

    /// Greedy action under the current estimates, ties broken at random
    fn policy(&mut self, state: &S) -> Option<A>;

    /// Apply one learning step for `state --action--> next_state`
    fn update(&mut self, state: &S, action: &A, next_state: &S, reward: f64);

    /// Hyperparameters
    fn config(&self) -> &AgentConfig;

    /// Mutable hyperparameters, bypassing range checks
    fn config_mut(&mut self) -> &mut AgentConfig;

    /// Legal actions of `state` scored and split into greedy and other groups
    fn partition(&self, state: &S) -> Option<ActionPartition<A>> {
        let scored = self
            .legal_actions(state)
            .into_iter()
            .map(|action| {
                let value = self.q_value(state, &action);
                (action, value)
            })
            .collect();
        ActionPartition::new(scored)
    }

    /// `max_a Q(state, a)` over legal actions, `0.0` when terminal
    fn value(&self, state: &S) -> f64 {
        self.partition(state)
            .map_or(0.0, |partition| partition.max_value)
    }

    /// Apply a learning step from a recorded transition
    fn observe(&mut self, transition: &Transition<S, A>) {
        self.update(
            &transition.state,
            &transition.action,
            &transition.next_state,
            transition.reward.value(),
        );
    }

    /// Called when a new episode begins
    fn on_episode_start(&mut self) {}

    /// Called once when the configured number of training episodes is reached
    fn on_training_complete(&self) {}

    /// Set the exploration probability
    ///
    /// # Errors
    ///
    /// Rejects values outside `[0, 1]`.
    fn set_epsilon(&mut self, epsilon: f64) -> Result<()> {
        check_epsilon(epsilon)?;
        self.config_mut().epsilon = epsilon;
        Ok(())
    }

    /// Set the learning rate
    ///
    /// # Errors
    ///
    /// Rejects values outside `(0, 1]`.
    fn set_learning_rate(&mut self, alpha: f64) -> Result<()> {
        check_alpha(alpha)?;
        self.config_mut().alpha = alpha;
        Ok(())
    }

    /// Set the discount factor
    ///
    /// # Errors
    ///
    /// Rejects values outside `[0, 1]`.
    fn set_discount(&mut self, gamma: f64) -> Result<()> {
        check_gamma(gamma)?;
        self.config_mut().gamma = gamma;
        Ok(())
    }
}
