//! Environment trait and step type

use qlearn_core::{Action, Reward, State};

/// Result of a single environment step
#[derive(Debug, Clone, PartialEq)]
pub struct Step<S> {
    /// State reached by the step
    pub state: S,
    /// Reward signal
    pub reward: Reward,
    /// Whether the episode is done
    pub done: bool,
    /// Whether the episode was cut short (e.g., time limit)
    pub truncated: bool,
}

impl<S> Step<S> {
    /// Non-final step
    pub fn running(state: S, reward: impl Into<Reward>) -> Self {
        Self {
            state,
            reward: reward.into(),
            done: false,
            truncated: false,
        }
    }

    /// Step that ends the episode
    pub fn terminal(state: S, reward: impl Into<Reward>) -> Self {
        Self {
            state,
            reward: reward.into(),
            done: true,
            truncated: false,
        }
    }
}

/// Core environment trait
///
/// Environments are driven one step at a time; an episode ends when a step
/// reports `done`.
pub trait Environment {
    /// State type
    type State: State;
    /// Action type
    type Action: Action;

    /// Reset the environment and return the initial state
    ///
    /// # Errors
    ///
    /// Implementations may fail when they cannot build an initial state.
    fn reset(&mut self) -> qlearn_core::Result<Self::State>;

    /// Take a step in the environment
    ///
    /// # Errors
    ///
    /// Fails on actions that are not legal in the current state, or when
    /// stepping a finished episode.
    fn step(&mut self, action: &Self::Action) -> qlearn_core::Result<Step<Self::State>>;

    /// Legal actions at `state`, empty when terminal
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Whether `state` ends the episode
    fn is_terminal(&self, state: &Self::State) -> bool {
        self.legal_actions(state).is_empty()
    }
}
