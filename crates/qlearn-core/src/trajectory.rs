//! Transitions and episode trajectories

use serde::{Deserialize, Serialize};

use crate::Reward;

/// One observed step: `state --action--> next_state` paying `reward`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition<S, A> {
    /// State the action was taken in
    pub state: S,
    /// Action taken
    pub action: A,
    /// State the environment moved to
    pub next_state: S,
    /// Reward received
    pub reward: Reward,
}

impl<S, A> Transition<S, A> {
    /// Create a new transition
    pub fn new(state: S, action: A, next_state: S, reward: impl Into<Reward>) -> Self {
        Self {
            state,
            action,
            next_state,
            reward: reward.into(),
        }
    }
}

/// Ordered transitions of a single episode
#[derive(Debug, Clone)]
pub struct Trajectory<S, A> {
    /// Sequence of transitions
    pub transitions: Vec<Transition<S, A>>,
    /// Total (undiscounted) reward
    pub total_reward: f64,
}

impl<S, A> Trajectory<S, A> {
    /// Create a new empty trajectory
    #[must_use]
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
            total_reward: 0.0,
        }
    }

    /// Add a transition to the trajectory
    pub fn push(&mut self, transition: Transition<S, A>) {
        self.total_reward += transition.reward.value();
        self.transitions.push(transition);
    }

    /// Get the length of the trajectory
    #[must_use]
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Check if trajectory is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Discounted return from the first step
    #[must_use]
    pub fn discounted_return(&self, gamma: f64) -> f64 {
        self.transitions
            .iter()
            .rev()
            .fold(0.0, |running, t| t.reward.value() + gamma * running)
    }
}

impl<S, A> Default for Trajectory<S, A> {
    fn default() -> Self {
        Self::new()
    }
}
