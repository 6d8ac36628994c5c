//! Reinforcement learning agents built on qlearn-core
//!
//! This crate provides the value-based agents:
//! - Q-learning (off-policy bootstrap on the greedy value)
//! - SARSA (on-policy bootstrap on a cached look-ahead action)
//! - Expected SARSA (bootstrap on the epsilon-greedy expectation)
//! - Dyna-Q (Q-learning plus model-based planning replays)
//! - Approximate Q-learning (linear model over extracted features)
//!
//! and [`ReinforcementShell`], which adds episode bookkeeping on top of any
//! of them.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod approximate;
pub mod dyna_q;
pub mod expected_sarsa;
pub mod model;
pub mod qlearning;
pub mod sarsa;
pub mod shell;
pub mod tabular;

// Re-export agents
pub use approximate::ApproximateQAgent;
pub use dyna_q::DynaQAgent;
pub use expected_sarsa::ExpectedSarsaAgent;
pub use qlearning::QLearningAgent;
pub use sarsa::SarsaAgent;

// Re-export building blocks
pub use model::Model;
pub use shell::{EpisodeSummary, ReinforcementShell};
pub use tabular::TabularCore;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ApproximateQAgent, DynaQAgent, ExpectedSarsaAgent, QLearningAgent, ReinforcementShell,
        SarsaAgent,
    };
    pub use qlearn_core::prelude::*;
}
