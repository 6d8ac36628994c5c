//! Core traits and value stores for tabular and linear Q-learning agents
//!
//! This crate provides the building blocks shared by every agent in the
//! workspace: the implicit-zero value store, greedy and epsilon-greedy
//! action selection, hyperparameter configuration, feature extraction and
//! the `Agent` contract exposed to a driving harness.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod agent;
pub mod config;
pub mod error;
pub mod features;
pub mod policy;
pub mod reward;
pub mod state;
pub mod trajectory;
pub mod value;

// Re-export core traits and types
pub use action::{Action, LegalActions};
pub use agent::Agent;
pub use config::AgentConfig;
pub use error::{RLError, Result};
pub use features::{BiasExtractor, FeatureExtractor, IdentityExtractor};
pub use policy::{ActionPartition, EpsilonGreedy, TIE_TOLERANCE};
pub use reward::Reward;
pub use state::State;
pub use trajectory::{Trajectory, Transition};
pub use value::{FeatureVector, QTable, SparseTable, Weights};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Action, Agent, AgentConfig, BiasExtractor, FeatureExtractor, FeatureVector,
        IdentityExtractor, LegalActions, QTable, Result, Reward, State, Trajectory, Transition,
        Weights,
    };
}
