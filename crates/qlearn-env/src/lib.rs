//! Reference environments for qlearn agents
//!
//! This crate provides:
//! - A synchronous [`Environment`] trait with a [`TimeLimit`] wrapper
//! - [`GridWorld`], a grid navigation task with exits and optional noise
//! - [`GridFeatures`] for approximate Q-learning on grids
//! - [`run_episode`] and [`train`] loops driving a shell-wrapped agent

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod environment;
pub mod features;
pub mod gridworld;
pub mod runner;
pub mod wrappers;

// Re-export environments
pub use environment::{Environment, Step};
pub use features::GridFeatures;
pub use gridworld::{
    Cell, Direction, Grid, GridState, GridWorld, GridWorldConfig, Position, BOOK_GRID,
    BRIDGE_GRID, CLIFF_GRID, MAZE_GRID,
};
pub use runner::{run_episode, train};
pub use wrappers::TimeLimit;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        run_episode, train, Direction, Environment, Grid, GridFeatures, GridState, GridWorld,
        GridWorldConfig, TimeLimit,
    };
    pub use qlearn_agents::prelude::*;
}
