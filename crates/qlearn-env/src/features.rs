//! Hand-written features for approximate Q-learning on grid worlds

use std::sync::Arc;

use qlearn_core::{FeatureExtractor, FeatureVector};

use crate::gridworld::{Cell, Direction, Grid, GridState, Position};

/// Features of a grid move, as seen from the cell it lands on
///
/// - `bias`: always `1.0`
/// - `exit-payoff`: payoff of an exit action, scaled by the largest payoff
/// - `goal-distance`: distance from the landing cell to the nearest positive
///   exit, scaled by the grid size
/// - `danger`: `1.0` when the landing cell is a negative exit
/// - `blocked`: `1.0` when the move runs into a wall or edge
///
/// Noise is ignored; features describe the intended move.
#[derive(Debug, Clone)]
pub struct GridFeatures {
    grid: Arc<Grid>,
    goals: Vec<Position>,
    payoff_scale: f64,
}

impl GridFeatures {
    /// Bias feature name
    pub const BIAS: &'static str = "bias";
    /// Exit payoff feature name
    pub const EXIT_PAYOFF: &'static str = "exit-payoff";
    /// Goal distance feature name
    pub const GOAL_DISTANCE: &'static str = "goal-distance";
    /// Negative exit feature name
    pub const DANGER: &'static str = "danger";
    /// Blocked move feature name
    pub const BLOCKED: &'static str = "blocked";

    /// Build the extractor for a layout
    pub fn new(grid: Arc<Grid>) -> Self {
        let goals = grid
            .exits()
            .filter(|(_, payoff)| *payoff > 0.0)
            .map(|(pos, _)| pos)
            .collect();
        let payoff_scale = grid
            .exits()
            .map(|(_, payoff)| payoff.abs())
            .fold(1.0, f64::max);
        Self {
            grid,
            goals,
            payoff_scale,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn goal_distance(&self, pos: Position) -> Option<f64> {
        let nearest = self.goals.iter().map(|goal| pos.distance(goal)).min()?;
        let size = (self.grid.rows() + self.grid.cols()).max(1);
        Some(nearest as f64 / size as f64)
    }
}

impl FeatureExtractor<GridState, Direction> for GridFeatures {
    fn features(&self, state: &GridState, action: &Direction) -> FeatureVector {
        let mut features = FeatureVector::new();
        features.set(Self::BIAS.to_string(), 1.0);

        let GridState::At(pos) = *state else {
            return features;
        };

        if *action == Direction::Exit {
            if let Some(Cell::Exit(payoff)) = self.grid.cell(pos) {
                features.set(Self::EXIT_PAYOFF.to_string(), payoff / self.payoff_scale);
            }
            return features;
        }

        let target = self.grid.move_from(pos, *action);
        if target == pos {
            features.set(Self::BLOCKED.to_string(), 1.0);
        }
        if let Some(distance) = self.goal_distance(target) {
            features.set(Self::GOAL_DISTANCE.to_string(), distance);
        }
        if matches!(self.grid.cell(target), Some(Cell::Exit(payoff)) if payoff < 0.0) {
            features.set(Self::DANGER.to_string(), 1.0);
        }
        features
    }
}
