//! Deterministic (or noisy) grid navigation with exit payoffs
//!
//! A layout is plain text, one row per line and whitespace separated cells:
//!
//! ```text
//! _ _ _ +1
//! _ # _ -1
//! S _ _ _
//! ```
//!
//! `_` is open floor, `#` a wall, `S` the start cell and any number an exit
//! paying that amount. From an exit cell the only legal action is
//! [`Direction::Exit`], which ends the episode in [`GridState::Terminal`].

use std::fmt::Write as _;
use std::sync::Arc;

use qlearn_core::{RLError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::environment::{Environment, Step};

/// Classic 3x4 grid with a +1 and a -1 exit
pub const BOOK_GRID: &str = "
    _ _ _ +1
    _ # _ -1
    S _ _ _
";

/// Narrow bridge lined with -100 exits
pub const BRIDGE_GRID: &str = "
    #  -100 -100 -100 -100 -100 #
    1  S    _    _    _    _    10
    #  -100 -100 -100 -100 -100 #
";

/// Short route along a cliff or a longer safe one
pub const CLIFF_GRID: &str = "
    _    _    _    _    _
    S    _    _    _    10
    -100 -100 -100 -100 -100
";

/// Small maze with a single exit
pub const MAZE_GRID: &str = "
    _ _ _ +1
    # # _ #
    _ # _ _
    _ # # _
    S _ _ _
";

/// Cell coordinates, row 0 at the top
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Row index
    pub row: usize,
    /// Column index
    pub col: usize,
}

impl Position {
    /// Create a position
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance to `other`
    #[must_use]
    pub fn distance(&self, other: &Self) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

/// Agent state in a grid world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridState {
    /// Standing on a cell
    At(Position),
    /// Absorbing state reached by exiting
    Terminal,
}

/// Grid actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Up one row
    North,
    /// Down one row
    South,
    /// Right one column
    East,
    /// Left one column
    West,
    /// Leave through an exit cell
    Exit,
}

impl Direction {
    /// The four movement actions
    pub const MOVES: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Directions a noisy move can slip into
    #[must_use]
    pub fn perpendicular(self) -> &'static [Direction] {
        match self {
            Direction::North | Direction::South => &[Direction::East, Direction::West],
            Direction::East | Direction::West => &[Direction::North, Direction::South],
            Direction::Exit => &[],
        }
    }
}

/// Contents of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    /// Open floor
    Open,
    /// Impassable wall
    Wall,
    /// Open floor where episodes begin
    Start,
    /// Exit paying the given reward
    Exit(f64),
}

/// Static grid layout
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cells: Vec<Vec<Cell>>,
    start: Position,
}

impl Grid {
    /// Parse a text layout
    ///
    /// # Errors
    ///
    /// Returns [`RLError::Config`] for unknown tokens, non-finite exit
    /// payoffs, ragged rows, or a layout without exactly one start cell.
    pub fn parse(layout: &str) -> Result<Self> {
        let mut cells: Vec<Vec<Cell>> = Vec::new();
        let mut start = None;

        let lines = layout.lines().map(str::trim).filter(|line| !line.is_empty());
        for (row, line) in lines.enumerate() {
            let mut parsed = Vec::new();
            for (col, token) in line.split_whitespace().enumerate() {
                let cell = match token {
                    "_" | "." => Cell::Open,
                    "#" => Cell::Wall,
                    "S" => {
                        if start.replace(Position::new(row, col)).is_some() {
                            return Err(RLError::Config(
                                "grid has more than one start cell".to_string(),
                            ));
                        }
                        Cell::Start
                    }
                    other => {
                        let payoff = other.parse::<f64>().map_err(|_| {
                            RLError::Config(format!(
                                "unknown grid token '{other}' at row {row}, column {col}"
                            ))
                        })?;
                        if !payoff.is_finite() {
                            return Err(RLError::Config(format!(
                                "exit payoff '{other}' at row {row}, column {col} is not finite"
                            )));
                        }
                        Cell::Exit(payoff)
                    }
                };
                parsed.push(cell);
            }
            if let Some(first) = cells.first() {
                if first.len() != parsed.len() {
                    return Err(RLError::Config(format!(
                        "grid row {row} has {} cells, expected {}",
                        parsed.len(),
                        first.len()
                    )));
                }
            }
            cells.push(parsed);
        }

        let start = start.ok_or_else(|| RLError::Config("grid has no start cell".to_string()))?;
        Ok(Self { cells, start })
    }

    /// Parse one of the built-in layouts by name
    ///
    /// Known names are `book`, `bridge`, `cliff` and `maze`.
    ///
    /// # Errors
    ///
    /// Returns [`RLError::Config`] for an unknown name.
    pub fn named(name: &str) -> Result<Self> {
        let layout = match name {
            "book" => BOOK_GRID,
            "bridge" => BRIDGE_GRID,
            "cliff" => CLIFF_GRID,
            "maze" => MAZE_GRID,
            other => return Err(RLError::Config(format!("unknown grid '{other}'"))),
        };
        Self::parse(layout)
    }

    /// Number of rows
    #[must_use]
    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    /// Number of columns
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    /// Start position
    #[must_use]
    pub fn start(&self) -> Position {
        self.start
    }

    /// Cell at `pos`, `None` outside the grid
    #[must_use]
    pub fn cell(&self, pos: Position) -> Option<Cell> {
        self.cells.get(pos.row).and_then(|row| row.get(pos.col)).copied()
    }

    /// Every exit with its payoff, in row-major order
    pub fn exits(&self) -> impl Iterator<Item = (Position, f64)> + '_ {
        self.positions().filter_map(|pos| match self.cell(pos) {
            Some(Cell::Exit(payoff)) => Some((pos, payoff)),
            _ => None,
        })
    }

    /// Every non-wall position, in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| **cell != Cell::Wall)
                .map(move |(col, _)| Position::new(row, col))
        })
    }

    /// Legal actions at `state`
    #[must_use]
    pub fn legal_actions(&self, state: &GridState) -> Vec<Direction> {
        match state {
            GridState::Terminal => Vec::new(),
            GridState::At(pos) => match self.cell(*pos) {
                Some(Cell::Exit(_)) => vec![Direction::Exit],
                Some(Cell::Open | Cell::Start) => Direction::MOVES.to_vec(),
                Some(Cell::Wall) | None => Vec::new(),
            },
        }
    }

    /// Where a move from `pos` lands; blocked moves stay put
    #[must_use]
    pub fn move_from(&self, pos: Position, direction: Direction) -> Position {
        let target = match direction {
            Direction::North => pos.row.checked_sub(1).map(|row| Position::new(row, pos.col)),
            Direction::South => Some(Position::new(pos.row + 1, pos.col)),
            Direction::East => Some(Position::new(pos.row, pos.col + 1)),
            Direction::West => pos.col.checked_sub(1).map(|col| Position::new(pos.row, col)),
            Direction::Exit => None,
        };
        match target {
            Some(next) if matches!(self.cell(next), Some(cell) if cell != Cell::Wall) => next,
            _ => pos,
        }
    }

    /// Render one number per open cell, walls as `#`
    pub fn render_values(&self, value: impl Fn(&GridState) -> f64) -> String {
        let mut out = String::new();
        for (row, cells) in self.cells.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if *cell == Cell::Wall {
                    out.push_str("      # ");
                } else {
                    let state = GridState::At(Position::new(row, col));
                    let _ = write!(out, "{:>7.2} ", value(&state));
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Grid world dynamics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridWorldConfig {
    /// Reward for every non-exit step
    pub living_reward: f64,
    /// Probability that a move slips to a perpendicular direction
    pub noise: f64,
    /// Seed for the noise draws; entropy when absent
    pub seed: Option<u64>,
}

impl Default for GridWorldConfig {
    fn default() -> Self {
        Self {
            living_reward: 0.0,
            noise: 0.2,
            seed: None,
        }
    }
}

impl GridWorldConfig {
    /// Deterministic moves
    #[must_use]
    pub fn deterministic() -> Self {
        Self {
            noise: 0.0,
            ..Self::default()
        }
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Rejects a noise outside `[0, 1]` or a non-finite living reward.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.noise) {
            return Err(RLError::InvalidHyperparameter {
                name: "noise",
                value: self.noise,
                expected: "a probability in [0, 1]",
            });
        }
        if !self.living_reward.is_finite() {
            return Err(RLError::InvalidHyperparameter {
                name: "living_reward",
                value: self.living_reward,
                expected: "a finite number",
            });
        }
        Ok(())
    }
}

/// Grid world environment
#[derive(Debug)]
pub struct GridWorld {
    grid: Arc<Grid>,
    config: GridWorldConfig,
    state: GridState,
    rng: StdRng,
}

impl GridWorld {
    /// Create a grid world positioned at the start cell
    ///
    /// # Errors
    ///
    /// Fails when `config` does not validate.
    pub fn new(grid: Grid, config: GridWorldConfig) -> Result<Self> {
        config.validate()?;
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Ok(Self {
            state: GridState::At(grid.start()),
            grid: Arc::new(grid),
            config,
            rng,
        })
    }

    /// Layout
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Shared handle to the layout
    #[must_use]
    pub fn shared_grid(&self) -> Arc<Grid> {
        Arc::clone(&self.grid)
    }

    /// Dynamics
    #[must_use]
    pub fn config(&self) -> &GridWorldConfig {
        &self.config
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> GridState {
        self.state
    }

    /// Legal-action source for agents, independent of this instance
    pub fn actions(&self) -> impl Fn(&GridState) -> Vec<Direction> + 'static {
        let grid = self.shared_grid();
        move |state| grid.legal_actions(state)
    }

    fn noisy(&mut self, direction: Direction) -> Direction {
        if self.config.noise > 0.0 && self.rng.gen_bool(self.config.noise) {
            if let Some(slipped) = direction.perpendicular().choose(&mut self.rng) {
                return *slipped;
            }
        }
        direction
    }
}

impl Environment for GridWorld {
    type State = GridState;
    type Action = Direction;

    fn reset(&mut self) -> Result<GridState> {
        self.state = GridState::At(self.grid.start());
        debug!(start = ?self.state, "grid world reset");
        Ok(self.state)
    }

    fn step(&mut self, action: &Direction) -> Result<Step<GridState>> {
        let GridState::At(pos) = self.state else {
            return Err(RLError::Environment(
                "step called after the episode ended".to_string(),
            ));
        };
        if !self.grid.legal_actions(&self.state).contains(action) {
            return Err(RLError::Environment(format!(
                "illegal action {action:?} at {pos:?}"
            )));
        }

        if let Some(Cell::Exit(payoff)) = self.grid.cell(pos) {
            self.state = GridState::Terminal;
            trace!(?pos, payoff, "exit");
            return Ok(Step::terminal(GridState::Terminal, payoff));
        }

        let actual = self.noisy(*action);
        let next = self.grid.move_from(pos, actual);
        self.state = GridState::At(next);
        trace!(?pos, ?action, ?actual, ?next, "move");
        Ok(Step::running(self.state, self.config.living_reward))
    }

    fn legal_actions(&self, state: &GridState) -> Vec<Direction> {
        self.grid.legal_actions(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn book(config: GridWorldConfig) -> GridWorld {
        GridWorld::new(Grid::parse(BOOK_GRID).unwrap(), config).unwrap()
    }

    #[test]
    fn test_parse_book_grid() {
        let grid = Grid::parse(BOOK_GRID).unwrap();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 4);
        assert_eq!(grid.start(), Position::new(2, 0));
        assert_eq!(grid.cell(Position::new(1, 1)), Some(Cell::Wall));
        let exits: Vec<_> = grid.exits().collect();
        assert_eq!(
            exits,
            vec![(Position::new(0, 3), 1.0), (Position::new(1, 3), -1.0)]
        );
        assert_eq!(grid.positions().count(), 11);
    }

    #[test]
    fn test_all_named_grids_parse() {
        for name in ["book", "bridge", "cliff", "maze"] {
            assert!(Grid::named(name).is_ok(), "{name}");
        }
        assert!(matches!(Grid::named("nope"), Err(RLError::Config(_))));
    }

    #[test]
    fn test_parse_rejects_bad_layouts() {
        assert!(Grid::parse("_ _\n_").is_err());
        assert!(Grid::parse("_ _ 1").is_err());
        assert!(Grid::parse("S S 1").is_err());
        assert!(Grid::parse("S x 1").is_err());
    }

    #[test]
    fn test_parse_rejects_non_finite_payoffs() {
        for layout in ["S NaN", "S inf", "S -inf _"] {
            assert!(
                matches!(Grid::parse(layout), Err(RLError::Config(_))),
                "{layout} should be rejected"
            );
        }
        assert!(Grid::parse("S 1e3").is_ok());
    }

    #[test]
    fn test_legal_actions() {
        let grid = Grid::parse(BOOK_GRID).unwrap();
        assert_eq!(
            grid.legal_actions(&GridState::At(Position::new(0, 3))),
            vec![Direction::Exit]
        );
        assert_eq!(
            grid.legal_actions(&GridState::At(Position::new(0, 0))),
            Direction::MOVES.to_vec()
        );
        assert!(grid.legal_actions(&GridState::Terminal).is_empty());
    }

    #[test]
    fn test_walls_and_edges_block_moves() {
        let grid = Grid::parse(BOOK_GRID).unwrap();
        let corner = Position::new(2, 0);
        assert_eq!(grid.move_from(corner, Direction::West), corner);
        assert_eq!(grid.move_from(corner, Direction::South), corner);
        assert_eq!(grid.move_from(corner, Direction::North), Position::new(1, 0));
        let below_wall = Position::new(2, 1);
        assert_eq!(grid.move_from(below_wall, Direction::North), below_wall);
    }

    #[test]
    fn test_exit_pays_and_terminates() {
        let mut world = book(GridWorldConfig::deterministic());
        world.reset().unwrap();
        for action in [
            Direction::North,
            Direction::North,
            Direction::East,
            Direction::East,
            Direction::East,
        ] {
            let step = world.step(&action).unwrap();
            assert!(!step.done);
        }
        assert_eq!(world.state(), GridState::At(Position::new(0, 3)));
        let step = world.step(&Direction::Exit).unwrap();
        assert!(step.done);
        assert_eq!(step.state, GridState::Terminal);
        assert_relative_eq!(step.reward.value(), 1.0);
        assert!(world.is_terminal(&step.state));
    }

    #[test]
    fn test_step_errors() {
        let mut world = book(GridWorldConfig::deterministic());
        world.reset().unwrap();
        assert!(matches!(
            world.step(&Direction::Exit),
            Err(RLError::Environment(_))
        ));

        let exit = GridWorld::new(
            Grid::parse("S 5").unwrap(),
            GridWorldConfig::deterministic(),
        );
        let mut exit = exit.unwrap();
        exit.step(&Direction::East).unwrap();
        exit.step(&Direction::Exit).unwrap();
        assert!(exit.step(&Direction::Exit).is_err());
    }

    #[test]
    fn test_living_reward() {
        let config = GridWorldConfig {
            living_reward: -0.04,
            ..GridWorldConfig::deterministic()
        };
        let mut world = book(config);
        world.reset().unwrap();
        let step = world.step(&Direction::East).unwrap();
        assert_relative_eq!(step.reward.value(), -0.04);
    }

    #[test]
    fn test_full_noise_always_slips() {
        let config = GridWorldConfig {
            noise: 1.0,
            seed: Some(9),
            ..GridWorldConfig::default()
        };
        let mut world = book(config);
        for _ in 0..50 {
            world.reset().unwrap();
            // From the bottom-left corner, east or west slips both stay in the bottom row
            let step = world.step(&Direction::North).unwrap();
            let GridState::At(pos) = step.state else {
                panic!("moves never terminate");
            };
            assert_eq!(pos.row, 2);
        }
    }

    #[test]
    fn test_config_validation() {
        let config = GridWorldConfig {
            noise: 1.5,
            ..GridWorldConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(GridWorld::new(Grid::parse(BOOK_GRID).unwrap(), config).is_err());
    }

    #[test]
    fn test_render_values_marks_walls() {
        let grid = Grid::parse(BOOK_GRID).unwrap();
        let rendered = grid.render_values(|_| 0.5);
        assert_eq!(rendered.lines().count(), 3);
        assert!(rendered.contains('#'));
        assert!(rendered.contains("0.50"));
    }
}
