//! Example: Train a value-based agent on a grid world and print what it learned
//!
//! ```text
//! cargo run -p qlearn-env --example gridworld_agents -- --agent dyna-q --grid maze
//! RUST_LOG=debug cargo run -p qlearn-env --example gridworld_agents -- --json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use qlearn_env::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AgentKind {
    QLearning,
    Sarsa,
    ExpectedSarsa,
    DynaQ,
    Approximate,
}

#[derive(Debug, Parser)]
#[command(name = "gridworld_agents")]
#[command(about = "Train a reinforcement learning agent on a grid world")]
struct Cli {
    /// Learning algorithm
    #[arg(short, long, value_enum, default_value = "q-learning")]
    agent: AgentKind,

    /// Built-in layout: book, bridge, cliff or maze
    #[arg(short, long, default_value = "book")]
    grid: String,

    /// Training episodes
    #[arg(short = 'n', long, default_value = "200")]
    episodes: usize,

    /// Testing episodes played after training
    #[arg(short, long, default_value = "10")]
    test: usize,

    /// Agent hyperparameters as JSON; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Exploration probability
    #[arg(short, long)]
    epsilon: Option<f64>,

    /// Learning rate
    #[arg(long)]
    alpha: Option<f64>,

    /// Discount factor
    #[arg(long)]
    gamma: Option<f64>,

    /// Planning replays per real step (Dyna-Q)
    #[arg(long)]
    planning_steps: Option<usize>,

    /// Chance that a move slips sideways
    #[arg(long, default_value = "0.2")]
    noise: f64,

    /// Reward for every non-exit step
    #[arg(long, default_value = "0.0")]
    living_reward: f64,

    /// Step budget per episode
    #[arg(long, default_value = "500")]
    max_steps: usize,

    /// Seed for both the agent and the environment
    #[arg(long)]
    seed: Option<u64>,

    /// Print each episode summary as a JSON line
    #[arg(long)]
    json: bool,
}

fn agent_config(cli: &Cli) -> Result<AgentConfig> {
    let mut config = match &cli.config {
        Some(path) => AgentConfig::from_json_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => AgentConfig::default(),
    };
    if let Some(epsilon) = cli.epsilon {
        config.epsilon = epsilon;
    }
    if let Some(alpha) = cli.alpha {
        config.alpha = alpha;
    }
    if let Some(gamma) = cli.gamma {
        config.gamma = gamma;
    }
    if let Some(planning_steps) = cli.planning_steps {
        config.planning_steps = planning_steps;
    }
    config.num_training = cli.episodes;
    config.validate().context("invalid agent configuration")?;
    Ok(config)
}

fn run<G>(cli: &Cli, world: GridWorld, agent: G) -> Result<()>
where
    G: Agent<GridState, Direction>,
{
    let grid = world.shared_grid();
    let mut shell = ReinforcementShell::new(agent);
    let mut env = TimeLimit::new(world, cli.max_steps);

    let summaries = train(&mut env, &mut shell, cli.episodes + cli.test)?;
    if cli.json {
        for summary in &summaries {
            println!("{}", serde_json::to_string(summary)?);
        }
    }

    let agent = shell.agent();
    println!("{} on a {}x{} grid", agent.name(), grid.rows(), grid.cols());
    println!("\nLearned values:");
    print!("{}", grid.render_values(|state| agent.value(state)));
    println!(
        "\nAverage reward: {:.2} over training, {:.2} over testing",
        shell.average_train_reward(),
        shell.average_test_reward()
    );
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = agent_config(&cli)?;
    let grid = Grid::named(&cli.grid)?;
    let world = GridWorld::new(
        grid,
        GridWorldConfig {
            living_reward: cli.living_reward,
            noise: cli.noise,
            seed: cli.seed,
        },
    )?;
    let actions = world.actions();
    let seed = cli.seed.unwrap_or_else(rand::random);

    match cli.agent {
        AgentKind::QLearning => {
            run(&cli, world, QLearningAgent::new(config, actions)?.with_seed(seed))
        }
        AgentKind::Sarsa => {
            run(&cli, world, SarsaAgent::new(config, actions)?.with_seed(seed))
        }
        AgentKind::ExpectedSarsa => {
            run(&cli, world, ExpectedSarsaAgent::new(config, actions)?.with_seed(seed))
        }
        AgentKind::DynaQ => {
            run(&cli, world, DynaQAgent::new(config, actions)?.with_seed(seed))
        }
        AgentKind::Approximate => {
            let features = GridFeatures::new(world.shared_grid());
            run(
                &cli,
                world,
                ApproximateQAgent::new(config, actions, features)?.with_seed(seed),
            )
        }
    }
}
