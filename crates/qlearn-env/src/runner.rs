//! Training loops connecting an environment to a shell-wrapped agent

use qlearn_agents::{EpisodeSummary, ReinforcementShell};
use qlearn_core::{Agent, Result};
use tracing::info;

use crate::environment::Environment;

/// Play one episode to the end
///
/// The shell picks every action, sees every reward, and closes the episode
/// through its end-of-episode hook, so training bookkeeping and reports
/// happen here.
///
/// # Errors
///
/// Propagates environment failures.
pub fn run_episode<E, G>(
    env: &mut E,
    shell: &mut ReinforcementShell<G, E::State, E::Action>,
) -> Result<EpisodeSummary>
where
    E: Environment,
    G: Agent<E::State, E::Action>,
{
    shell.start_episode();
    let mut state = env.reset()?;
    loop {
        let Some(action) = shell.action(&state) else {
            return Ok(shell.final_state(&state, 0.0));
        };
        let step = env.step(&action)?;
        if step.done {
            return Ok(shell.final_state(&step.state, step.reward.value()));
        }
        shell.observation_function(&step.state, step.reward.value());
        state = step.state;
    }
}

/// Play `episodes` episodes back to back
///
/// # Errors
///
/// Stops at the first environment failure.
pub fn train<E, G>(
    env: &mut E,
    shell: &mut ReinforcementShell<G, E::State, E::Action>,
    episodes: usize,
) -> Result<Vec<EpisodeSummary>>
where
    E: Environment,
    G: Agent<E::State, E::Action>,
{
    let summaries = (0..episodes)
        .map(|_| run_episode(env, shell))
        .collect::<Result<Vec<_>>>()?;
    info!(
        agent = shell.agent().name(),
        episodes,
        average_train_reward = shell.average_train_reward(),
        average_test_reward = shell.average_test_reward(),
        "run finished"
    );
    Ok(summaries)
}
