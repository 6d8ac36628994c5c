//! Environment wrappers

use qlearn_core::Result;

use crate::environment::{Environment, Step};

/// Time limit wrapper
///
/// Ends the episode with `truncated` set once `max_steps` steps have been
/// taken without the inner environment finishing.
#[derive(Debug)]
pub struct TimeLimit<E> {
    /// Inner environment
    pub env: E,
    /// Maximum steps
    pub max_steps: usize,
    /// Current step count
    pub steps: usize,
}

impl<E> TimeLimit<E> {
    /// Create a new time limit wrapper
    pub fn new(env: E, max_steps: usize) -> Self {
        Self {
            env,
            max_steps,
            steps: 0,
        }
    }

    /// Unwrap the inner environment
    pub fn into_inner(self) -> E {
        self.env
    }
}

impl<E> Environment for TimeLimit<E>
where
    E: Environment,
{
    type State = E::State;
    type Action = E::Action;

    fn reset(&mut self) -> Result<Self::State> {
        self.steps = 0;
        self.env.reset()
    }

    fn step(&mut self, action: &Self::Action) -> Result<Step<Self::State>> {
        self.steps += 1;
        let mut step = self.env.step(action)?;

        if self.steps >= self.max_steps && !step.done {
            step.truncated = true;
            step.done = true;
        }

        Ok(step)
    }

    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        self.env.legal_actions(state)
    }
}
