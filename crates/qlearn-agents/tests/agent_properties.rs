//! Behaviour shared by every agent in the crate

use approx::assert_relative_eq;
use proptest::prelude::*;
use qlearn_agents::prelude::*;

const GOAL: i32 = 4;

fn line(state: &i32) -> Vec<char> {
    if *state == GOAL || *state < 0 {
        Vec::new()
    } else {
        vec!['l', 'r']
    }
}

fn config() -> AgentConfig {
    AgentConfig::default()
        .with_epsilon(0.2)
        .with_alpha(0.5)
        .with_gamma(0.9)
        .with_planning_steps(3)
}

fn all_agents(config: &AgentConfig, seed: u64) -> Vec<Box<dyn Agent<i32, char>>> {
    vec![
        Box::new(QLearningAgent::new(config.clone(), line).unwrap().with_seed(seed)),
        Box::new(SarsaAgent::new(config.clone(), line).unwrap().with_seed(seed)),
        Box::new(ExpectedSarsaAgent::new(config.clone(), line).unwrap().with_seed(seed)),
        Box::new(DynaQAgent::new(config.clone(), line).unwrap().with_seed(seed)),
        Box::new(
            ApproximateQAgent::new(config.clone(), line, IdentityExtractor)
                .unwrap()
                .with_seed(seed),
        ),
    ]
}

fn step(state: i32, action: char) -> (i32, f64) {
    let next = if action == 'r' { state + 1 } else { state - 1 };
    let reward = match next {
        GOAL => 10.0,
        n if n < 0 => -10.0,
        _ => -1.0,
    };
    (next, reward)
}

fn run(agent: &mut dyn Agent<i32, char>, episodes: usize) {
    for _ in 0..episodes {
        agent.on_episode_start();
        let mut state = 1;
        let mut steps = 0;
        while let Some(action) = agent.action(&state) {
            let (next, reward) = step(state, action);
            agent.update(&state, &action, &next, reward);
            state = next;
            steps += 1;
            if steps >= 100 {
                break;
            }
        }
    }
}

#[test]
fn test_fresh_agents_read_zero() {
    for agent in all_agents(&config(), 0) {
        for state in -1..=GOAL {
            for action in ['l', 'r'] {
                assert_eq!(agent.q_value(&state, &action), 0.0, "{}", agent.name());
            }
        }
    }
}

#[test]
fn test_terminal_states_have_no_value_or_action() {
    for mut agent in all_agents(&config(), 3) {
        run(agent.as_mut(), 20);
        for terminal in [-1, GOAL] {
            assert_eq!(agent.value(&terminal), 0.0, "{}", agent.name());
            assert_eq!(agent.policy(&terminal), None, "{}", agent.name());
            assert_eq!(agent.action(&terminal), None, "{}", agent.name());
        }
    }
}

#[test]
fn test_every_agent_learns_to_head_for_the_goal() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    for mut agent in all_agents(&config(), 11) {
        run(agent.as_mut(), 300);
        for state in 0..GOAL {
            assert_eq!(agent.policy(&state), Some('r'), "{} at {state}", agent.name());
        }
    }
}

#[test]
fn test_single_successor_action_makes_bootstraps_agree() {
    fn single(state: &i32) -> Vec<char> {
        if *state >= 2 {
            Vec::new()
        } else {
            vec!['r']
        }
    }
    let config = AgentConfig::default().with_alpha(0.5).with_gamma(0.8);
    let mut q = QLearningAgent::new(config.clone(), single).unwrap().with_seed(0);
    let mut sarsa = SarsaAgent::new(config.clone(), single).unwrap().with_seed(0);
    let mut expected = ExpectedSarsaAgent::new(config, single).unwrap().with_seed(0);

    let agents: [&mut dyn Agent<i32, char>; 3] = [&mut q, &mut sarsa, &mut expected];
    for agent in agents {
        agent.update(&1, &'r', &2, 4.0);
        agent.update(&0, &'r', &1, 1.0);
        agent.update(&0, &'r', &1, 1.0);
    }

    for state in [0, 1] {
        let reference = q.q_value(&state, &'r');
        assert_relative_eq!(sarsa.q_value(&state, &'r'), reference);
        assert_relative_eq!(expected.q_value(&state, &'r'), reference);
    }
}

#[test]
fn test_greedy_agents_pick_a_best_action() {
    let config = config().with_epsilon(0.0);
    for mut agent in all_agents(&config, 5) {
        agent.update(&1, &'r', &2, 3.0);
        agent.update(&1, &'l', &0, 1.0);
        for _ in 0..20 {
            assert_eq!(agent.action(&1), Some('r'), "{}", agent.name());
        }
    }
}

proptest! {
    #[test]
    fn prop_exploration_stays_legal(seed in any::<u64>(), epsilon in 0.0f64..=1.0) {
        let config = config().with_epsilon(epsilon);
        for mut agent in all_agents(&config, seed) {
            for state in 0..GOAL {
                let action = agent.action(&state);
                prop_assert!(action.is_some_and(|a| line(&state).contains(&a)));
            }
        }
    }

    #[test]
    fn prop_value_is_max_q(rewards in prop::collection::vec(-10.0f64..10.0, 1..20)) {
        let mut agent = QLearningAgent::new(config(), line).unwrap().with_seed(0);
        for (i, reward) in rewards.iter().enumerate() {
            let action = if i % 2 == 0 { 'l' } else { 'r' };
            agent.update(&1, &action, &2, *reward);
        }
        let max = agent.q_value(&1, &'l').max(agent.q_value(&1, &'r'));
        prop_assert!((agent.value(&1) - max).abs() < 1e-12);
    }
}
