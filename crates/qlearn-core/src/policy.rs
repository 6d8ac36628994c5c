//! Greedy and epsilon-greedy action selection
//!
//! Greedy choices treat every action whose value lies within
//! [`TIE_TOLERANCE`] of the maximum as equally good and break the tie
//! uniformly at random.

use rand::seq::SliceRandom;
use rand::Rng;

/// Absolute tolerance around the maximum Q-value for near-ties
pub const TIE_TOLERANCE: f64 = 0.001;

/// Legal actions of one state split into greedy and non-greedy groups
#[derive(Debug, Clone, PartialEq)]
pub struct ActionPartition<A> {
    /// Actions within tolerance of the maximum, with their values
    pub best: Vec<(A, f64)>,
    /// Remaining actions, with their values
    pub other: Vec<(A, f64)>,
    /// Maximum value over all actions
    pub max_value: f64,
}

impl<A> ActionPartition<A> {
    /// Partition scored actions, `None` when there are none (terminal state)
    pub fn new(scored: Vec<(A, f64)>) -> Option<Self> {
        let max_value = scored
            .iter()
            .map(|(_, value)| *value)
            .reduce(f64::max)?;
        let (best, other) = scored
            .into_iter()
            .partition(|(_, value)| (value - max_value).abs() < TIE_TOLERANCE);
        Some(Self {
            best,
            other,
            max_value,
        })
    }

    /// Total number of legal actions
    #[must_use]
    pub fn len(&self) -> usize {
        self.best.len() + self.other.len()
    }

    /// Always false: a partition exists only for non-terminal states
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }

    /// Expected value of the epsilon-greedy policy over these actions
    ///
    /// Non-greedy actions are picked with probability `ε/N`; each greedy
    /// action with `(1-ε)/|best| + ε/N`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn expected_value(&self, epsilon: f64) -> f64 {
        let random_probability = epsilon / self.len() as f64;
        let best_probability = (1.0 - epsilon) / self.best.len() as f64 + random_probability;

        let other: f64 = self
            .other
            .iter()
            .map(|(_, value)| random_probability * value)
            .sum();
        let best: f64 = self
            .best
            .iter()
            .map(|(_, value)| best_probability * value)
            .sum();
        other + best
    }
}

impl<A: Clone> ActionPartition<A> {
    /// Uniformly random choice among the greedy actions
    pub fn choose_best<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<A> {
        self.best.choose(rng).map(|(action, _)| action.clone())
    }

    /// Greedy actions without their values
    #[must_use]
    pub fn best_actions(&self) -> Vec<A> {
        self.best.iter().map(|(action, _)| action.clone()).collect()
    }
}

/// Epsilon-greedy exploration rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpsilonGreedy {
    epsilon: f64,
}

impl EpsilonGreedy {
    /// Create a rule exploring with probability `epsilon`, clamped to `[0, 1]`
    #[must_use]
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon: epsilon.clamp(0.0, 1.0),
        }
    }

    /// Exploration probability
    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Flip the exploration coin
    pub fn explore<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        rng.gen_bool(self.epsilon)
    }

    /// Pick an action: random legal action when exploring, `greedy` otherwise
    ///
    /// Returns `None` without drawing from `rng` when `legal` is empty.
    pub fn select<A, R, F>(&self, rng: &mut R, legal: &[A], greedy: F) -> Option<A>
    where
        A: Clone,
        R: Rng + ?Sized,
        F: FnOnce(&mut R) -> Option<A>,
    {
        if legal.is_empty() {
            return None;
        }
        if self.explore(rng) {
            legal.choose(rng).cloned()
        } else {
            greedy(rng)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_empty_partition_is_none() {
        assert!(ActionPartition::<u8>::new(Vec::new()).is_none());
    }

    #[test]
    fn test_near_ties_share_best_group() {
        let partition =
            ActionPartition::new(vec![('a', 1.0), ('b', 1.0005), ('c', 0.998), ('d', 0.5)])
                .unwrap();
        assert_eq!(partition.best_actions(), vec!['a', 'b']);
        assert_eq!(partition.other.len(), 2);
        assert_relative_eq!(partition.max_value, 1.0005);
    }

    #[test]
    fn test_expected_value_mixes_by_epsilon() {
        let partition = ActionPartition::new(vec![('a', 4.0), ('b', 0.0)]).unwrap();
        // best: (1-0.5)/1 + 0.5/2 = 0.75 ; other: 0.25
        assert_relative_eq!(partition.expected_value(0.5), 3.0);
        assert_relative_eq!(partition.expected_value(0.0), 4.0);
        assert_relative_eq!(partition.expected_value(1.0), 2.0);
    }

    #[test]
    fn test_select_without_actions_is_none() {
        let mut rng = StdRng::seed_from_u64(7);
        let rule = EpsilonGreedy::new(1.0);
        let chosen: Option<u8> = rule.select(&mut rng, &[], |_| Some(0));
        assert!(chosen.is_none());
    }

    #[test]
    fn test_zero_epsilon_always_greedy() {
        let mut rng = StdRng::seed_from_u64(7);
        let rule = EpsilonGreedy::new(0.0);
        for _ in 0..200 {
            assert_eq!(rule.select(&mut rng, &[1, 2, 3], |_| Some(2)), Some(2));
        }
    }

    #[test]
    fn test_epsilon_is_clamped() {
        assert_eq!(EpsilonGreedy::new(1.5).epsilon(), 1.0);
        assert_eq!(EpsilonGreedy::new(-0.1).epsilon(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_greedy_expected_value_is_max(
            values in proptest::collection::vec(-50.0f64..50.0, 1..12),
        ) {
            let scored: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
            let partition = ActionPartition::new(scored).unwrap();
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            // Near-tied best values may differ from the max by < TIE_TOLERANCE.
            prop_assert!((partition.expected_value(0.0) - max).abs() < TIE_TOLERANCE);
        }

        #[test]
        fn prop_constant_values_expect_constant(
            value in -50.0f64..50.0,
            n in 1usize..10,
            epsilon in 0.0f64..=1.0,
        ) {
            let partition = ActionPartition::new((0..n).map(|a| (a, value)).collect()).unwrap();
            prop_assert!((partition.expected_value(epsilon) - value).abs() < 1e-9);
        }

        #[test]
        fn prop_best_group_contains_argmax(
            values in proptest::collection::vec(-50.0f64..50.0, 1..12),
        ) {
            let scored: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
            let partition = ActionPartition::new(scored).unwrap();
            prop_assert!(partition.best.iter().any(|(_, v)| *v == partition.max_value));
            prop_assert_eq!(partition.len(), values.len());
        }
    }
}
