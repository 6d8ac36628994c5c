//! Deterministic one-step environment model for Dyna-Q planning

use indexmap::IndexMap;
use qlearn_core::{Action, State};
use rand::Rng;

/// Last observed outcome of every visited `(state, action)` pair
///
/// Repeat visits overwrite the stored `(next_state, reward)`. Entries keep
/// their first-insertion order so that sampling with a seeded RNG is
/// reproducible.
#[derive(Debug, Clone)]
pub struct Model<S, A> {
    entries: IndexMap<(S, A), (S, f64)>,
}

impl<S, A> Model<S, A>
where
    S: State,
    A: Action,
{
    /// Create an empty model
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Record `state --action--> next_state` paying `reward`
    pub fn record(&mut self, state: &S, action: &A, next_state: &S, reward: f64) {
        self.entries
            .insert((state.clone(), action.clone()), (next_state.clone(), reward));
    }

    /// Stored outcome of `(state, action)`
    pub fn outcome(&self, state: &S, action: &A) -> Option<(&S, f64)> {
        self.entries
            .get(&(state.clone(), action.clone()))
            .map(|(next_state, reward)| (next_state, *reward))
    }

    /// Uniformly sampled visited pair with its outcome, `None` when empty
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(&S, &A, &S, f64)> {
        if self.entries.is_empty() {
            return None;
        }
        let slot = rng.gen_range(0..self.entries.len());
        self.entries
            .get_index(slot)
            .map(|((state, action), (next_state, reward))| (state, action, next_state, *reward))
    }

    /// Number of visited pairs
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S, A> Default for Model<S, A>
where
    S: State,
    A: Action,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_last_write_wins() {
        let mut model = Model::new();
        model.record(&0, &'a', &1, 1.0);
        model.record(&0, &'a', &2, -3.0);
        assert_eq!(model.len(), 1);
        assert_eq!(model.outcome(&0, &'a'), Some((&2, -3.0)));
        assert_eq!(model.outcome(&0, &'b'), None);
    }

    #[test]
    fn test_overwrite_keeps_sampling_order() {
        let mut first = Model::new();
        let mut second = Model::new();
        for state in 0..5u8 {
            first.record(&state, &'a', &state, 0.0);
            second.record(&state, &'a', &state, 0.0);
        }
        // Revisiting a pair must not move it to the back
        second.record(&0, &'a', &9, 2.0);

        let mut rng_first = StdRng::seed_from_u64(13);
        let mut rng_second = StdRng::seed_from_u64(13);
        for _ in 0..50 {
            let (state_a, ..) = first.sample(&mut rng_first).unwrap();
            let (state_b, ..) = second.sample(&mut rng_second).unwrap();
            assert_eq!(state_a, state_b);
        }
        assert_eq!(second.outcome(&0, &'a'), Some((&9, 2.0)));
    }

    #[test]
    fn test_empty_model_samples_nothing() {
        let model: Model<u8, char> = Model::new();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(model.sample(&mut rng).is_none());
    }

    #[test]
    fn test_sampling_covers_all_pairs() {
        let mut model = Model::new();
        for state in 0..4u8 {
            model.record(&state, &'a', &(state + 1), f64::from(state));
        }
        let mut rng = StdRng::seed_from_u64(0);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let (state, _, next, reward) = model.sample(&mut rng).unwrap();
            assert_eq!(*next, state + 1);
            assert_eq!(reward, f64::from(*state));
            seen[usize::from(*state)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
