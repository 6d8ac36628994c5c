//! Action representation and legal-action sources

use std::fmt::Debug;
use std::hash::Hash;

/// Opaque identifier for a move in a given state
pub trait Action: Clone + Eq + Hash + Debug {}

impl<T> Action for T where T: Clone + Eq + Hash + Debug {}

/// Supplier of the legal actions available in a state
///
/// Terminal states have no legal actions. Implemented for any
/// `Fn(&S) -> Vec<A>`, so a closure over the environment rules is enough.
pub trait LegalActions<S, A> {
    /// Legal actions at `state`, empty when `state` is terminal
    fn legal_actions(&self, state: &S) -> Vec<A>;
}

impl<S, A, F> LegalActions<S, A> for F
where
    F: Fn(&S) -> Vec<A>,
{
    fn legal_actions(&self, state: &S) -> Vec<A> {
        self(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_action_source() {
        let source = |s: &u32| if *s == 0 { vec![] } else { vec!['a', 'b'] };
        assert!(source.legal_actions(&0).is_empty());
        assert_eq!(source.legal_actions(&3), vec!['a', 'b']);
    }
}
