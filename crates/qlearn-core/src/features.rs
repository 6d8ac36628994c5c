//! Feature extraction for linear value approximation

use std::fmt::Debug;

use crate::FeatureVector;

/// Maps a `(state, action)` pair to a sparse named feature vector
///
/// Implemented for any `Fn(&S, &A) -> FeatureVector`.
pub trait FeatureExtractor<S, A> {
    /// Features of taking `action` in `state`
    fn features(&self, state: &S, action: &A) -> FeatureVector;
}

impl<S, A, F> FeatureExtractor<S, A> for F
where
    F: Fn(&S, &A) -> FeatureVector,
{
    fn features(&self, state: &S, action: &A) -> FeatureVector {
        self(state, action)
    }
}

/// One indicator feature per `(state, action)` pair
///
/// With this extractor a linear agent behaves like tabular Q-learning.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityExtractor;

impl<S: Debug, A: Debug> FeatureExtractor<S, A> for IdentityExtractor {
    fn features(&self, state: &S, action: &A) -> FeatureVector {
        std::iter::once((format!("{state:?}|{action:?}"), 1.0)).collect()
    }
}

/// A single constant `"bias"` feature for every pair
#[derive(Debug, Clone, Copy, Default)]
pub struct BiasExtractor;

impl BiasExtractor {
    /// Feature name used by the extractor
    pub const FEATURE: &'static str = "bias";
}

impl<S, A> FeatureExtractor<S, A> for BiasExtractor {
    fn features(&self, _state: &S, _action: &A) -> FeatureVector {
        std::iter::once((Self::FEATURE.to_string(), 1.0)).collect()
    }
}
