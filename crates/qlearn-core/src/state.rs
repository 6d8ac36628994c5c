//! State representation

use std::fmt::Debug;
use std::hash::Hash;

/// Opaque identifier for an environment configuration
///
/// Agents never look inside a state; they only hash it, compare it and hand
/// it back to the environment. Any `Clone + Eq + Hash + Debug` type
/// qualifies.
pub trait State: Clone + Eq + Hash + Debug {}

impl<T> State for T where T: Clone + Eq + Hash + Debug {}
