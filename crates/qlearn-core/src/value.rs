//! Sparse value stores with an implicit zero default
//!
//! Every store in this module reads unseen keys as exactly `0.0`. Stored
//! entries only ever appear through explicit writes, so the tables grow
//! monotonically as new keys are visited and are never pruned.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Sparse mapping from keys to reals where absent keys read as `0.0`
#[derive(Debug, Clone, PartialEq)]
pub struct SparseTable<K: Eq + Hash> {
    entries: HashMap<K, f64>,
}

/// Named feature values extracted for a `(state, action)` pair
pub type FeatureVector = SparseTable<String>;

/// Linear coefficients keyed by feature name
pub type Weights = SparseTable<String>;

impl<K: Eq + Hash> SparseTable<K> {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Value stored under `key`, or `0.0`
    pub fn get<Q>(&self, key: &Q) -> f64
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).copied().unwrap_or(0.0)
    }

    /// Overwrite the value stored under `key`
    pub fn set(&mut self, key: K, value: f64) {
        self.entries.insert(key, value);
    }

    /// Add `delta` to the value under `key`, starting from `0.0`
    pub fn add(&mut self, key: K, delta: f64) {
        *self.entries.entry(key).or_insert(0.0) += delta;
    }

    /// Dot product with another table; keys missing on either side count as `0.0`
    pub fn dot(&self, other: &Self) -> f64 {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .entries
            .iter()
            .map(|(key, value)| value * large.get(key))
            .sum()
    }

    /// Whether `key` has an explicit entry
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Number of explicit entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no explicit entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over explicit entries
    pub fn iter(&self) -> impl Iterator<Item = (&K, f64)> {
        self.entries.iter().map(|(key, value)| (key, *value))
    }
}

impl<K: Eq + Hash> Default for SparseTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> FromIterator<(K, f64)> for SparseTable<K> {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Action-value table mapping `(state, action)` pairs to estimates
///
/// Entries are grouped per state so reads never need to clone the key.
#[derive(Debug, Clone)]
pub struct QTable<S, A> {
    values: HashMap<S, HashMap<A, f64>>,
}

impl<S, A> QTable<S, A>
where
    S: Eq + Hash,
    A: Eq + Hash,
{
    /// Create an empty Q-table
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Get Q-value for a state-action pair, `0.0` if never written
    pub fn get(&self, state: &S, action: &A) -> f64 {
        self.values
            .get(state)
            .and_then(|actions| actions.get(action))
            .copied()
            .unwrap_or(0.0)
    }

    /// Set Q-value for a state-action pair
    pub fn set(&mut self, state: S, action: A, value: f64) {
        self.values.entry(state).or_default().insert(action, value);
    }

    /// Whether the pair has ever been written
    pub fn contains(&self, state: &S, action: &A) -> bool {
        self.values
            .get(state)
            .is_some_and(|actions| actions.contains_key(action))
    }

    /// Number of stored state-action pairs
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.values().map(HashMap::len).sum()
    }

    /// Whether no pair has been written yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over stored `(state, action, value)` entries
    pub fn iter(&self) -> impl Iterator<Item = (&S, &A, f64)> {
        self.values.iter().flat_map(|(state, actions)| {
            actions
                .iter()
                .map(move |(action, value)| (state, action, *value))
        })
    }
}

impl<S, A> Default for QTable<S, A>
where
    S: Eq + Hash,
    A: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
