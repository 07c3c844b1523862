//! Shared identifier space for sources, sequences and primers

use serde::{Deserialize, Serialize};

/// Largest id a graph may hold, so that any two ids differ by an `i64`
pub const MAX_ID: u64 = i64::MAX as u64;

/// Identifier shared by every entity in a cloning graph
///
/// Serializes as a plain integer. Valid ids lie in `1..=MAX_ID`; `0` never
/// names an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Create an id, rejecting zero and values above [`MAX_ID`]
    pub fn new(value: u64) -> Option<Self> {
        (1..=MAX_ID).contains(&value).then_some(Self(value))
    }

    /// Get the inner integer value
    pub fn get(self) -> u64 {
        self.0
    }

    /// Whether the id lies in the allowed range
    pub fn is_valid(self) -> bool {
        (1..=MAX_ID).contains(&self.0)
    }

    /// Shift the id by a signed delta, failing if the result leaves the range
    pub fn shifted(self, delta: i64) -> Option<Self> {
        let value = i128::from(self.0) + i128::from(delta);
        u64::try_from(value).ok().and_then(Self::new)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    /// Unchecked conversion; graph boundaries reject ids out of range.
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Smallest id greater than every id in `ids`, or `1` when there are none
///
/// Pure: two calls without inserting the first result return the same id.
/// Saturates instead of overflowing; an id past [`MAX_ID`] is then refused
/// by the graph it is inserted into.
pub fn next_id<I>(ids: I) -> EntityId
where
    I: IntoIterator<Item = EntityId>,
{
    ids.into_iter()
        .map(EntityId::get)
        .max()
        .map(|max| EntityId(max.saturating_add(1)))
        .unwrap_or(EntityId(1))
}
