//! Shard indices held by oracles and drawn by the dispatcher.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One shard index in `[0, index_space)`.
pub type ShardIndex = u8;

/// The ordered, pairwise-distinct shard indices assigned to one oracle.
///
/// Immutable once built. [`IndexSet::new`] checks distinctness and range;
/// deserialization checks distinctness only, since the index space is a
/// protocol parameter the wire form does not carry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<ShardIndex>", try_from = "Vec<ShardIndex>")]
pub struct IndexSet(Vec<ShardIndex>);

impl IndexSet {
    /// Build an index set, rejecting duplicates and indices `>= space`.
    pub fn new(indexes: Vec<ShardIndex>, space: u8) -> Result<Self, TypesError> {
        if !indexes.iter().all(|&i| i < space) {
            return Err(TypesError::InvalidIndexSet { indexes, space });
        }
        Self::checked(indexes, space)
    }

    fn checked(indexes: Vec<ShardIndex>, space: u8) -> Result<Self, TypesError> {
        let distinct = indexes
            .iter()
            .enumerate()
            .all(|(pos, i)| !indexes[..pos].contains(i));
        if indexes.is_empty() || !distinct {
            return Err(TypesError::InvalidIndexSet { indexes, space });
        }
        Ok(Self(indexes))
    }

    pub fn contains(&self, index: ShardIndex) -> bool {
        self.0.contains(&index)
    }

    pub fn as_slice(&self) -> &[ShardIndex] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<ShardIndex>> for IndexSet {
    type Error = TypesError;

    fn try_from(indexes: Vec<ShardIndex>) -> Result<Self, Self::Error> {
        Self::checked(indexes, u8::MAX)
    }
}

impl From<IndexSet> for Vec<ShardIndex> {
    fn from(set: IndexSet) -> Self {
        set.0
    }
}

impl fmt::Display for IndexSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{{{}}}", parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_distinct_in_range() {
        let set = IndexSet::new(vec![1, 4, 7], 10).unwrap();
        assert!(set.contains(4));
        assert!(!set.contains(5));
        assert_eq!(set.to_string(), "{1,4,7}");
    }

    #[test]
    fn rejects_duplicates() {
        assert!(IndexSet::new(vec![3, 3, 7], 10).is_err());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(IndexSet::new(vec![1, 2, 10], 10).is_err());
    }

    #[test]
    fn deserialize_rejects_duplicates_and_empty() {
        let set: IndexSet = serde_json::from_str("[2,5,9]").unwrap();
        assert_eq!(set.as_slice(), &[2, 5, 9]);
        assert!(serde_json::from_str::<IndexSet>("[3,3,200]").is_err());
        assert!(serde_json::from_str::<IndexSet>("[]").is_err());
        assert_eq!(serde_json::to_string(&set).unwrap(), "[2,5,9]");
    }

    #[test]
    fn rejects_empty() {
        assert!(IndexSet::new(vec![], 10).is_err());
    }

    #[test]
    fn preserves_assignment_order() {
        let set = IndexSet::new(vec![9, 0, 5], 10).unwrap();
        assert_eq!(set.as_slice(), &[9, 0, 5]);
    }
}
