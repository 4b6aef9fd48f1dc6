// Contract-First Design
// This module defines the contracts (preconditions, postconditions,
// invariants) both index structures must satisfy. The two implementations
// share an identical interface so they can be swapped or compared at the
// call site without either knowing about the other.

use crate::types::{ValidatedFileName, ValidatedPath};
use anyhow::Result;

/// A single filename -> path association held by an index
pub type IndexEntry = (ValidatedFileName, ValidatedPath);

/// Core trait for ordered index operations
///
/// Both the balanced binary index and the multiway leaf-chain index implement
/// this contract with different structural strategies.
pub trait OrderedIndex {
    /// Insert a key-value pair
    ///
    /// # Preconditions
    /// - Key and value are validated at construction of their types
    ///
    /// # Postconditions
    /// - Entry is searchable immediately
    /// - Previous value (if any) is overwritten in place
    /// - The structure's ordering and balance invariants hold
    ///
    /// # Invariants
    /// - Entry count increases by 1 only for a new key
    fn insert(&mut self, key: ValidatedFileName, value: ValidatedPath) -> Result<()>;

    /// Search for a key
    ///
    /// # Postconditions
    /// - Returns Some(path) if the key is present, None otherwise
    /// - An absent key is a normal outcome, never an error
    /// - Does not modify index state
    fn search(&self, key: &ValidatedFileName) -> Result<Option<ValidatedPath>>;

    /// Remove a key
    ///
    /// # Postconditions
    /// - Key no longer appears in searches or listings
    /// - Returns true if the key existed; deleting an absent key is a
    ///   no-op returning false, never an error
    /// - The structure's invariants hold after any repair
    fn delete(&mut self, key: &ValidatedFileName) -> Result<bool>;

    /// List every entry in ascending key order
    ///
    /// # Postconditions
    /// - Keys are strictly increasing
    /// - The returned set equals all inserted keys minus deleted ones
    fn list_all(&self) -> Result<Vec<IndexEntry>>;

    /// Number of entries currently indexed
    fn len(&self) -> usize;

    /// Whether the index holds no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short name identifying the implementation, for logs and metrics
    fn index_type(&self) -> &str;
}

/// Ordered range scans over a closed key interval
///
/// Only structures with an efficient ordered-scan path implement this; for
/// the multiway index it walks the leaf chain without touching the tree
/// above it.
pub trait RangeScan: OrderedIndex {
    /// Collect every entry with `start <= key <= end` in ascending order
    ///
    /// # Postconditions
    /// - Exactly the entries in the closed interval, ascending
    /// - `start > end` yields an empty sequence, never an error
    fn range_query(
        &self,
        start: &ValidatedFileName,
        end: &ValidatedFileName,
    ) -> Result<Vec<IndexEntry>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // A trivial vec-backed index to exercise the trait's default methods
    struct VecIndex(Vec<IndexEntry>);

    impl OrderedIndex for VecIndex {
        fn insert(&mut self, key: ValidatedFileName, value: ValidatedPath) -> Result<()> {
            self.0.retain(|(k, _)| k != &key);
            self.0.push((key, value));
            self.0.sort_by(|a, b| a.0.cmp(&b.0));
            Ok(())
        }

        fn search(&self, key: &ValidatedFileName) -> Result<Option<ValidatedPath>> {
            Ok(self
                .0
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone()))
        }

        fn delete(&mut self, key: &ValidatedFileName) -> Result<bool> {
            let before = self.0.len();
            self.0.retain(|(k, _)| k != key);
            Ok(self.0.len() < before)
        }

        fn list_all(&self) -> Result<Vec<IndexEntry>> {
            Ok(self.0.clone())
        }

        fn len(&self) -> usize {
            self.0.len()
        }

        fn index_type(&self) -> &str {
            "vec"
        }
    }

    #[test]
    fn test_is_empty_default() -> Result<()> {
        let mut index = VecIndex(Vec::new());
        assert!(index.is_empty());

        index.insert(
            ValidatedFileName::new("a.txt")?,
            ValidatedPath::new("/tmp/a.txt")?,
        )?;
        assert!(!index.is_empty());
        assert_eq!(index.len(), 1);

        Ok(())
    }
}
