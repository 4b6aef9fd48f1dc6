// Balanced Binary Index - Stage 2: Contract-First Design
// Implements the OrderedIndex trait over the pure red-black tree, adding
// runtime contract enforcement and operation logging. Production callers
// get it pre-wrapped in MeteredIndex via the factory.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::contracts::{IndexEntry, OrderedIndex};
use crate::observability::{
    log_error_with_context, log_operation, Operation, OperationContext, PerfTimer,
};
use crate::pure::rbtree;
use crate::types::{ValidatedFileName, ValidatedPath, ValidatedTimestamp};
use crate::wrappers::MeteredIndex;

/// Ordered index backed by a red-black tree
///
/// Guarantees O(log n) insert, search, and delete with a tree height of at
/// most 2*log2(n + 1). Should be used through the MeteredIndex wrapper in
/// production so operation timings are collected.
pub struct BalancedIndex {
    tree: rbtree::RbTree,
    metadata: IndexMetadata,
}

/// Bookkeeping carried alongside the tree
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexMetadata {
    version: u32,
    entry_count: usize,
    created: ValidatedTimestamp,
    updated: ValidatedTimestamp,
}

impl Default for IndexMetadata {
    fn default() -> Self {
        let now = ValidatedTimestamp::now();
        Self {
            version: 1,
            entry_count: 0,
            created: now,
            updated: now,
        }
    }
}

impl BalancedIndex {
    pub fn new() -> Self {
        Self {
            tree: rbtree::create_empty_tree(),
            metadata: IndexMetadata::default(),
        }
    }

    fn touch_metadata(&mut self) {
        self.metadata.entry_count = self.tree.len();
        self.metadata.updated = ValidatedTimestamp::now();
    }

    /// Metadata snapshot for diagnostics
    pub fn stats(&self) -> serde_json::Value {
        serde_json::json!({
            "index_type": "balanced",
            "version": self.metadata.version,
            "entry_count": self.metadata.entry_count,
            "created": self.metadata.created.as_secs(),
            "updated": self.metadata.updated.as_secs(),
        })
    }

    /// Validate postcondition that the entry is searchable after insert
    fn validate_insert_postcondition(
        &self,
        key: &ValidatedFileName,
        value: &ValidatedPath,
    ) -> Result<()> {
        match rbtree::search_in_tree(&self.tree, key) {
            Some(stored) => {
                if stored != *value {
                    bail!(
                        "Insert postcondition failed: stored path {} does not match inserted path {}",
                        stored,
                        value
                    );
                }
                Ok(())
            }
            None => bail!(
                "Insert postcondition failed: key {} not found after insertion",
                key
            ),
        }
    }

    /// Validate postcondition that the key is gone after delete
    fn validate_delete_postcondition(&self, key: &ValidatedFileName) -> Result<()> {
        if rbtree::search_in_tree(&self.tree, key).is_some() {
            bail!(
                "Delete postcondition failed: key {} still present after deletion",
                key
            );
        }
        Ok(())
    }
}

impl Default for BalancedIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderedIndex for BalancedIndex {
    fn insert(&mut self, key: ValidatedFileName, value: ValidatedPath) -> Result<()> {
        let ctx = OperationContext::new("balanced_index.insert");
        let inserted = rbtree::insert_into_tree(&mut self.tree, key.clone(), value.clone());
        self.touch_metadata();

        if let Err(e) = self.validate_insert_postcondition(&key, &value) {
            log_error_with_context(&e, &ctx);
            return Err(e);
        }

        log_operation(
            &ctx,
            &Operation::IndexInsert {
                index_type: "balanced".to_string(),
                key: key.to_string(),
            },
            &Ok(()),
        );
        debug!(
            key = %key,
            new_key = inserted,
            entries = self.metadata.entry_count,
            "balanced index insert"
        );
        Ok(())
    }

    fn search(&self, key: &ValidatedFileName) -> Result<Option<ValidatedPath>> {
        let ctx = OperationContext::new("balanced_index.search");
        let found = rbtree::search_in_tree(&self.tree, key);

        log_operation(
            &ctx,
            &Operation::IndexSearch {
                index_type: "balanced".to_string(),
                key: key.to_string(),
                found: found.is_some(),
            },
            &Ok(()),
        );
        Ok(found)
    }

    fn delete(&mut self, key: &ValidatedFileName) -> Result<bool> {
        let ctx = OperationContext::new("balanced_index.delete");
        let existed = rbtree::delete_from_tree(&mut self.tree, key);
        if existed {
            self.touch_metadata();
        }

        if let Err(e) = self.validate_delete_postcondition(key) {
            log_error_with_context(&e, &ctx);
            return Err(e);
        }

        log_operation(
            &ctx,
            &Operation::IndexDelete {
                index_type: "balanced".to_string(),
                key: key.to_string(),
                existed,
            },
            &Ok(()),
        );
        Ok(existed)
    }

    fn list_all(&self) -> Result<Vec<IndexEntry>> {
        let ctx = OperationContext::new("balanced_index.list_all");
        let _timer = PerfTimer::new("balanced_index.list_all");
        let pairs = rbtree::extract_all_pairs(&self.tree);

        log_operation(
            &ctx,
            &Operation::IndexList {
                index_type: "balanced".to_string(),
                result_count: pairs.len(),
            },
            &Ok(()),
        );
        Ok(pairs)
    }

    fn len(&self) -> usize {
        self.tree.len()
    }

    fn index_type(&self) -> &str {
        "balanced"
    }
}

/// Factory function to create a production-ready balanced index
///
/// Automatically applies the MeteredIndex wrapper for metrics collection.
pub fn create_balanced_index() -> MeteredIndex<BalancedIndex> {
    MeteredIndex::new(BalancedIndex::new(), "balanced".to_string())
}

/// Create a bare balanced index for testing without the metrics wrapper
pub fn create_balanced_index_for_tests() -> BalancedIndex {
    BalancedIndex::new()
}
