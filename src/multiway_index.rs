// Multiway Leaf-Chain Index - Stage 2: Contract-First Design
// Implements OrderedIndex and RangeScan over the pure B+ tree. The degree
// is fixed at construction; production callers get the index pre-wrapped
// in MeteredIndex via the factory.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::contracts::{IndexEntry, OrderedIndex, RangeScan};
use crate::observability::{
    log_error_with_context, log_operation, Operation, OperationContext, PerfTimer,
};
use crate::pure::btree;
use crate::types::{ValidatedDegree, ValidatedFileName, ValidatedPath, ValidatedTimestamp};
use crate::wrappers::MeteredIndex;

/// Ordered index backed by a B+ tree with a linked leaf chain
///
/// All entries live in leaves, so a range query descends once and then
/// walks siblings. Node capacity is governed by the degree chosen at
/// construction: non-root nodes hold degree-1 to 2*degree-1 keys.
pub struct MultiwayIndex {
    tree: btree::BPlusTree,
    metadata: IndexMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexMetadata {
    version: u32,
    degree: usize,
    entry_count: usize,
    created: ValidatedTimestamp,
    updated: ValidatedTimestamp,
}

impl MultiwayIndex {
    pub fn new(degree: ValidatedDegree) -> Self {
        let now = ValidatedTimestamp::now();
        Self {
            tree: btree::create_tree(degree),
            metadata: IndexMetadata {
                version: 1,
                degree: degree.get(),
                entry_count: 0,
                created: now,
                updated: now,
            },
        }
    }

    pub fn degree(&self) -> usize {
        self.metadata.degree
    }

    fn touch_metadata(&mut self) {
        self.metadata.entry_count = self.tree.len();
        self.metadata.updated = ValidatedTimestamp::now();
    }

    /// Metadata snapshot for diagnostics
    pub fn stats(&self) -> serde_json::Value {
        serde_json::json!({
            "index_type": "multiway",
            "version": self.metadata.version,
            "degree": self.metadata.degree,
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
        match btree::search_in_tree(&self.tree, key) {
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
        if btree::search_in_tree(&self.tree, key).is_some() {
            bail!(
                "Delete postcondition failed: key {} still present after deletion",
                key
            );
        }
        Ok(())
    }
}

impl Default for MultiwayIndex {
    fn default() -> Self {
        Self::new(ValidatedDegree::default())
    }
}

impl OrderedIndex for MultiwayIndex {
    fn insert(&mut self, key: ValidatedFileName, value: ValidatedPath) -> Result<()> {
        let ctx = OperationContext::new("multiway_index.insert");
        let inserted = btree::insert_into_tree(&mut self.tree, key.clone(), value.clone());
        self.touch_metadata();

        if let Err(e) = self.validate_insert_postcondition(&key, &value) {
            log_error_with_context(&e, &ctx);
            return Err(e);
        }

        log_operation(
            &ctx,
            &Operation::IndexInsert {
                index_type: "multiway".to_string(),
                key: key.to_string(),
            },
            &Ok(()),
        );
        debug!(
            key = %key,
            new_key = inserted,
            entries = self.metadata.entry_count,
            "multiway index insert"
        );
        Ok(())
    }

    fn search(&self, key: &ValidatedFileName) -> Result<Option<ValidatedPath>> {
        let ctx = OperationContext::new("multiway_index.search");
        let found = btree::search_in_tree(&self.tree, key);

        log_operation(
            &ctx,
            &Operation::IndexSearch {
                index_type: "multiway".to_string(),
                key: key.to_string(),
                found: found.is_some(),
            },
            &Ok(()),
        );
        Ok(found)
    }

    fn delete(&mut self, key: &ValidatedFileName) -> Result<bool> {
        let ctx = OperationContext::new("multiway_index.delete");
        let existed = btree::delete_from_tree(&mut self.tree, key);
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
                index_type: "multiway".to_string(),
                key: key.to_string(),
                existed,
            },
            &Ok(()),
        );
        Ok(existed)
    }

    fn list_all(&self) -> Result<Vec<IndexEntry>> {
        let ctx = OperationContext::new("multiway_index.list_all");
        let _timer = PerfTimer::new("multiway_index.list_all");
        let pairs = btree::extract_all_pairs(&self.tree);

        log_operation(
            &ctx,
            &Operation::IndexList {
                index_type: "multiway".to_string(),
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
        "multiway"
    }
}

impl RangeScan for MultiwayIndex {
    fn range_query(
        &self,
        start: &ValidatedFileName,
        end: &ValidatedFileName,
    ) -> Result<Vec<IndexEntry>> {
        let ctx = OperationContext::new("multiway_index.range_query");
        let pairs = btree::range_scan(&self.tree, start, end);

        log_operation(
            &ctx,
            &Operation::IndexRangeScan {
                index_type: "multiway".to_string(),
                result_count: pairs.len(),
            },
            &Ok(()),
        );
        Ok(pairs)
    }
}

/// Factory function to create a production-ready multiway index
///
/// Automatically applies the MeteredIndex wrapper for metrics collection.
pub fn create_multiway_index(degree: ValidatedDegree) -> MeteredIndex<MultiwayIndex> {
    MeteredIndex::new(MultiwayIndex::new(degree), "multiway".to_string())
}

/// Create a bare multiway index for testing without the metrics wrapper
pub fn create_multiway_index_for_tests(degree: ValidatedDegree) -> MultiwayIndex {
    MultiwayIndex::new(degree)
}
