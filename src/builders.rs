// Builder Patterns - Stage 6: Component Library
// Fluent builder APIs for constructing index entries and configured index
// instances with sensible defaults.

use anyhow::{ensure, Result};

use crate::balanced_index::BalancedIndex;
use crate::contracts::IndexEntry;
use crate::multiway_index::MultiwayIndex;
use crate::types::{ValidatedDegree, ValidatedFileName, ValidatedPath};
use crate::wrappers::MeteredIndex;

/// Fluent builder for creating index entries from raw path strings
///
/// The key defaults to the final component of the path, so most callers
/// only set the path.
pub struct EntryBuilder {
    path: Option<ValidatedPath>,
    key: Option<ValidatedFileName>,
}

impl EntryBuilder {
    pub fn new() -> Self {
        Self {
            path: None,
            key: None,
        }
    }

    /// Set the full path this entry points at
    pub fn path(mut self, path: impl AsRef<std::path::Path>) -> Result<Self> {
        self.path = Some(ValidatedPath::new(path)?);
        Ok(self)
    }

    /// Override the key instead of deriving it from the path
    pub fn key(mut self, key: impl Into<String>) -> Result<Self> {
        self.key = Some(ValidatedFileName::new(key)?);
        Ok(self)
    }

    /// Build the entry, deriving the key from the path when unset
    pub fn build(self) -> Result<IndexEntry> {
        ensure!(self.path.is_some(), "Entry requires a path");
        let path = self.path.expect("presence checked above");

        let key = match self.key {
            Some(key) => key,
            None => ValidatedFileName::from_path(path.as_path())?,
        };
        Ok((key, path))
    }
}

impl Default for EntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Fluent builder for configuring index instances
pub struct IndexConfigBuilder {
    name: Option<String>,
    degree: ValidatedDegree,
}

impl IndexConfigBuilder {
    pub fn new() -> Self {
        Self {
            name: None,
            degree: ValidatedDegree::default(),
        }
    }

    /// Set the name used in metrics output
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the multiway degree (ignored by the balanced index)
    pub fn degree(mut self, degree: usize) -> Result<Self> {
        self.degree = ValidatedDegree::new(degree)?;
        Ok(self)
    }

    /// Build a metered balanced binary index
    pub fn build_balanced(self) -> MeteredIndex<BalancedIndex> {
        let name = self.name.unwrap_or_else(|| "balanced".to_string());
        MeteredIndex::new(BalancedIndex::new(), name)
    }

    /// Build a metered multiway leaf-chain index
    pub fn build_multiway(self) -> MeteredIndex<MultiwayIndex> {
        let name = self.name.unwrap_or_else(|| "multiway".to_string());
        MeteredIndex::new(MultiwayIndex::new(self.degree), name)
    }
}

impl Default for IndexConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
