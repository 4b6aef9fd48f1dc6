// Validated Types
// Strongly-typed wrappers that enforce invariants at construction time.
// These types cannot be built from invalid data, so the index structures
// never have to re-check their inputs.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A filename that has been validated for use as an index key
///
/// Ordering is plain byte-wise string ordering; this is the ordering both
/// index structures maintain.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ValidatedFileName {
    inner: String,
}

impl ValidatedFileName {
    /// Create a new validated filename
    ///
    /// # Invariants
    /// - Non-empty after trimming
    /// - At most 255 bytes
    /// - No path separators
    /// - No null bytes
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        crate::validation::index::validate_filename(&name)?;
        Ok(Self { inner: name })
    }

    /// Extract a validated filename from a full path
    ///
    /// This is the seam a CLI or filesystem layer uses to turn a user-supplied
    /// path into an index key before calling insert.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("Path has no filename component: {}", path.display()))?;
        Self::new(name)
    }

    /// Get the filename as a string slice
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl fmt::Display for ValidatedFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

/// A path that has been validated and is guaranteed to be safe
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidatedPath {
    inner: PathBuf,
}

impl ValidatedPath {
    /// Create a new validated path
    ///
    /// # Invariants
    /// - Path is non-empty
    /// - No directory traversal (..)
    /// - No null bytes
    /// - Valid UTF-8
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Path is not valid UTF-8"))?;

        crate::validation::path::validate_file_path(path_str)?;

        Ok(Self {
            inner: path.to_path_buf(),
        })
    }

    /// Get the inner path
    pub fn as_path(&self) -> &Path {
        &self.inner
    }

    /// Get as string (guaranteed to be valid UTF-8)
    pub fn as_str(&self) -> &str {
        self.inner.to_str().expect("ValidatedPath is always UTF-8")
    }
}

impl fmt::Display for ValidatedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A branching degree for the multiway index, bounded at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValidatedDegree {
    inner: usize,
}

impl ValidatedDegree {
    /// Create a new validated degree
    ///
    /// # Invariants
    /// - 2 <= degree <= 512
    pub fn new(degree: usize) -> Result<Self> {
        crate::validation::index::validate_degree(degree)?;
        Ok(Self { inner: degree })
    }

    /// Get the degree value
    pub fn get(&self) -> usize {
        self.inner
    }

    /// Minimum keys a non-root node may hold (degree - 1)
    pub fn min_keys(&self) -> usize {
        self.inner - 1
    }

    /// Maximum keys any node may hold (2 * degree - 1)
    pub fn max_keys(&self) -> usize {
        2 * self.inner - 1
    }
}

impl Default for ValidatedDegree {
    fn default() -> Self {
        // Degree 3 keeps nodes small enough that splits and merges show up
        // in modest test datasets.
        Self { inner: 3 }
    }
}

/// A timestamp with validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValidatedTimestamp {
    inner: i64,
}

impl ValidatedTimestamp {
    /// Create a new validated timestamp
    pub fn new(timestamp: i64) -> Result<Self> {
        ensure!(timestamp > 0, "Timestamp must be positive");
        Ok(Self { inner: timestamp })
    }

    /// Current time as a timestamp
    pub fn now() -> Self {
        Self {
            inner: chrono::Utc::now().timestamp(),
        }
    }

    /// Get the inner timestamp
    pub fn as_secs(&self) -> i64 {
        self.inner
    }
}
