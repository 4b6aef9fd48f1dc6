// Validation Layer
// Runtime enforcement of the contracts on keys, values and index
// configuration. Everything the index core accepts passes through here.

use anyhow::{bail, Result};
use std::collections::HashMap;

/// Validation errors with detailed context
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Precondition failed: {condition}")]
    PreconditionFailed { condition: String, context: String },

    #[error("Postcondition failed: {condition}")]
    PostconditionFailed { condition: String, context: String },

    #[error("Invariant violated: {invariant}")]
    InvariantViolated { invariant: String, state: String },

    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },
}

/// Validation context for better error messages
#[derive(Clone)]
pub struct ValidationContext {
    operation: String,
    attributes: HashMap<String, String>,
}

impl ValidationContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn validate(self, condition: bool, message: &str) -> Result<()> {
        if !condition {
            let context = format!(
                "Operation: {}, Attributes: {:?}",
                self.operation, self.attributes
            );
            bail!(ValidationError::PreconditionFailed {
                condition: message.to_string(),
                context,
            });
        }
        Ok(())
    }
}

/// Path validation for index values
pub mod path {
    use super::*;
    use std::path::Path;

    /// Maximum path length across platforms
    const MAX_PATH_LENGTH: usize = 4096;

    /// Validate a file path used as an index value
    pub fn validate_file_path(path: &str) -> Result<()> {
        let ctx = ValidationContext::new("validate_file_path").with_attribute("path", path);

        ctx.clone()
            .validate(!path.is_empty(), "Path cannot be empty")?;

        ctx.clone().validate(
            path.len() < MAX_PATH_LENGTH,
            &format!("Path exceeds maximum length of {MAX_PATH_LENGTH}"),
        )?;

        ctx.clone()
            .validate(!path.contains('\0'), "Path contains null bytes")?;

        // Reject directory traversal components
        let path_obj = Path::new(path);
        for component in path_obj.components() {
            if let std::path::Component::ParentDir = component {
                bail!(ValidationError::InvalidInput {
                    field: "path".to_string(),
                    reason: "Parent directory references (..) not allowed".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Key and configuration validation for the index structures
pub mod index {
    use super::*;

    /// Maximum filename length (common filesystem limit)
    const MAX_FILENAME_LENGTH: usize = 255;

    /// Smallest and largest accepted branching degrees
    pub const MIN_DEGREE: usize = 2;
    pub const MAX_DEGREE: usize = 512;

    /// Validate a filename used as an index key
    pub fn validate_filename(name: &str) -> Result<()> {
        let ctx = ValidationContext::new("validate_filename").with_attribute("filename", name);

        ctx.clone()
            .validate(!name.trim().is_empty(), "Filename cannot be empty")?;

        ctx.clone().validate(
            name.len() <= MAX_FILENAME_LENGTH,
            &format!("Filename exceeds maximum length of {MAX_FILENAME_LENGTH}"),
        )?;

        ctx.clone()
            .validate(!name.contains('\0'), "Filename contains null bytes")?;

        ctx.validate(
            !name.contains('/') && !name.contains('\\'),
            "Filename cannot contain path separators",
        )?;

        Ok(())
    }

    /// Validate a branching degree for the multiway index
    pub fn validate_degree(degree: usize) -> Result<()> {
        let ctx =
            ValidationContext::new("validate_degree").with_attribute("degree", degree.to_string());

        ctx.clone().validate(
            degree >= MIN_DEGREE,
            &format!("Degree must be at least {MIN_DEGREE}"),
        )?;

        ctx.validate(
            degree <= MAX_DEGREE,
            &format!("Degree must be at most {MAX_DEGREE}"),
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_validation() {
        // Valid paths
        assert!(path::validate_file_path("/test/file.md").is_ok());
        assert!(path::validate_file_path("relative/path.txt").is_ok());

        // Invalid paths
        assert!(path::validate_file_path("").is_err());
        assert!(path::validate_file_path("../../../etc/passwd").is_err());
        assert!(path::validate_file_path("file\0with\0nulls").is_err());

        // Path too long
        let long_path = "x".repeat(5000);
        assert!(path::validate_file_path(&long_path).is_err());
    }

    #[test]
    fn test_filename_validation() {
        // Valid filenames
        assert!(index::validate_filename("notes.txt").is_ok());
        assert!(index::validate_filename("report-2024_final.md").is_ok());

        // Invalid filenames
        assert!(index::validate_filename("").is_err());
        assert!(index::validate_filename("   ").is_err());
        assert!(index::validate_filename("dir/notes.txt").is_err());
        assert!(index::validate_filename("dir\\notes.txt").is_err());
        assert!(index::validate_filename("nul\0byte").is_err());
        assert!(index::validate_filename(&"x".repeat(300)).is_err());
    }

    #[test]
    fn test_degree_validation() {
        assert!(index::validate_degree(2).is_ok());
        assert!(index::validate_degree(3).is_ok());
        assert!(index::validate_degree(512).is_ok());

        assert!(index::validate_degree(0).is_err());
        assert!(index::validate_degree(1).is_err());
        assert!(index::validate_degree(1000).is_err());
    }
}
