//! Crate-wide error taxonomy.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error covers every fatal condition the extraction pipeline can hit.
///
/// Structural type mismatches between compared documents are deliberately not
/// represented here: they are handled by falling back to whole-value
/// replacement and surfaced as a warning diagnostic.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no resource schema registered for {identity}")]
    SchemaNotFound { identity: String },

    #[error("required attribute 'metadata.name' not found in {identity} resource")]
    MissingIdentifier { identity: String },

    #[error("list element under '{field}' is missing merge key '{key}'")]
    MissingMergeKey { field: String, key: String },

    #[error("malformed input: {reason}")]
    MalformedInput { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Creates a schema-not-found error for a type identity.
    pub fn schema_not_found(identity: impl Into<String>) -> Self {
        Error::SchemaNotFound {
            identity: identity.into(),
        }
    }

    /// Creates a missing-identifier error for a type identity.
    pub fn missing_identifier(identity: impl Into<String>) -> Self {
        Error::MissingIdentifier {
            identity: identity.into(),
        }
    }

    /// Creates a missing-merge-key error for a list field.
    pub fn missing_merge_key(field: impl Into<String>, key: impl Into<String>) -> Self {
        Error::MissingMergeKey {
            field: field.into(),
            key: key.into(),
        }
    }

    /// Creates a malformed-input error.
    pub fn malformed_input(reason: impl Into<String>) -> Self {
        Error::MalformedInput {
            reason: reason.into(),
        }
    }
}
