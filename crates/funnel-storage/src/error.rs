//! Storage error types.

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested entity was not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g., "lead", "rule").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// An insert collided with an existing row.
    #[error("{entity} already exists: {id}")]
    Duplicate {
        /// The kind of entity.
        entity: String,
        /// The conflicting identifier.
        id: String,
    },

    /// A conditional write matched no row because the entity's state
    /// changed underneath it. Callers should re-read and reconcile.
    #[error("{entity} {id} was modified concurrently")]
    Conflict {
        /// The kind of entity.
        entity: String,
        /// The identifier whose state changed.
        id: String,
    },

    /// A validation constraint was violated.
    #[error("validation error: {message}")]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to establish or maintain a database connection.
    #[error("connection error: {0}")]
    Connection(String),

    /// A schema migration failed.
    #[error("migration {name} failed: {reason}")]
    Migration {
        /// Name of the migration that failed.
        name: String,
        /// Underlying error description.
        reason: String,
    },

    /// A raw SQLite query error.
    #[error("query error: {0}")]
    Query(#[from] rusqlite::Error),

    /// JSON serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Catch-all for unexpected internal errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the storage crate.
pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    // -- Constructors --------------------------------------------------------

    /// Creates a [`StorageError::NotFound`] for the given entity kind and id.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a [`StorageError::Duplicate`] for the given entity kind and id.
    pub fn duplicate(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Duplicate {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a [`StorageError::Conflict`] for the given entity kind and id.
    pub fn conflict(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Conflict {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a [`StorageError::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    // -- Predicates ----------------------------------------------------------

    /// Returns `true` if this is a [`StorageError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a [`StorageError::Conflict`].
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
