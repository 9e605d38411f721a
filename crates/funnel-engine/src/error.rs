//! Engine error types.

use funnel_storage::StorageError;

/// Errors surfaced by the transition engine, workflows, and scheduler.
///
/// Callers must treat anything other than an `Ok` outcome as "my view of
/// the lead is stale": re-read from the store rather than patching locally.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g., "lead", "rule").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The target stage is not in the catalog.
    #[error("unknown stage: {0}")]
    UnknownStage(String),

    /// The lead has already been converted; conversion is one-way.
    #[error("lead {0} is already converted")]
    AlreadyConverted(String),

    /// The target stage requires a call, but no call time was supplied.
    #[error("stage {stage} requires a scheduled call time")]
    CallTimeRequired {
        /// The call-required stage.
        stage: String,
    },

    /// Call creation failed and the stage write was compensated; the lead
    /// is back in its previous stage.
    #[error("call creation failed for lead {lead_id} (stage restored to {restored_stage}): {reason}")]
    CallCreationFailed {
        /// The lead whose transition was rolled back.
        lead_id: String,
        /// The stage the compensating write restored.
        restored_stage: String,
        /// The underlying call-creation failure.
        reason: String,
    },

    /// The compensating write itself failed; the lead may still be visible
    /// in the target stage without a call. Callers must re-read.
    #[error("compensation failed for lead {lead_id}: {reason}")]
    CompensationFailed {
        /// The lead left in an unconfirmed stage.
        lead_id: String,
        /// The underlying store failure.
        reason: String,
    },

    /// The store reported a concurrent modification; re-read and retry.
    #[error("conflict on {entity} {id}: re-read required")]
    Conflict {
        /// The kind of entity.
        entity: String,
        /// The identifier whose state changed underneath the caller.
        id: String,
    },

    /// The persistence layer failed.
    #[error("storage error: {0}")]
    Storage(StorageError),
}

/// Convenience alias used throughout the engine crate.
pub type Result<T> = std::result::Result<T, EngineError>;

impl From<StorageError> for EngineError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, id } => Self::NotFound { entity, id },
            StorageError::Conflict { entity, id } => Self::Conflict { entity, id },
            other => Self::Storage(other),
        }
    }
}

impl EngineError {
    /// Returns `true` if this is a [`EngineError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
