//! Error types for graph operations

use super::entity::EntityKind;
use super::id::EntityId;
use super::validate::InvariantViolation;
use thiserror::Error;

/// Errors that can occur in lineage operations
///
/// Every operation that returns one of these leaves its input graph
/// untouched.
#[derive(Debug, Error)]
pub enum LineageError {
    #[error("Entity not found: {0}")]
    NotFound(EntityId),

    #[error("Entity {id} is not a {expected}")]
    WrongKind { id: EntityId, expected: EntityKind },

    #[error("Cycle detected through sequence {0}")]
    Cycle(EntityId),

    /// Raised by primer dedup; a merge or graft that hits it is a merge conflict.
    #[error("Duplicate primer name '{name}': primers {kept} and {duplicate} differ in sequence or identity")]
    DuplicatePrimerName {
        name: String,
        kept: EntityId,
        duplicate: EntityId,
    },

    #[error("Invalid graft source: {0}")]
    InvalidGraftSource(String),

    #[error("Invalid graph: {0}")]
    InvalidGraph(#[from] InvariantViolation),

    #[error("Primer name already in use: {0}")]
    PrimerNameTaken(String),

    #[error("Primer {primer} is referenced by source {source_id}")]
    PrimerInUse { primer: EntityId, source_id: EntityId },

    #[error("Source {0} already has an output")]
    SourceAlreadyCommitted(EntityId),

    #[error("No candidate results held for source {0}")]
    NoPendingCandidates(EntityId),

    #[error("Remote computation failed: {0}")]
    Remote(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LineageError {
    /// Whether the error is a primer-name clash surfaced by merge or graft
    pub fn is_merge_conflict(&self) -> bool {
        matches!(self, LineageError::DuplicatePrimerName { .. })
    }
}

/// Result type for lineage operations
pub type LineageResult<T> = Result<T, LineageError>;
