//! Storage trait definitions

use crate::graph::{CloningGraph, LineageError};
use chrono::{DateTime, Utc};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParse(String),

    #[error("Stored strategy is invalid: {0}")]
    Lineage(#[from] LineageError),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Listing entry for a stored strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategySummary {
    pub name: String,
    pub saved_at: DateTime<Utc>,
    pub sources: usize,
    pub sequences: usize,
    pub primers: usize,
}

/// Trait for strategy storage backends
///
/// Strategies are stored whole, by name. Implementations must be
/// thread-safe (Send + Sync).
pub trait StrategyStore: Send + Sync {
    /// Save a strategy, replacing any strategy with the same name
    fn save_strategy(&self, name: &str, graph: &CloningGraph) -> StorageResult<()>;

    /// Load and re-validate a strategy
    fn load_strategy(&self, name: &str) -> StorageResult<Option<CloningGraph>>;

    /// Delete a strategy, returning whether it existed
    fn delete_strategy(&self, name: &str) -> StorageResult<bool>;

    /// List stored strategies, most recently saved first
    fn list_strategies(&self) -> StorageResult<Vec<StrategySummary>>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: StrategyStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
