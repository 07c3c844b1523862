//! Storage backends for cloning strategies
//!
//! Strategies are persisted through the `StrategyStore` trait. The primary
//! implementation is `SqliteStore`.

mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{OpenStore, StorageError, StorageResult, StrategyStore, StrategySummary};
