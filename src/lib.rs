//! Cloneline: Provenance Graph Engine for DNA Cloning Strategies
//!
//! Records how every sequence in a cloning strategy came to be: a DAG in
//! which each source consumes upstream sequences and primers and produces
//! at most one sequence.
//!
//! # Core Concepts
//!
//! - **Sources**: one cloning step each (PCR, digestion, assembly, ...)
//! - **Sequences**: DNA molecules, each produced by exactly one source
//! - **Primers**: named oligos shared by reference between sources
//!
//! Graph surgery (merge, graft, cascade delete, extraction) lives in
//! [`surgery`]; mapping product coordinates back onto inputs lives in
//! [`transform`]; [`store::ProvenanceStore`] ties them together behind a
//! single writer.
//!
//! # Example
//!
//! ```
//! use cloneline::store::ProvenanceStore;
//!
//! let mut store = ProvenanceStore::new();
//! let fwd = store.add_primer("fwd", "ACGTACGT", None).unwrap();
//! assert!(store.graph().primer(fwd).is_some());
//! ```

mod graph;
pub mod storage;
pub mod store;
pub mod surgery;
pub mod transform;

pub use graph::{
    next_id, AdjacencyIndex, Attachment, CloningGraph, Descendants, Entity, EntityId, EntityKind,
    GraphDocument, InvariantViolation, LineageError, LineageResult, Location, Operation, Primer,
    PrimerBinding, Sequence, SequenceKind, Source, SourceInput, MAX_ID,
};
pub use storage::{OpenStore, SqliteStore, StorageError, StorageResult, StrategyStore, StrategySummary};
pub use store::{CandidateResult, CloningService, Completion, ProvenanceStore, Session};
pub use transform::{AssemblyMap, SequenceRange};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
