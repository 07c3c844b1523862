//! Core graph data structures

mod cloning_graph;
mod document;
mod entity;
mod error;
mod id;
mod index;
mod source;
mod validate;


pub use cloning_graph::CloningGraph;
pub use document::GraphDocument;
pub use entity::{Attachment, Entity, EntityKind, Primer, Sequence, SequenceKind};
pub use error::{LineageError, LineageResult};
pub use id::{next_id, EntityId, MAX_ID};
pub use index::{AdjacencyIndex, Descendants};
pub use source::{Location, Operation, PrimerBinding, Source, SourceInput};
pub use validate::InvariantViolation;
