//! Structural invariants of a cloning graph
//!
//! 1. ids are unique across sources, sequences and primers, and lie in
//!    `1..=MAX_ID`
//! 2. every reference points at an existing entity of the right kind
//! 3. output -> input edges form no cycle
//! 4. every sequence is produced by exactly one source
//! 5. primer names are unique

use super::cloning_graph::CloningGraph;
use super::entity::EntityKind;
use super::id::{EntityId, MAX_ID};
use std::collections::HashMap;
use thiserror::Error;

/// A broken invariant, naming the offending ids
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("id {0} is used more than once")]
    DuplicateId(EntityId),

    #[error("{kind} has a non-positive id")]
    NonPositiveId { kind: EntityKind },

    #[error("id {0} is above the largest allowed id {max}", max = MAX_ID)]
    IdOutOfRange(EntityId),

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("source {source_id} references missing entity {missing}")]
    DanglingReference {
        source_id: EntityId,
        missing: EntityId,
    },

    #[error("source {source_id} references {id}, which is not a {expected}")]
    WrongReferenceKind {
        source_id: EntityId,
        id: EntityId,
        expected: EntityKind,
    },

    #[error("sequence {0} is its own ancestor")]
    Cycle(EntityId),

    #[error("sequence {0} has no producing source")]
    UnproducedSequence(EntityId),

    #[error("sequence {sequence} is produced by both source {first} and source {second}")]
    MultipleProducers {
        sequence: EntityId,
        first: EntityId,
        second: EntityId,
    },

    #[error("primer name '{name}' is used by primers {first} and {second}")]
    DuplicatePrimerName {
        name: String,
        first: EntityId,
        second: EntityId,
    },

    #[error("attachment '{file_name}' belongs to missing sequence {sequence}")]
    DanglingAttachment { sequence: EntityId, file_name: String },
}

impl InvariantViolation {
    /// Number of the invariant that failed
    ///
    /// `0` means the document did not fit the data model at all: a missing
    /// field, a negative id, an unknown operation kind.
    pub fn invariant(&self) -> u8 {
        match self {
            InvariantViolation::MalformedDocument(_) => 0,
            InvariantViolation::DuplicateId(_)
            | InvariantViolation::NonPositiveId { .. }
            | InvariantViolation::IdOutOfRange(_) => 1,
            InvariantViolation::DanglingReference { .. }
            | InvariantViolation::WrongReferenceKind { .. }
            | InvariantViolation::DanglingAttachment { .. } => 2,
            InvariantViolation::Cycle(_) => 3,
            InvariantViolation::UnproducedSequence(_)
            | InvariantViolation::MultipleProducers { .. } => 4,
            InvariantViolation::DuplicatePrimerName { .. } => 5,
        }
    }
}

/// Check that `id` lies in `1..=MAX_ID`
pub(crate) fn check_id(kind: EntityKind, id: EntityId) -> Result<(), InvariantViolation> {
    match id.get() {
        0 => Err(InvariantViolation::NonPositiveId { kind }),
        value if value > MAX_ID => Err(InvariantViolation::IdOutOfRange(id)),
        _ => Ok(()),
    }
}

impl CloningGraph {
    /// Check invariants 1 to 5, reporting the first violation found
    ///
    /// Invariant 1 is structural in the arena; only the id range is checked
    /// here. Duplicates are caught when documents are loaded.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        for entity in self.entities() {
            check_id(entity.kind(), entity.id())?;
        }

        check_references(self)?;
        check_producers(self)?;

        self.index()
            .order_sources(self)
            .map_err(InvariantViolation::Cycle)?;

        check_primer_names(self)
    }
}

fn check_references(graph: &CloningGraph) -> Result<(), InvariantViolation> {
    let expect = |source_id: EntityId, id: EntityId, allowed: &[EntityKind]| {
        match graph.kind_of(id) {
            None => Err(InvariantViolation::DanglingReference {
                source_id,
                missing: id,
            }),
            Some(kind) if !allowed.contains(&kind) => Err(InvariantViolation::WrongReferenceKind {
                source_id,
                id,
                expected: allowed[0],
            }),
            Some(_) => Ok(()),
        }
    };

    for source in graph.sources() {
        for input in source.input_ids() {
            expect(source.id, input, &[EntityKind::Sequence, EntityKind::Primer])?;
        }
        for primer in source.operation_primer_ids() {
            expect(source.id, primer, &[EntityKind::Primer])?;
        }
        if let Some(output) = source.output {
            expect(source.id, output, &[EntityKind::Sequence])?;
        }
    }

    for attachment in graph.attachments() {
        if graph.sequence(attachment.sequence_id).is_none() {
            return Err(InvariantViolation::DanglingAttachment {
                sequence: attachment.sequence_id,
                file_name: attachment.file_name.clone(),
            });
        }
    }

    Ok(())
}

fn check_producers(graph: &CloningGraph) -> Result<(), InvariantViolation> {
    let mut producers: HashMap<EntityId, EntityId> = HashMap::new();
    for source in graph.sources() {
        let Some(output) = source.output else {
            continue;
        };
        if let Some(first) = producers.insert(output, source.id) {
            return Err(InvariantViolation::MultipleProducers {
                sequence: output,
                first,
                second: source.id,
            });
        }
    }

    match graph.sequences().find(|s| !producers.contains_key(&s.id)) {
        Some(orphan) => Err(InvariantViolation::UnproducedSequence(orphan.id)),
        None => Ok(()),
    }
}

fn check_primer_names(graph: &CloningGraph) -> Result<(), InvariantViolation> {
    let mut names: HashMap<&str, EntityId> = HashMap::new();
    for primer in graph.primers() {
        if let Some(first) = names.insert(primer.name.as_str(), primer.id) {
            return Err(InvariantViolation::DuplicatePrimerName {
                name: primer.name.clone(),
                first,
                second: primer.id,
            });
        }
    }
    Ok(())
}
