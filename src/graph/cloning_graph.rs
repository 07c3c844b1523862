//! CloningGraph: the arena holding one cloning strategy

use super::entity::{Attachment, Entity, EntityKind, Primer, Sequence};
use super::error::{LineageError, LineageResult};
use super::id::{self, EntityId};
use super::index::AdjacencyIndex;
use super::source::Source;
use std::collections::BTreeMap;

/// A provenance graph of sources, sequences and primers
///
/// All three entity kinds live in one arena keyed by id, so an id can
/// only ever name one entity. Attachments are kept beside the arena and
/// keyed by sequence id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloningGraph {
    entities: BTreeMap<EntityId, Entity>,
    attachments: Vec<Attachment>,
}

impl CloningGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, for fixtures and tests
    pub fn with(mut self, entity: impl Into<Entity>) -> LineageResult<Self> {
        self.insert(entity)?;
        Ok(self)
    }

    /// Insert an entity under its own id
    ///
    /// Fails if the id is outside `1..=MAX_ID` or already in use by any
    /// entity kind.
    pub fn insert(&mut self, entity: impl Into<Entity>) -> LineageResult<()> {
        use super::validate::{check_id, InvariantViolation};
        use std::collections::btree_map::Entry;

        let entity = entity.into();
        let id = entity.id();
        check_id(entity.kind(), id)?;
        match self.entities.entry(id) {
            Entry::Vacant(e) => {
                e.insert(entity);
                Ok(())
            }
            Entry::Occupied(_) => Err(InvariantViolation::DuplicateId(id).into()),
        }
    }

    /// Replace an existing entity of the same kind
    pub(crate) fn replace(&mut self, entity: Entity) -> LineageResult<()> {
        let id = entity.id();
        let existing = self.entities.get_mut(&id).ok_or(LineageError::NotFound(id))?;
        if existing.kind() != entity.kind() {
            return Err(LineageError::WrongKind {
                id,
                expected: existing.kind(),
            });
        }
        *existing = entity;
        Ok(())
    }

    /// Split into entities and attachments
    pub(crate) fn into_parts(self) -> (Vec<Entity>, Vec<Attachment>) {
        (self.entities.into_values().collect(), self.attachments)
    }

    /// Remove an entity, returning it
    pub(crate) fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn kind_of(&self, id: EntityId) -> Option<EntityKind> {
        self.entities.get(&id).map(Entity::kind)
    }

    pub fn source(&self, id: EntityId) -> Option<&Source> {
        match self.entities.get(&id) {
            Some(Entity::Source(s)) => Some(s),
            _ => None,
        }
    }

    pub fn sequence(&self, id: EntityId) -> Option<&Sequence> {
        match self.entities.get(&id) {
            Some(Entity::Sequence(s)) => Some(s),
            _ => None,
        }
    }

    pub fn primer(&self, id: EntityId) -> Option<&Primer> {
        match self.entities.get(&id) {
            Some(Entity::Primer(p)) => Some(p),
            _ => None,
        }
    }

    pub(crate) fn source_mut(&mut self, id: EntityId) -> Option<&mut Source> {
        match self.entities.get_mut(&id) {
            Some(Entity::Source(s)) => Some(s),
            _ => None,
        }
    }

    /// Look up a source, distinguishing a missing id from a wrong kind
    pub fn require_source(&self, id: EntityId) -> LineageResult<&Source> {
        self.require_kind(id, EntityKind::Source)?;
        self.source(id).ok_or(LineageError::NotFound(id))
    }

    /// Look up a sequence, distinguishing a missing id from a wrong kind
    pub fn require_sequence(&self, id: EntityId) -> LineageResult<&Sequence> {
        self.require_kind(id, EntityKind::Sequence)?;
        self.sequence(id).ok_or(LineageError::NotFound(id))
    }

    /// Look up a primer, distinguishing a missing id from a wrong kind
    pub fn require_primer(&self, id: EntityId) -> LineageResult<&Primer> {
        self.require_kind(id, EntityKind::Primer)?;
        self.primer(id).ok_or(LineageError::NotFound(id))
    }

    fn require_kind(&self, id: EntityId, expected: EntityKind) -> LineageResult<()> {
        match self.kind_of(id) {
            None => Err(LineageError::NotFound(id)),
            Some(kind) if kind != expected => Err(LineageError::WrongKind { id, expected }),
            Some(_) => Ok(()),
        }
    }

    /// All ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn sources(&self) -> impl Iterator<Item = &Source> {
        self.entities.values().filter_map(|e| match e {
            Entity::Source(s) => Some(s),
            _ => None,
        })
    }

    pub fn sequences(&self) -> impl Iterator<Item = &Sequence> {
        self.entities.values().filter_map(|e| match e {
            Entity::Sequence(s) => Some(s),
            _ => None,
        })
    }

    pub fn primers(&self) -> impl Iterator<Item = &Primer> {
        self.entities.values().filter_map(|e| match e {
            Entity::Primer(p) => Some(p),
            _ => None,
        })
    }

    /// Rewrite every source's references in place
    pub(crate) fn map_source_references(&mut self, f: &impl Fn(EntityId) -> EntityId) {
        for entity in self.entities.values_mut() {
            if let Entity::Source(source) = entity {
                source.map_references(f);
            }
        }
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Attachments belonging to one sequence
    pub fn attachments_of(&self, sequence_id: EntityId) -> impl Iterator<Item = &Attachment> {
        self.attachments
            .iter()
            .filter(move |a| a.sequence_id == sequence_id)
    }

    /// Attach a file to an existing sequence
    pub fn add_attachment(&mut self, attachment: Attachment) -> LineageResult<()> {
        self.require_sequence(attachment.sequence_id)?;
        self.attachments.push(attachment);
        Ok(())
    }

    pub(crate) fn push_attachment_unchecked(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    pub(crate) fn retain_attachments(&mut self, keep: impl FnMut(&Attachment) -> bool) {
        self.attachments.retain(keep);
    }

    /// Smallest unused id (see [`id::next_id`])
    pub fn next_id(&self) -> EntityId {
        id::next_id(self.entities.keys().next_back().copied())
    }

    /// Smallest id in use
    pub fn min_id(&self) -> Option<EntityId> {
        self.entities.keys().next().copied()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn source_count(&self) -> usize {
        self.sources().count()
    }

    pub fn sequence_count(&self) -> usize {
        self.sequences().count()
    }

    pub fn primer_count(&self) -> usize {
        self.primers().count()
    }

    /// Find a primer by name
    pub fn primer_by_name(&self, name: &str) -> Option<&Primer> {
        self.primers().find(|p| p.name == name)
    }

    /// The source producing a sequence
    pub fn producer_of(&self, sequence_id: EntityId) -> Option<&Source> {
        self.sources().find(|s| s.output == Some(sequence_id))
    }

    /// Build the adjacency index for this snapshot
    pub fn index(&self) -> AdjacencyIndex {
        AdjacencyIndex::build(self)
    }

    /// Sequences that no source consumes
    pub fn terminal_sequences(&self) -> Vec<EntityId> {
        let index = self.index();
        self.sequences()
            .map(|s| s.id)
            .filter(|id| index.consumers(*id).is_empty())
            .collect()
    }

    /// Sources ordered so that every producer precedes its consumers
    pub fn topological_sources(&self) -> LineageResult<Vec<EntityId>> {
        self.index().topological_sources(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SourceInput;

    fn id(n: u64) -> EntityId {
        EntityId::from(n)
    }

    #[test]
    fn ids_are_unique_across_kinds() {
        let mut graph = CloningGraph::new();
        graph.insert(Sequence::new(id(1), 10)).unwrap();
        let err = graph.insert(Primer::new(id(1), "fwd", "ACGT")).unwrap_err();
        assert!(matches!(err, LineageError::InvalidGraph(_)));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn zero_id_is_rejected_on_insert() {
        let mut graph = CloningGraph::new();
        assert!(graph.insert(Source::new(id(0))).is_err());
        assert!(graph.is_empty());
    }

    #[test]
    fn next_id_follows_highest_id() {
        let mut graph = CloningGraph::new();
        assert_eq!(graph.next_id(), id(1));
        graph.insert(Primer::new(id(9), "p", "AC")).unwrap();
        graph.insert(Source::new(id(2))).unwrap();
        assert_eq!(graph.next_id(), id(10));
        assert_eq!(graph.min_id(), Some(id(2)));
    }

    #[test]
    fn require_distinguishes_missing_and_wrong_kind() {
        let graph = CloningGraph::new().with(Sequence::new(id(1), 10)).unwrap();
        assert!(matches!(graph.require_source(id(2)), Err(LineageError::NotFound(_))));
        assert!(matches!(
            graph.require_source(id(1)),
            Err(LineageError::WrongKind { expected: EntityKind::Source, .. })
        ));
        assert!(graph.require_sequence(id(1)).is_ok());
    }

    #[test]
    fn terminal_sequences_are_unconsumed() {
        let graph = CloningGraph::new()
            .with(Source::new(id(1)).with_output(id(2)))
            .and_then(|g| g.with(Sequence::new(id(2), 100)))
            .and_then(|g| {
                g.with(
                    Source::new(id(3))
                        .with_input(SourceInput::new(id(2)))
                        .with_output(id(4)),
                )
            })
            .and_then(|g| g.with(Sequence::new(id(4), 50)))
            .unwrap();
        assert_eq!(graph.terminal_sequences(), vec![id(4)]);
        assert_eq!(graph.producer_of(id(4)).map(|s| s.id), Some(id(3)));
    }

    #[test]
    fn attachment_requires_sequence() {
        let mut graph = CloningGraph::new().with(Source::new(id(1))).unwrap();
        let err = graph
            .add_attachment(Attachment::new(id(1), "read.ab1", "Sequencing file"))
            .unwrap_err();
        assert!(matches!(err, LineageError::WrongKind { .. }));
        assert!(graph.attachments().is_empty());
    }
}
