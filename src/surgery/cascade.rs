//! Cascading deletion

use crate::graph::{CloningGraph, Descendants, EntityId, LineageResult};

/// Graph left after a cascade, plus what was taken out
#[derive(Debug, Clone)]
pub struct Removal {
    pub graph: CloningGraph,
    pub removed: Descendants,
}

/// Remove a source and everything forward-reachable from its output
///
/// Attachments keyed by removed sequences go with them. Primers and
/// upstream sequences are never touched.
pub fn delete_source_and_descendants(graph: &CloningGraph, source_id: EntityId) -> LineageResult<Removal> {
    graph.require_source(source_id)?;
    let removed = graph.index().descendants(graph, source_id);
    let result = without(graph, &removed);

    tracing::debug!(
        source = %source_id,
        sources = removed.sources.len(),
        sequences = removed.sequences.len(),
        "cascade delete"
    );
    Ok(Removal {
        graph: result,
        removed,
    })
}

/// Remove everything downstream of a source but keep the source itself,
/// with its output cleared
pub fn clear_source_output(graph: &CloningGraph, source_id: EntityId) -> LineageResult<Removal> {
    graph.require_source(source_id)?;
    let mut removed = graph.index().descendants(graph, source_id);
    removed.sources.remove(&source_id);
    let mut result = without(graph, &removed);
    if let Some(source) = result.source_mut(source_id) {
        source.output = None;
    }
    Ok(Removal {
        graph: result,
        removed,
    })
}

fn without(graph: &CloningGraph, removed: &Descendants) -> CloningGraph {
    let mut result = graph.clone();
    for id in removed.sources.iter().chain(removed.sequences.iter()) {
        result.remove(*id);
    }
    result.retain_attachments(|a| !removed.sequences.contains(&a.sequence_id));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Attachment, LineageError, Primer, Sequence, Source, SourceInput};
    use std::collections::BTreeSet;

    fn id(n: u64) -> EntityId {
        EntityId::from(n)
    }

    /// 1 -> [2] -> 3 -> [4] -> 5 (pending); primer 6 feeds 3; 7 -> [8] independent
    fn lineage() -> CloningGraph {
        let mut graph = CloningGraph::new();
        graph.insert(Source::new(id(1)).with_output(id(2))).unwrap();
        graph.insert(Sequence::new(id(2), 100)).unwrap();
        graph
            .insert(
                Source::new(id(3))
                    .with_input(SourceInput::new(id(2)))
                    .with_input(SourceInput::new(id(6)))
                    .with_output(id(4)),
            )
            .unwrap();
        graph.insert(Sequence::new(id(4), 60)).unwrap();
        graph
            .insert(Source::new(id(5)).with_input(SourceInput::new(id(4))))
            .unwrap();
        graph.insert(Primer::new(id(6), "fwd", "ACGT")).unwrap();
        graph.insert(Source::new(id(7)).with_output(id(8))).unwrap();
        graph.insert(Sequence::new(id(8), 30)).unwrap();
        graph
            .add_attachment(Attachment::new(id(4), "read.ab1", "Sequencing file"))
            .unwrap();
        graph
            .add_attachment(Attachment::new(id(8), "other.ab1", "Sequencing file"))
            .unwrap();
        graph
    }

    #[test]
    fn cascade_removes_exactly_forward_closure() {
        let removal = delete_source_and_descendants(&lineage(), id(3)).unwrap();
        assert_eq!(removal.removed.sources, BTreeSet::from([id(3), id(5)]));
        assert_eq!(removal.removed.sequences, BTreeSet::from([id(4)]));
        assert_eq!(
            removal.graph.ids().collect::<Vec<_>>(),
            vec![id(1), id(2), id(6), id(7), id(8)]
        );
        assert_eq!(removal.graph.validate(), Ok(()));
    }

    #[test]
    fn attachments_of_removed_sequences_are_dropped() {
        let removal = delete_source_and_descendants(&lineage(), id(3)).unwrap();
        let files: Vec<_> = removal.graph.attachments().iter().map(|a| a.sequence_id).collect();
        assert_eq!(files, vec![id(8)]);
    }

    #[test]
    fn pending_leaf_removes_only_itself() {
        let removal = delete_source_and_descendants(&lineage(), id(5)).unwrap();
        assert_eq!(removal.removed.sources, BTreeSet::from([id(5)]));
        assert!(removal.removed.sequences.is_empty());
        assert_eq!(removal.graph.len(), lineage().len() - 1);
    }

    #[test]
    fn cascade_requires_a_source() {
        assert!(matches!(
            delete_source_and_descendants(&lineage(), id(2)),
            Err(LineageError::WrongKind { .. })
        ));
        assert!(matches!(
            delete_source_and_descendants(&lineage(), id(99)),
            Err(LineageError::NotFound(_))
        ));
    }

    #[test]
    fn clearing_output_keeps_the_source() {
        let removal = clear_source_output(&lineage(), id(1)).unwrap();
        let source = removal.graph.source(id(1)).unwrap();
        assert!(source.is_pending());
        assert!(removal.graph.sequence(id(2)).is_none());
        assert!(removal.graph.source(id(3)).is_none());
        assert!(removal.graph.primer(id(6)).is_some());
        assert_eq!(removal.graph.validate(), Ok(()));
    }
}
