//! Subgraph extraction

use crate::graph::{CloningGraph, EntityId, EntityKind, LineageError, LineageResult};

/// Standalone lineage of a sequence, or of a source's output
///
/// Walks backward through inputs collecting producing sources, their
/// input sequences and every primer they reference. The producing source
/// is included even when it has no ancestors. Attachments of included
/// sequences are copied. A primer id is rejected.
pub fn extract_subgraph(graph: &CloningGraph, id: EntityId) -> LineageResult<CloningGraph> {
    let index = graph.index();
    let root = match graph.kind_of(id) {
        None => return Err(LineageError::NotFound(id)),
        Some(EntityKind::Source) => id,
        Some(EntityKind::Sequence) => index.producer(id).ok_or(LineageError::NotFound(id))?,
        Some(EntityKind::Primer) => {
            return Err(LineageError::WrongKind {
                id,
                expected: EntityKind::Sequence,
            })
        }
    };

    let keep = index.ancestors(graph, root);
    let mut result = CloningGraph::new();
    for entity_id in &keep {
        if let Some(entity) = graph.get(*entity_id) {
            result.insert(entity.clone())?;
        }
    }
    for attachment in graph.attachments() {
        if keep.contains(&attachment.sequence_id) {
            result.push_attachment_unchecked(attachment.clone());
        }
    }

    tracing::debug!(root = %root, entities = result.len(), "extracted subgraph");
    Ok(result)
}
