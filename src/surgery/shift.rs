//! Id rebasing: uniform shifts and targeted renames

use crate::graph::{CloningGraph, EntityId, InvariantViolation, LineageResult};
use std::collections::BTreeMap;

/// Copy of `graph` with every id moved by `delta`
///
/// References, outputs, operation primers and attachment keys move with
/// the ids they point at. Fails if any id would leave `1..=MAX_ID`.
pub fn shift_ids(graph: &CloningGraph, delta: i64) -> LineageResult<CloningGraph> {
    if delta == 0 {
        return Ok(graph.clone());
    }

    let mut mapping = BTreeMap::new();
    for entity in graph.entities() {
        let shifted = entity.id().shifted(delta).ok_or(if delta < 0 {
            InvariantViolation::NonPositiveId { kind: entity.kind() }
        } else {
            InvariantViolation::IdOutOfRange(entity.id())
        })?;
        mapping.insert(entity.id(), shifted);
    }

    let result = rebuild(graph, &mapping)?;
    tracing::debug!(delta, entities = result.len(), "shifted graph ids");
    Ok(result)
}

/// Copy of `graph` with the ids in `renames` replaced, everything else kept
///
/// Fails if a rename collides with an id that stays.
pub fn rename_ids(
    graph: &CloningGraph,
    renames: &BTreeMap<EntityId, EntityId>,
) -> LineageResult<CloningGraph> {
    rebuild(graph, renames)
}

fn rebuild(graph: &CloningGraph, mapping: &BTreeMap<EntityId, EntityId>) -> LineageResult<CloningGraph> {
    let map = |id: EntityId| mapping.get(&id).copied().unwrap_or(id);

    let mut result = CloningGraph::new();
    for entity in graph.entities() {
        let mut moved = entity.clone();
        moved.set_id(map(entity.id()));
        if let crate::graph::Entity::Source(source) = &mut moved {
            source.map_references(&map);
        }
        result.insert(moved)?;
    }
    for attachment in graph.attachments() {
        let mut moved = attachment.clone();
        moved.sequence_id = map(attachment.sequence_id);
        result.push_attachment_unchecked(moved);
    }
    Ok(result)
}
