//! Merging independent graphs and grafting one onto a placeholder in another

use super::dedup::dedup_primers;
use super::shift::{rename_ids, shift_ids};
use crate::graph::{CloningGraph, EntityId, InvariantViolation, LineageError, LineageResult};
use std::collections::BTreeMap;

/// A combined graph and the shift applied to the rebased side
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub graph: CloningGraph,
    /// Amount added to every id of the rebased graph
    pub delta: i64,
}

/// Rebase `incoming` above `existing`, union them, then dedup primers
///
/// `delta = next_id(existing) - min(incoming ids)`. A primer name clash
/// with differing content fails with [`LineageError::DuplicatePrimerName`]
/// and neither input is touched.
pub fn merge_graphs(incoming: &CloningGraph, existing: &CloningGraph) -> LineageResult<MergeOutcome> {
    let Some(min) = incoming.min_id() else {
        return Ok(MergeOutcome {
            graph: existing.clone(),
            delta: 0,
        });
    };

    let delta = offset(existing.next_id(), min)?;
    let rebased = shift_ids(incoming, delta)?;
    let graph = finish(absorb(existing.clone(), rebased)?)?;

    tracing::debug!(delta, entities = graph.len(), "merged graphs");
    Ok(MergeOutcome { graph, delta })
}

/// Splice `parent` onto the placeholder source `graft_source_id` of `child`
///
/// `parent` must have exactly one terminal sequence. Its producing source
/// takes over the placeholder's id. When the placeholder's output is a
/// template sequence, the parent's terminal sequence replaces it under
/// the same id; a real output sequence in the child is kept instead.
pub fn graft_graph(
    parent: &CloningGraph,
    child: &CloningGraph,
    graft_source_id: EntityId,
) -> LineageResult<MergeOutcome> {
    let placeholder = child.require_source(graft_source_id)?;

    let terminals = parent.terminal_sequences();
    let terminal = match terminals.as_slice() {
        [only] => *only,
        [] => {
            return Err(LineageError::InvalidGraftSource(
                "graph has no terminal sequence".into(),
            ))
        }
        many => {
            return Err(LineageError::InvalidGraftSource(format!(
                "graph has {} terminal sequences, expected one",
                many.len()
            )))
        }
    };
    let producer = parent.index().producer(terminal).ok_or_else(|| {
        LineageError::InvalidGraftSource(format!("terminal sequence {terminal} has no producer"))
    })?;

    // terminal exists, so parent is non-empty
    let delta = offset(child.next_id(), parent.min_id().unwrap_or(terminal))?;
    let shifted = shift_ids(parent, delta)?;

    let shifted_of = |id: EntityId| {
        id.shifted(delta)
            .ok_or_else(|| LineageError::InvalidGraftSource(format!("cannot rebase id {id}")))
    };
    let mut renames = BTreeMap::from([(shifted_of(producer)?, graft_source_id)]);
    if let Some(output) = placeholder.output {
        renames.insert(shifted_of(terminal)?, output);
    }
    let mut rebased = rename_ids(&shifted, &renames)?;

    let mut base = child.clone();
    base.remove(graft_source_id);
    if let Some(output) = placeholder.output {
        match child.sequence(output) {
            Some(sequence) if sequence.is_template() => {
                base.remove(output);
            }
            _ => {
                rebased.remove(output);
            }
        }
    }

    let graph = finish(absorb(base, rebased)?)?;
    tracing::debug!(
        graft = %graft_source_id,
        delta,
        entities = graph.len(),
        "grafted graph"
    );
    Ok(MergeOutcome { graph, delta })
}

/// Shift that moves `min` onto `next`
fn offset(next: EntityId, min: EntityId) -> LineageResult<i64> {
    let delta = i128::from(next.get()) - i128::from(min.get());
    i64::try_from(delta).map_err(|_| InvariantViolation::IdOutOfRange(next).into())
}

/// Move every entity and attachment of `other` into `into`
fn absorb(mut into: CloningGraph, other: CloningGraph) -> LineageResult<CloningGraph> {
    let (entities, attachments) = other.into_parts();
    for entity in entities {
        into.insert(entity)?;
    }
    for attachment in attachments {
        into.push_attachment_unchecked(attachment);
    }
    Ok(into)
}

fn finish(graph: CloningGraph) -> LineageResult<CloningGraph> {
    let deduped = dedup_primers(&graph)?.graph;
    deduped.validate()?;
    Ok(deduped)
}
