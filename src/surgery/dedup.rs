//! Primer deduplication by name

use crate::graph::{CloningGraph, EntityId, LineageError, LineageResult, Primer};
use std::collections::{BTreeMap, HashMap};

/// Result of a dedup pass
#[derive(Debug, Clone)]
pub struct DedupOutcome {
    pub graph: CloningGraph,
    /// Removed primer id -> surviving primer id
    pub replaced: BTreeMap<EntityId, EntityId>,
}

/// Pairs `(kept, duplicate)` of primers sharing a name
///
/// The primer with the lowest id in each name group is the one kept.
/// Fails on the first pair whose sequence or external identity differ.
pub fn find_duplicate_primers(graph: &CloningGraph) -> LineageResult<Vec<(EntityId, EntityId)>> {
    let mut first_by_name: HashMap<&str, &Primer> = HashMap::new();
    let mut pairs = Vec::new();

    // primers() iterates in ascending id order
    for primer in graph.primers() {
        match first_by_name.get(primer.name.as_str()) {
            None => {
                first_by_name.insert(primer.name.as_str(), primer);
            }
            Some(kept) if kept.same_content(primer) => pairs.push((kept.id, primer.id)),
            Some(kept) => {
                return Err(LineageError::DuplicatePrimerName {
                    name: primer.name.clone(),
                    kept: kept.id,
                    duplicate: primer.id,
                })
            }
        }
    }

    Ok(pairs)
}

/// Merge same-name primers and point every referencing source at the survivor
///
/// Inputs, PCR primer pairs, hybridization oligos and CRISPR guides are all
/// rewritten. Running it on its own output changes nothing.
pub fn dedup_primers(graph: &CloningGraph) -> LineageResult<DedupOutcome> {
    let pairs = find_duplicate_primers(graph)?;
    if pairs.is_empty() {
        return Ok(DedupOutcome {
            graph: graph.clone(),
            replaced: BTreeMap::new(),
        });
    }

    let replaced: BTreeMap<EntityId, EntityId> =
        pairs.into_iter().map(|(kept, dup)| (dup, kept)).collect();

    let mut result = graph.clone();
    for duplicate in replaced.keys() {
        result.remove(*duplicate);
    }
    result.map_source_references(&|id: EntityId| replaced.get(&id).copied().unwrap_or(id));

    tracing::debug!(merged = replaced.len(), "deduplicated primers");
    Ok(DedupOutcome {
        graph: result,
        replaced,
    })
}
