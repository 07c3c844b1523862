//! Independent invariant checks for integration tests
//!
//! These rescan the flat entity lists instead of using the adjacency index,
//! so they can cross-check the engine's own traversal.

use cloneline::{CloningGraph, EntityId};
use std::collections::BTreeSet;

/// Forward closure of a source by fixed-point rescans
pub fn forward_closure(graph: &CloningGraph, source_id: EntityId) -> (BTreeSet<EntityId>, BTreeSet<EntityId>) {
    let mut sources = BTreeSet::from([source_id]);
    let mut sequences = BTreeSet::new();

    loop {
        let before = (sources.len(), sequences.len());
        for source in graph.sources() {
            if sources.contains(&source.id) {
                if let Some(output) = source.output {
                    sequences.insert(output);
                }
            } else if source.input_ids().any(|input| sequences.contains(&input)) {
                sources.insert(source.id);
            }
        }
        if before == (sources.len(), sequences.len()) {
            return (sources, sequences);
        }
    }
}

/// Whether a sequence can reach itself through output -> input edges
pub fn has_cycle(graph: &CloningGraph) -> bool {
    graph.sources().any(|source| {
        let (_, downstream) = forward_closure(graph, source.id);
        source.input_ids().any(|input| downstream.contains(&input))
    })
}

/// Ids shared by two graphs
pub fn shared_ids(a: &CloningGraph, b: &CloningGraph) -> BTreeSet<EntityId> {
    let left: BTreeSet<EntityId> = a.ids().collect();
    b.ids().filter(|id| left.contains(id)).collect()
}

/// Every primer name appears once
pub fn primer_names_unique(graph: &CloningGraph) -> bool {
    let names: BTreeSet<&str> = graph.primers().map(|p| p.name.as_str()).collect();
    names.len() == graph.primer_count()
}
