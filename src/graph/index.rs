//! Adjacency index built once per graph snapshot

use super::cloning_graph::CloningGraph;
use super::error::{LineageError, LineageResult};
use super::id::EntityId;
use std::collections::{BTreeSet, HashMap, VecDeque};

/// Everything reached by walking forward from a source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descendants {
    pub sources: BTreeSet<EntityId>,
    pub sequences: BTreeSet<EntityId>,
}

/// Immediate parent/child lookups over one snapshot
///
/// Sequences and primers map to the sources consuming them; sequences map
/// to their producing source. Lookups are O(1), so cascade and extraction
/// stay linear in the size of what they visit.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyIndex {
    producer: HashMap<EntityId, EntityId>,
    consumers: HashMap<EntityId, Vec<EntityId>>,
}

impl AdjacencyIndex {
    /// Build the index for a graph
    pub fn build(graph: &CloningGraph) -> Self {
        let mut index = Self::default();
        for source in graph.sources() {
            if let Some(output) = source.output {
                index.producer.entry(output).or_insert(source.id);
            }
            for upstream in source.upstream_ids() {
                index.consumers.entry(upstream).or_default().push(source.id);
            }
        }
        index
    }

    /// Source producing a sequence
    pub fn producer(&self, sequence: EntityId) -> Option<EntityId> {
        self.producer.get(&sequence).copied()
    }

    /// Sources consuming a sequence or primer
    pub fn consumers(&self, id: EntityId) -> &[EntityId] {
        self.consumers.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Forward closure of a source: the source itself, its output, every
    /// source consuming a collected sequence, and so on
    pub fn descendants(&self, graph: &CloningGraph, source_id: EntityId) -> Descendants {
        let mut found = Descendants::default();
        let mut queue = VecDeque::from([source_id]);

        while let Some(current) = queue.pop_front() {
            if !found.sources.insert(current) {
                continue;
            }
            let Some(output) = graph.source(current).and_then(|s| s.output) else {
                continue;
            };
            found.sequences.insert(output);
            for &consumer in self.consumers(output) {
                if !found.sources.contains(&consumer) {
                    queue.push_back(consumer);
                }
            }
        }

        found
    }

    /// Backward closure of a source: every upstream source, sequence and
    /// primer, plus the source and its own output
    pub fn ancestors(&self, graph: &CloningGraph, source_id: EntityId) -> BTreeSet<EntityId> {
        let mut found = BTreeSet::new();
        let mut queue = VecDeque::from([source_id]);

        if let Some(output) = graph.source(source_id).and_then(|s| s.output) {
            found.insert(output);
        }

        while let Some(current) = queue.pop_front() {
            if !found.insert(current) {
                continue;
            }
            let Some(source) = graph.source(current) else {
                continue;
            };
            for upstream in source.upstream_ids() {
                if !found.insert(upstream) {
                    continue;
                }
                if let Some(producer) = self.producer(upstream) {
                    queue.push_back(producer);
                }
            }
        }

        found
    }

    /// Kahn ordering of sources; producers come before consumers
    ///
    /// Ties are broken by ascending id so the order is deterministic.
    pub fn topological_sources(&self, graph: &CloningGraph) -> LineageResult<Vec<EntityId>> {
        self.order_sources(graph).map_err(LineageError::Cycle)
    }

    /// Ordering, or a sequence lying on a cycle
    pub(crate) fn order_sources(&self, graph: &CloningGraph) -> Result<Vec<EntityId>, EntityId> {
        let mut in_degree: HashMap<EntityId, usize> = HashMap::new();
        let mut children: HashMap<EntityId, Vec<EntityId>> = HashMap::new();

        for source in graph.sources() {
            let parents: BTreeSet<EntityId> = source
                .input_ids()
                .filter_map(|input| self.producer(input))
                .collect();
            in_degree.insert(source.id, parents.len());
            for parent in parents {
                children.entry(parent).or_default().push(source.id);
            }
        }

        let mut ready: BTreeSet<EntityId> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut order = Vec::with_capacity(in_degree.len());

        while let Some(current) = ready.pop_first() {
            order.push(current);
            for child in children.get(&current).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(child) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(*child);
                    }
                }
            }
        }

        if order.len() == in_degree.len() {
            return Ok(order);
        }

        let placed: BTreeSet<EntityId> = order.into_iter().collect();
        let on_cycle = graph
            .sources()
            .filter(|s| !placed.contains(&s.id))
            .flat_map(|s| s.input_ids().collect::<Vec<_>>())
            .find(|input| {
                self.producer(*input)
                    .is_some_and(|producer| !placed.contains(&producer))
            });
        // A leftover source always has an unplaced producer among its inputs.
        Err(on_cycle.unwrap_or_else(|| EntityId::from(0)))
    }
}
