//! ProvenanceStore: the single-writer holder of the current graph

use super::pending::{CandidateResult, Completion, RequestTicket, RequestTracker};
use crate::graph::{
    Attachment, CloningGraph, Descendants, Entity, EntityId, LineageError, LineageResult,
    Operation, Primer, Source, SourceInput,
};
use crate::surgery::{
    clear_source_output, delete_source_and_descendants, extract_subgraph, graft_graph,
    merge_graphs,
};
use crate::transform::{range_in_parent, SequenceRange};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// The mutable cloning strategy
///
/// Each operation builds a new graph from the current snapshot and swaps
/// it in only when every invariant holds, so a failed operation leaves the
/// store exactly as it was. Readers holding a snapshot keep seeing the
/// graph they took.
#[derive(Debug, Default)]
pub struct ProvenanceStore {
    graph: Arc<CloningGraph>,
    held: HashMap<EntityId, Vec<CandidateResult>>,
    requests: RequestTracker,
}

impl ProvenanceStore {
    /// Create a store holding an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store over an existing graph, validating it first
    pub fn from_graph(graph: CloningGraph) -> LineageResult<Self> {
        graph.validate()?;
        Ok(Self {
            graph: Arc::new(graph),
            ..Self::default()
        })
    }

    /// The current graph
    pub fn graph(&self) -> &CloningGraph {
        &self.graph
    }

    /// A shared handle to the current graph
    pub fn snapshot(&self) -> Arc<CloningGraph> {
        Arc::clone(&self.graph)
    }

    fn apply(&mut self, next: CloningGraph) {
        self.graph = Arc::new(next);
    }

    fn forget_source(&mut self, source_id: EntityId) {
        self.held.remove(&source_id);
        self.requests.forget(source_id);
    }

    /// Add an undefined source consuming `input`
    pub fn create_empty_source(&mut self, input: Vec<SourceInput>) -> LineageResult<EntityId> {
        let mut next = (*self.graph).clone();
        let id = next.next_id();
        let mut source = Source::new(id);
        source.input = input;
        next.insert(source)?;
        next.validate()?;
        self.apply(next);
        info!(source = %id, "created source");
        Ok(id)
    }

    /// Commit one result as the output of a pending source
    ///
    /// Returns the id assigned to the new sequence.
    pub fn commit_result(&mut self, source_id: EntityId, result: CandidateResult) -> LineageResult<EntityId> {
        if !self.graph.require_source(source_id)?.is_pending() {
            return Err(LineageError::SourceAlreadyCommitted(source_id));
        }

        let mut next = (*self.graph).clone();
        let sequence_id = next.next_id();

        let mut sequence = result.sequence;
        sequence.id = sequence_id;
        let mut source = result.source;
        source.id = source_id;
        source.output = Some(sequence_id);

        next.replace(Entity::Source(source))?;
        next.insert(sequence)?;
        next.validate()?;

        self.held.remove(&source_id);
        self.apply(next);
        info!(source = %source_id, sequence = %sequence_id, "committed result");
        Ok(sequence_id)
    }

    /// Commit a single candidate, or hold several until one is chosen
    pub fn offer_candidates(
        &mut self,
        source_id: EntityId,
        mut candidates: Vec<CandidateResult>,
    ) -> LineageResult<Completion> {
        match candidates.len() {
            0 => Err(LineageError::Remote(format!(
                "no candidates returned for source {source_id}"
            ))),
            1 => {
                let only = candidates.remove(0);
                let sequence = self.commit_result(source_id, only)?;
                Ok(Completion::Committed { sequence })
            }
            count => {
                if !self.graph.require_source(source_id)?.is_pending() {
                    return Err(LineageError::SourceAlreadyCommitted(source_id));
                }
                self.held.insert(source_id, candidates);
                info!(source = %source_id, candidates = count, "holding candidates");
                Ok(Completion::AwaitingChoice { candidates: count })
            }
        }
    }

    /// Candidates waiting for a choice
    pub fn held_candidates(&self, source_id: EntityId) -> &[CandidateResult] {
        self.held.get(&source_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Commit the held candidate at `index`
    pub fn choose_candidate(&mut self, source_id: EntityId, index: usize) -> LineageResult<EntityId> {
        let chosen = self
            .held
            .get(&source_id)
            .and_then(|candidates| candidates.get(index))
            .cloned()
            .ok_or(LineageError::NoPendingCandidates(source_id))?;
        self.commit_result(source_id, chosen)
    }

    /// Replace a source's inputs and operation
    ///
    /// A completed source loses its output and everything downstream; the
    /// source itself stays, pending. Inputs drawn from its own downstream
    /// are rejected as a cycle.
    pub fn update_source_parameters(
        &mut self,
        source_id: EntityId,
        input: Vec<SourceInput>,
        operation: Option<Operation>,
    ) -> LineageResult<Descendants> {
        self.graph.require_source(source_id)?;
        let downstream = self.graph.index().descendants(&self.graph, source_id);
        if let Some(looped) = input
            .iter()
            .map(|i| i.sequence)
            .find(|seq| downstream.sequences.contains(seq))
        {
            return Err(LineageError::Cycle(looped));
        }

        let removal = clear_source_output(&self.graph, source_id)?;
        let mut next = removal.graph;
        if let Some(source) = next.source_mut(source_id) {
            source.input = input;
            source.operation = operation;
        }
        next.validate()?;

        self.forget_source(source_id);
        for removed in &removal.removed.sources {
            self.forget_source(*removed);
        }
        self.apply(next);
        info!(
            source = %source_id,
            cleared = removal.removed.sources.len() + removal.removed.sequences.len(),
            "updated source parameters"
        );
        Ok(removal.removed)
    }

    /// Delete a source and everything downstream of it
    pub fn delete_source(&mut self, source_id: EntityId) -> LineageResult<Descendants> {
        let removal = delete_source_and_descendants(&self.graph, source_id)?;
        for removed in &removal.removed.sources {
            self.forget_source(*removed);
        }
        self.apply(removal.graph);
        info!(
            source = %source_id,
            sources = removal.removed.sources.len(),
            sequences = removal.removed.sequences.len(),
            "deleted source and descendants"
        );
        Ok(removal.removed)
    }

    /// Merge an independently built graph into the current one
    ///
    /// Returns the shift applied to `incoming`.
    pub fn import_and_merge(&mut self, incoming: &CloningGraph) -> LineageResult<i64> {
        let outcome = merge_graphs(incoming, &self.graph)?;
        self.apply(outcome.graph);
        info!(delta = outcome.delta, "merged graph");
        Ok(outcome.delta)
    }

    /// Graft `parent` onto the placeholder source `graft_source_id`
    pub fn import_and_graft(&mut self, parent: &CloningGraph, graft_source_id: EntityId) -> LineageResult<i64> {
        let outcome = graft_graph(parent, &self.graph, graft_source_id)?;
        self.forget_source(graft_source_id);
        self.apply(outcome.graph);
        info!(graft = %graft_source_id, delta = outcome.delta, "grafted graph");
        Ok(outcome.delta)
    }

    /// Replace the whole graph, dropping held candidates and requests
    pub fn replace_graph(&mut self, graph: CloningGraph) -> LineageResult<()> {
        graph.validate()?;
        self.held.clear();
        self.requests.clear();
        self.apply(graph);
        info!(entities = self.graph.len(), "replaced graph");
        Ok(())
    }

    /// Add a primer, rejecting a name already in use
    pub fn add_primer(
        &mut self,
        name: impl Into<String>,
        sequence: impl Into<String>,
        database_id: Option<i64>,
    ) -> LineageResult<EntityId> {
        let name = name.into();
        if self.graph.primer_by_name(&name).is_some() {
            return Err(LineageError::PrimerNameTaken(name));
        }

        let mut next = (*self.graph).clone();
        let id = next.next_id();
        let mut primer = Primer::new(id, name, sequence);
        primer.database_id = database_id;
        next.insert(primer)?;
        self.apply(next);
        Ok(id)
    }

    /// Rename a primer or change its sequence
    pub fn edit_primer(
        &mut self,
        primer_id: EntityId,
        name: impl Into<String>,
        sequence: impl Into<String>,
    ) -> LineageResult<()> {
        let mut primer = self.graph.require_primer(primer_id)?.clone();
        let name = name.into();
        if self
            .graph
            .primer_by_name(&name)
            .is_some_and(|other| other.id != primer_id)
        {
            return Err(LineageError::PrimerNameTaken(name));
        }

        primer.name = name;
        primer.sequence = sequence.into();
        let mut next = (*self.graph).clone();
        next.replace(Entity::Primer(primer))?;
        self.apply(next);
        Ok(())
    }

    /// Delete a primer no source references
    pub fn delete_primer(&mut self, primer_id: EntityId) -> LineageResult<()> {
        self.graph.require_primer(primer_id)?;
        if let Some(user) = self.graph.sources().find(|s| s.references(primer_id)) {
            return Err(LineageError::PrimerInUse {
                primer: primer_id,
                source_id: user.id,
            });
        }

        let mut next = (*self.graph).clone();
        next.remove(primer_id);
        self.apply(next);
        Ok(())
    }

    /// Standalone lineage of a sequence or source
    pub fn extract_subgraph(&self, id: EntityId) -> LineageResult<CloningGraph> {
        extract_subgraph(&self.graph, id)
    }

    /// Attach a file to a sequence
    pub fn add_attachment(&mut self, attachment: Attachment) -> LineageResult<()> {
        let mut next = (*self.graph).clone();
        next.add_attachment(attachment)?;
        self.apply(next);
        Ok(())
    }

    /// Map a selection on a source's product onto one of its inputs
    pub fn range_in_parent(
        &self,
        source_id: EntityId,
        selection: SequenceRange,
        input: EntityId,
    ) -> LineageResult<Option<SequenceRange>> {
        range_in_parent(&self.graph, source_id, selection, input)
    }

    /// Start a remote computation for a pending source
    ///
    /// Any earlier ticket for the same source becomes stale.
    pub fn begin_request(&mut self, source_id: EntityId) -> LineageResult<RequestTicket> {
        if !self.graph.require_source(source_id)?.is_pending() {
            return Err(LineageError::SourceAlreadyCommitted(source_id));
        }
        Ok(self.requests.issue(source_id))
    }

    /// Deliver the results of a remote computation
    ///
    /// Responses for deleted sources or superseded tickets are discarded.
    pub fn complete_request(
        &mut self,
        ticket: RequestTicket,
        candidates: Vec<CandidateResult>,
    ) -> LineageResult<Completion> {
        if self.graph.source(ticket.source_id).is_none() {
            warn!(source = %ticket.source_id, "discarding response for deleted source");
            return Ok(Completion::DiscardedDeleted);
        }
        if !self.requests.retire(&ticket) {
            warn!(source = %ticket.source_id, "discarding stale response");
            return Ok(Completion::DiscardedStale);
        }
        self.offer_candidates(ticket.source_id, candidates)
    }

    /// Give up on a request whose computation failed
    pub fn abandon_request(&mut self, ticket: &RequestTicket) {
        self.requests.retire(ticket);
    }

    /// Requests still awaiting a response
    pub fn requests_in_flight(&self) -> usize {
        self.requests.in_flight()
    }
}
