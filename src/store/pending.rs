//! Remote results and request tracking

use crate::graph::{EntityId, Sequence, Source};
use std::collections::HashMap;

/// One computed outcome for a pending source
///
/// `source` carries the parameters and framing the computation settled on;
/// its id and output are overwritten on commit. `sequence` receives a fresh
/// id from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateResult {
    pub source: Source,
    pub sequence: Sequence,
}

impl CandidateResult {
    pub fn new(source: Source, sequence: Sequence) -> Self {
        Self { source, sequence }
    }
}

/// What became of a set of offered candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// A single candidate was committed as the source's output
    Committed { sequence: EntityId },
    /// Several candidates are held until one is chosen
    AwaitingChoice { candidates: usize },
    /// A newer request for the same source was issued
    DiscardedStale,
    /// The source no longer exists
    DiscardedDeleted,
}

/// Handle for one in-flight remote computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub source_id: EntityId,
    generation: u64,
}

/// Tracks the latest request issued per source
///
/// Only the most recently issued ticket for a source may commit; earlier
/// ones are stale whenever they resolve.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: HashMap<EntityId, u64>,
    issued: u64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket, superseding any earlier one for the same source
    pub fn issue(&mut self, source_id: EntityId) -> RequestTicket {
        self.issued += 1;
        self.latest.insert(source_id, self.issued);
        RequestTicket {
            source_id,
            generation: self.issued,
        }
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.latest.get(&ticket.source_id) == Some(&ticket.generation)
    }

    /// Close a ticket if it is still the current one
    pub fn retire(&mut self, ticket: &RequestTicket) -> bool {
        if self.is_current(ticket) {
            self.latest.remove(&ticket.source_id);
            true
        } else {
            false
        }
    }

    /// Drop any request for a source, making every outstanding ticket stale
    pub fn forget(&mut self, source_id: EntityId) {
        self.latest.remove(&source_id);
    }

    pub fn in_flight(&self) -> usize {
        self.latest.len()
    }

    pub fn clear(&mut self) {
        self.latest.clear();
    }
}
