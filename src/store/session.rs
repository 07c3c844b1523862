//! Async glue between the store and a remote cloning service

use super::engine::ProvenanceStore;
use super::pending::{CandidateResult, Completion};
use crate::graph::{CloningGraph, Entity, EntityId, LineageResult, Source};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

/// Everything a remote computation needs to run one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRequest {
    /// The pending source, with the parameters chosen so far
    pub source: Source,
    /// Sequences and primers the source references
    pub upstream: Vec<Entity>,
}

impl StepRequest {
    /// Capture a source and its upstream entities from a snapshot
    pub fn capture(graph: &CloningGraph, source_id: EntityId) -> LineageResult<Self> {
        let source = graph.require_source(source_id)?.clone();
        let upstream = source
            .upstream_ids()
            .into_iter()
            .filter_map(|id| graph.get(id).cloned())
            .collect();
        Ok(Self { source, upstream })
    }
}

/// The remote collaborator that computes cloning steps
#[async_trait]
pub trait CloningService: Send + Sync {
    /// Compute the candidate results of one step
    async fn compute(&self, request: StepRequest) -> LineageResult<Vec<CandidateResult>>;
}

/// A store shared between the caller and in-flight remote computations
///
/// The store lock is released while the service runs, so the caller may
/// keep editing; the response is checked against the store when it lands.
#[derive(Debug, Default)]
pub struct Session {
    store: Mutex<ProvenanceStore>,
}

impl Session {
    pub fn new(store: ProvenanceStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// Run `f` with exclusive access to the store
    pub async fn with_store<R>(&self, f: impl FnOnce(&mut ProvenanceStore) -> R) -> R {
        let mut store = self.store.lock().await;
        f(&mut *store)
    }

    /// The current graph
    pub async fn snapshot(&self) -> Arc<CloningGraph> {
        self.store.lock().await.snapshot()
    }

    /// Ask `service` to compute a pending source and deliver its result
    pub async fn run_step(
        &self,
        service: &dyn CloningService,
        source_id: EntityId,
    ) -> LineageResult<Completion> {
        let (ticket, request) = {
            let mut store = self.store.lock().await;
            let ticket = store.begin_request(source_id)?;
            let request = StepRequest::capture(store.graph(), source_id)?;
            (ticket, request)
        };

        let response = service.compute(request).await;

        let mut store = self.store.lock().await;
        match response {
            Ok(candidates) => store.complete_request(ticket, candidates),
            Err(e) => {
                warn!(source = %source_id, error = %e, "remote computation failed");
                store.abandon_request(&ticket);
                Err(e)
            }
        }
    }

    /// Take the store back out of the session
    pub fn into_inner(self) -> ProvenanceStore {
        self.store.into_inner()
    }
}
