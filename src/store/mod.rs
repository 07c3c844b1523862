//! The provenance store and its remote-computation glue

mod engine;
mod pending;
mod session;

pub use engine::ProvenanceStore;
pub use pending::{CandidateResult, Completion, RequestTicket, RequestTracker};
pub use session::{CloningService, Session, StepRequest};
