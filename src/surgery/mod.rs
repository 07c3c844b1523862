//! Graph surgery
//!
//! Every operation takes graphs by reference and returns a new graph or an
//! error. A failed operation leaves its inputs untouched.

mod cascade;
mod dedup;
mod extract;
mod merge;
mod shift;

pub use cascade::{clear_source_output, delete_source_and_descendants, Removal};
pub use dedup::{dedup_primers, find_duplicate_primers, DedupOutcome};
pub use extract::extract_subgraph;
pub use merge::{graft_graph, merge_graphs, MergeOutcome};
pub use shift::{rename_ids, shift_ids};
