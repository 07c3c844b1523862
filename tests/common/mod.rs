//! Common test utilities for cloneline integration tests
//!
//! This module provides strategy fixtures, a seeded random strategy
//! generator, and independent invariant checks.

#![allow(dead_code, unused_imports)]

pub mod graph_builder;
pub mod metrics;

pub use graph_builder::{
    chain, id, pcr_strategy, pool_primer, random_strategy, template_strategy,
};
pub use metrics::{forward_closure, has_cycle, primer_names_unique, shared_ids};
