//! Coordinate transforms from assembled products back to their inputs

mod assembly;
mod range;

pub use assembly::{range_in_parent, AssemblyMap, Fragment};
pub use range::{circular_len, contains, wrap, SequenceRange};
