//! Range arithmetic on linear and circular molecules

use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive range of positions, 0-based
///
/// On a circular molecule `end < start` denotes a range that crosses the
/// origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceRange {
    pub start: usize,
    pub end: usize,
}

impl SequenceRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn spans_origin(&self) -> bool {
        self.end < self.start
    }

    /// Number of positions covered on a molecule of `size`
    ///
    /// Positions past the end wrap around the origin.
    pub fn len_on(&self, size: usize) -> usize {
        if size == 0 {
            return 0;
        }
        let (start, end) = (self.start % size, self.end % size);
        (end + size - start) % size + 1
    }
}

impl fmt::Display for SequenceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Distance walking forward from `start` to `end` on a molecule of `size`
///
/// Equal positions mean one full turn.
pub fn circular_len(start: usize, end: usize, size: usize) -> usize {
    if size == 0 {
        return 0;
    }
    let forward = (end as i64 - start as i64).rem_euclid(size as i64) as usize;
    if forward == 0 {
        size
    } else {
        forward
    }
}

/// Reduce a position onto a molecule of `size`
pub fn wrap(position: i64, size: usize) -> usize {
    if size == 0 {
        return 0;
    }
    position.rem_euclid(size as i64) as usize
}

/// Whether `outer` contains `inner`, both on a molecule of `size`
///
/// An origin-crossing `inner` is unrolled by adding `size` to its end. A
/// circular `outer` that crosses the origin is tried both as-is and with
/// `inner` shifted one turn forward.
pub fn contains(outer: SequenceRange, inner: SequenceRange, size: usize, circular: bool) -> bool {
    let inner_start = inner.start;
    let inner_end = if inner.spans_origin() {
        inner.end + size
    } else {
        inner.end
    };

    if circular && outer.spans_origin() {
        let outer_end = outer.end + size;
        let fits = |s: usize, e: usize| outer.start <= s && e <= outer_end;
        fits(inner_start, inner_end) || fits(inner_start + size, inner_end + size)
    } else {
        outer.start <= inner_start && inner_end <= outer.end
    }
}
