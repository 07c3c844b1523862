//! Output-to-input coordinate maps for assembly-family sources

use super::range::{circular_len, contains, wrap, SequenceRange};
use crate::graph::{CloningGraph, EntityId, LineageResult, Operation, SourceInput};

/// Where one input fragment sits in the assembled product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Input sequence id
    pub sequence: EntityId,
    /// Input position at which the fragment starts
    pub anchor: usize,
    /// Length of the input molecule
    pub input_size: usize,
    /// Positions the fragment contributes to the product
    pub length: usize,
    /// Product-frame interval occupied by the fragment
    pub range_in_assembly: SequenceRange,
    pub reverse_complemented: bool,
}

/// Coordinate map of one completed assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyMap {
    output_length: usize,
    circular: bool,
    fragments: Vec<Fragment>,
}

impl AssemblyMap {
    /// Build the map for a source in `graph`
    ///
    /// `Ok(None)` when the source is pending, its operation is not in the
    /// assembly family, or none of its inputs carry framing yet.
    pub fn from_source(graph: &CloningGraph, source_id: EntityId) -> LineageResult<Option<Self>> {
        let source = graph.require_source(source_id)?;
        let Some(operation) = source.operation.as_ref().filter(|op| op.is_assembly()) else {
            return Ok(None);
        };
        let Some(output) = source.output else {
            return Ok(None);
        };
        let product = graph.require_sequence(output)?;

        let mut inputs = Vec::with_capacity(source.input.len());
        for input in &source.input {
            // primers listed as inputs contribute no fragment
            if let Some(sequence) = graph.sequence(input.sequence) {
                inputs.push((input, sequence.length));
            }
        }

        Ok(Self::build(operation, &inputs, product.length, product.circular))
    }

    /// Build the map from framed inputs and their sizes
    pub fn build(
        operation: &Operation,
        inputs: &[(&SourceInput, usize)],
        output_length: usize,
        circular: bool,
    ) -> Option<Self> {
        if output_length == 0 || !inputs.iter().any(|(input, _)| input.has_framing()) {
            return None;
        }

        let mut count = operation.assembly_start_offset();
        let mut fragments = Vec::with_capacity(inputs.len());

        for (input, size) in inputs {
            let size = *size;
            let anchor = input.left_location.map_or(0, |l| l.start);
            let stop = input.right_location.map_or(size, |r| r.end);

            let whole = input.left_location.is_some() && input.left_location == input.right_location;
            let natural = if whole {
                size
            } else {
                circular_len(anchor, stop, size)
            };
            let length = natural.min(output_length);

            let end = count + length.saturating_sub(1);
            let range_in_assembly = if circular {
                SequenceRange::new(count % output_length, end % output_length)
            } else {
                SequenceRange::new(count, end)
            };

            fragments.push(Fragment {
                sequence: input.sequence,
                anchor,
                input_size: size,
                length,
                range_in_assembly,
                reverse_complemented: input.reverse_complemented,
            });

            count += match input.right_location {
                Some(right) if !whole => circular_len(anchor, right.start, size),
                _ => length,
            };
        }

        Some(Self {
            output_length,
            circular,
            fragments,
        })
    }

    pub fn output_length(&self) -> usize {
        self.output_length
    }

    pub fn is_circular(&self) -> bool {
        self.circular
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Map a product-frame selection onto input `input`
    ///
    /// An input may appear several times; the first fragment containing the
    /// selection wins. `None` when no fragment of `input` contains it.
    pub fn range_in_parent(&self, selection: SequenceRange, input: EntityId) -> Option<SequenceRange> {
        self.fragments
            .iter()
            .filter(|f| f.sequence == input)
            .find(|f| self.fragment_contains(f, selection))
            .map(|f| self.translate(f, selection))
    }

    fn fragment_contains(&self, fragment: &Fragment, selection: SequenceRange) -> bool {
        // A fragment covering the whole product contains everything, even
        // origin-crossing selections that land outside it on the input.
        if fragment.length >= self.output_length {
            return true;
        }
        contains(
            fragment.range_in_assembly,
            selection,
            self.output_length,
            self.circular,
        )
    }

    fn translate(&self, fragment: &Fragment, selection: SequenceRange) -> SequenceRange {
        let to_input = |position: usize| {
            let offset = position as i64 - fragment.range_in_assembly.start as i64;
            let offset = if self.circular {
                offset.rem_euclid(self.output_length as i64)
            } else {
                offset
            };
            wrap(fragment.anchor as i64 + offset, fragment.input_size)
        };

        let start = to_input(selection.start);
        let end = to_input(selection.end);
        if fragment.reverse_complemented {
            let last = fragment.input_size.saturating_sub(1);
            SequenceRange::new(last - end, last - start)
        } else {
            SequenceRange::new(start, end)
        }
    }
}

/// Map a selection on a source's product back onto one of its inputs
pub fn range_in_parent(
    graph: &CloningGraph,
    source_id: EntityId,
    selection: SequenceRange,
    input: EntityId,
) -> LineageResult<Option<SequenceRange>> {
    Ok(AssemblyMap::from_source(graph, source_id)?.and_then(|map| map.range_in_parent(selection, input)))
}
