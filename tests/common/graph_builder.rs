//! Strategy builders for integration tests
//!
//! Hand-written fixtures for the scenario tests plus a seeded random
//! generator for the property tests.

use cloneline::{
    CloningGraph, EntityId, Location, Operation, Primer, PrimerBinding, Sequence, Source,
    SourceInput,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

pub fn id(n: u64) -> EntityId {
    EntityId::from(n)
}

fn upload(name: &str) -> Operation {
    Operation::UploadedFile {
        file_name: name.to_string(),
        index_in_file: None,
    }
}

/// A linear chain of `len` sequences, each derived from the previous one
///
/// Source `2k+1` produces sequence `2k+2`. Returns the graph and the
/// sequence ids in chain order.
pub fn chain(len: usize) -> (CloningGraph, Vec<EntityId>) {
    let mut graph = CloningGraph::new();
    let mut sequences = Vec::with_capacity(len);
    for step in 0..len as u64 {
        let source_id = id(2 * step + 1);
        let sequence_id = id(2 * step + 2);
        let mut source = Source::new(source_id).with_output(sequence_id);
        source = match sequences.last() {
            Some(&previous) => source
                .with_input(SourceInput::new(previous))
                .with_operation(Operation::PolymeraseExtension),
            None => source.with_operation(upload("start.gb")),
        };
        graph.insert(source).unwrap();
        graph.insert(Sequence::new(sequence_id, 1000 - step as usize)).unwrap();
        sequences.push(sequence_id);
    }
    (graph, sequences)
}

/// A 23 bp circular template amplified into an 18 bp product
///
/// Source 5 is the PCR; sequence 2 the template, sequence 6 the product.
/// The forward primer anneals from offset 12.
pub fn pcr_strategy() -> CloningGraph {
    let mut graph = CloningGraph::new();
    graph
        .insert(Source::new(id(1)).with_operation(upload("template.gb")).with_output(id(2)))
        .unwrap();
    graph.insert(Sequence::new(id(2), 23).circular()).unwrap();
    graph.insert(Primer::new(id(3), "fwd", "TTTTTTTTTTTTACGTAC")).unwrap();
    graph.insert(Primer::new(id(4), "rvs", "GGCCAA")).unwrap();
    graph
        .insert(
            Source::new(id(5))
                .with_input(SourceInput::fragment(
                    id(2),
                    Some(Location::new(8, 14)),
                    Some(Location::new(20, 3)),
                ))
                .with_operation(Operation::Pcr {
                    forward_primer: PrimerBinding::new(id(3), Location::new(12, 18)),
                    reverse_primer: PrimerBinding::new(id(4), Location::new(0, 6)),
                    add_primer_features: false,
                })
                .with_output(id(6)),
        )
        .unwrap();
    graph.insert(Sequence::new(id(6), 18)).unwrap();
    graph
}

/// A template strategy: placeholder 1 -> [template 2] -> Gibson 3 -> [4]
pub fn template_strategy() -> CloningGraph {
    let mut graph = CloningGraph::new();
    graph.insert(Source::new(id(1)).with_output(id(2))).unwrap();
    graph.insert(Sequence::template(id(2))).unwrap();
    graph
        .insert(
            Source::new(id(3))
                .with_input(SourceInput::new(id(2)))
                .with_operation(Operation::GibsonAssembly)
                .with_output(id(4)),
        )
        .unwrap();
    graph.insert(Sequence::new(id(4), 3000).circular()).unwrap();
    graph
}

/// Primer `k` of the shared pool: same name always means same content
pub fn pool_primer(primer_id: EntityId, k: usize) -> Primer {
    Primer::new(primer_id, format!("p{k}"), "ACGT".repeat(k + 2))
}

/// A random valid strategy built in `steps` steps
///
/// Mixes uploads, primers drawn from the shared pool and derived steps
/// consuming one or two earlier sequences, some left pending.
pub fn random_strategy(rng: &mut StdRng, steps: usize) -> CloningGraph {
    let mut graph = CloningGraph::new();
    let mut sequences: Vec<EntityId> = Vec::new();
    let mut primers: Vec<EntityId> = Vec::new();

    for _ in 0..steps {
        let next = graph.next_id();
        let roll = rng.gen_range(0..6);

        if roll == 0 || sequences.is_empty() {
            let sequence_id = id(next.get() + 1);
            graph
                .insert(Source::new(next).with_operation(upload("part.gb")).with_output(sequence_id))
                .unwrap();
            graph
                .insert(Sequence::new(sequence_id, rng.gen_range(50..5000)))
                .unwrap();
            sequences.push(sequence_id);
        } else if roll == 1 && primers.len() < 6 {
            graph.insert(pool_primer(next, primers.len())).unwrap();
            primers.push(next);
        } else {
            let take = rng.gen_range(1..=2).min(sequences.len());
            let mut source = Source::new(next);
            for input in sequences.choose_multiple(rng, take) {
                source = source.with_input(SourceInput::new(*input));
            }
            if let Some(primer) = primers.choose(rng) {
                source = source.with_input(SourceInput::new(*primer));
            }
            source = source.with_operation(Operation::Ligation);

            if rng.gen_bool(0.25) {
                graph.insert(source).unwrap();
            } else {
                let sequence_id = id(next.get() + 1);
                graph.insert(source.with_output(sequence_id)).unwrap();
                graph
                    .insert(Sequence::new(sequence_id, rng.gen_range(50..5000)))
                    .unwrap();
                sequences.push(sequence_id);
            }
        }
    }

    graph
}
