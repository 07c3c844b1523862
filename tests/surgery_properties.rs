//! Randomized property checks for graph surgery
//!
//! Each property runs over a fixed set of seeds so failures reproduce.
//!
//! Run with: `cargo test --test surgery_properties`

mod common;

use cloneline::surgery::{
    dedup_primers, delete_source_and_descendants, extract_subgraph, merge_graphs, shift_ids,
};
use cloneline::CloningGraph;
use common::{forward_closure, has_cycle, pool_primer, primer_names_unique, random_strategy, shared_ids};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;

const SEEDS: u64 = 24;
const STEPS: usize = 18;

fn strategies(seed: u64) -> (CloningGraph, CloningGraph) {
    let mut rng = StdRng::seed_from_u64(seed);
    (random_strategy(&mut rng, STEPS), random_strategy(&mut rng, STEPS))
}

#[test]
fn random_strategies_are_valid() {
    for seed in 0..SEEDS {
        let (a, b) = strategies(seed);
        assert_eq!(a.validate(), Ok(()), "seed {seed}");
        assert_eq!(b.validate(), Ok(()), "seed {seed}");
        assert!(!has_cycle(&a), "seed {seed}");
    }
}

#[test]
fn merge_rebases_into_disjoint_id_ranges() {
    for seed in 0..SEEDS {
        let (incoming, existing) = strategies(seed);
        let outcome = merge_graphs(&incoming, &existing).unwrap();

        let expected = existing.next_id().get() as i64 - incoming.min_id().unwrap().get() as i64;
        assert_eq!(outcome.delta, expected, "seed {seed}");

        let rebased = shift_ids(&incoming, outcome.delta).unwrap();
        assert!(shared_ids(&rebased, &existing).is_empty(), "seed {seed}");
        assert!(rebased.min_id().unwrap() > existing.ids().last().unwrap(), "seed {seed}");

        for existing_id in existing.ids() {
            assert!(outcome.graph.contains(existing_id), "seed {seed}: lost {existing_id}");
        }
        assert_eq!(outcome.graph.validate(), Ok(()), "seed {seed}");
        assert!(primer_names_unique(&outcome.graph), "seed {seed}");
        assert!(!has_cycle(&outcome.graph), "seed {seed}");
    }
}

#[test]
fn merge_accounts_for_every_entity() {
    for seed in 0..SEEDS {
        let (incoming, existing) = strategies(seed);
        let outcome = merge_graphs(&incoming, &existing).unwrap();

        let existing_names: BTreeSet<&str> = existing.primers().map(|p| p.name.as_str()).collect();
        let collapsed = incoming
            .primers()
            .filter(|p| existing_names.contains(p.name.as_str()))
            .count();
        assert_eq!(
            outcome.graph.len(),
            incoming.len() + existing.len() - collapsed,
            "seed {seed}"
        );
    }
}

#[test]
fn cascade_removes_exactly_the_forward_closure() {
    for seed in 0..SEEDS {
        let (graph, _) = strategies(seed);
        for source in graph.sources() {
            let removal = delete_source_and_descendants(&graph, source.id).unwrap();
            let (sources, sequences) = forward_closure(&graph, source.id);
            assert_eq!(removal.removed.sources, sources, "seed {seed}, source {}", source.id);
            assert_eq!(removal.removed.sequences, sequences, "seed {seed}, source {}", source.id);

            let expected: Vec<_> = graph
                .ids()
                .filter(|id| !sources.contains(id) && !sequences.contains(id))
                .collect();
            assert_eq!(removal.graph.ids().collect::<Vec<_>>(), expected);
            assert_eq!(removal.graph.validate(), Ok(()), "seed {seed}");
        }
    }
}

#[test]
fn dedup_is_idempotent() {
    for seed in 0..SEEDS {
        let (mut graph, _) = strategies(seed);
        let originals: Vec<_> = graph.primers().cloned().collect();
        for (k, _) in originals.iter().enumerate() {
            let copy_id = graph.next_id();
            graph.insert(pool_primer(copy_id, k)).unwrap();
        }

        let once = dedup_primers(&graph).unwrap();
        assert_eq!(once.replaced.len(), originals.len(), "seed {seed}");
        assert_eq!(once.graph.validate(), Ok(()), "seed {seed}");

        let twice = dedup_primers(&once.graph).unwrap();
        assert!(twice.replaced.is_empty(), "seed {seed}");
        assert_eq!(twice.graph, once.graph, "seed {seed}");
    }
}

#[test]
fn shift_preserves_structure() {
    for seed in 0..SEEDS {
        let (graph, _) = strategies(seed);
        let shifted = shift_ids(&graph, 1000).unwrap();
        assert_eq!(shifted.validate(), Ok(()), "seed {seed}");
        assert_eq!(shifted.len(), graph.len());
        assert_eq!(shift_ids(&shifted, -1000).unwrap(), graph, "seed {seed}");
    }
}

#[test]
fn extraction_yields_a_valid_closed_subgraph() {
    for seed in 0..SEEDS {
        let (graph, _) = strategies(seed);
        for sequence in graph.sequences() {
            let sub = extract_subgraph(&graph, sequence.id).unwrap();
            assert_eq!(sub.validate(), Ok(()), "seed {seed}, sequence {}", sequence.id);
            assert!(sub.contains(sequence.id));
            assert_eq!(sub.terminal_sequences(), vec![sequence.id], "seed {seed}");
            for entity in sub.entities() {
                assert_eq!(graph.get(entity.id()), Some(entity));
            }
        }
    }
}
