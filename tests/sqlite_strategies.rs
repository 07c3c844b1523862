//! On-disk strategy persistence
//!
//! Run with: `cargo test --test sqlite_strategies`

mod common;

use cloneline::surgery::graft_graph;
use cloneline::{OpenStore, SqliteStore, StrategyStore};
use common::{id, pcr_strategy, template_strategy};
use tempfile::TempDir;

#[test]
fn strategies_survive_reopening() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("strategies.db");
    let grafted = graft_graph(&pcr_strategy(), &template_strategy(), id(1)).unwrap();

    {
        let store = SqliteStore::open(&path).unwrap();
        store.save_strategy("pcr", &pcr_strategy()).unwrap();
        store.save_strategy("grafted", &grafted.graph).unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(store.load_strategy("pcr").unwrap(), Some(pcr_strategy()));
    assert_eq!(store.load_strategy("grafted").unwrap(), Some(grafted.graph.clone()));

    let names: Vec<_> = store
        .list_strategies()
        .unwrap()
        .into_iter()
        .map(|summary| summary.name)
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"pcr".to_string()));
    assert!(names.contains(&"grafted".to_string()));
}

#[test]
fn deleted_strategy_stays_deleted_after_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("strategies.db");

    {
        let store = SqliteStore::open(&path).unwrap();
        store.save_strategy("pcr", &pcr_strategy()).unwrap();
        assert!(store.delete_strategy("pcr").unwrap());
        assert!(!store.delete_strategy("pcr").unwrap());
    }

    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(store.load_strategy("pcr").unwrap(), None);
    assert!(store.list_strategies().unwrap().is_empty());
}

#[test]
fn summary_counts_match_saved_graph() {
    let store = SqliteStore::open_in_memory().unwrap();
    let graph = pcr_strategy();
    store.save_strategy("pcr", &graph).unwrap();

    let summary = store.list_strategies().unwrap().remove(0);
    assert_eq!(summary.sources, graph.source_count());
    assert_eq!(summary.sequences, graph.sequence_count());
    assert_eq!(summary.primers, graph.primer_count());
}
