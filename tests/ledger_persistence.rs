//! Persistence tests - checkpoint, reload, resume across process lifetimes

mod common;

use common::{counter_buffer, counter_regions, sample_catalog, ScriptedOracle};
use faultline::coordinator::MutationCoordinator;
use faultline::ledger::ChangeLedger;

#[test]
fn test_checkpoint_roundtrips_full_campaign_state() {
    let oracle = ScriptedOracle::new()
        .choose_region(1)
        .choose_line(8, "constant-corruption")
        .rewrite("count <= 4'b0001;", "reset to one")
        .choose_region(1)
        .choose_line(10, "operator-swap")
        .rewrite("count <= count - 1;", "decrement");
    let mut coordinator = MutationCoordinator::new(
        Box::new(oracle),
        sample_catalog(),
        &counter_buffer(),
        &counter_regions(),
    );

    coordinator.attempt_mutation().unwrap().unwrap();
    coordinator.attempt_mutation().unwrap().unwrap();
    coordinator.undo_mutation();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counter.ledger.json");
    coordinator.checkpoint(&path).unwrap();

    let loaded = ChangeLedger::load(&path).unwrap();
    assert_eq!(loaded.changes(), coordinator.ledger().changes());
    assert_eq!(loaded.regions(), coordinator.ledger().regions());
    assert_eq!(loaded.changes().len(), 2);
    assert!(loaded.changes()[0].valid);
    assert!(!loaded.changes()[1].valid);
}

#[test]
fn test_resume_rebuilds_regions_without_rediscovery() {
    let oracle = ScriptedOracle::new()
        .choose_region(0)
        .choose_line(2, "signal-swap")
        .rewrite("input rst,", "clk port renamed to rst");
    let mut coordinator = MutationCoordinator::new(
        Box::new(oracle),
        sample_catalog(),
        &counter_buffer(),
        &counter_regions(),
    );
    coordinator.attempt_mutation().unwrap().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counter.ledger.json");
    coordinator.checkpoint(&path).unwrap();

    // New process: reload the ledger against a freshly loaded source file.
    let ledger = ChangeLedger::load(&path).unwrap();
    let resumed = MutationCoordinator::resume(
        Box::new(ScriptedOracle::new()),
        sample_catalog(),
        &counter_buffer(),
        ledger,
    );

    assert_eq!(resumed.partition().len(), 2);
    assert_eq!(resumed.partition()[0].description, "port declarations");
    assert_eq!(resumed.partition()[1].start_line(), 6);
    // The resumed partition holds pristine text; only the ledger remembers
    // the change committed before the checkpoint.
    assert_eq!(resumed.partition()[0].line(2), "  input clk,");
    assert_eq!(resumed.ledger().changes_in_region(0, true).len(), 1);
}

#[test]
fn test_resumed_campaign_statistics_feed_region_selection() {
    let oracle = ScriptedOracle::new()
        .choose_region(1)
        .choose_line(10, "operator-swap")
        .rewrite("count <= count - 1;", "decrement");
    let mut coordinator = MutationCoordinator::new(
        Box::new(oracle),
        sample_catalog(),
        &counter_buffer(),
        &counter_regions(),
    );
    coordinator.attempt_mutation().unwrap().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counter.ledger.json");
    coordinator.checkpoint(&path).unwrap();

    let second_oracle = ScriptedOracle::new().choose_region(0);
    let transcript = second_oracle.transcript();
    let ledger = ChangeLedger::load(&path).unwrap();
    let mut resumed = MutationCoordinator::resume(
        Box::new(second_oracle),
        sample_catalog(),
        &counter_buffer(),
        ledger,
    );
    resumed.select_region().unwrap();

    let transcript = transcript.borrow();
    let summaries = &transcript.region_queries[0].summaries;
    assert_eq!(summaries[1].num_mutations_attempted, 1);
    assert_eq!(summaries[1].num_mutations_successful, 1);
    assert_eq!(summaries[0].num_mutations_attempted, 0);
}

#[test]
fn test_edits_after_checkpoint_stay_in_memory_only() {
    let oracle = ScriptedOracle::new()
        .choose_region(1)
        .choose_line(10, "operator-swap")
        .rewrite("count <= count - 1;", "decrement");
    let mut coordinator = MutationCoordinator::new(
        Box::new(oracle),
        sample_catalog(),
        &counter_buffer(),
        &counter_regions(),
    );

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counter.ledger.json");
    coordinator.checkpoint(&path).unwrap();

    // Commit after the checkpoint: durable storage is stale until the next
    // explicit checkpoint, but the in-memory text has the edit.
    coordinator.attempt_mutation().unwrap().unwrap();
    let on_disk = ChangeLedger::load(&path).unwrap();
    assert!(on_disk.changes().is_empty());
    assert!(coordinator.materialize().contains("count <= count - 1;"));
}

#[test]
fn test_written_output_matches_materialized_text() {
    let oracle = ScriptedOracle::new()
        .choose_region(1)
        .choose_line(7, "condition-flip")
        .rewrite("if (!rst)", "inverted reset");
    let mut coordinator = MutationCoordinator::new(
        Box::new(oracle),
        sample_catalog(),
        &counter_buffer(),
        &counter_regions(),
    );
    coordinator.attempt_mutation().unwrap().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("counter_mut.v");
    coordinator.write_output(&out).unwrap();

    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(written, coordinator.materialize());
    assert!(written.contains("if (!rst) // BUG_1: inserted condition-flip fault"));
}
