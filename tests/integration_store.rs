//! Integration tests for persisted inputs and saved scenarios.

mod common;

use std::process::Command;

use carbon_incentives::calc::report::Analysis;
use carbon_incentives::config::CalculatorConfig;
use carbon_incentives::store::{
    FileStore, INPUTS_KEY, KeyValueStore, SCENARIOS_KEY, ScenarioBook, StoreError, load_inputs,
    reset_inputs, restore_inputs_or_default, save_inputs,
};

#[test]
fn inputs_survive_a_reopened_file_store() {
    let dir = common::scratch_dir("reopen");
    let mut config = CalculatorConfig::high_rates();
    config.bundle_discount_percent = 12.5;

    {
        let mut store = FileStore::open(&dir).expect("open store");
        save_inputs(&mut store, &config).expect("save inputs");
    }

    let store = FileStore::open(&dir).expect("reopen store");
    assert_eq!(load_inputs(&store).expect("load inputs"), Some(config));
}

#[test]
fn corrupt_inputs_fall_back_to_baseline() {
    let dir = common::scratch_dir("corrupt");
    let mut store = FileStore::open(&dir).expect("open store");
    store.set(INPUTS_KEY, "{not json").expect("write blob");

    assert!(matches!(
        load_inputs(&store),
        Err(StoreError::Corrupt { .. })
    ));
    assert_eq!(restore_inputs_or_default(&store), CalculatorConfig::baseline());
}

#[test]
fn reset_clears_saved_inputs() {
    let dir = common::scratch_dir("reset");
    let mut store = FileStore::open(&dir).expect("open store");
    save_inputs(&mut store, &CalculatorConfig::cold_climate()).expect("save inputs");

    let defaults = reset_inputs(&mut store).expect("reset");
    assert_eq!(defaults, CalculatorConfig::baseline());
    assert_eq!(load_inputs(&store).expect("load inputs"), None);
}

#[test]
fn scenario_book_round_trip_recomputes_results() {
    let dir = common::scratch_dir("book");
    let mut store = FileStore::open(&dir).expect("open store");

    let mut book = ScenarioBook::new();
    let a = book
        .save("Baseline home", &CalculatorConfig::baseline())
        .expect("save a");
    let b = book
        .save("Cold climate", &CalculatorConfig::cold_climate())
        .expect("save b");
    book.persist(&mut store).expect("persist");
    assert!(store.get(SCENARIOS_KEY).expect("read").is_some());

    let mut restored = ScenarioBook::restore(&store).expect("restore");
    assert_eq!(restored.scenarios().len(), 2);
    assert_eq!(restored.load(b).ok(), Some(CalculatorConfig::cold_climate()));

    let scenario = restored.get(a).expect("scenario a");
    let expected = Analysis::run(&CalculatorConfig::baseline()).expect("baseline runs");
    assert_eq!(scenario.analysis().ok(), Some(expected));

    // ids keep increasing after a restore
    let c = restored
        .save("High rates", &CalculatorConfig::high_rates())
        .expect("save c");
    assert!(c > b);
}

#[test]
fn comparison_selection_is_capped() {
    let mut book = ScenarioBook::new();
    let ids: Vec<u64> = (0..4)
        .map(|i| {
            book.save(&format!("Scenario {i}"), &CalculatorConfig::baseline())
                .expect("save")
        })
        .collect();

    for id in &ids[..3] {
        assert!(book.toggle_compare(*id).expect("toggle"));
    }
    assert!(matches!(
        book.toggle_compare(ids[3]),
        Err(StoreError::CompareLimit)
    ));
    assert!(!book.toggle_compare(ids[0]).expect("toggle off"));
    assert!(book.toggle_compare(ids[3]).expect("toggle on"));
    assert_eq!(book.compared().len(), 3);
}

#[test]
fn cli_saves_and_restores_through_store_dir() {
    let dir = common::scratch_dir("cli-store");
    let store_dir = dir.to_str().unwrap_or_default();
    let bin = env!("CARGO_BIN_EXE_carbon-incentives");

    let first = Command::new(bin)
        .args(["--preset", "high_rates", "--store-dir", store_dir])
        .args(["--save-as", "Pricey gas"])
        .output()
        .expect("first run");
    assert!(
        first.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&first.stderr)
    );

    let store = FileStore::open(&dir).expect("open store");
    assert_eq!(
        load_inputs(&store).expect("load inputs"),
        Some(CalculatorConfig::high_rates())
    );

    let second = Command::new(bin)
        .args(["--store-dir", store_dir, "--list-scenarios"])
        .output()
        .expect("second run");
    assert!(second.status.success());
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains("Pricey gas"));

    let third = Command::new(bin)
        .args(["--store-dir", store_dir, "--load-scenario", "1"])
        .args(["--view", "consumer"])
        .output()
        .expect("third run");
    assert!(third.status.success());
    let stdout = String::from_utf8_lossy(&third.stdout);
    assert_eq!(common::parse_metric(&stdout, "Total incentive:"), Some(1100.0));
}
