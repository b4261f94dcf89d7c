/// Batch mode over JSON-lines event files
///
/// Run with: cargo test --test batch_tests -- --nocapture
mod common;

use std::io::Cursor;
use std::sync::Arc;

use electron_regression::batch;
use electron_regression::error::RegressionError;
use electron_regression::event::{EventRecord, InputTag};
use electron_regression::geometry::{CaloGeometry, CaloTopology};
use electron_regression::producer::ElectronRegressionProducer;
use electron_regression::rechits::RecHitCollection;

fn producer(dir: &tempfile::TempDir) -> ElectronRegressionProducer {
    let weights = dir.path().join("weights.json");
    common::constant_model(1.02, 0.015).save(&weights).unwrap();
    ElectronRegressionProducer::from_config(
        &common::config(&weights),
        Arc::new(CaloGeometry::ideal()),
        Arc::new(CaloTopology::ideal()),
    )
    .unwrap()
}

fn event_line(n_electrons: usize, number: u64) -> String {
    let mut event = common::event(
        (0..n_electrons)
            .map(|i| common::barrel_electron(10, 50 + i as i32, 30.0))
            .collect(),
        RecHitCollection::default(),
        RecHitCollection::default(),
        vec![common::good_vertex()],
        4.0,
    );
    event.event = number;
    serde_json::to_string(&event).unwrap()
}

#[test]
fn test_batch_processes_every_line() {
    println!("\n=== Test: Batch Run ===");
    let dir = tempfile::tempdir().unwrap();
    let producer = producer(&dir);
    let input = format!("{}\n\n{}\n{}\n", event_line(2, 1), event_line(0, 2), event_line(3, 3));

    let mut out = Vec::new();
    let summary = batch::run(&producer, Cursor::new(input), &mut out).unwrap();
    assert_eq!(summary.events, 3);
    assert_eq!(summary.electrons, 5);

    let lines: Vec<serde_json::Value> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    let events: Vec<u64> = lines.iter().map(|l| l["event"].as_u64().unwrap()).collect();
    assert_eq!(events, vec![1, 2, 3]);
    let third = lines[2]["outputs"][1]["values"]["entries"].as_array().unwrap();
    assert_eq!(third.len(), 3);
    println!("✓ {} events, {} electrons", summary.events, summary.electrons);
}

#[test]
fn test_batch_stops_at_first_bad_event() {
    let dir = tempfile::tempdir().unwrap();
    let producer = producer(&dir);

    let mut broken: EventRecord = serde_json::from_str(&event_line(1, 2)).unwrap();
    broken.products.remove(&InputTag::new("kt6PFJets", "rho"));
    let input = format!(
        "{}\n{}\n{}\n",
        event_line(1, 1),
        serde_json::to_string(&broken).unwrap(),
        event_line(1, 3)
    );

    let mut out = Vec::new();
    let err = batch::run(&producer, Cursor::new(input), &mut out).unwrap_err();
    assert!(matches!(err, RegressionError::MissingProduct(_)), "{err}");
    // only the first event made it out
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
}

#[test]
fn test_batch_rejects_malformed_json() {
    let dir = tempfile::tempdir().unwrap();
    let producer = producer(&dir);
    let err = batch::run(&producer, Cursor::new("{not json}\n"), Vec::new()).unwrap_err();
    assert!(matches!(err, RegressionError::Json(_)));

    // an unreadable line after a good one keeps the output already written
    let input = format!("{}\n{{\"run\": 1,\n{}\n", event_line(1, 1), event_line(1, 3));
    let mut out = Vec::new();
    let err = batch::run(&producer, Cursor::new(input), &mut out).unwrap_err();
    assert!(matches!(err, RegressionError::Json(_)), "{err}");
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
}
