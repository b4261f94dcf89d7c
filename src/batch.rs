//! Offline mode: one JSON event record per input line, one JSON result per
//! output line. The first bad event stops the run.

use std::io::{BufRead, Write};

use serde::Serialize;

use crate::error::Result;
use crate::event::{EventRecord, InputTag};
use crate::producer::{ElectronRegressionProducer, ProducedMaps};
use crate::value_map::ValueMap;

#[derive(Debug, Serialize)]
pub struct EventOutput<'a> {
    pub run: u32,
    pub lumi: u32,
    pub event: u64,
    pub rho: f64,
    pub vertex_count: u32,
    pub outputs: Vec<NamedMap<'a>>,
}

#[derive(Debug, Serialize)]
pub struct NamedMap<'a> {
    pub tag: &'a InputTag,
    pub values: &'a ValueMap<f64>,
}

impl<'a> EventOutput<'a> {
    pub fn new(record: &EventRecord, maps: &'a ProducedMaps) -> Self {
        Self {
            run: record.run,
            lumi: record.lumi,
            event: record.event,
            rho: maps.context.rho,
            vertex_count: maps.context.vertex_count,
            outputs: vec![
                NamedMap {
                    tag: &maps.energy_tag,
                    values: &maps.energy,
                },
                NamedMap {
                    tag: &maps.energy_error_tag,
                    values: &maps.energy_error,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub events: u64,
    pub electrons: u64,
}

pub fn run<R: BufRead, W: Write>(
    producer: &ElectronRegressionProducer,
    input: R,
    mut output: W,
) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();
    for (line_no, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut record: EventRecord = serde_json::from_str(&line).map_err(|e| {
            tracing::error!(line = line_no + 1, error = %e, "aborting batch: unreadable event");
            e
        })?;
        let maps = producer.produce(&mut record).map_err(|e| {
            tracing::error!(
                line = line_no + 1,
                run = record.run,
                event = record.event,
                error = %e,
                "aborting batch"
            );
            e
        })?;
        serde_json::to_writer(&mut output, &EventOutput::new(&record, &maps))?;
        output.write_all(b"\n")?;

        summary.events += 1;
        summary.electrons += maps.energy.len() as u64;
    }
    output.flush()?;
    tracing::info!(events = summary.events, electrons = summary.electrons, "batch finished");
    Ok(summary)
}
