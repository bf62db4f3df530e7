//! Scenario metadata checkpoint.
//!
//! The metadata table is written as CSV immediately after generation, before
//! the expensive execution phase, and read back by the dispatcher and the
//! aggregator. Field values round-trip exactly (f64 uses shortest
//! round-trip formatting), and ids must come back dense and in generation
//! order.

use std::path::Path;

use crate::grid::ScenarioSpec;
use crate::{ScenarioError, ScenarioResult};

pub fn write_checkpoint(path: &Path, specs: &[ScenarioSpec]) -> ScenarioResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for spec in specs {
        writer.serialize(spec)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_checkpoint(path: &Path) -> ScenarioResult<Vec<ScenarioSpec>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut specs = Vec::new();
    for record in reader.deserialize() {
        let spec: ScenarioSpec = record?;
        specs.push(spec);
    }

    for (row, spec) in specs.iter().enumerate() {
        if spec.id as usize != row {
            return Err(ScenarioError::CorruptCheckpoint {
                what: format!("expected id {} at row {}, found {}", row, row, spec.id),
            });
        }
    }

    Ok(specs)
}
