//! Raw output loading.
//!
//! One tab-separated, headerless file per scenario, named by scenario id:
//! `survey<TAB>ageGroup<TAB>measure<TAB>value`. Row order within a file
//! carries no meaning; rows are treated as an unordered bag. A scenario that
//! failed to execute leaves no file; a scenario that died mid-write can
//! leave partial garbage. Both are absorbed here: unreadable files are
//! skipped with a warning and malformed lines are dropped and counted, so a
//! sweep with holes still yields a usable table.

use std::path::Path;

use es_scenario::ScenarioSpec;
use tracing::{debug, warn};

/// One row of a scenario's raw output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawMeasurement {
    /// 1-based monitoring interval; period 1 is the burn-in artifact.
    pub survey: u32,
    /// 1-based index into the age-band boundary sequence.
    pub age_group: u32,
    /// Measure code; may be absent from the name table.
    pub measure: i32,
    pub value: f64,
}

/// A raw row tagged with its originating scenario.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedMeasurement {
    pub scenario_id: u32,
    pub row: RawMeasurement,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    pub scenarios_loaded: usize,
    pub scenarios_skipped: usize,
    pub rows: usize,
    pub malformed_lines: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub rows: Vec<TaggedMeasurement>,
    pub summary: LoadSummary,
}

fn parse_line(line: &str) -> Option<RawMeasurement> {
    let mut fields = line.split('\t');
    let survey = fields.next()?.trim().parse().ok()?;
    let age_group = fields.next()?.trim().parse().ok()?;
    let measure = fields.next()?.trim().parse().ok()?;
    let value = fields.next()?.trim().parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some(RawMeasurement {
        survey,
        age_group,
        measure,
        value,
    })
}

/// Parse one raw output file's text; returns surviving rows and the count of
/// dropped lines.
pub fn parse_output(text: &str) -> (Vec<RawMeasurement>, usize) {
    let mut rows = Vec::new();
    let mut malformed = 0;
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(row) => rows.push(row),
            None => malformed += 1,
        }
    }
    (rows, malformed)
}

/// Load and tag every scenario's output from `output_dir`.
///
/// Missing or unreadable files are holes, not errors: they are logged,
/// counted, and contribute zero rows.
pub fn collect_raw(specs: &[ScenarioSpec], output_dir: &Path) -> RawTable {
    let mut table = RawTable::default();

    for spec in specs {
        let path = output_dir.join(spec.output_file_name());
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!(scenario = %spec.label(), path = %path.display(), error = %e,
                    "skipping unreadable scenario output");
                table.summary.scenarios_skipped += 1;
                continue;
            }
        };

        let (rows, malformed) = parse_output(&text);
        if malformed > 0 {
            warn!(scenario = spec.id, malformed, "dropped malformed output lines");
        }
        table.summary.scenarios_loaded += 1;
        table.summary.malformed_lines += malformed;
        table.summary.rows += rows.len();
        table.rows.extend(rows.into_iter().map(|row| TaggedMeasurement {
            scenario_id: spec.id,
            row,
        }));
    }

    debug!(
        loaded = table.summary.scenarios_loaded,
        skipped = table.summary.scenarios_skipped,
        rows = table.summary.rows,
        "collected raw outputs"
    );
    table
}
