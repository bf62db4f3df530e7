//! The aggregation contract.
//!
//! Reduces raw rows to one value per `(template, mode, eir, seed, measure,
//! age band)`. The reduction is a pipeline of named steps with a fixed
//! order:
//!
//! 1. [`drop_invalid`]: non-finite values out first.
//! 2. [`exclude_first_survey`]: survey 1 precedes the monitoring window.
//! 3. [`sum_by_group`]: remaining surveys are additive period counts.
//! 4. [`adjust_host_years_at_risk`]: host counts only, exactly once.
//!
//! Steps 3 and 4 commute for the seed dimension (the adjustment is a
//! per-band scalar), but the order above is the documented contract and the
//! one [`aggregate`] applies. Sums are associative and commutative, so the
//! result is independent of input row order.

use std::collections::BTreeMap;

use es_core::age::AgeBands;
use es_core::measures::Measure;
use es_core::seasonality::SeasonalityMode;
use es_scenario::ScenarioSpec;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ResultsResult;
use crate::load::TaggedMeasurement;

/// One reduced row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRow {
    pub template_name: String,
    pub mode: SeasonalityMode,
    pub eir: f64,
    pub seed: u32,
    pub measure: i32,
    pub age_group: u32,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedTable {
    pub rows: Vec<AggregatedRow>,
}

impl AggregatedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows for one `(template, mode)` reporting view.
    pub fn select(&self, template_name: &str, mode: SeasonalityMode) -> Vec<AggregatedRow> {
        self.rows
            .iter()
            .filter(|r| r.template_name == template_name && r.mode == mode)
            .cloned()
            .collect()
    }

    pub fn save_cache(&self, path: &std::path::Path) -> ResultsResult<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn load_cache(path: &std::path::Path) -> ResultsResult<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut rows = Vec::new();
        for record in reader.deserialize() {
            rows.push(record?);
        }
        Ok(Self { rows })
    }
}

/// Step 1: drop rows with missing or non-finite values. A scenario that
/// terminated abnormally can leave partial garbage; it must not poison the
/// sums.
pub fn drop_invalid(rows: Vec<TaggedMeasurement>) -> Vec<TaggedMeasurement> {
    rows.into_iter()
        .filter(|t| t.row.value.is_finite())
        .collect()
}

/// Step 2: exclude survey period 1. It reflects the burn-in convention, not
/// a real observation inside the monitoring window.
pub fn exclude_first_survey(rows: Vec<TaggedMeasurement>) -> Vec<TaggedMeasurement> {
    rows.into_iter().filter(|t| t.row.survey != 1).collect()
}

// Grouping key. EIR is keyed by its bit pattern: sweep EIRs are positive
// finite values, for which the IEEE bit order matches numeric order.
type GroupKey = (String, SeasonalityMode, u64, u32, i32, u32);

/// Step 3: group by `(template, mode, eir, seed, measure, age band)` and sum
/// values. The surveys remaining inside the monitoring window are additive
/// counts per period; summing yields the window total.
pub fn sum_by_group(rows: &[TaggedMeasurement], specs: &[ScenarioSpec]) -> AggregatedTable {
    let by_id: BTreeMap<u32, &ScenarioSpec> = specs.iter().map(|s| (s.id, s)).collect();

    let mut groups: BTreeMap<GroupKey, f64> = BTreeMap::new();
    for tagged in rows {
        let Some(spec) = by_id.get(&tagged.scenario_id) else {
            warn!(scenario = tagged.scenario_id, "row references unknown scenario id");
            continue;
        };
        let key = (
            spec.template_name.clone(),
            spec.mode,
            spec.eir.to_bits(),
            spec.seed,
            tagged.row.measure,
            tagged.row.age_group,
        );
        *groups.entry(key).or_insert(0.0) += tagged.row.value;
    }

    AggregatedTable {
        rows: groups
            .into_iter()
            .map(
                |((template_name, mode, eir_bits, seed, measure, age_group), value)| {
                    AggregatedRow {
                        template_name,
                        mode,
                        eir: f64::from_bits(eir_bits),
                        seed,
                        measure,
                        age_group,
                        value,
                    }
                },
            )
            .collect(),
    }
}

/// Step 4: correct host-count population-time denominators for partial-year
/// age bands. Applied exactly once, to the host-count measure only.
pub fn adjust_host_years_at_risk(table: &mut AggregatedTable, bands: &AgeBands) {
    let host_code = Measure::NHost.code();
    for row in &mut table.rows {
        if row.measure != host_code {
            continue;
        }
        match bands.years_at_risk(row.age_group) {
            Some(factor) => row.value *= factor,
            None => warn!(
                age_group = row.age_group,
                "host-count row with out-of-range age band left unadjusted"
            ),
        }
    }
}

/// Run the full reduction in its fixed order.
pub fn aggregate(
    specs: &[ScenarioSpec],
    rows: Vec<TaggedMeasurement>,
    bands: &AgeBands,
) -> AggregatedTable {
    let rows = drop_invalid(rows);
    let rows = exclude_first_survey(rows);
    let mut table = sum_by_group(&rows, specs);
    adjust_host_years_at_risk(&mut table, bands);
    table
}
