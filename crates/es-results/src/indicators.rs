//! Derived epidemiological indicators.
//!
//! Pure functions over one `(template, mode)` view of the aggregated table.
//! Their numeric definitions are part of the pipeline contract: downstream
//! consumers must reproduce these exact reductions (same band selection,
//! same seed grouping) to match reference results.

use std::collections::BTreeMap;

use es_core::age::AgeBands;
use es_core::measures::Measure;

use crate::aggregate::AggregatedRow;

/// Seed-enveloped value per EIR sweep point.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub eir: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Single value per EIR sweep point.
#[derive(Debug, Clone, PartialEq)]
pub struct EirValue {
    pub eir: f64,
    pub value: f64,
}

/// Age-band selection window: a band is in the window when its upper
/// boundary lies in `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeWindow {
    pub lo: f64,
    pub hi: f64,
}

impl AgeWindow {
    pub const PREVALENCE_2_TO_10: AgeWindow = AgeWindow { lo: 2.0, hi: 10.0 };

    fn contains(&self, bands: &AgeBands, age_group: u32) -> bool {
        bands
            .upper(age_group)
            .is_some_and(|upper| upper >= self.lo && upper <= self.hi)
    }
}

// Sum per (eir, seed) of the selected measures inside the window.
fn sum_per_eir_seed(
    rows: &[AggregatedRow],
    bands: &AgeBands,
    measures: &[Measure],
    window: AgeWindow,
) -> BTreeMap<(u64, u32), f64> {
    let codes: Vec<i32> = measures.iter().map(|m| m.code()).collect();
    let mut sums = BTreeMap::new();
    for row in rows {
        if !codes.contains(&row.measure) || !window.contains(bands, row.age_group) {
            continue;
        }
        *sums.entry((row.eir.to_bits(), row.seed)).or_insert(0.0) += row.value;
    }
    sums
}

// Collapse per-(eir, seed) values into a per-EIR mean/min/max envelope.
fn envelope(values: BTreeMap<(u64, u32), f64>) -> Vec<SeriesPoint> {
    let mut per_eir: BTreeMap<u64, Vec<f64>> = BTreeMap::new();
    for ((eir_bits, _seed), value) in values {
        per_eir.entry(eir_bits).or_default().push(value);
    }
    per_eir
        .into_iter()
        .map(|(eir_bits, values)| {
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            let min = values.iter().copied().fold(f64::MAX, f64::min);
            let max = values.iter().copied().fold(f64::MIN, f64::max);
            SeriesPoint {
                eir: f64::from_bits(eir_bits),
                mean,
                min,
                max,
            }
        })
        .collect()
}

/// Fraction of hosts aged 2-10 with patent infection, as a percentage.
///
/// Per `(eir, seed)`: patent sum over host sum across the bands whose upper
/// boundary lies in `[2, 10]`; the envelope is taken across seeds.
pub fn prevalence_2_to_10(rows: &[AggregatedRow], bands: &AgeBands) -> Vec<SeriesPoint> {
    let hosts = sum_per_eir_seed(
        rows,
        bands,
        &[Measure::NHost],
        AgeWindow::PREVALENCE_2_TO_10,
    );
    let patent = sum_per_eir_seed(
        rows,
        bands,
        &[Measure::NPatent],
        AgeWindow::PREVALENCE_2_TO_10,
    );

    let ratios: BTreeMap<(u64, u32), f64> = patent
        .into_iter()
        .filter_map(|(key, patent_sum)| {
            let host_sum = *hosts.get(&key)?;
            (host_sum > 0.0).then_some((key, patent_sum / host_sum * 100.0))
        })
        .collect();

    envelope(ratios)
}

/// Annualized incidence: case events per person per year.
///
/// Per `(eir, seed)`: the case sum over the window, divided by the host sum
/// over the same window scaled to person-years (`host / 12`, the monitoring
/// window reports person-months).
pub fn incidence(
    rows: &[AggregatedRow],
    bands: &AgeBands,
    case_measures: &[Measure],
    window: AgeWindow,
) -> Vec<SeriesPoint> {
    let cases = sum_per_eir_seed(rows, bands, case_measures, window);
    let hosts = sum_per_eir_seed(rows, bands, &[Measure::NHost], window);

    let rates: BTreeMap<(u64, u32), f64> = cases
        .into_iter()
        .filter_map(|(key, case_sum)| {
            let host_sum = *hosts.get(&key)?;
            (host_sum > 0.0).then_some((key, case_sum / (host_sum / 12.0)))
        })
        .collect();

    envelope(rates)
}

/// Annualized simulated EIR: mean of the reported per-period values, scaled
/// by 6 to convert the model's native reporting granularity to a yearly
/// estimate.
pub fn simulated_eir(rows: &[AggregatedRow]) -> Vec<EirValue> {
    let code = Measure::SimulatedEir.code();
    let mut per_eir: BTreeMap<u64, Vec<f64>> = BTreeMap::new();
    for row in rows {
        if row.measure == code {
            per_eir.entry(row.eir.to_bits()).or_default().push(row.value);
        }
    }
    per_eir
        .into_iter()
        .map(|(eir_bits, values)| EirValue {
            eir: f64::from_bits(eir_bits),
            value: values.iter().sum::<f64>() / values.len() as f64 * 6.0,
        })
        .collect()
}
