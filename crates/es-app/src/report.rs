//! Indicator-series export.
//!
//! Chart rendering is an external collaborator; this module writes the
//! numeric series behind each chart family as CSV files in the figures
//! directory: prevalence-to-incidence per measure set, incidence by age
//! band, and simulated EIR against prevalence.

use std::path::{Path, PathBuf};

use es_core::age::AgeBands;
use es_core::measures::Measure;
use es_results::aggregate::AggregatedTable;
use es_results::indicators::{AgeWindow, SeriesPoint, incidence, prevalence_2_to_10, simulated_eir};
use serde::Serialize;

use crate::config::Experiment;
use crate::error::AppResult;

/// Age windows plotted against prevalence (band upper boundaries in years).
const AGE_WINDOWS: [AgeWindow; 4] = [
    AgeWindow { lo: 0.0, hi: 5.0 },
    AgeWindow { lo: 5.0, hi: 10.0 },
    AgeWindow { lo: 10.0, hi: 15.0 },
    AgeWindow { lo: 15.0, hi: 20.0 },
];

/// Oldest band upper boundary included in the age-incidence profile.
const AGE_PROFILE_CUTOFF: f64 = 20.0;

fn measure_sets() -> [(&'static str, Vec<Measure>); 3] {
    [
        ("clinical", vec![Measure::NUncomp]),
        ("severe", vec![Measure::ExpectedSevere]),
        (
            "mortality",
            vec![
                Measure::ExpectedDirectDeaths,
                Measure::ExpectedIndirectDeaths,
            ],
        ),
    ]
}

#[derive(Serialize)]
struct PrevalenceIncidenceRecord<'a> {
    template: &'a str,
    mode: &'a str,
    age_lo: f64,
    age_hi: f64,
    eir: f64,
    prevalence_pct: f64,
    incidence_mean: f64,
    incidence_min: f64,
    incidence_max: f64,
}

#[derive(Serialize)]
struct AgeIncidenceRecord<'a> {
    template: &'a str,
    mode: &'a str,
    measure_set: &'a str,
    age_band: String,
    band_upper: f64,
    eir: f64,
    incidence_mean: f64,
    incidence_min: f64,
    incidence_max: f64,
}

#[derive(Serialize)]
struct EirPrevalenceRecord<'a> {
    template: &'a str,
    mode: &'a str,
    eir: f64,
    simulated_eir: f64,
    prevalence_mean_pct: f64,
    prevalence_min_pct: f64,
    prevalence_max_pct: f64,
}

fn prevalence_for(series: &[SeriesPoint], eir: f64) -> Option<f64> {
    series
        .iter()
        .find(|p| p.eir.to_bits() == eir.to_bits())
        .map(|p| p.mean)
}

/// Write every series file; returns the paths written.
pub fn write_reports(experiment: &Experiment, table: &AggregatedTable) -> AppResult<Vec<PathBuf>> {
    let bands = experiment.age_bands()?;
    let figures_dir = experiment.figures_dir();
    std::fs::create_dir_all(&figures_dir)?;

    let mut written = Vec::new();

    for (set_name, measures) in measure_sets() {
        let path = figures_dir.join(format!("prevalence_to_{set_name}.csv"));
        write_prevalence_to_incidence(&path, experiment, table, &bands, &measures)?;
        written.push(path);
    }

    let age_path = figures_dir.join("age_incidence.csv");
    write_age_incidence(&age_path, experiment, table, &bands)?;
    written.push(age_path);

    let eir_path = figures_dir.join("eir_to_prevalence.csv");
    write_eir_to_prevalence(&eir_path, experiment, table, &bands)?;
    written.push(eir_path);

    Ok(written)
}

fn write_prevalence_to_incidence(
    path: &Path,
    experiment: &Experiment,
    table: &AggregatedTable,
    bands: &AgeBands,
    measures: &[Measure],
) -> AppResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    for template in &experiment.sweep.templates {
        for &mode in &experiment.sweep.modes {
            let rows = table.select(&template.name, mode);
            let prevalence = prevalence_2_to_10(&rows, bands);

            for window in AGE_WINDOWS {
                for point in incidence(&rows, bands, measures, window) {
                    let Some(prevalence_pct) = prevalence_for(&prevalence, point.eir) else {
                        continue;
                    };
                    writer.serialize(PrevalenceIncidenceRecord {
                        template: &template.name,
                        mode: mode.as_str(),
                        age_lo: window.lo,
                        age_hi: window.hi,
                        eir: point.eir,
                        prevalence_pct,
                        incidence_mean: point.mean,
                        incidence_min: point.min,
                        incidence_max: point.max,
                    })?;
                }
            }
        }
    }

    writer.flush()?;
    Ok(())
}

fn write_age_incidence(
    path: &Path,
    experiment: &Experiment,
    table: &AggregatedTable,
    bands: &AgeBands,
) -> AppResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    for template in &experiment.sweep.templates {
        for &mode in &experiment.sweep.modes {
            let rows = table.select(&template.name, mode);

            for (set_name, measures) in measure_sets() {
                for band in 1..=bands.band_count() as u32 {
                    let Some(upper) = bands.upper(band) else {
                        continue;
                    };
                    if upper > AGE_PROFILE_CUTOFF {
                        continue;
                    }
                    // A degenerate window selects exactly this band.
                    let window = AgeWindow {
                        lo: upper,
                        hi: upper,
                    };
                    for point in incidence(&rows, bands, &measures, window) {
                        writer.serialize(AgeIncidenceRecord {
                            template: &template.name,
                            mode: mode.as_str(),
                            measure_set: set_name,
                            age_band: bands.label(band).unwrap_or_default(),
                            band_upper: upper,
                            eir: point.eir,
                            incidence_mean: point.mean,
                            incidence_min: point.min,
                            incidence_max: point.max,
                        })?;
                    }
                }
            }
        }
    }

    writer.flush()?;
    Ok(())
}

fn write_eir_to_prevalence(
    path: &Path,
    experiment: &Experiment,
    table: &AggregatedTable,
    bands: &AgeBands,
) -> AppResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    for template in &experiment.sweep.templates {
        for &mode in &experiment.sweep.modes {
            let rows = table.select(&template.name, mode);
            let prevalence = prevalence_2_to_10(&rows, bands);

            for annualized in simulated_eir(&rows) {
                let Some(point) = prevalence
                    .iter()
                    .find(|p| p.eir.to_bits() == annualized.eir.to_bits())
                else {
                    continue;
                };
                writer.serialize(EirPrevalenceRecord {
                    template: &template.name,
                    mode: mode.as_str(),
                    eir: annualized.eir,
                    simulated_eir: annualized.value,
                    prevalence_mean_pct: point.mean,
                    prevalence_min_pct: point.min,
                    prevalence_max_pct: point.max,
                })?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}
