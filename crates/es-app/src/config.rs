//! Experiment configuration.
//!
//! One YAML file describes a whole sweep: the simulator installation, the
//! fixed population and monitoring parameters, the parameter grid, and the
//! execution strategy. The configuration is loaded and validated once at
//! the start of a run and passed by reference into every phase; no
//! component reads global state.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use es_core::age::{AgeBands, DEFAULT_BOUNDARIES};
use es_core::seasonality::SeasonalityMode;
use es_scenario::Substitutions;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const INPUT_SUBDIR: &str = "xml";
pub const OUTPUT_SUBDIR: &str = "txt";
pub const FIGURES_SUBDIR: &str = "figures";
pub const CHECKPOINT_FILE: &str = "scenarios.csv";
pub const AGGREGATE_CACHE_FILE: &str = "aggregated.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub version: u32,
    pub name: String,
    pub simulator: SimulatorConfig,
    pub population: PopulationConfig,
    pub monitoring: MonitoringConfig,
    pub sweep: SweepConfig,
    pub execution: ExecutionConfig,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Simulator binary name or path.
    pub program: String,
    /// Installation directory holding the support files.
    pub home: PathBuf,
    /// Scenario-format version; also names the staged schema file.
    pub version: u32,
    /// Environment-preparation command for batch tasks.
    #[serde(default)]
    pub prepare: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    pub size: u32,
    /// 5-day treatment-access probability.
    pub access: f64,
    /// Fraction of biting occurring outdoors; indoor is the complement.
    pub outdoor_biting: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub start_year: i32,
    pub end_year: i32,
    pub burn_in_years: i32,
    /// Must mirror the monitoring section of the scenario templates.
    #[serde(default = "default_age_boundaries")]
    pub age_group_boundaries: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub templates: Vec<TemplateConfig>,
    pub eirs: Vec<f64>,
    /// Seeds run from 0 to `seeds - 1`.
    pub seeds: u32,
    pub modes: Vec<SeasonalityMode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ExecutionConfig {
    Local {
        #[serde(default)]
        workers: Option<usize>,
        #[serde(default = "default_timeout_s")]
        timeout_s: u64,
    },
    Batch {
        job_template: PathBuf,
        cpus_per_task: u32,
        batch_size: u32,
        #[serde(default)]
        extra: BTreeMap<String, String>,
    },
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_age_boundaries() -> Vec<f64> {
    DEFAULT_BOUNDARIES.to_vec()
}

fn default_timeout_s() -> u64 {
    300
}

impl Experiment {
    pub fn input_dir(&self) -> PathBuf {
        self.output_dir.join(INPUT_SUBDIR)
    }

    pub fn raw_output_dir(&self) -> PathBuf {
        self.output_dir.join(OUTPUT_SUBDIR)
    }

    pub fn figures_dir(&self) -> PathBuf {
        self.output_dir.join(FIGURES_SUBDIR)
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.output_dir.join(CHECKPOINT_FILE)
    }

    pub fn aggregate_cache_path(&self) -> PathBuf {
        self.output_dir.join(AGGREGATE_CACHE_FILE)
    }

    pub fn age_bands(&self) -> AppResult<AgeBands> {
        Ok(AgeBands::new(
            self.monitoring.age_group_boundaries.clone(),
        )?)
    }

    /// Substitutions shared by every scenario of the sweep.
    pub fn fixed_substitutions(&self) -> Substitutions {
        let indoor = 1.0 - self.population.outdoor_biting;
        let burn_in = self.monitoring.start_year - self.monitoring.burn_in_years;

        let mut subs = Substitutions::new();
        subs.set("version", self.simulator.version);
        subs.set("pop_size", self.population.size);
        subs.set("burn_in", burn_in);
        subs.set("access", self.population.access);
        subs.set("start_year", self.monitoring.start_year);
        subs.set("end_year", self.monitoring.end_year);
        subs.set("indoor", indoor);
        subs.set("outdoor", self.population.outdoor_biting);
        subs
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.sweep.templates.is_empty() {
            return Err(AppError::Validation(
                "sweep must name at least one template".to_string(),
            ));
        }
        if self.sweep.eirs.is_empty() {
            return Err(AppError::Validation(
                "sweep must have at least one EIR value".to_string(),
            ));
        }
        for &eir in &self.sweep.eirs {
            if !eir.is_finite() || eir <= 0.0 {
                return Err(AppError::Validation(format!(
                    "EIR values must be positive, got {eir}"
                )));
            }
        }
        if self.sweep.seeds == 0 {
            return Err(AppError::Validation(
                "sweep must run at least one seed".to_string(),
            ));
        }
        if self.sweep.modes.is_empty() {
            return Err(AppError::Validation(
                "sweep must have at least one seasonality mode".to_string(),
            ));
        }
        if self.population.size == 0 {
            return Err(AppError::Validation(
                "population size must be positive".to_string(),
            ));
        }
        for (what, value) in [
            ("access", self.population.access),
            ("outdoor_biting", self.population.outdoor_biting),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AppError::Validation(format!(
                    "{what} must lie in [0, 1], got {value}"
                )));
            }
        }
        if self.monitoring.start_year >= self.monitoring.end_year {
            return Err(AppError::Validation(
                "monitoring start year must precede the end year".to_string(),
            ));
        }
        if self.monitoring.burn_in_years < 0 {
            return Err(AppError::Validation(
                "burn-in years cannot be negative".to_string(),
            ));
        }
        self.age_bands()?;

        match &self.execution {
            ExecutionConfig::Local { timeout_s, .. } => {
                if *timeout_s == 0 {
                    return Err(AppError::Validation(
                        "local timeout must be at least one second".to_string(),
                    ));
                }
            }
            ExecutionConfig::Batch {
                cpus_per_task,
                batch_size,
                ..
            } => {
                if *cpus_per_task == 0 || *batch_size == 0 {
                    return Err(AppError::Validation(
                        "batch cpus_per_task and batch_size must be positive".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Load and validate an experiment file.
pub fn load_experiment(path: &Path) -> AppResult<Experiment> {
    let content = std::fs::read_to_string(path).map_err(|source| AppError::ConfigFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let experiment: Experiment = serde_yaml::from_str(&content)?;
    experiment.validate()?;
    Ok(experiment)
}
