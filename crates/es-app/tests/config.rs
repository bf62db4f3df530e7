use es_app::config::ExecutionConfig;
use es_app::{AppError, Experiment};

const EXPERIMENT_YAML: &str = "\
version: 1
name: transmission-sweep
simulator:
  program: openMalaria
  home: /opt/om
  version: 44
  prepare: module load openmalaria
population:
  size: 2000
  access: 0.15
  outdoor_biting: 0.2
monitoring:
  start_year: 2000
  end_year: 2020
  burn_in_years: 30
sweep:
  templates:
    - name: R0000GA
      path: R0000GA.xml
  eirs: [0.25, 1, 10, 100]
  seeds: 10
  modes: [perennial, seasonal]
execution:
  strategy: local
  workers: 4
  timeout_s: 300
output_dir: output
";

fn parse(yaml: &str) -> Result<Experiment, AppError> {
    let experiment: Experiment = serde_yaml::from_str(yaml).map_err(AppError::ConfigParse)?;
    experiment.validate()?;
    Ok(experiment)
}

#[test]
fn parses_a_full_experiment() {
    let experiment = parse(EXPERIMENT_YAML).unwrap();
    assert_eq!(experiment.name, "transmission-sweep");
    assert_eq!(experiment.sweep.eirs.len(), 4);
    assert_eq!(experiment.sweep.seeds, 10);
    assert!(matches!(
        experiment.execution,
        ExecutionConfig::Local {
            workers: Some(4),
            timeout_s: 300
        }
    ));
    // default boundaries apply when the section omits them
    assert_eq!(experiment.monitoring.age_group_boundaries.len(), 8);
}

#[test]
fn fixed_substitutions_carry_derived_values() {
    let experiment = parse(EXPERIMENT_YAML).unwrap();
    let subs = experiment.fixed_substitutions();
    assert_eq!(subs.get("burn_in"), Some("1970"));
    assert_eq!(subs.get("indoor"), Some("0.8"));
    assert_eq!(subs.get("outdoor"), Some("0.2"));
    assert_eq!(subs.get("version"), Some("44"));
}

#[test]
fn parses_a_batch_execution_section() {
    let yaml = EXPERIMENT_YAML.replace(
        "execution:\n  strategy: local\n  workers: 4\n  timeout_s: 300",
        "execution:\n  strategy: batch\n  job_template: job.sh.in\n  cpus_per_task: 1\n  batch_size: 50\n  extra:\n    ACCOUNT: epi",
    );
    let experiment = parse(&yaml).unwrap();
    match &experiment.execution {
        ExecutionConfig::Batch {
            batch_size, extra, ..
        } => {
            assert_eq!(*batch_size, 50);
            assert_eq!(extra.get("ACCOUNT").map(String::as_str), Some("epi"));
        }
        other => panic!("expected batch execution, got {other:?}"),
    }
}

#[test]
fn rejects_non_positive_eirs() {
    let yaml = EXPERIMENT_YAML.replace("eirs: [0.25, 1, 10, 100]", "eirs: [0.25, -1]");
    let err = parse(&yaml).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "{err}");
}

#[test]
fn rejects_zero_seeds() {
    let yaml = EXPERIMENT_YAML.replace("seeds: 10", "seeds: 0");
    assert!(parse(&yaml).is_err());
}

#[test]
fn rejects_unordered_age_boundaries() {
    let yaml = EXPERIMENT_YAML.replace(
        "  burn_in_years: 30",
        "  burn_in_years: 30\n  age_group_boundaries: [5, 1, 10]",
    );
    assert!(parse(&yaml).is_err());
}

#[test]
fn rejects_inverted_monitoring_window() {
    let yaml = EXPERIMENT_YAML.replace("end_year: 2020", "end_year: 1990");
    assert!(parse(&yaml).is_err());
}
