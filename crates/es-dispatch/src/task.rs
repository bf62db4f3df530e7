//! Unit-of-work abstraction shared by both execution strategies.

use std::path::PathBuf;

use es_scenario::ScenarioSpec;
use serde::{Deserialize, Serialize};

/// One simulator invocation. Paths are relative to the run root so the same
/// shape serves the local pool and the batch manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub scenario_id: u32,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Invocation {
    pub fn for_scenario(spec: &ScenarioSpec, input_subdir: &str, output_subdir: &str) -> Self {
        Self {
            scenario_id: spec.id,
            input: PathBuf::from(input_subdir).join(spec.input_file_name()),
            output: PathBuf::from(output_subdir).join(spec.output_file_name()),
        }
    }
}

/// One invocation per scenario, in checkpoint order.
pub fn plan_invocations(
    specs: &[ScenarioSpec],
    input_subdir: &str,
    output_subdir: &str,
) -> Vec<Invocation> {
    specs
        .iter()
        .map(|spec| Invocation::for_scenario(spec, input_subdir, output_subdir))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskStatus {
    Completed,
    Failed { exit_code: Option<i32> },
    TimedOut,
    SpawnFailed { message: String },
}

impl TaskStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

/// Per-scenario completion record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub scenario_id: u32,
    #[serde(flatten)]
    pub status: TaskStatus,
    /// Wall-clock seconds for this invocation; absent on the batch path,
    /// where the scheduler owns per-task timing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_s: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use es_scenario::SeasonalityMode;

    #[test]
    fn invocation_paths_follow_scenario_id() {
        let spec = ScenarioSpec {
            id: 7,
            template_name: "T".to_string(),
            eir: 1.0,
            seed: 0,
            mode: SeasonalityMode::Perennial,
        };
        let inv = Invocation::for_scenario(&spec, "xml", "txt");
        assert_eq!(inv.input, PathBuf::from("xml/7.xml"));
        assert_eq!(inv.output, PathBuf::from("txt/7.txt"));
    }
}
