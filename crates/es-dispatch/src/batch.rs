//! Array-job submission to a batch scheduler.
//!
//! Writes one command line per scenario into a manifest, instantiates the
//! site's job script from a template, submits it with `sbatch --wait`, and
//! blocks until the scheduler reports the whole array done. Concurrency,
//! retry, and resource accounting belong to the scheduler; this path is only
//! responsible for correct manifest generation and blocking submission.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::Command;

use es_scenario::{Substitutions, render};
use tracing::info;

use crate::task::{Invocation, TaskOutcome, TaskStatus};
use crate::{DispatchError, DispatchResult};

pub const COMMANDS_FILE: &str = "commands.txt";
pub const JOB_SCRIPT_FILE: &str = "start_array_job.sh";

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Path to the site job-script template.
    pub job_template: PathBuf,
    pub cpus_per_task: u32,
    /// Scenarios per array task; the array size is the ceiling quotient.
    pub batch_size: u32,
    /// Environment-preparation command substituted into the job script.
    pub prepare: String,
    /// Additional site-specific placeholders (account, partition, ...).
    pub extra: BTreeMap<String, String>,
}

/// Submit all invocations as one job array and wait for completion.
///
/// A template missing any required placeholder is fatal before submission.
/// The scheduler does not report per-task exit codes back through the
/// blocking submit, so per-scenario status is derived from output-file
/// presence afterwards.
pub fn run_batch(
    invocations: &[Invocation],
    program: &str,
    run_root: &Path,
    simulator_home: &Path,
    options: &BatchOptions,
) -> DispatchResult<Vec<TaskOutcome>> {
    write_manifest(invocations, program, run_root, simulator_home)?;
    write_job_script(invocations.len(), run_root, options)?;

    info!(
        scenarios = invocations.len(),
        batch_size = options.batch_size,
        "submitting job array"
    );

    let status = Command::new("sbatch")
        .arg("--wait")
        .arg(JOB_SCRIPT_FILE)
        .current_dir(run_root)
        .status()
        .map_err(|e| DispatchError::Scheduler {
            what: format!("failed to invoke sbatch: {e}"),
        })?;

    if !status.success() {
        return Err(DispatchError::Scheduler {
            what: format!("sbatch exited with {status}"),
        });
    }

    Ok(invocations
        .iter()
        .map(|inv| {
            let completed = run_root.join(&inv.output).exists();
            TaskOutcome {
                scenario_id: inv.scenario_id,
                status: if completed {
                    TaskStatus::Completed
                } else {
                    TaskStatus::Failed { exit_code: None }
                },
                elapsed_s: None,
            }
        })
        .collect())
}

fn write_manifest(
    invocations: &[Invocation],
    program: &str,
    run_root: &Path,
    simulator_home: &Path,
) -> DispatchResult<()> {
    let mut manifest = String::new();
    for inv in invocations {
        let _ = writeln!(
            manifest,
            "export PATH=$PATH:{} && {} -s {} --output {}",
            simulator_home.display(),
            program,
            inv.input.display(),
            inv.output.display()
        );
    }
    let path = run_root.join(COMMANDS_FILE);
    std::fs::write(&path, manifest).map_err(|source| DispatchError::WriteFile { path, source })
}

fn write_job_script(
    scenario_count: usize,
    run_root: &Path,
    options: &BatchOptions,
) -> DispatchResult<()> {
    let template_text = std::fs::read_to_string(&options.job_template).map_err(|source| {
        DispatchError::ReadTemplate {
            path: options.job_template.clone(),
            source,
        }
    })?;

    let array_size = scenario_count.div_ceil(options.batch_size.max(1) as usize);

    let mut subs = Substitutions::new();
    subs.set("N", array_size);
    subs.set("CPUS_PER_TASK", options.cpus_per_task);
    subs.set("BATCH_SIZE", options.batch_size);
    subs.set("PREPARE", &options.prepare);
    for (name, value) in &options.extra {
        subs.set(name, value);
    }

    let script = render(&template_text, &subs).map_err(|source| DispatchError::JobTemplate {
        path: options.job_template.clone(),
        source,
    })?;

    let path = run_root.join(JOB_SCRIPT_FILE);
    std::fs::write(&path, script).map_err(|source| DispatchError::WriteFile { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB_TEMPLATE: &str = "#!/bin/bash\n\
#SBATCH --array=1-@N@\n\
#SBATCH --cpus-per-task=@CPUS_PER_TASK@\n\
@PREPARE@\n\
sed -n \"$(( (SLURM_ARRAY_TASK_ID - 1) * @BATCH_SIZE@ + 1 )),+$(( @BATCH_SIZE@ - 1 ))p\" commands.txt | bash\n";

    fn options(dir: &Path) -> BatchOptions {
        let template_path = dir.join("job.sh.in");
        std::fs::write(&template_path, JOB_TEMPLATE).unwrap();
        BatchOptions {
            job_template: template_path,
            cpus_per_task: 1,
            batch_size: 4,
            prepare: "module load sim".to_string(),
            extra: BTreeMap::new(),
        }
    }

    fn invocations(n: u32) -> Vec<Invocation> {
        (0..n)
            .map(|id| Invocation {
                scenario_id: id,
                input: PathBuf::from(format!("xml/{id}.xml")),
                output: PathBuf::from(format!("txt/{id}.txt")),
            })
            .collect()
    }

    #[test]
    fn manifest_has_one_command_per_scenario() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(
            &invocations(3),
            "openMalaria",
            dir.path(),
            Path::new("/opt/sim"),
        )
        .unwrap();

        let manifest = std::fs::read_to_string(dir.path().join(COMMANDS_FILE)).unwrap();
        let lines: Vec<&str> = manifest.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "export PATH=$PATH:/opt/sim && openMalaria -s xml/1.xml --output txt/1.txt"
        );
    }

    #[test]
    fn job_script_substitutes_array_shape() {
        let dir = tempfile::tempdir().unwrap();
        let opts = options(dir.path());
        write_job_script(10, dir.path(), &opts).unwrap();

        let script = std::fs::read_to_string(dir.path().join(JOB_SCRIPT_FILE)).unwrap();
        assert!(script.contains("--array=1-3"), "{script}");
        assert!(script.contains("module load sim"));
        assert!(!script.contains('@'), "unresolved placeholder: {script}");
    }

    #[test]
    fn job_template_missing_placeholder_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(dir.path());
        opts.extra
            .insert("ACCOUNT".to_string(), "epi".to_string());

        let err = write_job_script(10, dir.path(), &opts).unwrap_err();
        assert!(matches!(err, DispatchError::JobTemplate { .. }), "{err}");
    }
}
