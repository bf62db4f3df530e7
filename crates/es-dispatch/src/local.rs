//! Bounded local process pool.
//!
//! A fixed-size rayon pool runs one child process per invocation. Each child
//! is wholly independent (own input file, own output file, exit code as the
//! only feedback channel), so workers never share mutable state. A hung
//! child is killed when its wall-clock timeout expires without blocking the
//! rest of the pool; any individual failure is logged and recorded but never
//! aborts sibling invocations.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::task::{Invocation, TaskOutcome, TaskStatus};
use crate::{DispatchError, DispatchResult};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct LocalPoolOptions {
    /// Worker count; defaults to available parallelism.
    pub workers: Option<usize>,
    /// Per-invocation wall-clock timeout.
    pub timeout: Duration,
}

impl Default for LocalPoolOptions {
    fn default() -> Self {
        Self {
            workers: None,
            timeout: Duration::from_secs(300),
        }
    }
}

/// Run every invocation through `program`, at most `workers` concurrently.
///
/// The simulator home is appended to `PATH` so the binary can locate its
/// own helpers; the working directory is the run root, where the staged
/// support files live.
pub fn run_local(
    invocations: &[Invocation],
    program: &str,
    run_root: &Path,
    simulator_home: &Path,
    options: &LocalPoolOptions,
) -> DispatchResult<Vec<TaskOutcome>> {
    let workers = options
        .workers
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(usize::from)
                .unwrap_or(1)
        })
        .max(1);

    let path_var = extended_path(simulator_home)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| DispatchError::Pool(e.to_string()))?;

    debug!(workers, invocations = invocations.len(), "starting local pool");

    let outcomes = pool.install(|| {
        invocations
            .par_iter()
            .map(|inv| run_one(inv, program, run_root, &path_var, options.timeout))
            .collect()
    });

    Ok(outcomes)
}

fn extended_path(simulator_home: &Path) -> DispatchResult<OsString> {
    let mut entries: Vec<std::path::PathBuf> =
        std::env::split_paths(&std::env::var_os("PATH").unwrap_or_default()).collect();
    entries.push(simulator_home.to_path_buf());
    std::env::join_paths(entries).map_err(|e| DispatchError::Pool(e.to_string()))
}

fn run_one(
    inv: &Invocation,
    program: &str,
    run_root: &Path,
    path_var: &OsString,
    timeout: Duration,
) -> TaskOutcome {
    let started = Instant::now();

    let spawned = Command::new(program)
        .arg("-s")
        .arg(&inv.input)
        .arg("--output")
        .arg(&inv.output)
        .current_dir(run_root)
        .env("PATH", path_var)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            warn!(scenario = inv.scenario_id, error = %e, "failed to spawn simulator");
            return TaskOutcome {
                scenario_id: inv.scenario_id,
                status: TaskStatus::SpawnFailed {
                    message: e.to_string(),
                },
                elapsed_s: Some(started.elapsed().as_secs_f64()),
            };
        }
    };

    let deadline = started + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(exit)) => {
                if exit.success() {
                    break TaskStatus::Completed;
                }
                warn!(scenario = inv.scenario_id, code = ?exit.code(), "simulator exited nonzero");
                break TaskStatus::Failed {
                    exit_code: exit.code(),
                };
            }
            Ok(None) => {
                if Instant::now() >= deadline {
                    warn!(scenario = inv.scenario_id, "invocation timed out, killing");
                    let _ = child.kill();
                    let _ = child.wait();
                    break TaskStatus::TimedOut;
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                warn!(scenario = inv.scenario_id, error = %e, "failed to poll child");
                let _ = child.kill();
                let _ = child.wait();
                break TaskStatus::SpawnFailed {
                    message: e.to_string(),
                };
            }
        }
    };

    TaskOutcome {
        scenario_id: inv.scenario_id,
        status,
        elapsed_s: Some(started.elapsed().as_secs_f64()),
    }
}
