//! Integration tests for the local process pool, using a stand-in simulator
//! shell script.

#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use es_dispatch::{Invocation, LocalPoolOptions, TaskStatus, run_local};

/// Install a fake simulator that parses `-s <in> --output <out>` and copies
/// the input to the output, failing if the input contains `fail`.
fn install_fake_simulator(dir: &Path) -> PathBuf {
    let script = "#!/bin/sh\n\
while [ $# -gt 0 ]; do\n\
  case \"$1\" in\n\
    -s) in=\"$2\"; shift 2;;\n\
    --output) out=\"$2\"; shift 2;;\n\
    *) shift;;\n\
  esac\n\
done\n\
if grep -q fail \"$in\"; then exit 3; fi\n\
cat \"$in\" > \"$out\"\n";
    write_script(dir, "fake-simulator", script)
}

fn install_sleeper(dir: &Path) -> PathBuf {
    write_script(dir, "sleeper", "#!/bin/sh\nsleep 30\n")
}

fn write_script(dir: &Path, name: &str, content: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn setup_run_root(dir: &Path, inputs: &[&str]) -> Vec<Invocation> {
    std::fs::create_dir_all(dir.join("xml")).unwrap();
    std::fs::create_dir_all(dir.join("txt")).unwrap();
    inputs
        .iter()
        .enumerate()
        .map(|(id, content)| {
            let input = PathBuf::from(format!("xml/{id}.xml"));
            std::fs::write(dir.join(&input), content).unwrap();
            Invocation {
                scenario_id: id as u32,
                input,
                output: PathBuf::from(format!("txt/{id}.txt")),
            }
        })
        .collect()
}

fn options(workers: usize, timeout: Duration) -> LocalPoolOptions {
    LocalPoolOptions {
        workers: Some(workers),
        timeout,
    }
}

#[test]
fn runs_every_invocation_and_produces_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let program = install_fake_simulator(dir.path());
    let invocations = setup_run_root(dir.path(), &["a", "b", "c", "d", "e"]);

    let outcomes = run_local(
        &invocations,
        program.to_str().unwrap(),
        dir.path(),
        dir.path(),
        &options(2, Duration::from_secs(30)),
    )
    .unwrap();

    assert_eq!(outcomes.len(), 5);
    for outcome in &outcomes {
        assert_eq!(outcome.status, TaskStatus::Completed, "{outcome:?}");
    }
    for inv in &invocations {
        assert!(dir.path().join(&inv.output).exists());
    }
}

#[test]
fn one_failure_does_not_abort_siblings() {
    let dir = tempfile::tempdir().unwrap();
    let program = install_fake_simulator(dir.path());
    let invocations = setup_run_root(dir.path(), &["ok", "fail", "ok", "fail"]);

    let outcomes = run_local(
        &invocations,
        program.to_str().unwrap(),
        dir.path(),
        dir.path(),
        &options(2, Duration::from_secs(30)),
    )
    .unwrap();

    let succeeded = outcomes.iter().filter(|o| o.status.is_success()).count();
    assert_eq!(succeeded, 2);
    let failed: Vec<u32> = outcomes
        .iter()
        .filter(|o| matches!(o.status, TaskStatus::Failed { exit_code: Some(3) }))
        .map(|o| o.scenario_id)
        .collect();
    assert_eq!(failed, vec![1, 3]);
}

#[test]
fn timeout_kills_only_the_hung_invocation() {
    let dir = tempfile::tempdir().unwrap();
    let program = install_sleeper(dir.path());
    let invocations = setup_run_root(dir.path(), &["a", "b"]);

    let started = std::time::Instant::now();
    let outcomes = run_local(
        &invocations,
        program.to_str().unwrap(),
        dir.path(),
        dir.path(),
        &options(2, Duration::from_millis(300)),
    )
    .unwrap();

    assert!(
        started.elapsed() < Duration::from_secs(10),
        "pool should not wait out the full sleep"
    );
    for outcome in &outcomes {
        assert_eq!(outcome.status, TaskStatus::TimedOut, "{outcome:?}");
        assert!(outcome.elapsed_s.unwrap() < 10.0);
    }
}

#[test]
fn missing_program_is_a_spawn_failure_not_a_panic() {
    let dir = tempfile::tempdir().unwrap();
    let invocations = setup_run_root(dir.path(), &["a"]);

    let outcomes = run_local(
        &invocations,
        "/nonexistent/simulator-binary",
        dir.path(),
        dir.path(),
        &options(1, Duration::from_secs(5)),
    )
    .unwrap();

    assert!(matches!(
        outcomes[0].status,
        TaskStatus::SpawnFailed { .. }
    ));
}
