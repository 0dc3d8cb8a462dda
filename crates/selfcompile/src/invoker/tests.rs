//! Unit tests for toolchain invocation.

use std::ffi::OsStr;
use std::time::Duration;

use rstest::rstest;
use tempfile::TempDir;

use super::*;

#[test]
fn environment_holds_exactly_three_variables() {
    let env = toolchain_environment(
        Path::new("/work"),
        Path::new("/work/_vendor"),
        Some(OsString::from("/usr/bin:/bin")),
    );
    assert_eq!(
        env,
        vec![
            (OsString::from("PATH"), OsString::from("/usr/bin:/bin")),
            (OsString::from("GOROOT"), OsString::from("/work")),
            (OsString::from("GOPATH"), OsString::from("/work/_vendor")),
        ]
    );
}

#[test]
fn missing_search_path_becomes_empty() {
    let env = toolchain_environment(Path::new("/work"), Path::new("/work/_vendor"), None);
    let invocation = Invocation::new("go", ["version"], "/work").with_env(env);
    assert_eq!(invocation.env_var(SEARCH_PATH_VAR), Some(OsStr::new("")));
}

#[test]
fn toolchain_invocation_targets_staged_binary() {
    let invocation = Invocation::toolchain(
        Path::new("/work"),
        Path::new("/work/_vendor"),
        ["get", "-d", "example.org/app"],
    );

    assert_eq!(invocation.program(), Path::new("/work/bin/go"));
    assert_eq!(invocation.current_dir(), Path::new("/work"));
    assert_eq!(
        invocation.args(),
        [
            OsString::from("get"),
            OsString::from("-d"),
            OsString::from("example.org/app"),
        ]
    );
    assert_eq!(
        invocation.env_var(TOOLCHAIN_ROOT_VAR),
        Some(OsStr::new("/work"))
    );
    assert_eq!(
        invocation.env_var(DEPENDENCY_ROOT_VAR),
        Some(OsStr::new("/work/_vendor"))
    );
    assert_eq!(invocation.env().len(), 3);
    assert_eq!(invocation.timeout(), None);
}

#[test]
fn timeout_is_recorded() {
    let invocation =
        Invocation::new("go", ["build"], "/work").with_timeout(Some(Duration::from_secs(5)));
    assert_eq!(invocation.timeout(), Some(Duration::from_secs(5)));
}

#[cfg(unix)]
fn shell(script: &str, dir: &Path) -> Invocation {
    let search_path = std::env::var_os(SEARCH_PATH_VAR).unwrap_or_default();
    Invocation::new("/bin/sh", ["-c", script], dir)
        .with_env(vec![(OsString::from(SEARCH_PATH_VAR), search_path)])
}

#[cfg(unix)]
#[test]
fn successful_process_returns_ok() {
    let dir = TempDir::new().expect("temp dir");
    ProcessExecutor
        .run(&shell("exit 0", dir.path()))
        .expect("process succeeds");
}

#[cfg(unix)]
#[rstest]
#[case(1)]
#[case(7)]
fn failing_process_reports_exit_status(#[case] code: i32) {
    let dir = TempDir::new().expect("temp dir");
    let err = ProcessExecutor
        .run(&shell(&format!("exit {code}"), dir.path()))
        .expect_err("process fails");
    assert!(
        matches!(err, InvokeError::NonZeroExit { status, .. } if status == code),
        "unexpected error: {err:?}"
    );
}

#[test]
fn missing_program_reports_spawn_failure() {
    let dir = TempDir::new().expect("temp dir");
    let invocation = Invocation::new(dir.path().join("bin/go"), ["get"], dir.path());
    let err = ProcessExecutor.run(&invocation).expect_err("spawn fails");
    assert!(matches!(err, InvokeError::Spawn { .. }), "unexpected error: {err:?}");
}

#[cfg(unix)]
#[test]
fn process_runs_in_requested_directory_with_given_environment() {
    let dir = TempDir::new().expect("temp dir");
    let script = "test \"$(pwd -P)\" = \"$EXPECTED_DIR\" && test -z \"$HOME\"";
    let expected = dir.path().canonicalize().expect("canonical dir");
    let invocation = Invocation::new("/bin/sh", ["-c", script], dir.path()).with_env(vec![(
        OsString::from("EXPECTED_DIR"),
        expected.into_os_string(),
    )]);
    ProcessExecutor
        .run(&invocation)
        .expect("cwd and environment as requested");
}

#[cfg(unix)]
#[test]
fn slow_process_is_killed_after_deadline() {
    let dir = TempDir::new().expect("temp dir");
    let invocation =
        shell("exec sleep 5", dir.path()).with_timeout(Some(Duration::from_millis(100)));
    let started = std::time::Instant::now();
    let err = ProcessExecutor.run(&invocation).expect_err("times out");
    assert!(matches!(err, InvokeError::Timeout { .. }), "unexpected error: {err:?}");
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[cfg(unix)]
#[test]
fn fast_process_finishes_within_deadline() {
    let dir = TempDir::new().expect("temp dir");
    let invocation = shell("exit 0", dir.path()).with_timeout(Some(Duration::from_secs(10)));
    ProcessExecutor.run(&invocation).expect("finishes in time");
}
