//! Subprocess execution of toolchain invocations.
//!
//! [`ProcessExecutor`] spawns the program with a cleared environment, null
//! stdin, and the parent's stdout and stderr, then waits for it to exit. When
//! the invocation carries a deadline the child is polled and killed once the
//! deadline passes.

use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{BuildExecutor, InvokeError, Invocation};

/// Tracing target for toolchain process operations.
const PROCESS_TARGET: &str = "selfcompile::invoker";

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs invocations as child processes of the current program.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl BuildExecutor for ProcessExecutor {
    fn run(&self, invocation: &Invocation) -> Result<(), InvokeError> {
        let mut command = Command::new(invocation.program());
        command
            .args(invocation.args())
            .current_dir(invocation.current_dir())
            .env_clear()
            .envs(invocation.env().iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        debug!(
            target: PROCESS_TARGET,
            program = %invocation.program().display(),
            args = ?invocation.args(),
            dir = %invocation.current_dir().display(),
            "spawning toolchain process"
        );

        let mut child = command.spawn().map_err(|err| InvokeError::Spawn {
            program: invocation.program().to_path_buf(),
            source: Arc::new(err),
        })?;

        let status = match invocation.timeout() {
            Some(timeout) => wait_with_deadline(invocation, &mut child, timeout)?,
            None => child.wait().map_err(|err| InvokeError::Wait {
                program: invocation.program().to_path_buf(),
                source: Arc::new(err),
            })?,
        };

        debug!(
            target: PROCESS_TARGET,
            program = %invocation.program().display(),
            ?status,
            "toolchain process exited"
        );

        if status.success() {
            Ok(())
        } else {
            Err(InvokeError::NonZeroExit {
                program: invocation.program().to_path_buf(),
                status: status.code().unwrap_or(-1),
            })
        }
    }
}

fn wait_with_deadline(
    invocation: &Invocation,
    child: &mut Child,
    timeout: Duration,
) -> Result<ExitStatus, InvokeError> {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if start.elapsed() > timeout {
                    warn!(
                        target: PROCESS_TARGET,
                        program = %invocation.program().display(),
                        timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                        "toolchain timed out, killing process"
                    );
                    drop(child.kill());
                    drop(child.wait());
                    return Err(InvokeError::Timeout {
                        program: invocation.program().to_path_buf(),
                        timeout,
                    });
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(err) => {
                return Err(InvokeError::Wait {
                    program: invocation.program().to_path_buf(),
                    source: Arc::new(err),
                });
            }
        }
    }
}
