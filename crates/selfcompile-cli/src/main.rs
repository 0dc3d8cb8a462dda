//! CLI entrypoint for the `selfcompile` tool.
//!
//! The binary delegates to [`selfcompile_cli::run`], which loads
//! configuration, installs telemetry, registers the requested plugins, and
//! drives one recompilation.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    selfcompile_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
