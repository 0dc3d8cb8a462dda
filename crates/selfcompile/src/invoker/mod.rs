//! Invocation of the external build toolchain inside a staged workdir.
//!
//! An [`Invocation`] captures everything needed to run the toolchain once:
//! program, arguments, working directory, environment, and an optional
//! deadline. The environment is deliberately minimal. Only the caller's
//! search path is inherited; the toolchain root and dependency root are
//! redirected into the staged tree so the toolchain never touches the host's
//! own installation.
//!
//! Execution sits behind the [`BuildExecutor`] trait so the orchestrator can
//! be driven by test doubles. [`ProcessExecutor`] is the production
//! implementation and forwards the child's output streams unchanged.

use std::env;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

mod process;

pub use process::ProcessExecutor;

/// Inherited search-path variable.
pub const SEARCH_PATH_VAR: &str = "PATH";

/// Variable pointing the toolchain at its own root (the workdir).
pub const TOOLCHAIN_ROOT_VAR: &str = "GOROOT";

/// Variable pointing the toolchain at its dependency root (the vendor root).
pub const DEPENDENCY_ROOT_VAR: &str = "GOPATH";

/// Location of the toolchain executable relative to the workdir.
pub const TOOLCHAIN_BINARY: [&str; 2] = ["bin", "go"];

/// Errors raised while running the toolchain.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The process could not be started.
    #[error("failed to start '{program}': {source}")]
    Spawn {
        /// Program that failed to start.
        program: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The process exited unsuccessfully.
    #[error("'{program}' exited with non-zero status {status}")]
    NonZeroExit {
        /// Program that failed.
        program: PathBuf,
        /// Exit code, or `-1` when the process was terminated by a signal.
        status: i32,
    },

    /// The process outlived its deadline and was killed.
    #[error("'{program}' timed out after {timeout:?}")]
    Timeout {
        /// Program that timed out.
        program: PathBuf,
        /// Deadline that expired.
        timeout: Duration,
    },

    /// Waiting on the process failed.
    #[error("failed to wait for '{program}': {source}")]
    Wait {
        /// Program being waited on.
        program: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
}

/// A single toolchain run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<OsString>,
    current_dir: PathBuf,
    env: Vec<(OsString, OsString)>,
    timeout: Option<Duration>,
}

impl Invocation {
    /// Creates an invocation with an empty environment and no deadline.
    #[must_use]
    pub fn new<I, S>(program: impl Into<PathBuf>, args: I, current_dir: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(|a| a.as_ref().to_os_string()).collect(),
            current_dir: current_dir.into(),
            env: Vec::new(),
            timeout: None,
        }
    }

    /// Creates an invocation of the staged toolchain binary.
    ///
    /// The program is the toolchain inside `workdir`, the working directory
    /// is `workdir`, and the environment comes from
    /// [`toolchain_environment`] using the caller's current search path.
    #[must_use]
    pub fn toolchain<I, S>(workdir: &Path, vendor_root: &Path, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let program = TOOLCHAIN_BINARY
            .iter()
            .fold(workdir.to_path_buf(), |path, part| path.join(part));
        let environment =
            toolchain_environment(workdir, vendor_root, env::var_os(SEARCH_PATH_VAR));
        Self::new(program, args, workdir).with_env(environment)
    }

    /// Replaces the environment passed to the process.
    #[must_use]
    pub fn with_env(mut self, env: Vec<(OsString, OsString)>) -> Self {
        self.env = env;
        self
    }

    /// Sets the deadline after which the process is killed.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Program to execute.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments passed to the program.
    #[must_use]
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Working directory of the process.
    #[must_use]
    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    /// Complete environment of the process.
    #[must_use]
    pub fn env(&self) -> &[(OsString, OsString)] {
        &self.env
    }

    /// Looks up a single environment variable.
    #[must_use]
    pub fn env_var(&self, key: &str) -> Option<&OsStr> {
        self.env
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    /// Deadline for the process, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Builds the environment for a toolchain run.
///
/// The result holds exactly three variables: the search path (empty when the
/// caller has none), the toolchain root set to `workdir`, and the dependency
/// root set to `vendor_root`.
#[must_use]
pub fn toolchain_environment(
    workdir: &Path,
    vendor_root: &Path,
    search_path: Option<OsString>,
) -> Vec<(OsString, OsString)> {
    vec![
        (
            OsString::from(SEARCH_PATH_VAR),
            search_path.unwrap_or_default(),
        ),
        (
            OsString::from(TOOLCHAIN_ROOT_VAR),
            workdir.as_os_str().to_os_string(),
        ),
        (
            OsString::from(DEPENDENCY_ROOT_VAR),
            vendor_root.as_os_str().to_os_string(),
        ),
    ]
}

/// Runs toolchain invocations.
#[cfg_attr(test, mockall::automock)]
pub trait BuildExecutor {
    /// Runs the invocation to completion.
    ///
    /// # Errors
    ///
    /// Returns an [`InvokeError`] when the process cannot be started, exits
    /// unsuccessfully, or exceeds its deadline.
    fn run(&self, invocation: &Invocation) -> Result<(), InvokeError>;
}

impl<T> BuildExecutor for &T
where
    T: BuildExecutor + ?Sized,
{
    fn run(&self, invocation: &Invocation) -> Result<(), InvokeError> {
        (**self).run(invocation)
    }
}

#[cfg(test)]
mod tests;
