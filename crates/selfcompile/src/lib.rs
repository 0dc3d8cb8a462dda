//! Self-recompilation of a running program with extra plugins woven in.
//!
//! The `selfcompile` crate rebuilds the program that embeds it. It stages an
//! ephemeral workdir, restores the bundled toolchain and dependency sources
//! into it through an injected [`RestoreAssets`] collaborator, writes a small
//! stub source file that blank-imports every registered plugin, and runs the
//! external toolchain to fetch and then build and install the program's
//! install target. The workdir is removed afterwards, either automatically or
//! on request, and a cleanup failure never hides the compile failure that
//! preceded it.
//!
//! # Architecture
//!
//! - [`stub`] renders the plugin stub file.
//! - [`workdir`] creates, lays out, and removes the staged tree.
//! - [`assets`] defines the restoration collaborator.
//! - [`invoker`] runs the toolchain with a minimal environment.
//! - [`orchestrator`] sequences the steps as a small state machine.
//! - [`report`] surfaces lifecycle events to telemetry.
//!
//! # Example
//!
//! ```rust,no_run
//! use selfcompile::{CompileOptions, DirectoryAssets, InstallTarget, SelfCompile};
//!
//! let options = CompileOptions::new()
//!     .with_install_target(InstallTarget::new("example.org/app")?)
//!     .with_auto_cleanup(true);
//!
//! let mut compiler =
//!     SelfCompile::new(options).with_restorer(DirectoryAssets::new("/opt/app/assets"));
//! compiler.register_plugin("example.org/plugins/metrics")?;
//! compiler.compile()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod assets;
pub mod error;
pub mod invoker;
pub mod orchestrator;
pub mod report;
pub mod stub;
pub mod target;
pub mod workdir;

#[cfg(test)]
mod tests;

pub use self::assets::{DirectoryAssets, RestoreAssets};
pub use self::error::{CompileError, CompileErrorKind};
pub use self::invoker::{BuildExecutor, Invocation, InvokeError, ProcessExecutor};
pub use self::orchestrator::{CompileOptions, EmptyPluginPolicy, Phase, SelfCompile};
pub use self::report::{CompileReporter, TracingReporter};
pub use self::stub::{PluginStub, StubError};
pub use self::target::{InstallTarget, InstallTargetError};
pub use self::workdir::{Layout, Workdir};
