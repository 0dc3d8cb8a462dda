//! The recompilation state machine.
//!
//! [`SelfCompile`] owns one recompilation attempt. Plugins are registered
//! first; [`SelfCompile::compile`] then stages a workdir, restores bundled
//! assets into it, fetches the install target, writes the plugin stub into the
//! fetched package, and builds it. [`SelfCompile::cleanup`] removes the staged
//! tree, and runs automatically after every attempt when auto-cleanup is on.
//!
//! ```no_run
//! use selfcompile::assets::DirectoryAssets;
//! use selfcompile::orchestrator::{CompileOptions, SelfCompile};
//! use selfcompile::target::InstallTarget;
//!
//! let options = CompileOptions::new()
//!     .with_install_target(InstallTarget::new("example.org/app")?)
//!     .with_auto_cleanup(true);
//! let mut compiler =
//!     SelfCompile::new(options).with_restorer(DirectoryAssets::new("/opt/app/assets"));
//! compiler.register_plugin("example.org/plugins/audit")?;
//! compiler.compile()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::assets::RestoreAssets;
use crate::error::CompileError;
use crate::invoker::{BuildExecutor, Invocation, ProcessExecutor};
use crate::report::{CompileReporter, TracingReporter};
use crate::stub::{self, PluginStub};
use crate::target::InstallTarget;
use crate::workdir::{Layout, Workdir};

mod options;

pub use options::{CompileOptions, EmptyPluginPolicy};

/// Toolchain arguments for the dependency fetch step.
const FETCH_ARGS: [&str; 2] = ["get", "-d"];

/// Toolchain arguments for the build and install step.
const BUILD_ARGS: [&str; 1] = ["get"];

/// Lifecycle position of a [`SelfCompile`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Nothing has been staged; plugins may still be registered.
    #[default]
    Uninitialized,
    /// The workdir exists and assets have been restored.
    Staged,
    /// The install target was built and installed.
    Built,
    /// The workdir has been removed.
    Cleaned,
    /// A compile step or a cleanup failed.
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Uninitialized => "uninitialized",
            Self::Staged => "staged",
            Self::Built => "built",
            Self::Cleaned => "cleaned",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Default)]
struct RunState {
    phase: Phase,
    workdir: Option<Workdir>,
    layout: Option<Layout>,
}

/// Orchestrates one recompilation of the running program.
pub struct SelfCompile<E = ProcessExecutor> {
    options: CompileOptions,
    plugins: Vec<String>,
    restorer: Option<Box<dyn RestoreAssets + Send>>,
    executor: E,
    reporter: Arc<dyn CompileReporter>,
    run: RunState,
}

impl SelfCompile<ProcessExecutor> {
    /// Creates an orchestrator that runs the toolchain as a subprocess and
    /// reports through `tracing`.
    #[must_use]
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            plugins: Vec::new(),
            restorer: None,
            executor: ProcessExecutor,
            reporter: Arc::new(TracingReporter::new()),
            run: RunState::default(),
        }
    }
}

impl<E> SelfCompile<E> {
    /// Replaces the toolchain executor.
    #[must_use]
    pub fn with_executor<F: BuildExecutor>(self, executor: F) -> SelfCompile<F> {
        SelfCompile {
            options: self.options,
            plugins: self.plugins,
            restorer: self.restorer,
            executor,
            reporter: self.reporter,
            run: self.run,
        }
    }

    /// Sets the collaborator that restores bundled assets.
    #[must_use]
    pub fn with_restorer(mut self, restorer: impl RestoreAssets + Send + 'static) -> Self {
        self.restorer = Some(Box::new(restorer));
        self
    }

    /// Replaces the lifecycle reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn CompileReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Records a plugin import path to weave into the rebuilt program.
    ///
    /// Paths are rendered in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::PluginsSealed`] once compilation has started,
    /// or [`CompileError::Stub`] when the path cannot be rendered as an
    /// import.
    pub fn register_plugin(&mut self, import_path: impl Into<String>) -> Result<(), CompileError> {
        if self.run.phase != Phase::Uninitialized {
            return Err(CompileError::PluginsSealed);
        }
        let path = import_path.into();
        stub::validate_import(&path)?;
        self.plugins.push(path);
        Ok(())
    }

    /// Registered plugin import paths in order.
    #[must_use]
    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.run.phase
    }

    /// Staged workdir, until it has been removed.
    #[must_use]
    pub const fn workdir(&self) -> Option<&Workdir> {
        self.run.workdir.as_ref()
    }

    /// Layout of the staged workdir, until it has been removed.
    #[must_use]
    pub const fn layout(&self) -> Option<&Layout> {
        self.run.layout.as_ref()
    }

    /// Configuration this orchestrator was built with.
    #[must_use]
    pub const fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Removes the staged workdir.
    ///
    /// Valid from any phase and moves the orchestrator to [`Phase::Cleaned`],
    /// which also seals plugin registration. With nothing staged it succeeds
    /// without touching the filesystem. A failed removal leaves the phase at
    /// [`Phase::Failed`] with the workdir recorded so cleanup can be retried.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::Cleanup`] when the tree cannot be removed.
    pub fn cleanup(&mut self) -> Result<(), CompileError> {
        let Some(workdir) = self.run.workdir.as_ref() else {
            self.run.phase = Phase::Cleaned;
            return Ok(());
        };
        self.reporter.cleanup_starting(workdir.path());
        if let Err(err) = workdir.destroy() {
            self.run.phase = Phase::Failed;
            return Err(CompileError::Cleanup {
                workdir: workdir.path().to_path_buf(),
                source: Arc::new(err),
            });
        }
        self.reporter.cleanup_finished(workdir.path());
        self.run.workdir = None;
        self.run.layout = None;
        self.run.phase = Phase::Cleaned;
        Ok(())
    }
}

impl<E: BuildExecutor> SelfCompile<E> {
    /// Stages, fetches, writes the plugin stub, and builds.
    ///
    /// Each step runs only if the previous one succeeded. With auto-cleanup
    /// enabled the workdir is removed afterwards whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::AlreadyCompiled`] when called more than once,
    /// the error of the first failing step otherwise, and
    /// [`CompileError::Combined`] when that step and the automatic cleanup
    /// both fail.
    pub fn compile(&mut self) -> Result<(), CompileError> {
        if self.run.phase != Phase::Uninitialized {
            return Err(CompileError::AlreadyCompiled {
                phase: self.run.phase,
            });
        }

        let outcome = self.attempt();
        match &outcome {
            Ok(()) => self.run.phase = Phase::Built,
            Err(err) => {
                self.run.phase = Phase::Failed;
                self.reporter.compile_failed(err);
            }
        }

        if self.options.auto_cleanup() {
            let cleanup = self.cleanup();
            return CompileError::combine(outcome, cleanup);
        }
        outcome
    }

    fn attempt(&mut self) -> Result<(), CompileError> {
        let Some(restorer) = self.restorer.as_ref() else {
            return Err(CompileError::MissingRestoreAssets);
        };

        let workdir = Workdir::create(self.options.prefix(), self.options.root()).map_err(
            |err| CompileError::CreateWorkdir {
                root: self
                    .options
                    .root()
                    .map_or_else(env::temp_dir, Path::to_path_buf),
                source: Arc::new(err),
            },
        )?;
        let layout = workdir.layout(self.options.install_target());
        self.reporter.workdir_created(workdir.path());
        self.run.workdir = Some(workdir.clone());
        self.run.layout = Some(layout.clone());

        restorer
            .restore(workdir.path(), "")
            .map_err(|err| CompileError::RestoreAssets {
                workdir: workdir.path().to_path_buf(),
                source: Arc::new(err),
            })?;
        self.run.phase = Phase::Staged;
        self.reporter.assets_restored(workdir.path());

        let target = self.options.install_target().cloned();
        if let Some(install) = &target {
            self.reporter.fetch_starting(install);
            self.executor
                .run(&self.toolchain(&workdir, &layout, &FETCH_ARGS, install))
                .map_err(|source| CompileError::Fetch {
                    target: install.to_string(),
                    source,
                })?;
        }

        self.write_stub(&layout)?;

        let Some(install) = target else {
            return Err(CompileError::BundledSourceUnsupported);
        };
        self.reporter.build_starting(&install);
        self.executor
            .run(&self.toolchain(&workdir, &layout, &BUILD_ARGS, &install))
            .map_err(|source| CompileError::Build {
                target: install.to_string(),
                source,
            })?;
        self.reporter.build_succeeded(&install);
        Ok(())
    }

    fn toolchain(
        &self,
        workdir: &Workdir,
        layout: &Layout,
        leading: &[&str],
        install: &InstallTarget,
    ) -> Invocation {
        let args = leading.iter().copied().chain([install.as_str()]);
        Invocation::toolchain(workdir.path(), layout.vendor_root(), args)
            .with_timeout(self.options.build_timeout())
    }

    fn write_stub(&self, layout: &Layout) -> Result<(), CompileError> {
        let stub = PluginStub::new(self.options.package(), self.plugins.clone());
        let rendered = match self.options.empty_plugins() {
            EmptyPluginPolicy::Reject => stub.render(),
            EmptyPluginPolicy::RenderEmpty => stub.render_allow_empty(),
        }?;

        let path = layout.stub_path();
        let write_error = |err| CompileError::WriteStub {
            path: path.clone(),
            source: Arc::new(err),
        };
        fs::create_dir_all(layout.source_root()).map_err(write_error)?;
        fs::write(&path, rendered).map_err(write_error)?;
        self.reporter.stub_written(&path, self.plugins.len());
        Ok(())
    }
}
