//! Structured reporting of recompilation lifecycle events.

use std::path::Path;
use std::sync::Arc;

use crate::error::CompileError;
use crate::target::InstallTarget;

const REPORT_TARGET: &str = "selfcompile::report";

/// Observer trait used to surface pipeline progress to telemetry sinks.
#[cfg_attr(test, mockall::automock)]
pub trait CompileReporter: Send + Sync {
    /// Invoked after the workdir has been created.
    fn workdir_created(&self, workdir: &Path);

    /// Invoked after bundled assets have been restored.
    fn assets_restored(&self, workdir: &Path);

    /// Invoked before dependencies are fetched.
    fn fetch_starting(&self, target: &InstallTarget);

    /// Invoked after the plugin stub has been written.
    fn stub_written(&self, path: &Path, plugins: usize);

    /// Invoked before the build and install step.
    fn build_starting(&self, target: &InstallTarget);

    /// Invoked after the build and install step succeeds.
    fn build_succeeded(&self, target: &InstallTarget);

    /// Invoked when a compile attempt fails.
    fn compile_failed(&self, error: &CompileError);

    /// Invoked before the workdir is removed.
    fn cleanup_starting(&self, workdir: &Path);

    /// Invoked after the workdir has been removed.
    fn cleanup_finished(&self, workdir: &Path);
}

impl<T> CompileReporter for Arc<T>
where
    T: CompileReporter + ?Sized,
{
    fn workdir_created(&self, workdir: &Path) {
        (**self).workdir_created(workdir);
    }

    fn assets_restored(&self, workdir: &Path) {
        (**self).assets_restored(workdir);
    }

    fn fetch_starting(&self, target: &InstallTarget) {
        (**self).fetch_starting(target);
    }

    fn stub_written(&self, path: &Path, plugins: usize) {
        (**self).stub_written(path, plugins);
    }

    fn build_starting(&self, target: &InstallTarget) {
        (**self).build_starting(target);
    }

    fn build_succeeded(&self, target: &InstallTarget) {
        (**self).build_succeeded(target);
    }

    fn compile_failed(&self, error: &CompileError) {
        (**self).compile_failed(error);
    }

    fn cleanup_starting(&self, workdir: &Path) {
        (**self).cleanup_starting(workdir);
    }

    fn cleanup_finished(&self, workdir: &Path) {
        (**self).cleanup_finished(workdir);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl TracingReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CompileReporter for TracingReporter {
    fn workdir_created(&self, workdir: &Path) {
        tracing::info!(
            target: REPORT_TARGET,
            event = "workdir_created",
            workdir = %workdir.display(),
            "created workdir"
        );
    }

    fn assets_restored(&self, workdir: &Path) {
        tracing::info!(
            target: REPORT_TARGET,
            event = "assets_restored",
            workdir = %workdir.display(),
            "restored bundled assets"
        );
    }

    fn fetch_starting(&self, target: &InstallTarget) {
        tracing::info!(
            target: REPORT_TARGET,
            event = "fetch_starting",
            install_target = %target,
            "fetching dependencies"
        );
    }

    fn stub_written(&self, path: &Path, plugins: usize) {
        tracing::info!(
            target: REPORT_TARGET,
            event = "stub_written",
            path = %path.display(),
            plugins,
            "wrote plugin stub"
        );
    }

    fn build_starting(&self, target: &InstallTarget) {
        tracing::info!(
            target: REPORT_TARGET,
            event = "build_starting",
            install_target = %target,
            "building and installing"
        );
    }

    fn build_succeeded(&self, target: &InstallTarget) {
        tracing::info!(
            target: REPORT_TARGET,
            event = "build_succeeded",
            install_target = %target,
            "build completed"
        );
    }

    fn compile_failed(&self, error: &CompileError) {
        tracing::error!(
            target: REPORT_TARGET,
            event = "compile_failed",
            kind = %error.kind(),
            error = %error,
            "recompilation failed"
        );
    }

    fn cleanup_starting(&self, workdir: &Path) {
        tracing::debug!(
            target: REPORT_TARGET,
            event = "cleanup_starting",
            workdir = %workdir.display(),
            "removing workdir"
        );
    }

    fn cleanup_finished(&self, workdir: &Path) {
        tracing::info!(
            target: REPORT_TARGET,
            event = "cleanup_finished",
            workdir = %workdir.display(),
            "removed workdir"
        );
    }
}
