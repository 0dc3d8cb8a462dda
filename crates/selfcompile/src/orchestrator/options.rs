//! Immutable configuration of a recompilation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::target::InstallTarget;
use crate::workdir::DEFAULT_PREFIX;

/// What to do when compilation starts with no registered plugins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyPluginPolicy {
    /// Fail with a missing-imports error.
    #[default]
    Reject,
    /// Write a stub that declares the package and imports nothing.
    RenderEmpty,
}

/// Settings for one recompilation, fixed once the orchestrator is built.
///
/// ```
/// use selfcompile::orchestrator::CompileOptions;
/// use selfcompile::target::InstallTarget;
///
/// let options = CompileOptions::new()
///     .with_install_target(InstallTarget::new("example.org/app").expect("target"))
///     .with_auto_cleanup(true);
/// assert_eq!(options.package(), "main");
/// assert_eq!(options.prefix(), "go-selfcompile");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    package: String,
    install_target: Option<InstallTarget>,
    auto_cleanup: bool,
    prefix: String,
    root: Option<PathBuf>,
    empty_plugins: EmptyPluginPolicy,
    build_timeout: Option<Duration>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            package: String::new(),
            install_target: None,
            auto_cleanup: false,
            prefix: String::from(DEFAULT_PREFIX),
            root: None,
            empty_plugins: EmptyPluginPolicy::default(),
            build_timeout: None,
        }
    }
}

impl CompileOptions {
    /// Creates options with every setting at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the package declared by the stub. Empty means `main`.
    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    /// Sets the import path fetched and installed by the toolchain.
    #[must_use]
    pub fn with_install_target(mut self, target: InstallTarget) -> Self {
        self.install_target = Some(target);
        self
    }

    /// Enables or disables removal of the workdir after every attempt.
    #[must_use]
    pub const fn with_auto_cleanup(mut self, enabled: bool) -> Self {
        self.auto_cleanup = enabled;
        self
    }

    /// Sets the workdir name hint. Empty means the default prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the directory workdirs are created in.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Sets the zero-plugin policy.
    #[must_use]
    pub const fn with_empty_plugins(mut self, policy: EmptyPluginPolicy) -> Self {
        self.empty_plugins = policy;
        self
    }

    /// Sets the deadline applied to each toolchain run.
    #[must_use]
    pub const fn with_build_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.build_timeout = timeout;
        self
    }

    /// Package declared by the stub, after defaulting.
    #[must_use]
    pub fn package(&self) -> &str {
        if self.package.is_empty() {
            crate::stub::DEFAULT_PACKAGE
        } else {
            &self.package
        }
    }

    /// Install target, if configured.
    #[must_use]
    pub const fn install_target(&self) -> Option<&InstallTarget> {
        self.install_target.as_ref()
    }

    /// Whether cleanup follows every compile attempt.
    #[must_use]
    pub const fn auto_cleanup(&self) -> bool {
        self.auto_cleanup
    }

    /// Workdir name hint, after defaulting.
    #[must_use]
    pub fn prefix(&self) -> &str {
        if self.prefix.is_empty() {
            DEFAULT_PREFIX
        } else {
            &self.prefix
        }
    }

    /// Directory workdirs are created in; `None` means the platform
    /// temporary directory.
    #[must_use]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Zero-plugin policy.
    #[must_use]
    pub const fn empty_plugins(&self) -> EmptyPluginPolicy {
        self.empty_plugins
    }

    /// Deadline applied to each toolchain run.
    #[must_use]
    pub const fn build_timeout(&self) -> Option<Duration> {
        self.build_timeout
    }
}
