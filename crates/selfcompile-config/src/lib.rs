//! Layered configuration for the `selfcompile` binary.
//!
//! Values resolve from built-in defaults, then a TOML configuration file,
//! then `SELFCOMPILE_*` environment variables, then command-line flags, with
//! later layers overriding earlier ones. The configuration file is located
//! with `--config-path` or `SELFCOMPILE_CONFIG_PATH`.
//!
//! ```no_run
//! use selfcompile_config::Config;
//!
//! let config = Config::load()?;
//! println!("install target: {:?}", config.install_target());
//! # Ok::<(), std::sync::Arc<ortho_config::OrthoError>>(())
//! ```

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;
mod policy;

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_TMP_PREFIX, default_empty_plugins, default_log_filter,
    default_log_filter_string, default_log_format,
};
pub use logging::LogFormat;
pub use policy::{EmptyPlugins, EmptyPluginsParseError};

/// Resolved configuration for one recompilation run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "SELFCOMPILE")]
pub struct Config {
    /// Import path fetched, built, and installed by the toolchain.
    #[serde(default)]
    pub install_target: Option<String>,
    /// Remove the workdir automatically after the compile attempt.
    #[serde(default)]
    #[ortho_config(default = false)]
    pub auto_cleanup: bool,
    /// Name hint for the workdir.
    #[serde(default)]
    pub tmp_prefix: Option<String>,
    /// Directory the workdir is created in.
    #[serde(default)]
    pub tmp_root: Option<Utf8PathBuf>,
    /// Package declared by the generated plugin stub.
    #[serde(default)]
    pub package: Option<String>,
    /// Unpacked asset tree restored into the workdir.
    #[serde(default)]
    pub assets_dir: Option<Utf8PathBuf>,
    /// Handling of a run with no plugins.
    #[serde(default = "default_empty_plugins")]
    #[ortho_config(default = default_empty_plugins())]
    pub empty_plugins: EmptyPlugins,
    /// Deadline in seconds for each toolchain run.
    #[serde(default)]
    pub build_timeout_secs: Option<u64>,
    /// Tracing filter expression.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            install_target: None,
            auto_cleanup: false,
            tmp_prefix: None,
            tmp_root: None,
            package: None,
            assets_dir: None,
            empty_plugins: default_empty_plugins(),
            build_timeout_secs: None,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Install target, if configured.
    #[must_use]
    pub fn install_target(&self) -> Option<&str> {
        self.install_target.as_deref()
    }

    /// Whether the workdir is removed automatically.
    #[must_use]
    pub const fn auto_cleanup(&self) -> bool {
        self.auto_cleanup
    }

    /// Workdir name hint, falling back to [`DEFAULT_TMP_PREFIX`].
    #[must_use]
    pub fn tmp_prefix(&self) -> &str {
        self.tmp_prefix.as_deref().unwrap_or(DEFAULT_TMP_PREFIX)
    }

    /// Directory the workdir is created in, if overridden.
    #[must_use]
    pub fn tmp_root(&self) -> Option<&Utf8Path> {
        self.tmp_root.as_deref()
    }

    /// Stub package override, if configured.
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// Asset tree to restore from, if configured.
    #[must_use]
    pub fn assets_dir(&self) -> Option<&Utf8Path> {
        self.assets_dir.as_deref()
    }

    /// Zero-plugin policy.
    #[must_use]
    pub const fn empty_plugins(&self) -> EmptyPlugins {
        self.empty_plugins
    }

    /// Deadline for each toolchain run; zero disables it.
    #[must_use]
    pub fn build_timeout(&self) -> Option<Duration> {
        self.build_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
