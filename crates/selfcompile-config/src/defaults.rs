use crate::logging::LogFormat;
use crate::policy::EmptyPlugins;

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default workdir name hint.
pub const DEFAULT_TMP_PREFIX: &str = "go-selfcompile";

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default zero-plugin policy.
#[must_use]
pub const fn default_empty_plugins() -> EmptyPlugins {
    EmptyPlugins::Reject
}
