//! Output format for the diagnostics the `selfcompile` binary writes.
//!
//! Diagnostics go to stderr, interleaved with the toolchain's own output from
//! `go get`, so the default favours a format a person can read in a terminal.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How lifecycle events are rendered on stderr.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, for runs driven by another program that
    /// collects the rebuild log.
    Json,
    /// Single-line text that stays legible between toolchain output lines.
    #[default]
    Compact,
}
