use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Handling of a recompilation that has no plugins registered.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EmptyPlugins {
    /// Refuse to build without at least one plugin.
    #[default]
    Reject,
    /// Build with a stub that imports nothing.
    RenderEmpty,
}

/// Errors encountered while parsing an [`EmptyPlugins`] policy from text.
pub type EmptyPluginsParseError = strum::ParseError;
