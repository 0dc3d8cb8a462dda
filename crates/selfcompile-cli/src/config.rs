//! Configuration loading helpers for the CLI.
//!
//! Leading arguments that name configuration flags are handed to
//! `ortho_config`; everything from the first other token onwards is parsed as
//! the plugin list.

use std::ffi::{OsStr, OsString};

use ortho_config::OrthoConfig;
use selfcompile_config::Config;

use crate::AppError;

/// Value-taking flags recognised by the configuration loader.
///
/// MAINTENANCE: keep in sync with the fields of `selfcompile_config::Config`.
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--install-target",
    "--tmp-prefix",
    "--tmp-root",
    "--package",
    "--assets-dir",
    "--empty-plugins",
    "--build-timeout-secs",
    "--log-filter",
    "--log-format",
];

/// Boolean switches recognised by the configuration loader.
pub(crate) const CONFIG_CLI_SWITCHES: &[&str] = &["--auto-cleanup"];

pub(crate) trait ConfigLoader {
    /// Loads configuration from the filtered configuration arguments.
    ///
    /// # Flag Ordering
    ///
    /// Configuration flags must appear before `--plugin`. Configuration flags
    /// after the first plugin are treated as CLI arguments and rejected.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Switch,
    Skip,
}

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

impl OrthoConfigLoader {
    fn process_config_flag(argument: &OsStr) -> FlagAction {
        let argument_text = argument.to_string_lossy();
        if !argument_text.starts_with("--") {
            return FlagAction::Skip;
        }

        let (flag, has_inline_value) = match argument_text.split_once('=') {
            Some((name, _)) => (name, true),
            None => (&*argument_text, false),
        };

        if CONFIG_CLI_FLAGS.contains(&flag) {
            return FlagAction::Include {
                needs_value: !has_inline_value,
            };
        }
        if CONFIG_CLI_SWITCHES.contains(&flag) {
            return if has_inline_value {
                FlagAction::Include { needs_value: false }
            } else {
                FlagAction::Switch
            };
        }

        FlagAction::Skip
    }
}

fn is_boolean_literal(argument: &OsStr) -> bool {
    argument == "true" || argument == "false"
}

pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_start: usize,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some(program) = args.first() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_start: 0,
        };
    };

    let mut filtered: Vec<OsString> = vec![program.clone()];
    let mut rest = args.iter().skip(1).peekable();
    let mut command_start = 1usize;

    while let Some(argument) = rest.peek() {
        match OrthoConfigLoader::process_config_flag(argument.as_os_str()) {
            FlagAction::Include { needs_value } => {
                filtered.push((*argument).clone());
                rest.next();
                command_start += 1;
                if needs_value && let Some(value) = rest.next() {
                    filtered.push(value.clone());
                    command_start += 1;
                }
            }
            FlagAction::Switch => {
                filtered.push((*argument).clone());
                rest.next();
                command_start += 1;
                if let Some(value) = rest.next_if(|next| is_boolean_literal(next)) {
                    filtered.push(value.clone());
                    command_start += 1;
                }
            }
            FlagAction::Skip => break,
        }
    }

    ConfigArgumentSplit {
        config_arguments: filtered,
        command_start,
    }
}
