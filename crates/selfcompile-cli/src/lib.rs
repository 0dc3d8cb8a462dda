//! Command-line runtime for the `selfcompile` tool.
//!
//! The runtime loads layered configuration, installs telemetry, registers the
//! plugins named with `--plugin`, and runs one recompilation. Assets are
//! restored from the directory given by `--assets-dir`. The workdir is always
//! removed before the process exits, either by the orchestrator's automatic
//! cleanup or by an explicit cleanup afterwards.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use selfcompile::{
    CompileOptions, DirectoryAssets, EmptyPluginPolicy, InstallTarget, SelfCompile,
};
use selfcompile_config::{Config, EmptyPlugins};

mod config;
mod errors;
mod telemetry;

use config::{ConfigArgumentSplit, ConfigLoader, OrthoConfigLoader, split_config_arguments};
pub(crate) use errors::AppError;

/// Command-line arguments that are not configuration.
#[derive(Parser, Debug)]
#[command(
    name = "selfcompile",
    about = "Rebuild a program from its bundled assets with extra plugins"
)]
pub(crate) struct Cli {
    /// Plugin import path to weave into the rebuilt program; repeatable.
    #[arg(long = "plugin", value_name = "IMPORT_PATH")]
    pub(crate) plugins: Vec<String>,
}

/// Runs the CLI using the provided arguments and output handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);
    let cli = match Cli::try_parse_from(prepare_cli_arguments(&args, &split)) {
        Ok(cli) => cli,
        Err(error) if is_informational(&error) => {
            drop(write!(stdout, "{error}"));
            return ExitCode::SUCCESS;
        }
        Err(error) => return report(stderr, &[AppError::CliUsage(error)]),
    };

    let result = loader
        .load(&split.config_arguments)
        .and_then(|config| {
            telemetry::initialise(&config)?;
            Ok(config)
        })
        .map_err(|error| vec![error])
        .and_then(|config| recompile(&config, &cli.plugins));

    match result {
        Ok(summary) => {
            drop(writeln!(stdout, "{summary}"));
            ExitCode::SUCCESS
        }
        Err(errors) => report(stderr, &errors),
    }
}

fn is_informational(error: &clap::Error) -> bool {
    matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
}

fn report<E: Write>(stderr: &mut E, errors: &[AppError]) -> ExitCode {
    for error in errors {
        drop(writeln!(stderr, "{error}"));
    }
    ExitCode::FAILURE
}

fn prepare_cli_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    let program = args.first().into_iter().cloned();
    let rest = args.iter().skip(split.command_start).cloned();
    program.chain(rest).collect()
}

/// Maps resolved configuration onto orchestrator options.
pub(crate) fn compile_options(config: &Config) -> Result<CompileOptions, AppError> {
    let policy = match config.empty_plugins() {
        EmptyPlugins::Reject => EmptyPluginPolicy::Reject,
        EmptyPlugins::RenderEmpty => EmptyPluginPolicy::RenderEmpty,
    };
    let mut options = CompileOptions::new()
        .with_auto_cleanup(config.auto_cleanup())
        .with_prefix(config.tmp_prefix())
        .with_empty_plugins(policy)
        .with_build_timeout(config.build_timeout());
    if let Some(package) = config.package() {
        options = options.with_package(package);
    }
    if let Some(root) = config.tmp_root() {
        options = options.with_root(root.as_std_path());
    }
    if let Some(target) = config.install_target() {
        options = options.with_install_target(InstallTarget::new(target)?);
    }
    Ok(options)
}

fn recompile(config: &Config, plugins: &[String]) -> Result<String, Vec<AppError>> {
    let options = compile_options(config).map_err(|error| vec![error])?;
    let mut compiler = SelfCompile::new(options);
    if let Some(dir) = config.assets_dir() {
        compiler = compiler.with_restorer(DirectoryAssets::new(dir.as_std_path()));
    }
    for plugin in plugins {
        compiler
            .register_plugin(plugin.as_str())
            .map_err(|error| vec![AppError::InvalidPlugin(error)])?;
    }

    let mut errors = Vec::new();
    if let Err(error) = compiler.compile() {
        errors.push(AppError::Compile(error));
    }
    if !config.auto_cleanup()
        && let Err(error) = compiler.cleanup()
    {
        errors.push(AppError::Cleanup(error));
    }

    if errors.is_empty() {
        let target = config.install_target().unwrap_or_default();
        Ok(format!("rebuilt {target} with {} plugin(s)", plugins.len()))
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests;
