//! Error types for the CLI runtime.

use std::sync::Arc;

use selfcompile::{CompileError, InstallTargetError};
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("invalid install target: {0}")]
    InvalidInstallTarget(#[from] InstallTargetError),
    #[error("invalid plugin: {0}")]
    InvalidPlugin(#[source] CompileError),
    #[error("recompilation failed: {0}")]
    Compile(#[source] CompileError),
    #[error("cleanup failed: {0}")]
    Cleanup(#[source] CompileError),
}
