//! Error types for the recompilation pipeline.
//!
//! Each failing step maps to one [`CompileError`] variant. When a compile
//! attempt fails and the cleanup that follows it fails as well, both are
//! retained in [`CompileError::Combined`] so neither cause is lost. Use
//! [`CompileError::has_kind`] to test for a cause regardless of nesting.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::invoker::InvokeError;
use crate::orchestrator::Phase;
use crate::stub::StubError;

/// Coarse classification of a [`CompileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompileErrorKind {
    /// No asset restorer was configured.
    MissingRestoreAssets,
    /// The workdir could not be created.
    CreateWorkdir,
    /// Asset restoration failed.
    RestoreAssets,
    /// The dependency fetch step failed.
    Fetch,
    /// The plugin stub could not be rendered.
    Stub,
    /// The plugin stub could not be written.
    WriteStub,
    /// The build and install step failed.
    Build,
    /// Removing the workdir failed.
    Cleanup,
    /// Building from bundled sources is not supported.
    BundledSourceUnsupported,
    /// Plugins were registered after compilation started.
    PluginsSealed,
    /// Compilation was requested more than once.
    AlreadyCompiled,
}

impl fmt::Display for CompileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::MissingRestoreAssets => "missing_restore_assets",
            Self::CreateWorkdir => "create_workdir",
            Self::RestoreAssets => "restore_assets",
            Self::Fetch => "fetch",
            Self::Stub => "stub",
            Self::WriteStub => "write_stub",
            Self::Build => "build",
            Self::Cleanup => "cleanup",
            Self::BundledSourceUnsupported => "bundled_source_unsupported",
            Self::PluginsSealed => "plugins_sealed",
            Self::AlreadyCompiled => "already_compiled",
        };
        f.write_str(label)
    }
}

/// Errors raised while recompiling or cleaning up.
#[derive(Debug, Error)]
pub enum CompileError {
    /// No asset restorer was configured before compiling.
    #[error("missing asset restoration function")]
    MissingRestoreAssets,

    /// The workdir could not be created.
    #[error("failed to create workdir under '{}': {source}", root.display())]
    CreateWorkdir {
        /// Directory the workdir was to be created in.
        root: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// Bundled assets could not be restored into the workdir.
    #[error("failed to restore assets into '{}': {source}", workdir.display())]
    RestoreAssets {
        /// Workdir being populated.
        workdir: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The dependency fetch step failed.
    #[error("failed to fetch '{target}': {source}")]
    Fetch {
        /// Install target being fetched.
        target: String,
        /// Toolchain failure.
        #[source]
        source: InvokeError,
    },

    /// The plugin stub could not be rendered.
    #[error("failed to render plugin stub: {0}")]
    Stub(#[from] StubError),

    /// The rendered stub could not be written.
    #[error("failed to write plugin stub '{}': {source}", path.display())]
    WriteStub {
        /// Destination of the stub.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The build and install step failed.
    #[error("failed to build '{target}': {source}")]
    Build {
        /// Install target being built.
        target: String,
        /// Toolchain failure.
        #[source]
        source: InvokeError,
    },

    /// The workdir could not be removed.
    #[error("failed to remove workdir '{}': {source}", workdir.display())]
    Cleanup {
        /// Workdir that survived.
        workdir: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// No install target was configured and bundled sources cannot be built.
    #[error("building from bundled sources is not supported; set an install target")]
    BundledSourceUnsupported,

    /// A plugin was registered after compilation started.
    #[error("plugins cannot be registered once compilation has started")]
    PluginsSealed,

    /// Compilation was requested after a previous attempt.
    #[error("compilation already attempted (phase: {phase})")]
    AlreadyCompiled {
        /// Phase at the time of the request.
        phase: Phase,
    },

    /// The compile attempt and the automatic cleanup both failed.
    #[error("{compile}; cleanup also failed: {cleanup}")]
    Combined {
        /// Failure of the compile attempt.
        #[source]
        compile: Box<CompileError>,
        /// Failure of the cleanup that followed.
        cleanup: Box<CompileError>,
    },
}

impl CompileError {
    /// Returns the classification of this error.
    ///
    /// For [`CompileError::Combined`] this is the kind of the compile failure.
    #[must_use]
    pub fn kind(&self) -> CompileErrorKind {
        match self {
            Self::MissingRestoreAssets => CompileErrorKind::MissingRestoreAssets,
            Self::CreateWorkdir { .. } => CompileErrorKind::CreateWorkdir,
            Self::RestoreAssets { .. } => CompileErrorKind::RestoreAssets,
            Self::Fetch { .. } => CompileErrorKind::Fetch,
            Self::Stub(_) => CompileErrorKind::Stub,
            Self::WriteStub { .. } => CompileErrorKind::WriteStub,
            Self::Build { .. } => CompileErrorKind::Build,
            Self::Cleanup { .. } => CompileErrorKind::Cleanup,
            Self::BundledSourceUnsupported => CompileErrorKind::BundledSourceUnsupported,
            Self::PluginsSealed => CompileErrorKind::PluginsSealed,
            Self::AlreadyCompiled { .. } => CompileErrorKind::AlreadyCompiled,
            Self::Combined { compile, .. } => compile.kind(),
        }
    }

    /// Returns `true` when this error, or either half of a combined error,
    /// has the given kind.
    #[must_use]
    pub fn has_kind(&self, kind: CompileErrorKind) -> bool {
        match self {
            Self::Combined { compile, cleanup } => {
                compile.has_kind(kind) || cleanup.has_kind(kind)
            }
            other => other.kind() == kind,
        }
    }

    /// Merges the outcome of a compile attempt with the cleanup that
    /// followed it.
    pub(crate) fn combine(
        compile: Result<(), Self>,
        cleanup: Result<(), Self>,
    ) -> Result<(), Self> {
        match (compile, cleanup) {
            (Ok(()), Ok(())) => Ok(()),
            (Err(err), Ok(())) | (Ok(()), Err(err)) => Err(err),
            (Err(compile_err), Err(cleanup_err)) => Err(Self::Combined {
                compile: Box::new(compile_err),
                cleanup: Box::new(cleanup_err),
            }),
        }
    }
}
