//! Generated source stub that blank-imports every registered plugin.
//!
//! A [`PluginStub`] pairs a package name with an ordered list of import paths
//! and serialises them into the file the toolchain compiles alongside the
//! program's own sources. Each blank import pulls a plugin into the rebuilt
//! binary so its registration side effects run at startup.
//!
//! Rendering is a pure function of the package and import list: the same
//! inputs always produce byte-identical output, so staged files can be
//! compared directly in tests.
//!
//! ```
//! use selfcompile::stub::PluginStub;
//!
//! let stub = PluginStub::new("main", vec!["a/x".into(), "a/y".into()]);
//! let rendered = String::from_utf8(stub.render().expect("render")).expect("utf-8");
//! assert_eq!(
//!     rendered,
//!     "// Generated by go-selfcompile.\npackage main\n\nimport _ \"a/x\"\nimport _ \"a/y\"\n",
//! );
//! ```

use std::io::{self, Write};
use std::sync::Arc;

use thiserror::Error;

/// File name of the generated stub inside the staged source root.
pub const STUB_FILE_NAME: &str = "plugin_selfcompile.go";

/// Package declared when no package name is configured.
pub const DEFAULT_PACKAGE: &str = "main";

const GENERATED_MARKER: &str = "// Generated by go-selfcompile.";

/// Errors raised while validating or rendering a plugin stub.
#[derive(Debug, Error)]
pub enum StubError {
    /// No plugin imports were supplied.
    #[error("missing import string for plugin")]
    MissingImports,

    /// An import path cannot be rendered into a well-formed import line.
    #[error("invalid plugin import '{import}': {reason}")]
    InvalidImport {
        /// Offending import path.
        import: String,
        /// Why the import was rejected.
        reason: &'static str,
    },

    /// The package name is not a valid identifier.
    #[error("invalid package name '{package}'")]
    InvalidPackage {
        /// Offending package name.
        package: String,
    },

    /// Writing the rendered stub failed.
    #[error("failed to write plugin stub: {0}")]
    Io(#[source] Arc<io::Error>),
}

/// Package name and ordered blank imports rendered into the stub file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginStub {
    package: String,
    imports: Vec<String>,
}

impl PluginStub {
    /// Creates a stub for `package` importing `imports` in order.
    ///
    /// An empty package name renders as [`DEFAULT_PACKAGE`].
    #[must_use]
    pub fn new(package: impl Into<String>, imports: Vec<String>) -> Self {
        Self {
            package: package.into(),
            imports,
        }
    }

    /// Returns the package the stub declares, after defaulting.
    #[must_use]
    pub fn package(&self) -> &str {
        if self.package.is_empty() {
            DEFAULT_PACKAGE
        } else {
            self.package.as_str()
        }
    }

    /// Returns the import paths in rendering order.
    #[must_use]
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    /// Renders the stub, refusing an empty import list.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::MissingImports`] when there are no imports, or a
    /// validation error for a malformed package or import.
    pub fn render(&self) -> Result<Vec<u8>, StubError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(buffer)
    }

    /// Renders the stub, producing a header-only file when there are no
    /// imports.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed package or import.
    pub fn render_allow_empty(&self) -> Result<Vec<u8>, StubError> {
        self.validate_entries()?;
        let mut buffer = Vec::new();
        self.emit(&mut buffer)?;
        Ok(buffer)
    }

    /// Writes the rendered stub to `writer`, returning the byte count.
    ///
    /// Validation happens before the first write, so a rejected stub leaves
    /// the writer untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::MissingImports`] for an empty import list, a
    /// validation error for malformed entries, or [`StubError::Io`] when the
    /// writer fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<u64, StubError> {
        self.validate()?;
        self.emit(writer)
    }

    /// Checks that the stub can be rendered.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::MissingImports`] for an empty import list, or a
    /// validation error for a malformed package or import.
    pub fn validate(&self) -> Result<(), StubError> {
        if self.imports.is_empty() {
            return Err(StubError::MissingImports);
        }
        self.validate_entries()
    }

    fn validate_entries(&self) -> Result<(), StubError> {
        validate_package(self.package())?;
        self.imports
            .iter()
            .map(String::as_str)
            .try_for_each(validate_import)
    }

    fn emit<W: Write>(&self, writer: &mut W) -> Result<u64, StubError> {
        let mut counter = CountingWriter::new(writer);
        writeln!(counter, "{GENERATED_MARKER}").map_err(io_error)?;
        writeln!(counter, "package {}", self.package()).map_err(io_error)?;
        writeln!(counter).map_err(io_error)?;
        for import in &self.imports {
            writeln!(counter, "import _ \"{import}\"").map_err(io_error)?;
        }
        counter.flush().map_err(io_error)?;
        Ok(counter.written)
    }
}

/// Checks that an import path renders into a single well-formed import line.
///
/// # Errors
///
/// Returns [`StubError::InvalidImport`] for empty paths, paths with
/// surrounding whitespace, and paths containing quotes, backslashes, or
/// control characters.
pub fn validate_import(import: &str) -> Result<(), StubError> {
    let reason = if import.is_empty() {
        Some("import path is empty")
    } else if import.trim() != import {
        Some("import path has surrounding whitespace")
    } else if import.contains(['"', '\\']) {
        Some("import path contains a quote or backslash")
    } else if import.chars().any(char::is_control) {
        Some("import path contains a control character")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(StubError::InvalidImport {
            import: import.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

fn validate_package(package: &str) -> Result<(), StubError> {
    let mut chars = package.chars();
    let valid_start = chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_');
    if valid_start && chars.all(|c| c.is_alphanumeric() || c == '_') {
        return Ok(());
    }
    Err(StubError::InvalidPackage {
        package: package.to_owned(),
    })
}

fn io_error(error: io::Error) -> StubError {
    StubError::Io(Arc::new(error))
}

struct CountingWriter<'a, W: Write> {
    inner: &'a mut W,
    written: u64,
}

impl<'a, W: Write> CountingWriter<'a, W> {
    const fn new(inner: &'a mut W) -> Self {
        Self { inner, written: 0 }
    }
}

impl<W: Write> Write for CountingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let count = self.inner.write(buf)?;
        self.written = self
            .written
            .saturating_add(u64::try_from(count).unwrap_or(u64::MAX));
        Ok(count)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
