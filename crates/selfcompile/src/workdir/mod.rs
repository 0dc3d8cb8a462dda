//! Ephemeral build directory creation, layout, and removal.
//!
//! Every recompilation stages its toolchain, dependencies, and generated
//! sources inside a freshly created directory. The sub-paths inside it are
//! fixed: dependencies live under [`VENDOR_DIR`], and the package being
//! rebuilt lives either under the vendor tree at the install target's import
//! path or, for bundled sources, under [`SOURCE_DIR`].

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::Builder;

use crate::stub::STUB_FILE_NAME;
use crate::target::InstallTarget;

/// Name hint used for the workdir when no prefix is configured.
pub const DEFAULT_PREFIX: &str = "go-selfcompile";

/// Directory under the workdir holding bundled package sources.
pub const SOURCE_DIR: &str = "_self";

/// Directory under the workdir acting as the dependency root.
pub const VENDOR_DIR: &str = "_vendor";

/// Directory under the vendor root where fetched sources are placed.
const VENDOR_SOURCE_DIR: &str = "src";

/// A uniquely named directory created for a single recompilation.
///
/// The directory is not removed on drop; call [`Workdir::destroy`] once the
/// build has finished with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workdir {
    path: PathBuf,
}

impl Workdir {
    /// Creates a new empty directory under `root`, or the platform temporary
    /// directory when `root` is `None`.
    ///
    /// An empty `prefix` falls back to [`DEFAULT_PREFIX`].
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the directory cannot be created.
    pub fn create(prefix: &str, root: Option<&Path>) -> io::Result<Self> {
        let name_hint = if prefix.is_empty() {
            DEFAULT_PREFIX
        } else {
            prefix
        };
        let parent = root.map_or_else(env::temp_dir, Path::to_path_buf);
        let path = Builder::new().prefix(name_hint).tempdir_in(parent)?.keep();
        Ok(Self { path })
    }

    /// Returns the directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Derives the staging layout for this workdir.
    #[must_use]
    pub fn layout(&self, target: Option<&InstallTarget>) -> Layout {
        Layout::derive(&self.path, target)
    }

    /// Recursively removes the directory tree.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when removal fails. A tree that is
    /// already gone counts as removed.
    pub fn destroy(&self) -> io::Result<()> {
        destroy(&self.path)
    }
}

/// Recursively removes `path`, treating an empty or missing path as already
/// removed.
///
/// # Errors
///
/// Returns the underlying I/O error for any other removal failure.
pub fn destroy(path: &Path) -> io::Result<()> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    match fs::remove_dir_all(path) {
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Fixed sub-paths of a workdir used as toolchain roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    source_root: PathBuf,
    vendor_root: PathBuf,
}

impl Layout {
    /// Computes the source and vendor roots for `workdir`.
    ///
    /// With an install target the source root nests under the vendor root at
    /// the target's import path, which is where the toolchain's fetch step
    /// places it. Without one the source root is [`SOURCE_DIR`].
    ///
    /// ```
    /// use std::path::Path;
    /// use selfcompile::target::InstallTarget;
    /// use selfcompile::workdir::Layout;
    ///
    /// let target: InstallTarget = "example.org/app".parse().expect("target");
    /// let layout = Layout::derive(Path::new("/tmp/work"), Some(&target));
    /// assert_eq!(layout.vendor_root(), Path::new("/tmp/work/_vendor"));
    /// assert_eq!(
    ///     layout.source_root(),
    ///     Path::new("/tmp/work/_vendor/src/example.org/app"),
    /// );
    /// ```
    #[must_use]
    pub fn derive(workdir: &Path, target: Option<&InstallTarget>) -> Self {
        let vendor_root = workdir.join(VENDOR_DIR);
        let source_root = match target {
            Some(install) => install
                .segments()
                .fold(vendor_root.join(VENDOR_SOURCE_DIR), |path, segment| {
                    path.join(segment)
                }),
            None => workdir.join(SOURCE_DIR),
        };
        Self {
            source_root,
            vendor_root,
        }
    }

    /// Directory holding the package being rebuilt.
    #[must_use]
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Directory acting as the dependency root.
    #[must_use]
    pub fn vendor_root(&self) -> &Path {
        &self.vendor_root
    }

    /// Path of the generated plugin stub.
    #[must_use]
    pub fn stub_path(&self) -> PathBuf {
        self.source_root.join(STUB_FILE_NAME)
    }
}

#[cfg(test)]
mod tests;
