//! Restoration of bundled build assets into a staged workdir.
//!
//! The orchestrator does not know how toolchain files and dependency sources
//! were bundled with the running program. It only asks a [`RestoreAssets`]
//! implementation to materialise them under a directory. Closures with the
//! matching signature implement the trait, so generated restore functions can
//! be passed directly; [`DirectoryAssets`] restores from an unpacked asset
//! tree on disk.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

const ASSETS_TARGET: &str = "selfcompile::assets";

/// Materialises bundled build assets into a directory.
#[cfg_attr(test, mockall::automock)]
pub trait RestoreAssets {
    /// Restores the asset `name` (recursively) under `target`.
    ///
    /// An empty `name` restores every bundled asset.
    ///
    /// # Errors
    ///
    /// Returns the I/O error that prevented restoration.
    fn restore(&self, target: &Path, name: &str) -> io::Result<()>;
}

impl<F> RestoreAssets for F
where
    F: Fn(&Path, &str) -> io::Result<()>,
{
    fn restore(&self, target: &Path, name: &str) -> io::Result<()> {
        self(target, name)
    }
}

/// Restores assets by copying them from an unpacked directory tree.
///
/// Unix permission bits are carried across so toolchain executables stay
/// executable in the staged copy. Symbolic links inside the tree are
/// recreated as links on unix and skipped elsewhere.
///
/// ```no_run
/// use std::path::Path;
/// use selfcompile::assets::{DirectoryAssets, RestoreAssets};
///
/// let assets = DirectoryAssets::new("/opt/app/assets");
/// assets.restore(Path::new("/tmp/go-selfcompile123"), "")?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryAssets {
    source: PathBuf,
}

impl DirectoryAssets {
    /// Creates a restorer copying from `source`.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Returns the directory assets are copied from.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl RestoreAssets for DirectoryAssets {
    fn restore(&self, target: &Path, name: &str) -> io::Result<()> {
        let relative = asset_path(name)?;
        let from = self.source.join(&relative);
        let to = target.join(&relative);
        debug!(
            target: ASSETS_TARGET,
            from = %from.display(),
            to = %to.display(),
            "restoring assets"
        );
        copy_tree(&from, &to)
    }
}

fn asset_path(name: &str) -> io::Result<PathBuf> {
    let path = Path::new(name);
    let plain = path
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
    if plain {
        Ok(path.to_path_buf())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("asset name '{name}' must be a relative path inside the bundle"),
        ))
    }
}

/// Copies `from` to `to`. The top-level path is followed if it is a link;
/// links inside the tree are recreated rather than traversed.
fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    if fs::metadata(from)?.is_dir() {
        copy_dir(from, to)
    } else {
        copy_file(from, to)
    }
}

fn copy_dir(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let source = entry.path();
        let destination = to.join(entry.file_name());
        if file_type.is_symlink() {
            copy_link(&source, &destination)?;
        } else if file_type.is_dir() {
            copy_dir(&source, &destination)?;
        } else {
            copy_file(&source, &destination)?;
        }
    }
    Ok(())
}

fn copy_file(from: &Path, to: &Path) -> io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to)?;
    Ok(())
}

#[cfg(unix)]
fn copy_link(from: &Path, to: &Path) -> io::Result<()> {
    let link = fs::read_link(from)?;
    match fs::symlink_metadata(to) {
        Ok(_) => fs::remove_file(to)?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    std::os::unix::fs::symlink(link, to)
}

#[cfg(not(unix))]
fn copy_link(from: &Path, _to: &Path) -> io::Result<()> {
    debug!(
        target: ASSETS_TARGET,
        link = %from.display(),
        "skipping symbolic link"
    );
    Ok(())
}

#[cfg(test)]
mod tests;
