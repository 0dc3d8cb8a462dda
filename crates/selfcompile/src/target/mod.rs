//! Validated install targets naming the remote package to rebuild.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors raised when parsing an [`InstallTarget`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallTargetError {
    /// The target was empty.
    #[error("install target must not be empty")]
    Empty,

    /// The target started with a path separator.
    #[error("install target '{0}' must be a relative import path")]
    Absolute(String),

    /// The target started with `-` and would be read as a toolchain flag.
    #[error("install target '{0}' must not start with '-'")]
    FlagLike(String),

    /// A path segment was empty, `.`, `..`, or contained a backslash.
    #[error("install target '{target}' has an invalid segment '{segment}'")]
    InvalidSegment {
        /// Full target text.
        target: String,
        /// Offending segment.
        segment: String,
    },
}

/// Slash-separated import path of the package the toolchain fetches and
/// builds, for example `example.org/app`.
///
/// Its segments double as the nested source directory under the staged
/// vendor root, so they are restricted to plain relative names.
///
/// ```
/// use selfcompile::target::InstallTarget;
///
/// let target: InstallTarget = "example.org/app".parse().expect("valid target");
/// assert_eq!(target.segments().collect::<Vec<_>>(), ["example.org", "app"]);
/// assert!("../escape".parse::<InstallTarget>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstallTarget(String);

impl InstallTarget {
    /// Validates and wraps an install target.
    ///
    /// # Errors
    ///
    /// Returns an [`InstallTargetError`] when the target is empty, absolute,
    /// starts with `-`, or contains an empty, `.`, `..`, or backslash-bearing
    /// segment.
    pub fn new(target: impl Into<String>) -> Result<Self, InstallTargetError> {
        let text: String = target.into();
        if text.is_empty() {
            return Err(InstallTargetError::Empty);
        }
        if text.starts_with('/') {
            return Err(InstallTargetError::Absolute(text));
        }
        if text.starts_with('-') {
            return Err(InstallTargetError::FlagLike(text));
        }
        if let Some(segment) = text.split('/').find(|s| !is_plain_segment(s)) {
            return Err(InstallTargetError::InvalidSegment {
                segment: segment.to_owned(),
                target: text,
            });
        }
        Ok(Self(text))
    }

    /// Returns the target as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Iterates over the slash-separated path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains('\\')
        && !segment.chars().any(char::is_control)
}

impl FromStr for InstallTarget {
    type Err = InstallTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for InstallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for InstallTarget {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
