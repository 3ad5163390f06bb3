//! Version-control capability consumed by the interpreter.
//!
//! The interpreter never talks to git directly. Tests substitute a recording
//! implementation; production uses [`crate::io::git::Git`].

use std::error::Error;
use std::fmt;

use anyhow::Result;

/// Operations the interpreter needs from a working copy bound to a remote.
///
/// Every failure (network, authentication, merge conflict, timeout) is
/// reported as a [`VcsError`] wrapped in `anyhow::Error`.
pub trait Vcs {
    /// Fetch and merge remote changes into the working copy.
    fn pull(&self) -> Result<()>;
    /// Publish local commits to the remote.
    fn push(&self) -> Result<()>;
    /// Stage one file (path relative to the working copy root).
    fn stage(&self, path: &str) -> Result<()>;
    /// Commit whatever is staged. Always creates a commit.
    fn commit(&self, message: &str) -> Result<()>;
    /// Identifier of the commit currently checked out.
    fn current_revision(&self) -> Result<String>;
}

/// Uniform failure of a version-control operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcsError {
    /// Operation name (`clone`, `pull`, `push`, `stage`, `commit`, `revision`).
    pub operation: &'static str,
    /// Backend detail, usually trimmed stderr.
    pub detail: String,
}

impl VcsError {
    pub fn new(operation: &'static str, detail: impl Into<String>) -> Self {
        Self {
            operation,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for VcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "git {} failed: {}", self.operation, self.detail)
    }
}

impl Error for VcsError {}
