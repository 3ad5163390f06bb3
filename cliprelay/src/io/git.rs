//! Git adapter for the working copy.
//!
//! The relay clones, pulls, commits and pushes one repository for the whole
//! process lifetime, so we keep a small, explicit wrapper around `git`
//! subprocess calls. Network operations are bounded by a timeout; every
//! failure is surfaced as a [`VcsError`].

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::{debug, info, instrument};

use crate::io::process::{DEFAULT_OUTPUT_LIMIT_BYTES, run_command_with_timeout};
use crate::io::vcs::{Vcs, VcsError};

/// Upper bound for local (non-network) git commands.
const LOCAL_TIMEOUT: Duration = Duration::from_secs(60);

/// Wrapper for executing git commands in a working copy.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
    network_timeout: Duration,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>, network_timeout: Duration) -> Self {
        Self {
            workdir: workdir.into(),
            network_timeout,
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Open `dest` as a working copy, cloning `url` into it first if it does not exist.
    #[instrument(skip_all, fields(dest = %dest.display()))]
    pub fn open_or_clone(url: &str, dest: &Path, network_timeout: Duration) -> Result<Self> {
        if !dest.exists() {
            Self::clone_into(url, dest, network_timeout)?;
        }
        let git = Self::new(dest, network_timeout);
        let out = git.run("open", &["rev-parse", "--is-inside-work-tree"], LOCAL_TIMEOUT)?;
        if out.trim() != "true" {
            return Err(anyhow!(VcsError::new(
                "open",
                format!("{} is not a git working copy", dest.display())
            )));
        }
        debug!("opened working copy");
        Ok(git)
    }

    /// Clone `url` into `dest` (which must not exist yet).
    pub fn clone_into(url: &str, dest: &Path, network_timeout: Duration) -> Result<Self> {
        info!(url, dest = %dest.display(), "cloning repository");
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow!(VcsError::new(
                    "clone",
                    format!("create {}: {e}", parent.display())
                ))
            })?;
        }
        let mut cmd = git_command();
        cmd.arg("clone").arg(url).arg(dest);
        run_checked("clone", cmd, network_timeout)?;
        info!(dest = %dest.display(), "repository cloned");
        Ok(Self::new(dest, network_timeout))
    }

    fn run(&self, operation: &'static str, args: &[&str], timeout: Duration) -> Result<String> {
        let mut cmd = git_command();
        cmd.args(args).current_dir(&self.workdir);
        run_checked(operation, cmd, timeout)
    }
}

impl Vcs for Git {
    #[instrument(skip_all)]
    fn pull(&self) -> Result<()> {
        self.run(
            "pull",
            &["pull", "--no-rebase", "--no-edit"],
            self.network_timeout,
        )?;
        Ok(())
    }

    #[instrument(skip_all)]
    fn push(&self) -> Result<()> {
        self.run("push", &["push"], self.network_timeout)?;
        Ok(())
    }

    fn stage(&self, path: &str) -> Result<()> {
        self.run("stage", &["add", "--", path], LOCAL_TIMEOUT)?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        debug!("committing staged changes");
        self.run(
            "commit",
            &["commit", "--allow-empty", "--quiet", "-m", message],
            LOCAL_TIMEOUT,
        )?;
        Ok(())
    }

    fn current_revision(&self) -> Result<String> {
        let out = self.run("revision", &["rev-parse", "HEAD"], LOCAL_TIMEOUT)?;
        Ok(out.trim().to_string())
    }
}

fn git_command() -> Command {
    let mut cmd = Command::new("git");
    // Never prompt for credentials.
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    cmd
}

/// Run a git command, collapsing spawn errors, timeouts and non-zero exits into [`VcsError`].
fn run_checked(operation: &'static str, cmd: Command, timeout: Duration) -> Result<String> {
    let output = run_command_with_timeout(cmd, timeout, DEFAULT_OUTPUT_LIMIT_BYTES)
        .map_err(|e| anyhow!(VcsError::new(operation, format!("{e:#}"))))?;
    if !output.success() {
        return Err(anyhow!(VcsError::new(
            operation,
            output.failure_summary(timeout)
        )));
    }
    Ok(output.stdout_lossy())
}
