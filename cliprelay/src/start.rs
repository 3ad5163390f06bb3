//! Startup for `cliprelay run`.
//!
//! Everything that can be checked before the loop starts is checked here:
//! configuration, the working copy, the clipboard and the input backend. Once
//! [`prepare`] returns, the only failures left are runtime ones.

use std::path::Path;

use anyhow::{Context as _, Result};
use tracing::{debug, info};

use crate::interpreter::{Capabilities, Context, Interpreter};
use crate::io::clipboard::SystemClipboard;
use crate::io::clock::SystemClock;
use crate::io::config::{RelayConfig, RepoConfig, load_config};
use crate::io::git::Git;
use crate::io::input::Xdotool;
use crate::io::workspace::WorkingCopy;

/// Load `config_path` and build an interpreter backed by the real system.
pub fn prepare(config_path: &Path) -> Result<Interpreter> {
    debug!(config = %config_path.display(), "preparing relay");
    let config = load_config(config_path)?;
    let git = open_repo(&config.repo)?;
    let caps = Capabilities {
        vcs: Box::new(git),
        clipboard: Box::new(SystemClipboard::open()?),
        input: Box::new(Xdotool::new(
            config.input.xdotool.clone(),
            config.input.command_timeout(),
        )),
        clock: Box::new(SystemClock),
    };
    assemble(&config, caps)
}

/// Open the configured working copy, cloning it first if `local_path` is missing.
pub fn open_repo(repo: &RepoConfig) -> Result<Git> {
    Git::open_or_clone(&repo.url, &repo.local_path, repo.network_timeout())
        .with_context(|| format!("open repository '{}'", repo.name))
}

/// Build an interpreter for `config` over the given capabilities.
pub fn assemble(config: &RelayConfig, caps: Capabilities) -> Result<Interpreter> {
    let actions = config.action_list()?;
    let commit_message = config.commit_message()?;
    let files = WorkingCopy::new(&config.repo.local_path);
    let ctx = Context::new(caps, files, commit_message)?;

    info!(
        repo = %config.repo.name,
        local_path = %config.repo.local_path.display(),
        request = %config.repo.request,
        response = %config.repo.response,
        actions = actions.len(),
        "relay ready"
    );
    Ok(Interpreter::new(actions, ctx))
}
