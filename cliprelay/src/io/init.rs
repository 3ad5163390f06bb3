//! Starter configuration scaffolding for `cliprelay init`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::info;

pub const STARTER_CONFIG: &str = include_str!("../../templates/config.yaml");

/// Options for `init_config`.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// If true, overwrite an existing config file.
    pub force: bool,
}

/// Write the starter configuration to `path`.
///
/// Fails if the file already exists unless `options.force` is set.
pub fn init_config(path: &Path, options: &InitOptions) -> Result<()> {
    if path.exists() && !options.force {
        return Err(anyhow!(
            "cliprelay init: {} already exists (use --force to overwrite)",
            path.display()
        ));
    }
    if path.is_dir() {
        return Err(anyhow!(
            "cliprelay init: {} is a directory",
            path.display()
        ));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    fs::write(path, STARTER_CONFIG).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), "wrote starter config");
    Ok(())
}
