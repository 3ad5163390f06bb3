//! Relay configuration (`config.yaml`, or `config.toml`).
//!
//! Loading is strict and happens once at startup: the document must conform
//! to the embedded JSON Schema, decode into typed structs, and pass semantic
//! validation (action payloads, filenames, commit template). Any violation is
//! fatal before the loop starts.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::Draft;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::core::action::{ActionEntry, ActionList, WorkingFile};
use crate::core::commit_message::{CommitMessage, DEFAULT_COMMIT_TEMPLATE};

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const CONFIG_SCHEMA: &str = include_str!("../../schemas/config.v1.schema.json");

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    pub repo: RepoConfig,
    #[serde(default)]
    pub input: InputConfig,
    /// Ordered action list; one pass is one cycle.
    pub constant_loop: Vec<ActionEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoConfig {
    /// Display name (logs and the `repo` commit template variable).
    pub name: String,
    /// Remote to clone from and sync with.
    pub url: String,
    /// Local working copy. Relative paths resolve against the config file's directory.
    pub local_path: PathBuf,
    /// File the UI side reads its next request from.
    pub request: String,
    /// File the UI side's answer is written to.
    pub response: String,
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
    /// Upper bound for one clone/pull/push.
    #[serde(default = "default_network_timeout_secs")]
    pub network_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Program used for keyboard/mouse injection.
    pub xdotool: String,
    /// Upper bound for one injected event.
    pub command_timeout_secs: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            xdotool: "xdotool".to_string(),
            command_timeout_secs: 10,
        }
    }
}

fn default_commit_message() -> String {
    DEFAULT_COMMIT_TEMPLATE.to_string()
}

fn default_network_timeout_secs() -> u64 {
    600
}

impl RepoConfig {
    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.network_timeout_secs)
    }
}

impl InputConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

impl RelayConfig {
    /// Decode the action list (strict: unknown or malformed entries are errors).
    pub fn action_list(&self) -> Result<ActionList> {
        ActionList::from_entries(self.constant_loop.clone())
    }

    pub fn commit_message(&self) -> Result<CommitMessage> {
        CommitMessage::new(&self.repo.commit_message, &self.repo.name)
    }

    pub fn validate(&self) -> Result<()> {
        if self.repo.network_timeout_secs == 0 {
            bail!("repo.network_timeout_secs must be > 0");
        }
        if self.input.command_timeout_secs == 0 {
            bail!("input.command_timeout_secs must be > 0");
        }
        WorkingFile::parse(&self.repo.request).context("repo.request")?;
        WorkingFile::parse(&self.repo.response).context("repo.response")?;
        self.commit_message()?;
        self.action_list()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Load, schema-check, decode and validate the configuration at `path`.
pub fn load_config(path: &Path) -> Result<RelayConfig> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let format = ConfigFormat::from_path(path);
    debug!(path = %path.display(), ?format, "loading config");
    let mut cfg = parse_config(&contents, format)
        .with_context(|| format!("invalid config {}", path.display()))?;
    if cfg.repo.local_path.is_relative() {
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        cfg.repo.local_path = base.join(&cfg.repo.local_path);
    }
    Ok(cfg)
}

fn parse_config(contents: &str, format: ConfigFormat) -> Result<RelayConfig> {
    let document: Value = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(contents).context("parse yaml")?,
        ConfigFormat::Toml => toml::from_str(contents).context("parse toml")?,
    };
    validate_schema(&document)?;
    let cfg: RelayConfig =
        serde_json::from_value(document).context("decode config as v1 struct")?;
    cfg.validate()?;
    Ok(cfg)
}

/// Validate a config document against the embedded JSON Schema (Draft 2020-12).
fn validate_schema(instance: &Value) -> Result<()> {
    let schema: Value = serde_json::from_str(CONFIG_SCHEMA).context("parse config schema")?;
    let compiled = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .context("compile config schema")?;
    let messages: Vec<String> = compiled
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        return Err(anyhow!(
            "schema validation failed:\n- {}",
            messages.join("\n- ")
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::Action;

    const YAML: &str = r#"
repo:
  name: bridge
  url: https://example.invalid/bridge.git
  local_path: work/bridge
  request: request.md
  response: response.md
constant_loop:
  - git_pull: true
  - write_file_to_clipboard: request.md
  - press: [ctrl, v]
  - press: enter
  - wait_in_clipboard: DONE
  - write_clipboard_to_file: response.md
  - clear_clipboard: true
  - wait_sec: 2
"#;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).expect("write config");
        path
    }

    #[test]
    fn loads_yaml_and_resolves_local_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = write(temp.path(), "config.yaml", YAML);

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.repo.name, "bridge");
        assert_eq!(cfg.repo.local_path, temp.path().join("work/bridge"));
        assert_eq!(cfg.repo.commit_message, DEFAULT_COMMIT_TEMPLATE);
        assert_eq!(cfg.repo.network_timeout_secs, 600);
        assert_eq!(cfg.input, InputConfig::default());

        let actions = cfg.action_list().expect("actions");
        assert_eq!(actions.len(), 8);
        assert_eq!(actions.as_slice()[0], Action::Pull);
    }

    #[test]
    fn loads_toml_equivalent() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = write(
            temp.path(),
            "config.toml",
            r#"
[repo]
name = "bridge"
url = "https://example.invalid/bridge.git"
local_path = "/srv/bridge"
request = "request.md"
response = "response.md"
network_timeout_secs = 30

[[constant_loop]]
git_pull = true

[[constant_loop]]
click_while_not_in_clipboard = { substr = "X", position = [10, 20], wait_sec = 0.5 }
"#,
        );

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.repo.local_path, PathBuf::from("/srv/bridge"));
        assert_eq!(cfg.repo.network_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.action_list().expect("actions").len(), 2);
    }

    #[test]
    fn unknown_action_tag_fails_schema() {
        let err = parse_config(
            &YAML.replace("clear_clipboard: true", "clear_clipbaord: true"),
            ConfigFormat::Yaml,
        )
        .expect_err("typo must be rejected");
        assert!(format!("{err:#}").contains("schema validation failed"));
    }

    #[test]
    fn missing_repo_key_fails_schema() {
        let err = parse_config(
            &YAML.replace("  response: response.md\n", ""),
            ConfigFormat::Yaml,
        )
        .expect_err("response is required");
        assert!(format!("{err:#}").contains("response"));
    }

    #[test]
    fn missing_click_substr_fails_schema() {
        let yaml = format!(
            "{YAML}  - click_while_not_in_clipboard:\n      position: [1, 2]\n"
        );
        let err = parse_config(&yaml, ConfigFormat::Yaml).expect_err("substr is required");
        assert!(format!("{err:#}").contains("substr"));
    }

    #[test]
    fn escaping_filename_fails_validation() {
        let err = parse_config(
            &YAML.replace("write_clipboard_to_file: response.md", "write_clipboard_to_file: ../x"),
            ConfigFormat::Yaml,
        )
        .expect_err("escape must be rejected");
        assert!(format!("{err:#}").contains("must not contain '..'"));
    }

    #[test]
    fn all_disabled_actions_fail_validation() {
        let yaml = r#"
repo:
  name: bridge
  url: u
  local_path: p
  request: request.md
  response: response.md
constant_loop:
  - git_pull: false
"#;
        let err = parse_config(yaml, ConfigFormat::Yaml).expect_err("nothing to run");
        assert!(format!("{err:#}").contains("action list is empty"));
    }

    #[test]
    fn empty_action_list_fails_schema() {
        let yaml = YAML
            .split("constant_loop:")
            .next()
            .map(|head| format!("{head}constant_loop: []\n"))
            .expect("head");
        assert!(parse_config(&yaml, ConfigFormat::Yaml).is_err());
    }

    #[test]
    fn bad_commit_template_fails_validation() {
        let yaml = YAML.replace(
            "  response: response.md\n",
            "  response: response.md\n  commit_message: \"Update {{ filename\"\n",
        );
        let err = parse_config(&yaml, ConfigFormat::Yaml).expect_err("bad template");
        assert!(format!("{err:#}").contains("invalid commit message template"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert!(load_config(&temp.path().join("config.yaml")).is_err());
    }
}
