//! Commit message template for clipboard uploads.

use anyhow::{Context, Result, bail};
use minijinja::{Environment, UndefinedBehavior, context};

pub const DEFAULT_COMMIT_TEMPLATE: &str = "Update {{ filename }} from clipboard";

const SAMPLE_FILENAME: &str = "example.txt";

/// Validated minijinja template rendered once per `write_clipboard_to_file`.
///
/// Available variables: `filename` (as configured) and `repo` (display name).
/// Undefined variables are errors, and the rendered message must contain the
/// filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    template: String,
    repo: String,
}

impl CommitMessage {
    pub fn new(template: &str, repo: &str) -> Result<Self> {
        let message = Self {
            template: template.to_string(),
            repo: repo.to_string(),
        };
        // Template errors must surface at load time.
        let sample = message
            .render(SAMPLE_FILENAME)
            .with_context(|| format!("invalid commit message template '{template}'"))?;
        if sample.trim().is_empty() {
            bail!("commit message template '{template}' renders to an empty message");
        }
        if !sample.contains(SAMPLE_FILENAME) {
            bail!("commit message template '{template}' must reference {{{{ filename }}}}");
        }
        Ok(message)
    }

    pub fn render(&self, filename: &str) -> Result<String> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        let rendered = env
            .render_str(
                &self.template,
                context! {
                    filename => filename,
                    repo => self.repo.as_str(),
                },
            )
            .context("render commit message")?;
        Ok(rendered)
    }
}

impl Default for CommitMessage {
    fn default() -> Self {
        Self {
            template: DEFAULT_COMMIT_TEMPLATE.to_string(),
            repo: String::new(),
        }
    }
}
