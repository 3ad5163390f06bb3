//! `cliprelay validate`: load the configuration and describe what `run` would do.

use std::path::Path;

use anyhow::Result;

use crate::io::config::load_config;

/// Resolved configuration, ready to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateOutcome {
    /// `key: value` lines for the repository section.
    pub repo: Vec<String>,
    /// One line per enabled action, in execution order.
    pub plan: Vec<String>,
}

impl ValidateOutcome {
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.repo {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(&format!("constant_loop ({} actions):\n", self.plan.len()));
        for (index, line) in self.plan.iter().enumerate() {
            out.push_str(&format!("  {index:>2}. {line}\n"));
        }
        out
    }
}

/// Run every startup check that does not touch the repository, clipboard or display.
pub fn validate_config(path: &Path) -> Result<ValidateOutcome> {
    let config = load_config(path)?;
    let actions = config.action_list()?;
    let commit_message = config.commit_message()?;
    let repo = &config.repo;

    Ok(ValidateOutcome {
        repo: vec![
            format!("repo: {}", repo.name),
            format!("url: {}", repo.url),
            format!("local_path: {}", repo.local_path.display()),
            format!("request: {}", repo.request),
            format!("response: {}", repo.response),
            format!("commit_message: {}", commit_message.render(&repo.response)?),
        ],
        plan: actions.iter().map(ToString::to_string).collect(),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn lists_enabled_actions_in_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.yaml");
        fs::write(
            &path,
            "repo:\n  name: bridge\n  url: https://example.invalid/b.git\n  local_path: b\n  request: in.md\n  response: out.md\n\
             constant_loop:\n  - git_pull: true\n  - git_push: false\n  - wait_sec: 1.5\n  - clear_clipboard: true\n",
        )
        .expect("write");

        let outcome = validate_config(&path).expect("valid");
        assert_eq!(outcome.plan.len(), 3);
        assert!(outcome.repo.contains(&"repo: bridge".to_string()));
        assert!(
            outcome
                .repo
                .contains(&"commit_message: Update out.md from clipboard".to_string())
        );
        let rendered = outcome.render();
        assert!(rendered.contains("constant_loop (3 actions):"));
        assert!(!rendered.contains("push"));
    }

    #[test]
    fn reports_invalid_config() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.yaml");
        fs::write(
            &path,
            "repo:\n  name: bridge\n  url: u\n  local_path: b\n  request: in.md\n  response: out.md\n\
             constant_loop:\n  - git_pul: true\n",
        )
        .expect("write");

        let err = validate_config(&path).expect_err("typo");
        assert!(format!("{err:#}").contains("schema validation failed"));
    }
}
