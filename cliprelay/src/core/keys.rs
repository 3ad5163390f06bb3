//! Key names used by `press` actions.
//!
//! Names follow the common desktop-automation vocabulary (`ctrl`, `enter`,
//! `f5`, `a`). They are normalized to lowercase at load time; mapping to a
//! concrete backend symbol is the injector's job.

use std::fmt;

use anyhow::{Result, anyhow};

/// A single validated, lowercase key name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(String);

impl Key {
    pub fn parse(raw: &str) -> Result<Self> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(anyhow!("key name must not be empty"));
        }
        if name.chars().any(|c| c.is_whitespace() || c == '+') {
            return Err(anyhow!(
                "invalid key name '{name}' (use a list for chords instead of '+' or spaces)"
            ));
        }
        Ok(Self(name.to_lowercase()))
    }

    /// The confirm keystroke.
    pub fn enter() -> Self {
        Self("enter".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_confirm(&self) -> bool {
        matches!(self.0.as_str(), "enter" | "return")
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payload of a `press` action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keys {
    /// A single confirm keystroke (`enter`).
    Confirm,
    /// One non-confirm key.
    Single(Key),
    /// All keys held together, released in reverse order.
    Chord(Vec<Key>),
}

impl fmt::Display for Keys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keys::Confirm => f.write_str("enter"),
            Keys::Single(key) => write!(f, "{key}"),
            Keys::Chord(keys) => {
                let names: Vec<&str> = keys.iter().map(Key::as_str).collect();
                write!(f, "[{}]", names.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case_and_trims() {
        let key = Key::parse("  Ctrl ").expect("parse");
        assert_eq!(key.as_str(), "ctrl");
    }

    #[test]
    fn parse_rejects_combined_names() {
        let err = Key::parse("ctrl+v").expect_err("combined names are not keys");
        assert!(err.to_string().contains("use a list for chords"));
        assert!(Key::parse("").is_err());
    }

    #[test]
    fn return_counts_as_confirm() {
        assert!(Key::parse("RETURN").expect("parse").is_confirm());
        assert!(Key::enter().is_confirm());
        assert!(!Key::parse("tab").expect("parse").is_confirm());
    }

    #[test]
    fn chord_display_lists_keys() {
        let chord = Keys::Chord(vec![
            Key::parse("ctrl").expect("parse"),
            Key::parse("v").expect("parse"),
        ]);
        assert_eq!(chord.to_string(), "[ctrl, v]");
    }
}
