//! Action descriptors and the ordered action list.
//!
//! Configuration entries ([`ActionEntry`]) are single-key mappings named after
//! the handler they drive. They are decoded and validated once at load time
//! into the closed [`Action`] enum; the interpreter only ever sees [`Action`].

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use serde::Deserialize;

use crate::core::excerpt::ExcerptLimit;
use crate::core::keys::{Key, Keys};

/// Interval between clipboard checks for both polling actions unless a
/// `click_while_not_in_clipboard` entry sets its own.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Screen coordinate, written as `[x, y]` in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Relative path of a file inside the working copy.
///
/// Absolute paths and `..` components are rejected so every file an action
/// touches stays inside the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingFile(String);

impl WorkingFile {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            bail!("filename must not be empty");
        }
        let mut normal = 0usize;
        for component in Path::new(trimmed).components() {
            match component {
                Component::Normal(_) => normal += 1,
                Component::CurDir => {}
                Component::ParentDir => {
                    bail!("filename '{trimmed}' must not contain '..'");
                }
                Component::RootDir | Component::Prefix(_) => {
                    bail!("filename '{trimmed}' must be relative to the working copy");
                }
            }
        }
        if normal == 0 {
            bail!("filename '{trimmed}' does not name a file");
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }
}

impl fmt::Display for WorkingFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `press` payload: one key name or a chord.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum KeySpec {
    One(String),
    Chord(Vec<String>),
}

/// `write_file_to_clipboard` payload: a bare filename or a mapping with limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FileSpec {
    Name(String),
    Excerpt(FileExcerptSpec),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileExcerptSpec {
    pub file: String,
    #[serde(default)]
    pub max_chars: Option<usize>,
    #[serde(default)]
    pub max_lines: Option<usize>,
}

/// `click_while_not_in_clipboard` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClickUntilSpec {
    pub substr: String,
    pub position: Point,
    #[serde(default)]
    pub wait_sec: Option<f64>,
}

/// One `constant_loop` entry exactly as written in configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionEntry {
    GitPull(bool),
    GitPush(bool),
    Press(KeySpec),
    WaitSec(f64),
    MouseClick(Point),
    MouseMoveClick(Point),
    WriteClipboardToFile(String),
    WriteFileToClipboard(FileSpec),
    WaitInClipboard(String),
    ClearClipboard(bool),
    ClickWhileNotInClipboard(ClickUntilSpec),
}

/// A validated action, one variant per handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Pull remote changes and record the resulting revision.
    Pull,
    /// Push local commits.
    Push,
    /// Inject a confirm keystroke, a single key, or a chord.
    Press(Keys),
    /// Sleep unconditionally.
    Wait(Duration),
    /// Move the pointer and click.
    Click(Point),
    /// Write clipboard text to a file, commit it, and push.
    ClipboardToFile(WorkingFile),
    /// Copy (part of) a file to the clipboard.
    FileToClipboard {
        file: WorkingFile,
        limit: ExcerptLimit,
    },
    /// Block until the clipboard contains `needle`.
    WaitForClipboard { needle: String },
    /// Overwrite the clipboard with empty text.
    ClearClipboard,
    /// Click `at` every `interval` until the clipboard contains `needle`.
    ClickUntilClipboard {
        needle: String,
        at: Point,
        interval: Duration,
    },
}

impl Action {
    /// Decode a configuration entry.
    ///
    /// Returns `Ok(None)` for boolean-flag entries set to `false`.
    pub fn from_entry(entry: ActionEntry) -> Result<Option<Self>> {
        let action = match entry {
            ActionEntry::GitPull(enabled) => enabled.then_some(Action::Pull),
            ActionEntry::GitPush(enabled) => enabled.then_some(Action::Push),
            ActionEntry::ClearClipboard(enabled) => enabled.then_some(Action::ClearClipboard),
            ActionEntry::Press(spec) => Some(Action::Press(parse_keys(spec)?)),
            ActionEntry::WaitSec(secs) => Some(Action::Wait(parse_seconds(secs, "wait_sec")?)),
            ActionEntry::MouseClick(at) | ActionEntry::MouseMoveClick(at) => {
                Some(Action::Click(at))
            }
            ActionEntry::WriteClipboardToFile(name) => {
                Some(Action::ClipboardToFile(WorkingFile::parse(&name)?))
            }
            ActionEntry::WriteFileToClipboard(spec) => Some(parse_file_to_clipboard(spec)?),
            ActionEntry::WaitInClipboard(needle) => Some(Action::WaitForClipboard {
                needle: parse_needle(needle)?,
            }),
            ActionEntry::ClickWhileNotInClipboard(spec) => {
                let interval = match spec.wait_sec {
                    Some(secs) => parse_seconds(secs, "wait_sec")?,
                    None => DEFAULT_POLL_INTERVAL,
                };
                if interval.is_zero() {
                    bail!("wait_sec must be greater than 0");
                }
                Some(Action::ClickUntilClipboard {
                    needle: parse_needle(spec.substr)?,
                    at: spec.position,
                    interval,
                })
            }
        };
        Ok(action)
    }

    /// Configuration tag this action was decoded from (for logs).
    pub fn tag(&self) -> &'static str {
        match self {
            Action::Pull => "git_pull",
            Action::Push => "git_push",
            Action::Press(_) => "press",
            Action::Wait(_) => "wait_sec",
            Action::Click(_) => "mouse_click",
            Action::ClipboardToFile(_) => "write_clipboard_to_file",
            Action::FileToClipboard { .. } => "write_file_to_clipboard",
            Action::WaitForClipboard { .. } => "wait_in_clipboard",
            Action::ClearClipboard => "clear_clipboard",
            Action::ClickUntilClipboard { .. } => "click_while_not_in_clipboard",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Pull => f.write_str("pull from remote"),
            Action::Push => f.write_str("push to remote"),
            Action::Press(keys) => write!(f, "press {keys}"),
            Action::Wait(duration) => write!(f, "wait {}s", duration.as_secs_f64()),
            Action::Click(at) => write!(f, "click at {at}"),
            Action::ClipboardToFile(file) => {
                write!(f, "write clipboard to '{file}', commit and push")
            }
            Action::FileToClipboard { file, limit } => {
                write!(f, "copy '{file}' to clipboard ({limit})")
            }
            Action::WaitForClipboard { needle } => {
                write!(f, "wait until clipboard contains '{needle}'")
            }
            Action::ClearClipboard => f.write_str("clear clipboard"),
            Action::ClickUntilClipboard {
                needle,
                at,
                interval,
            } => write!(
                f,
                "click at {at} every {}s until clipboard contains '{needle}'",
                interval.as_secs_f64()
            ),
        }
    }
}

/// Ordered, non-empty, immutable list of actions. One pass is a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionList {
    actions: Vec<Action>,
}

impl ActionList {
    pub fn new(actions: Vec<Action>) -> Result<Self> {
        if actions.is_empty() {
            return Err(anyhow!(
                "action list is empty (constant_loop needs at least one enabled action)"
            ));
        }
        Ok(Self { actions })
    }

    /// Decode every entry, reporting all invalid entries at once.
    pub fn from_entries(entries: Vec<ActionEntry>) -> Result<Self> {
        let mut actions = Vec::with_capacity(entries.len());
        let mut errors = Vec::new();
        for (index, entry) in entries.into_iter().enumerate() {
            match Action::from_entry(entry) {
                Ok(Some(action)) => actions.push(action),
                Ok(None) => {}
                Err(err) => errors.push(format!("constant_loop[{index}]: {err}")),
            }
        }
        if !errors.is_empty() {
            bail!("invalid actions:\n- {}", errors.join("\n- "));
        }
        Self::new(actions)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn as_slice(&self) -> &[Action] {
        &self.actions
    }
}

impl<'a> IntoIterator for &'a ActionList {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}

fn parse_keys(spec: KeySpec) -> Result<Keys> {
    match spec {
        KeySpec::One(name) => {
            let key = Key::parse(&name)?;
            if key.is_confirm() {
                Ok(Keys::Confirm)
            } else {
                Ok(Keys::Single(key))
            }
        }
        KeySpec::Chord(names) => {
            if names.is_empty() {
                bail!("press needs at least one key");
            }
            let keys = names
                .iter()
                .map(|name| Key::parse(name))
                .collect::<Result<Vec<_>>>()?;
            Ok(Keys::Chord(keys))
        }
    }
}

fn parse_file_to_clipboard(spec: FileSpec) -> Result<Action> {
    let (name, limit) = match spec {
        FileSpec::Name(name) => (name, ExcerptLimit::whole()),
        FileSpec::Excerpt(excerpt) => {
            for (field, value) in [
                ("max_chars", excerpt.max_chars),
                ("max_lines", excerpt.max_lines),
            ] {
                if value == Some(0) {
                    bail!("{field} must be at least 1");
                }
            }
            (
                excerpt.file,
                ExcerptLimit {
                    max_chars: excerpt.max_chars,
                    max_lines: excerpt.max_lines,
                },
            )
        }
    };
    Ok(Action::FileToClipboard {
        file: WorkingFile::parse(&name)?,
        limit,
    })
}

fn parse_needle(needle: String) -> Result<String> {
    if needle.is_empty() {
        bail!("clipboard target text must not be empty");
    }
    Ok(needle)
}

fn parse_seconds(secs: f64, field: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| anyhow!("{field} must be a finite, non-negative number of seconds (got {secs})"))
}
