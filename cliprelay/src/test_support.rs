//! Test doubles for the interpreter's capabilities, plus throwaway git remotes.
//!
//! Every fake records into a shared [`Journal`] so tests can assert the exact
//! sequence of side effects across clipboard, input, git and clock.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context as _, Result, anyhow, bail};
use tempfile::TempDir;

use crate::core::action::Point;
use crate::core::commit_message::CommitMessage;
use crate::core::keys::Key;
use crate::interpreter::{Capabilities, Context};
use crate::io::clipboard::Clipboard;
use crate::io::clock::Clock;
use crate::io::git::Git;
use crate::io::input::InputInjector;
use crate::io::process::{DEFAULT_OUTPUT_LIMIT_BYTES, run_command_with_timeout};
use crate::io::vcs::{Vcs, VcsError};
use crate::io::workspace::WorkingCopy;
use crate::poll::CancelToken;

/// One observable side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Pull,
    Push,
    Stage(String),
    Commit(String),
    MoveTo(Point),
    Click,
    Key(String),
    Chord(Vec<String>),
    ClipboardRead,
    ClipboardWrite(String),
    Sleep(Duration),
}

/// Shared, ordered record of calls.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    calls: Rc<RefCell<Vec<Call>>>,
}

impl Journal {
    pub fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|call| pred(*call)).count()
    }
}

#[derive(Debug, Default)]
struct ClipboardState {
    current: String,
    scripted: VecDeque<String>,
}

/// In-memory clipboard. Scripted reads replace the contents one read at a time.
#[derive(Debug, Clone, Default)]
pub struct FakeClipboard {
    journal: Journal,
    state: Rc<RefCell<ClipboardState>>,
}

impl FakeClipboard {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            state: Rc::default(),
        }
    }

    /// Set the contents without recording a call.
    pub fn set_text(&self, text: &str) {
        self.state.borrow_mut().current = text.to_string();
    }

    /// Each subsequent read first replaces the contents with the next scripted value.
    /// Once the script runs out the last value sticks.
    pub fn script_reads<I, S>(&self, reads: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .borrow_mut()
            .scripted
            .extend(reads.into_iter().map(Into::into));
    }

    pub fn text(&self) -> String {
        self.state.borrow().current.clone()
    }
}

impl Clipboard for FakeClipboard {
    fn read_text(&mut self) -> Result<String> {
        self.journal.record(Call::ClipboardRead);
        let mut state = self.state.borrow_mut();
        if let Some(next) = state.scripted.pop_front() {
            state.current = next;
        }
        Ok(state.current.clone())
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.journal.record(Call::ClipboardWrite(text.to_string()));
        self.state.borrow_mut().current = text.to_string();
        Ok(())
    }
}

#[derive(Debug)]
struct VcsState {
    revision: String,
    pull_revisions: VecDeque<String>,
    fail_push: bool,
    commits: Vec<String>,
}

impl Default for VcsState {
    fn default() -> Self {
        Self {
            revision: "rev-0".to_string(),
            pull_revisions: VecDeque::new(),
            fail_push: false,
            commits: Vec::new(),
        }
    }
}

/// Recording VCS. `current_revision` is not journaled.
#[derive(Debug, Clone, Default)]
pub struct FakeVcs {
    journal: Journal,
    state: Rc<RefCell<VcsState>>,
}

impl FakeVcs {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            state: Rc::default(),
        }
    }

    pub fn set_revision(&self, revision: &str) {
        self.state.borrow_mut().revision = revision.to_string();
    }

    /// Each subsequent pull moves HEAD to the next queued revision.
    pub fn queue_pull_revisions<I, S>(&self, revisions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .borrow_mut()
            .pull_revisions
            .extend(revisions.into_iter().map(Into::into));
    }

    pub fn fail_push(&self) {
        self.state.borrow_mut().fail_push = true;
    }

    pub fn commits(&self) -> Vec<String> {
        self.state.borrow().commits.clone()
    }
}

impl Vcs for FakeVcs {
    fn pull(&self) -> Result<()> {
        self.journal.record(Call::Pull);
        let mut state = self.state.borrow_mut();
        if let Some(next) = state.pull_revisions.pop_front() {
            state.revision = next;
        }
        Ok(())
    }

    fn push(&self) -> Result<()> {
        self.journal.record(Call::Push);
        if self.state.borrow().fail_push {
            return Err(anyhow!(VcsError::new("push", "remote rejected")));
        }
        Ok(())
    }

    fn stage(&self, path: &str) -> Result<()> {
        self.journal.record(Call::Stage(path.to_string()));
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.journal.record(Call::Commit(message.to_string()));
        self.state.borrow_mut().commits.push(message.to_string());
        Ok(())
    }

    fn current_revision(&self) -> Result<String> {
        Ok(self.state.borrow().revision.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeInput {
    journal: Journal,
}

impl FakeInput {
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }
}

impl InputInjector for FakeInput {
    fn move_to(&mut self, at: Point) -> Result<()> {
        self.journal.record(Call::MoveTo(at));
        Ok(())
    }

    fn click(&mut self) -> Result<()> {
        self.journal.record(Call::Click);
        Ok(())
    }

    fn press_key(&mut self, key: &Key) -> Result<()> {
        self.journal.record(Call::Key(key.as_str().to_string()));
        Ok(())
    }

    fn press_chord(&mut self, keys: &[Key]) -> Result<()> {
        self.journal.record(Call::Chord(
            keys.iter().map(|key| key.as_str().to_string()).collect(),
        ));
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ClockState {
    sleeps: u64,
    cancel_at: Option<(u64, CancelToken)>,
}

/// Clock that records sleeps instead of taking them.
///
/// Optionally cancels a token after a number of sleeps, which is the only
/// way to get an unbounded poll to return in a test.
#[derive(Debug, Clone, Default)]
pub struct FakeClock {
    journal: Journal,
    state: Rc<RefCell<ClockState>>,
}

impl FakeClock {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            state: Rc::default(),
        }
    }

    pub fn cancel_after(self, sleeps: u64, token: CancelToken) -> Self {
        self.set_cancel_after(sleeps, token);
        self
    }

    pub fn set_cancel_after(&self, sleeps: u64, token: CancelToken) {
        self.state.borrow_mut().cancel_at = Some((sleeps, token));
    }
}

impl Clock for FakeClock {
    fn sleep(&self, duration: Duration) {
        self.journal.record(Call::Sleep(duration));
        let mut state = self.state.borrow_mut();
        state.sleeps += 1;
        if let Some((limit, token)) = &state.cancel_at
            && state.sleeps >= *limit
        {
            token.cancel();
        }
    }
}

/// All fakes wired to one journal, plus a temporary working copy root.
pub struct TestRig {
    pub journal: Journal,
    pub clipboard: FakeClipboard,
    pub vcs: FakeVcs,
    pub input: FakeInput,
    pub clock: FakeClock,
    pub cancel: CancelToken,
    temp: TempDir,
}

impl TestRig {
    pub fn new() -> Result<Self> {
        let journal = Journal::default();
        Ok(Self {
            clipboard: FakeClipboard::new(journal.clone()),
            vcs: FakeVcs::new(journal.clone()),
            input: FakeInput::new(journal.clone()),
            clock: FakeClock::new(journal.clone()),
            cancel: CancelToken::new(),
            temp: tempfile::tempdir().context("create tempdir")?,
            journal,
        })
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Capabilities backed by this rig's fakes.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            vcs: Box::new(self.vcs.clone()),
            clipboard: Box::new(self.clipboard.clone()),
            input: Box::new(self.input.clone()),
            clock: Box::new(self.clock.clone()),
        }
    }

    pub fn context(&self) -> Result<Context> {
        let ctx = Context::new(
            self.capabilities(),
            WorkingCopy::new(self.root()),
            CommitMessage::default(),
        )?;
        Ok(ctx.with_cancel_token(self.cancel.clone()))
    }

    /// Cancel the rig's token once the clock has slept `sleeps` times.
    pub fn cancel_after_sleeps(&self, sleeps: u64) {
        self.clock.set_cancel_after(sleeps, self.cancel.clone());
    }

    pub fn write_file(&self, name: &str, contents: &str) {
        let path = self.root().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, contents).expect("write test file");
    }

    pub fn read_file(&self, name: &str) -> String {
        fs::read_to_string(self.root().join(name)).expect("read test file")
    }
}

const GIT_TIMEOUT: Duration = Duration::from_secs(60);

/// A bare repository plus a second clone ("the other side") that can push to it.
pub struct TestRemote {
    temp: TempDir,
    url: String,
    other: PathBuf,
}

impl TestRemote {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create tempdir")?;
        let remote = temp.path().join("remote.git");
        let other = temp.path().join("other");
        fs::create_dir_all(temp.path().join("scratch")).context("create scratch dir")?;

        git(temp.path(), &["init", "--bare", "--quiet", "--initial-branch=main", "remote.git"])?;
        git(temp.path(), &["init", "--quiet", "--initial-branch=main", "other"])?;
        configure_identity(&other)?;

        let url = remote.to_string_lossy().to_string();
        git(&other, &["remote", "add", "origin", &url])?;
        fs::write(other.join("README.md"), "relay test repo\n").context("write README")?;
        git(&other, &["add", "README.md"])?;
        git(&other, &["commit", "--quiet", "-m", "initial commit"])?;
        git(&other, &["push", "--quiet", "-u", "origin", "main"])?;

        Ok(Self { temp, url, other })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Empty directory for clones and config files.
    pub fn scratch(&self) -> PathBuf {
        self.temp.path().join("scratch")
    }

    /// Commit id of `main` on the remote.
    pub fn head_revision(&self) -> Result<String> {
        let out = git(Path::new(&self.url), &["rev-parse", "refs/heads/main"])?;
        Ok(out.trim().to_string())
    }

    /// Clone the remote into `scratch/<name>` with a commit identity configured.
    pub fn clone_working_copy(&self, name: &str) -> Result<Git> {
        let dest = self.scratch().join(name);
        let git_copy = Git::clone_into(&self.url, &dest, GIT_TIMEOUT)?;
        configure_identity(&dest)?;
        Ok(git_copy)
    }

    /// Commit `contents` to `file` from the other clone and push it. Returns the new commit id.
    pub fn commit_from_other_side(&self, file: &str, contents: &str) -> Result<String> {
        git(&self.other, &["pull", "--quiet", "--no-rebase", "--no-edit"])?;
        fs::write(self.other.join(file), contents)
            .with_context(|| format!("write {file} on other side"))?;
        git(&self.other, &["add", "--", file])?;
        git(&self.other, &["commit", "--quiet", "-m", &format!("Update {file}")])?;
        git(&self.other, &["push", "--quiet"])?;
        let out = git(&self.other, &["rev-parse", "HEAD"])?;
        Ok(out.trim().to_string())
    }

    /// Pull on the other side and read `file`, `None` if it does not exist.
    pub fn read_from_other_side(&self, file: &str) -> Result<Option<String>> {
        git(&self.other, &["pull", "--quiet", "--no-rebase", "--no-edit"])?;
        let path = self.other.join(file);
        if !path.exists() {
            return Ok(None);
        }
        let contents =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        Ok(Some(contents))
    }

    /// Move the bare repository away so every network operation fails.
    pub fn break_remote(&self) -> Result<()> {
        let gone = self.temp.path().join("remote.gone");
        fs::rename(&self.url, &gone).context("move remote away")?;
        Ok(())
    }
}

fn configure_identity(dir: &Path) -> Result<()> {
    git(dir, &["config", "user.name", "cliprelay test"])?;
    git(dir, &["config", "user.email", "cliprelay@example.invalid"])?;
    git(dir, &["config", "commit.gpgsign", "false"])?;
    Ok(())
}

fn git(dir: &Path, args: &[&str]) -> Result<String> {
    let mut cmd = Command::new("git");
    cmd.args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0");
    let output = run_command_with_timeout(cmd, GIT_TIMEOUT, DEFAULT_OUTPUT_LIMIT_BYTES)?;
    if !output.success() {
        bail!(
            "git {} failed in {}: {}",
            args.join(" "),
            dir.display(),
            output.failure_summary(GIT_TIMEOUT)
        );
    }
    Ok(output.stdout_lossy())
}
