//! One handler per action kind.
//!
//! Handlers run synchronously to completion against the shared [`Context`].
//! Only `write_file_to_clipboard` has a recoverable failure (missing file);
//! every other error propagates and ends the process.

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::core::action::{Action, DEFAULT_POLL_INTERVAL, Point, WorkingFile};
use crate::core::excerpt::ExcerptLimit;
use crate::core::keys::{Key, Keys};
use crate::interpreter::{Capabilities, Context};
use crate::poll::{PollOutcome, poll_until};

/// Whether the interpreter should keep going after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// A poll was cancelled; abandon the current cycle.
    Cancelled,
}

impl From<PollOutcome> for Flow {
    fn from(outcome: PollOutcome) -> Self {
        match outcome {
            PollOutcome::Satisfied { .. } => Flow::Continue,
            PollOutcome::Cancelled { .. } => Flow::Cancelled,
        }
    }
}

/// Run the handler for `action`.
pub fn dispatch(ctx: &mut Context, action: &Action) -> Result<Flow> {
    match action {
        Action::Pull => pull(ctx)?,
        Action::Push => push(ctx)?,
        Action::Press(keys) => press(ctx, keys)?,
        Action::Wait(duration) => wait(ctx, *duration),
        Action::Click(at) => click_at(ctx, *at)?,
        Action::ClipboardToFile(file) => clipboard_to_file(ctx, file)?,
        Action::FileToClipboard { file, limit } => file_to_clipboard(ctx, file, *limit)?,
        Action::WaitForClipboard { needle } => return wait_for_clipboard(ctx, needle),
        Action::ClearClipboard => clear_clipboard(ctx)?,
        Action::ClickUntilClipboard {
            needle,
            at,
            interval,
        } => return click_until_clipboard(ctx, needle, *at, *interval),
    }
    Ok(Flow::Continue)
}

/// Pull, and record the new revision if the remote moved.
pub fn pull(ctx: &mut Context) -> Result<()> {
    info!("pulling latest changes");
    ctx.caps.vcs.pull()?;
    let revision = ctx.caps.vcs.current_revision()?;
    if ctx.sync.observe(&revision) {
        info!(revision = %revision, "new commit detected");
    } else {
        debug!(revision = %revision, "no new commits");
    }
    Ok(())
}

pub fn push(ctx: &mut Context) -> Result<()> {
    info!("pushing to remote");
    ctx.caps.vcs.push()?;
    info!("push completed");
    Ok(())
}

pub fn press(ctx: &mut Context, keys: &Keys) -> Result<()> {
    info!(keys = %keys, "pressing keys");
    match keys {
        Keys::Confirm => ctx.caps.input.press_key(&Key::enter()),
        Keys::Single(key) => ctx.caps.input.press_key(key),
        Keys::Chord(chord) => ctx.caps.input.press_chord(chord),
    }
}

pub fn wait(ctx: &mut Context, duration: Duration) {
    info!(secs = duration.as_secs_f64(), "waiting");
    ctx.caps.clock.sleep(duration);
}

pub fn click_at(ctx: &mut Context, at: Point) -> Result<()> {
    info!(x = at.x, y = at.y, "moving pointer and clicking");
    ctx.caps.input.move_to(at)?;
    ctx.caps.input.click()
}

/// Save the clipboard into the working copy, commit it, and push.
pub fn clipboard_to_file(ctx: &mut Context, file: &WorkingFile) -> Result<()> {
    let text = ctx.caps.clipboard.read_text()?;
    ctx.files.write_text(file, &text)?;
    info!(file = %file, chars = text.chars().count(), "wrote clipboard to file");

    ctx.caps.vcs.stage(file.as_str())?;
    let message = ctx.commit_message.render(file.as_str())?;
    ctx.caps.vcs.commit(&message)?;
    info!(file = %file, message = %message, "committed to local repo");

    push(ctx)
}

/// Copy a file (or its configured prefix) to the clipboard.
///
/// A missing file is logged and leaves the clipboard untouched.
pub fn file_to_clipboard(ctx: &mut Context, file: &WorkingFile, limit: ExcerptLimit) -> Result<()> {
    let Some(contents) = ctx.files.read_text(file)? else {
        warn!(file = %file, "file not found, clipboard left unchanged");
        return Ok(());
    };
    let excerpt = limit.apply(&contents);
    ctx.caps.clipboard.write_text(excerpt)?;
    info!(file = %file, selection = %limit, chars = excerpt.chars().count(), "copied file to clipboard");
    Ok(())
}

/// Block until the clipboard contains `needle`, checking once per second.
///
/// There is no timeout: if the text never appears this never returns.
pub fn wait_for_clipboard(ctx: &mut Context, needle: &str) -> Result<Flow> {
    info!(needle, "waiting for text to appear in clipboard");
    let Capabilities {
        clipboard, clock, ..
    } = &mut ctx.caps;
    let outcome = poll_until(
        &**clock,
        DEFAULT_POLL_INTERVAL,
        &ctx.cancel,
        || Ok(clipboard.read_text()?.contains(needle)),
        || Ok(()),
    )?;
    if let PollOutcome::Satisfied { misses } = outcome {
        info!(needle, polls = misses, "found text in clipboard, continuing");
    }
    Ok(outcome.into())
}

/// Click `at` every `interval` until the clipboard contains `needle`.
///
/// The clipboard is checked before each click, so a clipboard that already
/// matches causes no click at all. Unbounded like [`wait_for_clipboard`].
pub fn click_until_clipboard(
    ctx: &mut Context,
    needle: &str,
    at: Point,
    interval: Duration,
) -> Result<Flow> {
    info!(needle, x = at.x, y = at.y, "clicking until text appears in clipboard");
    let Capabilities {
        clipboard,
        input,
        clock,
        ..
    } = &mut ctx.caps;
    let outcome = poll_until(
        &**clock,
        interval,
        &ctx.cancel,
        || Ok(clipboard.read_text()?.contains(needle)),
        || {
            input.move_to(at)?;
            input.click()
        },
    )?;
    if let PollOutcome::Satisfied { misses } = outcome {
        info!(needle, clicks = misses, "found text in clipboard, stopping clicks");
    }
    Ok(outcome.into())
}

pub fn clear_clipboard(ctx: &mut Context) -> Result<()> {
    ctx.caps.clipboard.write_text("")?;
    info!("clipboard cleared");
    Ok(())
}
