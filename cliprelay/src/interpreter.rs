//! The action-interpreter loop.
//!
//! An [`Interpreter`] owns the immutable [`ActionList`] and a [`Context`]
//! holding every capability, the working copy, and the [`SyncState`]. It
//! walks the list in order, one handler at a time, forever. There is no
//! parallelism: every sleep, poll and network call blocks the whole loop.

use anyhow::{Context as _, Result};
use tracing::{debug, info};

use crate::core::action::ActionList;
use crate::core::commit_message::CommitMessage;
use crate::core::sync_state::SyncState;
use crate::handlers::{self, Flow};
use crate::io::clipboard::Clipboard;
use crate::io::clock::Clock;
use crate::io::input::InputInjector;
use crate::io::vcs::Vcs;
use crate::io::workspace::WorkingCopy;
use crate::poll::CancelToken;

/// Process-wide singleton resources the handlers act through.
pub struct Capabilities {
    pub vcs: Box<dyn Vcs>,
    pub clipboard: Box<dyn Clipboard>,
    pub input: Box<dyn InputInjector>,
    pub clock: Box<dyn Clock>,
}

/// Explicit state passed to every handler call.
pub struct Context {
    pub caps: Capabilities,
    pub files: WorkingCopy,
    pub sync: SyncState,
    pub commit_message: CommitMessage,
    pub cancel: CancelToken,
}

impl Context {
    /// Build a context, seeding [`SyncState`] with the working copy's current revision.
    pub fn new(caps: Capabilities, files: WorkingCopy, commit_message: CommitMessage) -> Result<Self> {
        let revision = caps
            .vcs
            .current_revision()
            .context("read starting revision")?;
        info!(revision = %revision, "tracking working copy revision");
        Ok(Self {
            caps,
            files,
            sync: SyncState::new(revision),
            commit_message,
            cancel: CancelToken::new(),
        })
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Why a run returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStop {
    /// The cancel token was set; the current cycle was abandoned.
    Cancelled { cycles_completed: u64 },
    /// `run_cycles` reached its limit.
    CycleLimit { cycles_completed: u64 },
}

pub struct Interpreter {
    actions: ActionList,
    ctx: Context,
    cycles_completed: u64,
}

impl Interpreter {
    pub fn new(actions: ActionList, ctx: Context) -> Self {
        Self {
            actions,
            ctx,
            cycles_completed: 0,
        }
    }

    pub fn actions(&self) -> &ActionList {
        &self.actions
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.ctx.cancel.clone()
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    /// Run cycles forever.
    ///
    /// Returns only when a handler fails (fatal) or the cancel token is set.
    pub fn run(&mut self) -> Result<RunStop> {
        info!(actions = self.actions.len(), "starting action loop");
        self.run_until(None)
    }

    /// Run at most `limit` full cycles.
    pub fn run_cycles(&mut self, limit: u64) -> Result<RunStop> {
        self.run_until(Some(limit))
    }

    fn run_until(&mut self, limit: Option<u64>) -> Result<RunStop> {
        loop {
            if let Some(limit) = limit
                && self.cycles_completed >= limit
            {
                return Ok(RunStop::CycleLimit {
                    cycles_completed: self.cycles_completed,
                });
            }
            if self.run_cycle()? == Flow::Cancelled {
                info!(
                    cycles_completed = self.cycles_completed,
                    "action loop cancelled"
                );
                return Ok(RunStop::Cancelled {
                    cycles_completed: self.cycles_completed,
                });
            }
        }
    }

    /// Execute one full pass over the action list, in order.
    pub fn run_cycle(&mut self) -> Result<Flow> {
        let cycle = self.cycles_completed + 1;
        debug!(cycle, "starting cycle");
        for (index, action) in self.actions.iter().enumerate() {
            if self.ctx.cancel.is_cancelled() {
                return Ok(Flow::Cancelled);
            }
            debug!(cycle, index, tag = action.tag(), "dispatching action");
            let flow = handlers::dispatch(&mut self.ctx, action)
                .with_context(|| format!("cycle {cycle}, action #{index} ({action})"))?;
            if flow == Flow::Cancelled {
                return Ok(Flow::Cancelled);
            }
        }
        self.cycles_completed = cycle;
        Ok(Flow::Continue)
    }
}
