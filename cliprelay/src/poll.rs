//! Fixed-interval polling of an external condition.
//!
//! The clipboard is the only completion signal the upstream UI gives us, so
//! the blocking handlers poll it. Polls have no upper bound on attempts; the
//! only way out besides the condition is the [`CancelToken`], which the
//! production loop never triggers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;

use crate::io::clock::Clock;

/// Shared cancellation flag checked between poll attempts and between actions.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// How a poll ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The condition held after `misses` unsuccessful checks.
    Satisfied { misses: u64 },
    /// The token was cancelled after `misses` unsuccessful checks.
    Cancelled { misses: u64 },
}

/// Check `condition` until it holds.
///
/// Each round: evaluate `condition` (done when true), stop if `cancel` is set,
/// run `on_miss`, then sleep `interval` on `clock`. Errors from either closure
/// end the poll immediately.
pub fn poll_until<C, M>(
    clock: &dyn Clock,
    interval: Duration,
    cancel: &CancelToken,
    mut condition: C,
    mut on_miss: M,
) -> Result<PollOutcome>
where
    C: FnMut() -> Result<bool>,
    M: FnMut() -> Result<()>,
{
    let mut misses = 0u64;
    loop {
        if condition()? {
            return Ok(PollOutcome::Satisfied { misses });
        }
        if cancel.is_cancelled() {
            return Ok(PollOutcome::Cancelled { misses });
        }
        on_miss()?;
        misses += 1;
        clock.sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Call, FakeClock, Journal};

    #[test]
    fn satisfied_immediately_never_sleeps() {
        let journal = Journal::default();
        let clock = FakeClock::new(journal.clone());
        let outcome = poll_until(
            &clock,
            Duration::from_secs(1),
            &CancelToken::new(),
            || Ok(true),
            || Ok(()),
        )
        .expect("poll");
        assert_eq!(outcome, PollOutcome::Satisfied { misses: 0 });
        assert!(journal.calls().is_empty());
    }

    #[test]
    fn sleeps_interval_after_each_miss() {
        let journal = Journal::default();
        let clock = FakeClock::new(journal.clone());
        let mut remaining = 3;
        let mut miss_calls = 0;
        let outcome = poll_until(
            &clock,
            Duration::from_millis(250),
            &CancelToken::new(),
            || {
                remaining -= 1;
                Ok(remaining == 0)
            },
            || {
                miss_calls += 1;
                Ok(())
            },
        )
        .expect("poll");
        assert_eq!(outcome, PollOutcome::Satisfied { misses: 2 });
        assert_eq!(miss_calls, 2);
        assert_eq!(
            journal.calls(),
            vec![
                Call::Sleep(Duration::from_millis(250)),
                Call::Sleep(Duration::from_millis(250)),
            ]
        );
    }

    #[test]
    fn cancelled_token_ends_unbounded_poll() {
        let journal = Journal::default();
        let cancel = CancelToken::new();
        let clock = FakeClock::new(journal.clone()).cancel_after(5, cancel.clone());
        let mut checks = 0u64;
        let outcome = poll_until(
            &clock,
            Duration::from_secs(1),
            &cancel,
            || {
                checks += 1;
                Ok(false)
            },
            || Ok(()),
        )
        .expect("poll");
        assert_eq!(outcome, PollOutcome::Cancelled { misses: 5 });
        assert_eq!(checks, 6);
    }

    #[test]
    fn condition_error_propagates() {
        let clock = FakeClock::new(Journal::default());
        let err = poll_until(
            &clock,
            Duration::from_secs(1),
            &CancelToken::new(),
            || Err(anyhow::anyhow!("clipboard gone")),
            || Ok(()),
        )
        .expect_err("error");
        assert!(err.to_string().contains("clipboard gone"));
    }
}
