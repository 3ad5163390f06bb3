//! Clipboard relay between a git repository and a desktop chat UI.
//!
//! A configured list of actions runs forever, in order: pull the repository,
//! click and type into the UI, shuttle text between files and the clipboard,
//! and commit and push whatever the UI produced.
//!
//! - **[`core`]**: Pure values (actions, keys, excerpt limits, sync state).
//!   No I/O.
//! - **[`io`]**: Side-effecting capabilities (git, clipboard, input, clock,
//!   filesystem, configuration). Each sits behind a trait so tests can swap it.
//!
//! [`interpreter`] and [`handlers`] run the loop; [`start`] and [`validate`]
//! back the CLI commands.

pub mod core;
pub mod handlers;
pub mod interpreter;
pub mod io;
pub mod logging;
pub mod poll;
pub mod start;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod validate;
