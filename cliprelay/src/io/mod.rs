//! Side-effecting capabilities used by the interpreter.

pub mod clipboard;
pub mod clock;
pub mod config;
pub mod git;
pub mod init;
pub mod input;
pub mod process;
pub mod vcs;
pub mod workspace;
