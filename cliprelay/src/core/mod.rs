//! Deterministic, pure logic shared by the interpreter.
//!
//! Core modules must be free of I/O side effects. They decode and validate
//! configuration into typed values and compute what a handler should do.

pub mod action;
pub mod commit_message;
pub mod excerpt;
pub mod keys;
pub mod sync_state;
