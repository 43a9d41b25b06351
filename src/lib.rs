//! Operating-system primitive demos
//!
//! Two unrelated teaching programs:
//!
//! - `count_infinite`: a counting loop that never ends, meant to be stopped
//!   from a debugger.
//! - `fork`: a `fork()`/`wait()` walkthrough printing pid/ppid at each step.
//!
//! The programs are thin `main`s over [`counter`] and [`fork_demo`]; the
//! process primitives themselves live in the `libprocess` crate.

#![cfg(unix)]

pub mod config;
pub mod counter;
pub mod fork_demo;
pub mod logger;
