//! Process primitive library
//!
//! Thin, checked wrappers around the POSIX calls the demo programs are built
//! on: process identity queries, `fork`, `wait`, `_exit`, and
//! stream flushing.
//!
//! Every wrapper returns `Result<T, Error>`; a failed libc call is turned into
//! an [`Error::Os`] naming the operation and carrying the `errno` observed
//! right after the call.
//!
//! # Usage
//!
//! ```rust,no_run
//! use libprocess::process::{fork, wait, ForkResult};
//!
//! match fork().expect("fork") {
//!     ForkResult::Child => libprocess::process::exit(0),
//!     ForkResult::Parent(child) => {
//!         let (pid, status) = wait().expect("wait");
//!         assert_eq!(pid, child);
//!         assert!(status.exited());
//!     }
//! }
//! ```

#![cfg(unix)]

pub use errno::Errno;
pub use error::Error;
pub use types::Pid;

pub mod errno;
pub mod error;
pub mod io;
pub mod process;
pub mod types;
