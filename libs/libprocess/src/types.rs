//! Common types used across libprocess

use core::fmt;

/// Process ID type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Pid(libc::pid_t);

impl Pid {
    pub const fn from_raw(raw: libc::pid_t) -> Self {
        Pid(raw)
    }
    pub const fn raw(self) -> libc::pid_t {
        self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exit codes from `<stdlib.h>`
pub mod exit_code {
    pub const SUCCESS: i32 = libc::EXIT_SUCCESS;
    pub const FAILURE: i32 = libc::EXIT_FAILURE;
}
