//! POSIX errno values
//!
//! The variants cover the errors the process primitives can report. Anything
//! else is kept verbatim in [`Errno::Unknown`].

use core::fmt;

/// Error numbers reported by failed process calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Errno {
    /// Operation not permitted
    EPERM,
    /// No such process
    ESRCH,
    /// Interrupted system call
    EINTR,
    /// No child processes
    ECHILD,
    /// Resource temporarily unavailable
    EAGAIN,
    /// Out of memory
    ENOMEM,
    /// Bad address
    EFAULT,
    /// Invalid argument
    EINVAL,
    /// Broken pipe
    EPIPE,
    /// Function not implemented
    ENOSYS,
    /// Any errno not listed above
    Unknown(i32),
}

impl Errno {
    /// Convert a raw errno value to `Errno`
    pub fn from_raw(val: i32) -> Errno {
        match val {
            libc::EPERM => Errno::EPERM,
            libc::ESRCH => Errno::ESRCH,
            libc::EINTR => Errno::EINTR,
            libc::ECHILD => Errno::ECHILD,
            libc::EAGAIN => Errno::EAGAIN,
            libc::ENOMEM => Errno::ENOMEM,
            libc::EFAULT => Errno::EFAULT,
            libc::EINVAL => Errno::EINVAL,
            libc::EPIPE => Errno::EPIPE,
            libc::ENOSYS => Errno::ENOSYS,
            other => Errno::Unknown(other),
        }
    }

    /// The raw errno value
    pub fn raw(self) -> i32 {
        match self {
            Errno::EPERM => libc::EPERM,
            Errno::ESRCH => libc::ESRCH,
            Errno::EINTR => libc::EINTR,
            Errno::ECHILD => libc::ECHILD,
            Errno::EAGAIN => libc::EAGAIN,
            Errno::ENOMEM => libc::ENOMEM,
            Errno::EFAULT => libc::EFAULT,
            Errno::EINVAL => libc::EINVAL,
            Errno::EPIPE => libc::EPIPE,
            Errno::ENOSYS => libc::ENOSYS,
            Errno::Unknown(val) => val,
        }
    }

    /// The errno left behind by the most recent failed libc call on this thread
    pub fn last() -> Errno {
        let raw = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
        Errno::from_raw(raw)
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Same wording perror(3) would use.
        write!(f, "{}", std::io::Error::from_raw_os_error(self.raw()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values_map_both_ways() {
        for errno in [Errno::EINTR, Errno::ECHILD, Errno::EAGAIN, Errno::ENOMEM] {
            assert_eq!(Errno::from_raw(errno.raw()), errno);
        }
    }

    #[test]
    fn unlisted_values_are_preserved() {
        let errno = Errno::from_raw(libc::EROFS);
        assert_eq!(errno, Errno::Unknown(libc::EROFS));
        assert_eq!(errno.raw(), libc::EROFS);
    }

    #[test]
    fn display_uses_os_wording() {
        let text = Errno::ECHILD.to_string();
        assert!(text.contains("child"), "unexpected message: {}", text);
    }
}
