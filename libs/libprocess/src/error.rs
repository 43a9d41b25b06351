//! Unified error type for libprocess operations.
//!
//! All public functions in libprocess return `Result<T, Error>` for consistent
//! error handling. Use the `?` operator freely across modules.

use thiserror::Error;

use crate::errno::Errno;

/// Unified error type for libprocess operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// A failed OS call, with the name of the call and the errno it left.
    #[error("{op}: {errno}")]
    Os { op: &'static str, errno: Errno },
}

impl Error {
    /// Capture `errno` after a libc call named `op` reported failure.
    #[inline]
    pub fn last_os(op: &'static str) -> Error {
        Error::Os {
            op,
            errno: Errno::last(),
        }
    }

    /// Convert a raw libc return value to `Result`.
    ///
    /// libc calls return -1 on failure and set `errno`.
    #[inline]
    pub fn check(op: &'static str, ret: libc::c_int) -> Result<libc::c_int, Error> {
        if ret == -1 {
            Err(Error::last_os(op))
        } else {
            Ok(ret)
        }
    }

    /// Name of the call that failed
    pub fn op(&self) -> &'static str {
        match self {
            Error::Os { op, .. } => op,
        }
    }

    pub fn errno(&self) -> Errno {
        match self {
            Error::Os { errno, .. } => *errno,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_operation() {
        let err = Error::Os {
            op: "fork",
            errno: Errno::EAGAIN,
        };
        assert!(err.to_string().starts_with("fork: "));
        assert_eq!(err.op(), "fork");
        assert_eq!(err.errno(), Errno::EAGAIN);
    }

    #[test]
    fn check_passes_non_negative_values_through() {
        assert_eq!(Error::check("getpid", 4242), Ok(4242));
        assert_eq!(Error::check("wait", 0), Ok(0));
    }
}
