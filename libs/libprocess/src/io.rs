//! Stream flushing
//!
//! A forked child inherits a byte-for-byte copy of every userspace output
//! buffer. Anything still buffered at fork time is written twice, once by
//! each process, so flush before forking.

use std::io::Write;

use crate::errno::Errno;
use crate::error::Error;

fn from_io(op: &'static str, err: std::io::Error) -> Error {
    Error::Os {
        op,
        errno: Errno::from_raw(err.raw_os_error().unwrap_or(libc::EIO)),
    }
}

/// Write `line` and a newline to stdout.
///
/// A closed or broken stdout is reported as an `Error` naming the write
/// instead of panicking the way `println!` does.
pub fn write_stdout_line(line: &str) -> Result<(), Error> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", line).map_err(|e| from_io("write stdout", e))
}

/// Flush Rust's stdout handle.
pub fn flush_stdout() -> Result<(), Error> {
    std::io::stdout().flush().map_err(|e| from_io("flush stdout", e))
}

/// Flush Rust's stderr handle.
///
/// Unbuffered today; flushed anyway so callers need not rely on that.
pub fn flush_stderr() -> Result<(), Error> {
    std::io::stderr().flush().map_err(|e| from_io("flush stderr", e))
}

/// Flush every output stream the process may have buffered data in: the
/// Rust stdout/stderr handles and all C stdio streams.
pub fn flush_all() -> Result<(), Error> {
    flush_stdout()?;
    flush_stderr()?;
    // fflush(NULL) flushes every open C output stream.
    let ret = unsafe { libc::fflush(core::ptr::null_mut()) };
    if ret != 0 {
        return Err(Error::last_os("fflush"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_all_succeeds_on_open_streams() {
        assert!(flush_all().is_ok());
    }

    #[test]
    fn write_stdout_line_succeeds_on_open_stdout() {
        assert!(write_stdout_line("libprocess io test line").is_ok());
    }

    #[test]
    fn io_errors_keep_their_errno() {
        let err = from_io("flush stdout", std::io::Error::from_raw_os_error(libc::EPIPE));
        assert_eq!(err.errno(), Errno::EPIPE);
        assert_eq!(err.op(), "flush stdout");
    }
}
