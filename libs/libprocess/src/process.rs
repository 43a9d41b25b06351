//! Process management wrappers

use core::fmt;

use crate::errno::Errno;
use crate::error::Error;
use crate::types::Pid;

/// Terminate the calling process immediately with the given exit code.
///
/// Uses `_exit(2)`: at-exit handlers and stdio buffers inherited from a
/// parent are not run or flushed again. Flush anything you want written
/// before calling this.
#[inline]
pub fn exit(code: i32) -> ! {
    log::trace!("_exit({})", code);
    unsafe { libc::_exit(code) }
}

/// Get the current process ID.
#[inline]
pub fn getpid() -> Result<Pid, Error> {
    let ret = unsafe { libc::getpid() };
    Error::check("getpid", ret).map(Pid::from_raw)
}

/// Get the parent process ID.
#[inline]
pub fn getppid() -> Result<Pid, Error> {
    let ret = unsafe { libc::getppid() };
    Error::check("getppid", ret).map(Pid::from_raw)
}

/// The (pid, ppid) pair identifying a process at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub pid: Pid,
    pub ppid: Pid,
}

impl Identity {
    /// Query the identity of the calling process.
    pub fn current() -> Result<Identity, Error> {
        Ok(Identity {
            pid: getpid()?,
            ppid: getppid()?,
        })
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid={} ppid={}", self.pid, self.ppid)
    }
}

/// Which side of a successful `fork` the caller is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForkResult {
    /// The newly created process
    Child,
    /// The original process; carries the child's PID
    Parent(Pid),
}

impl ForkResult {
    /// The value `fork(2)` itself returned: 0 in the child, the child's PID
    /// in the parent.
    pub fn raw(self) -> libc::pid_t {
        match self {
            ForkResult::Child => 0,
            ForkResult::Parent(child) => child.raw(),
        }
    }

    pub fn is_child(self) -> bool {
        matches!(self, ForkResult::Child)
    }
}

/// Create a child process (fork).
///
/// Returns:
/// - In parent: `ForkResult::Parent(child_pid)`
/// - In child: `ForkResult::Child`
///
/// The child gets a copy-on-write image of the caller's memory, including
/// any unflushed stdio buffers. Call [`crate::io::flush_all`] first.
///
/// In a multi-threaded caller only the forking thread exists in the child;
/// the child should restrict itself to async-signal-safe work and `exit`.
#[inline]
pub fn fork() -> Result<ForkResult, Error> {
    let ret = unsafe { libc::fork() };
    match Error::check("fork", ret)? {
        0 => Ok(ForkResult::Child),
        child => {
            log::debug!("fork: created child {}", child);
            Ok(ForkResult::Parent(Pid::from_raw(child)))
        }
    }
}

/// Wait for any child to terminate.
///
/// Same as `waitpid(-1, &status, 0)`. Interrupted waits are restarted.
pub fn wait() -> Result<(Pid, WaitStatus), Error> {
    loop {
        let mut status: libc::c_int = 0;
        let ret = unsafe { libc::wait(&mut status) };
        match Error::check("wait", ret) {
            Ok(pid) => return Ok((Pid::from_raw(pid), WaitStatus::from_raw(status))),
            Err(e) if e.errno() == Errno::EINTR => {
                log::debug!("wait: interrupted, retrying");
                continue;
            }
            Err(e) => return Err(e),
        }
    }
}

/// POSIX WIFEXITED: true if child terminated normally
#[inline]
pub fn wifexited(status: i32) -> bool {
    libc::WIFEXITED(status)
}

/// POSIX WEXITSTATUS: extract exit code from status
#[inline]
pub fn wexitstatus(status: i32) -> i32 {
    libc::WEXITSTATUS(status)
}

/// Termination status reported by `wait`.
///
/// Bit-packed; only meaningful through the predicates below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct WaitStatus(i32);

impl WaitStatus {
    pub const fn from_raw(raw: i32) -> Self {
        WaitStatus(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    /// The child called `exit`/`_exit` or returned from `main`.
    pub fn exited(self) -> bool {
        wifexited(self.0)
    }

    /// Exit code, if the child terminated normally.
    pub fn exit_code(self) -> Option<i32> {
        if self.exited() {
            Some(wexitstatus(self.0))
        } else {
            None
        }
    }

    /// The child was killed by a signal.
    pub fn signaled(self) -> bool {
        libc::WIFSIGNALED(self.0)
    }

    pub fn term_signal(self) -> Option<i32> {
        if self.signaled() {
            Some(libc::WTERMSIG(self.0))
        } else {
            None
        }
    }
}

impl fmt::Display for WaitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.exit_code() {
            write!(f, "exited with code {}", code)
        } else if let Some(sig) = self.term_signal() {
            write!(f, "killed by signal {}", sig)
        } else {
            write!(f, "raw status {:#x}", self.0)
        }
    }
}
