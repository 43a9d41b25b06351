//! fork/wait walkthrough
//!
//! Duplicates the current process and prints a `<tag> pid=<pid> ppid=<ppid>`
//! line at each checkpoint, from whichever process reaches it. A possible
//! run:
//!
//! ```text
//! before fork pid=16026 ppid=14381
//! after fork pid=16031 ppid=16026
//! inside (pid == 0) pid=16031 ppid=16026
//! after fork pid=16026 ppid=14381
//! after (pid == 0) pid=16026 ppid=14381
//! after wait pid=16026 ppid=14381
//! fork() return = 16031
//! ```
//!
//! Only `wait` orders the two processes. The child's lines may land before,
//! between or after the parent's `after fork` / `after (pid == 0)` lines.
//!
//! The integer counter shows that fork copies memory instead of sharing it:
//! the child increments its copy, the parent's stays 0.

use libprocess::io::{flush_all, write_stdout_line};
use libprocess::process::{self, fork, getpid, wait, ForkResult, Identity, WaitStatus};
use libprocess::types::exit_code;
use libprocess::Pid;
use thiserror::Error;

/// Checkpoint tags, in program order
pub mod tags {
    /// Parent only; the child does not exist yet.
    pub const BEFORE_FORK: &str = "before fork";
    /// Printed by both processes.
    pub const AFTER_FORK: &str = "after fork";
    /// Child only.
    pub const INSIDE: &str = "inside (pid == 0)";
    /// Parent only, may race with the child's lines.
    pub const AFTER_CHILD_PATH: &str = "after (pid == 0)";
    /// Parent only, always after every child line.
    pub const AFTER_WAIT: &str = "after wait";
}

/// Prefix of the final line carrying fork's return value in the parent
pub const FORK_RETURN_PREFIX: &str = "fork() return = ";

#[derive(Debug, Error)]
pub enum DemoError {
    /// An identity query, stdout write or stream flush failed.
    #[error(transparent)]
    Os(#[from] libprocess::Error),
    /// The OS refused to create the child.
    #[error("{0}")]
    Fork(libprocess::Error),
    #[error("assertion failed: {0}")]
    Invariant(String),
}

impl DemoError {
    /// Fork failures and broken invariants abort; everything else exits
    /// with `EXIT_FAILURE`.
    pub fn is_fatal_abort(&self) -> bool {
        matches!(self, DemoError::Fork(_) | DemoError::Invariant(_))
    }
}

/// What the parent observed over a full run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Identity before fork
    pub before: Identity,
    /// fork's return value in the parent: the child's pid
    pub fork_return: Pid,
    /// The pid `wait` reported
    pub reaped: Pid,
    pub child_status: WaitStatus,
    /// The parent's copy of the counter at the end
    pub counter: i32,
}

pub fn checkpoint_line(tag: &str, identity: &Identity) -> String {
    format!("{} {}", tag, identity)
}

fn print_pid(tag: &str) -> Result<Identity, DemoError> {
    let identity = Identity::current()?;
    write_stdout_line(&checkpoint_line(tag, &identity))?;
    Ok(identity)
}

/// The child must have exited normally with `EXIT_SUCCESS`.
pub fn check_child_status(status: WaitStatus) -> Result<(), DemoError> {
    match status.exit_code() {
        Some(exit_code::SUCCESS) => Ok(()),
        Some(code) => Err(DemoError::Invariant(format!(
            "child exit code {} != {}",
            code,
            exit_code::SUCCESS
        ))),
        None => Err(DemoError::Invariant(format!(
            "child terminated abnormally ({})",
            status
        ))),
    }
}

/// A forked child is a new process with a pid of its own.
pub fn check_child_pid(child: Pid, parent: Pid) -> Result<(), DemoError> {
    if child == parent {
        return Err(DemoError::Invariant(format!(
            "child pid {} equals parent pid",
            child
        )));
    }
    Ok(())
}

/// The parent's counter is untouched by the child's increment.
pub fn check_counter(counter: i32) -> Result<(), DemoError> {
    if counter != 0 {
        return Err(DemoError::Invariant(format!(
            "parent counter is {}, expected 0",
            counter
        )));
    }
    Ok(())
}

/// Print the diagnostic for a fatal error.
pub fn report(err: &DemoError) {
    log::debug!("{:?}", err);
    eprintln!("{}", err);
}

/// Run the walkthrough.
///
/// Returns only in the parent. The child always terminates inside this
/// function.
pub fn run() -> Result<Outcome, DemoError> {
    // Duplicated by fork; each process mutates its own copy.
    let mut counter: i32 = 0;

    let parent_pid = getpid()?;

    let before = print_pid(tags::BEFORE_FORK)?;
    // Unflushed bytes would be inherited by the child and written twice.
    flush_all()?;

    let forked = fork().map_err(DemoError::Fork)?;

    let child = match forked {
        ForkResult::Child => child_path(parent_pid, &mut counter),
        ForkResult::Parent(child) => child,
    };

    print_pid(tags::AFTER_FORK)?;
    print_pid(tags::AFTER_CHILD_PATH)?;

    // Only one child exists, so "any child" is that one.
    let (reaped, child_status) = wait()?;
    log::info!("reaped child {}: {}", reaped, child_status);
    check_child_status(child_status)?;

    // The child's own getpid() could be compared with this value, but only
    // with IPC back to the parent. Not done here.
    print_pid(tags::AFTER_WAIT)?;
    write_stdout_line(&format!("{}{}", FORK_RETURN_PREFIX, forked.raw()))?;

    check_counter(counter)?;

    Ok(Outcome {
        before,
        fork_return: child,
        reaped,
        child_status,
        counter,
    })
}

/// Child side of the fork. Never returns.
fn child_path(parent_pid: Pid, counter: &mut i32) -> ! {
    let code = match child_body(parent_pid, counter) {
        Ok(()) => exit_code::SUCCESS,
        Err(err) => {
            report(&err);
            if err.is_fatal_abort() {
                std::process::abort();
            }
            exit_code::FAILURE
        }
    };
    // _exit skips stdio flushing; our lines must still reach the terminal.
    let _ = flush_all();
    process::exit(code)
}

fn child_body(parent_pid: Pid, counter: &mut i32) -> Result<(), DemoError> {
    print_pid(tags::AFTER_FORK)?;
    print_pid(tags::INSIDE)?;

    let pid = getpid()?;
    check_child_pid(pid, parent_pid)?;

    // Only the child's copy changes.
    *counter += 1;
    log::debug!("child counter is now {}", counter);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use libprocess::Errno;

    fn identity(pid: i32, ppid: i32) -> Identity {
        Identity {
            pid: Pid::from_raw(pid),
            ppid: Pid::from_raw(ppid),
        }
    }

    #[test]
    fn checkpoint_line_format() {
        assert_eq!(
            checkpoint_line(tags::BEFORE_FORK, &identity(16026, 14381)),
            "before fork pid=16026 ppid=14381"
        );
        assert_eq!(
            checkpoint_line(tags::INSIDE, &identity(16031, 16026)),
            "inside (pid == 0) pid=16031 ppid=16026"
        );
    }

    #[test]
    fn successful_child_passes() {
        assert!(check_child_status(WaitStatus::from_raw(0)).is_ok());
    }

    #[test]
    fn failing_child_is_an_invariant_violation() {
        let err = check_child_status(WaitStatus::from_raw(1 << 8)).unwrap_err();
        assert!(err.is_fatal_abort());
        assert_eq!(err.to_string(), "assertion failed: child exit code 1 != 0");
    }

    #[test]
    fn killed_child_is_abnormal() {
        let err = check_child_status(WaitStatus::from_raw(libc::SIGKILL)).unwrap_err();
        assert!(matches!(err, DemoError::Invariant(ref msg) if msg.contains("abnormally")));
    }

    #[test]
    fn child_pid_must_differ() {
        let pid = Pid::from_raw(100);
        assert!(check_child_pid(Pid::from_raw(101), pid).is_ok());
        assert!(check_child_pid(pid, pid).unwrap_err().is_fatal_abort());
    }

    #[test]
    fn counter_must_stay_zero() {
        assert!(check_counter(0).is_ok());
        assert!(check_counter(1).is_err());
    }

    #[test]
    fn os_failures_exit_instead_of_aborting() {
        let err = DemoError::from(libprocess::Error::Os {
            op: "getpid",
            errno: Errno::ENOSYS,
        });
        assert!(!err.is_fatal_abort());
        assert!(err.to_string().starts_with("getpid: "));

        let fork_err = DemoError::Fork(libprocess::Error::Os {
            op: "fork",
            errno: Errno::EAGAIN,
        });
        assert!(fork_err.is_fatal_abort());
        assert!(fork_err.to_string().starts_with("fork: "));
    }
}
