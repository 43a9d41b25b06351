//! osdemos runner
//!
//! This crate provides utilities for running the demo programs from host-side
//! integration tests and tools. It spawns a demo binary, captures its output,
//! and offers helpers to validate the tagged checkpoint lines.

use std::os::fd::{FromRawFd, OwnedFd};
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Checkpoint tags printed by the fork demo
pub mod markers {
    pub const BEFORE_FORK: &str = "before fork";
    pub const AFTER_FORK: &str = "after fork";
    pub const INSIDE: &str = "inside (pid == 0)";
    pub const AFTER_CHILD_PATH: &str = "after (pid == 0)";
    pub const AFTER_WAIT: &str = "after wait";
    pub const FORK_RETURN: &str = "fork() return = ";
}

/// Result of a demo run, containing output and helper methods
pub struct DemoRun {
    /// Pid the demo was started with
    pub pid: u32,
    pub output: Output,
}

impl DemoRun {
    /// Get stdout as a string
    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    /// Get stderr as a string
    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.output.status.code()
    }

    /// Signal that terminated the demo, if any
    pub fn terminating_signal(&self) -> Option<i32> {
        use std::os::unix::process::ExitStatusExt;
        self.output.status.signal()
    }

    /// Lines whose checkpoint tag is exactly `tag`
    pub fn lines_tagged(&self, tag: &str) -> Vec<String> {
        let prefix = format!("{} pid=", tag);
        self.stdout_str()
            .lines()
            .filter(|line| line.starts_with(&prefix))
            .map(str::to_string)
            .collect()
    }

    /// Assert that a tag appears on exactly `expected` lines
    pub fn assert_tag_count(&self, tag: &str, expected: usize) {
        let actual = self.lines_tagged(tag).len();
        assert_eq!(
            actual, expected,
            "expected {} lines tagged '{}', found {} in:\n{}",
            expected, tag, actual, self.stdout_str()
        );
    }

    /// (pid, ppid) of the first line tagged `tag`
    pub fn pid_line(&self, tag: &str) -> Option<(i32, i32)> {
        self.lines_tagged(tag).first().and_then(|line| parse_pid_line(tag, line))
    }

    /// All (pid, ppid) pairs printed under `tag`, in output order
    pub fn pid_lines(&self, tag: &str) -> Vec<(i32, i32)> {
        self.lines_tagged(tag)
            .iter()
            .filter_map(|line| parse_pid_line(tag, line))
            .collect()
    }

    /// The value on the `fork() return = <pid>` line
    pub fn fork_return(&self) -> Option<i32> {
        self.stdout_str()
            .lines()
            .find_map(|line| line.strip_prefix(markers::FORK_RETURN))
            .and_then(|pid| pid.trim().parse().ok())
    }

    /// Non-empty stdout lines parsed as integers, stopping at the first
    /// line that is not one
    pub fn counter_values(&self) -> Vec<u64> {
        self.stdout_str()
            .lines()
            .map_while(|line| line.trim().parse().ok())
            .collect()
    }
}

/// Parse `<tag> pid=<pid> ppid=<ppid>`
pub fn parse_pid_line(tag: &str, line: &str) -> Option<(i32, i32)> {
    let rest = line.strip_prefix(tag)?.trim_start();
    let rest = rest.strip_prefix("pid=")?;
    let (pid, rest) = rest.split_once(' ')?;
    let ppid = rest.strip_prefix("ppid=")?;
    Some((pid.parse().ok()?, ppid.trim().parse().ok()?))
}

/// Run a demo binary to completion
///
/// # Arguments
/// * `binary` - Path to the demo executable
/// * `args` - Extra command-line arguments
///
/// # Returns
/// A `DemoRun` with the captured output. A non-zero exit is not an error;
/// callers inspect `exit_code()` / `terminating_signal()` themselves.
pub fn run_binary(binary: &Path, args: &[&str]) -> Result<DemoRun> {
    let child = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to spawn {}", binary.display()))?;

    let pid = child.id();
    let output = child
        .wait_with_output()
        .context("Failed to collect demo output")?;

    Ok(DemoRun { pid, output })
}

/// Run a demo binary whose stdout is a pipe nobody reads
///
/// The read end is closed before the demo starts, so every stdout write
/// fails with `EPIPE`. stderr is captured as usual.
pub fn run_with_closed_stdout(binary: &Path, args: &[&str]) -> Result<DemoRun> {
    let mut fds = [0 as libc::c_int; 2];
    if unsafe { libc::pipe(fds.as_mut_ptr()) } == -1 {
        bail!("Failed to create pipe: {}", std::io::Error::last_os_error());
    }
    let (read_end, write_end) = unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };
    drop(read_end);

    let child = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(write_end))
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to spawn {}", binary.display()))?;

    let pid = child.id();
    let output = child
        .wait_with_output()
        .context("Failed to collect demo output")?;

    Ok(DemoRun { pid, output })
}

/// Run a demo binary that never exits on its own, then interrupt it
///
/// Lets the program run for `duration`, delivers `signal` (normally
/// `libc::SIGINT`, what Ctrl+C sends), and collects everything it printed.
pub fn run_for(binary: &Path, args: &[&str], duration: Duration, signal: i32) -> Result<DemoRun> {
    let child = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to spawn {}", binary.display()))?;

    thread::sleep(duration);

    let pid = child.id();
    if unsafe { libc::kill(pid as libc::pid_t, signal) } == -1 {
        let err = std::io::Error::last_os_error();
        // ESRCH: it already exited; collect what it printed.
        if err.raw_os_error() != Some(libc::ESRCH) {
            bail!("Failed to signal pid {}: {}", pid, err);
        }
    }

    let output = child
        .wait_with_output()
        .context("Failed to collect demo output")?;

    Ok(DemoRun { pid, output })
}

/// Every property a single fork demo run must satisfy
///
/// Returns a description of the first violated property.
pub fn check_fork_run(run: &DemoRun) -> Result<()> {
    if run.exit_code() != Some(0) {
        bail!(
            "fork demo exited with {:?} (signal {:?})\nSTDOUT:\n{}\nSTDERR:\n{}",
            run.exit_code(),
            run.terminating_signal(),
            run.stdout_str(),
            run.stderr_str()
        );
    }

    for (tag, expected) in [
        (markers::BEFORE_FORK, 1),
        (markers::AFTER_FORK, 2),
        (markers::INSIDE, 1),
        (markers::AFTER_CHILD_PATH, 1),
        (markers::AFTER_WAIT, 1),
    ] {
        let actual = run.lines_tagged(tag).len();
        if actual != expected {
            bail!("expected {} '{}' lines, found {}", expected, tag, actual);
        }
    }

    let (parent, grandparent) = run
        .pid_line(markers::BEFORE_FORK)
        .context("unparseable 'before fork' line")?;
    if parent != run.pid as i32 {
        bail!("'before fork' reports pid {}, demo was started as {}", parent, run.pid);
    }
    let (child, child_parent) = run
        .pid_line(markers::INSIDE)
        .context("unparseable 'inside' line")?;
    let fork_return = run.fork_return().context("missing 'fork() return' line")?;

    if child == parent {
        bail!("child pid {} equals parent pid", child);
    }
    if child_parent != parent {
        bail!("child reports ppid {}, parent is {}", child_parent, parent);
    }
    if fork_return != child {
        bail!("fork() returned {}, child printed pid {}", fork_return, child);
    }
    if run.pid_line(markers::AFTER_WAIT) != Some((parent, grandparent)) {
        bail!("'after wait' was not printed by the parent");
    }

    // wait() orders every child line before the parent's last checkpoint.
    let stdout = run.stdout_str();
    let lines: Vec<&str> = stdout.lines().collect();
    let position = |tag: &str| lines.iter().position(|l| l.starts_with(tag));
    match (position(markers::INSIDE), position(markers::AFTER_WAIT)) {
        (Some(inside), Some(after_wait)) if inside < after_wait => {}
        _ => bail!("'inside' line not before 'after wait'"),
    }

    Ok(())
}
