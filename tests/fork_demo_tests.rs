//! End-to-end checks of the fork demo binary


use demo_runner::{check_fork_run, markers, run_binary, run_with_closed_stdout};
use shared_demo::{fork_binary, fork_run};

#[test]
fn test_exits_successfully() {
    let run = fork_run();
    assert_eq!(
        run.exit_code(),
        Some(0),
        "fork demo failed, stderr:\n{}",
        run.stderr_str()
    );
    assert_eq!(run.terminating_signal(), None);
}

#[test]
fn test_before_fork_is_own_pid() {
    let run = fork_run();
    let (pid, ppid) = run
        .pid_line(markers::BEFORE_FORK)
        .expect("no 'before fork' line");
    assert_eq!(pid as u32, run.pid);
    // The demo's parent is the test process.
    assert_eq!(ppid as u32, std::process::id());
}

#[test]
fn test_child_is_a_distinct_process() {
    let run = fork_run();
    let (parent, _) = run.pid_line(markers::BEFORE_FORK).unwrap();
    let (child, child_parent) = run.pid_line(markers::INSIDE).expect("no 'inside' line");
    assert_ne!(child, parent);
    assert_eq!(child_parent, parent);
}

#[test]
fn test_fork_return_is_child_pid() {
    let run = fork_run();
    let (child, _) = run.pid_line(markers::INSIDE).unwrap();
    assert_eq!(run.fork_return(), Some(child));
}

#[test]
fn test_checkpoint_counts() {
    let run = fork_run();
    run.assert_tag_count(markers::BEFORE_FORK, 1);
    run.assert_tag_count(markers::AFTER_FORK, 2);
    run.assert_tag_count(markers::INSIDE, 1);
    run.assert_tag_count(markers::AFTER_CHILD_PATH, 1);
    run.assert_tag_count(markers::AFTER_WAIT, 1);
}

#[test]
fn test_after_fork_printed_by_both_processes() {
    let run = fork_run();
    let (parent, _) = run.pid_line(markers::BEFORE_FORK).unwrap();
    let (child, _) = run.pid_line(markers::INSIDE).unwrap();

    let mut pids: Vec<i32> = run
        .pid_lines(markers::AFTER_FORK)
        .into_iter()
        .map(|(pid, _)| pid)
        .collect();
    pids.sort_unstable();
    let mut expected = vec![parent, child];
    expected.sort_unstable();
    assert_eq!(pids, expected);
}

#[test]
fn test_final_lines_come_from_parent() {
    let run = fork_run();
    let stdout = run.stdout_str();
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines.len() >= 2, "too little output:\n{}", stdout);
    assert!(lines[lines.len() - 2].starts_with(markers::AFTER_WAIT));
    assert!(lines[lines.len() - 1].starts_with(markers::FORK_RETURN));
}

#[test]
fn test_no_diagnostics_on_success() {
    // Default log level is warn; a clean run prints nothing on stderr.
    assert_eq!(fork_run().stderr_str(), "");
}

#[test]
fn test_piped_output_is_not_duplicated() {
    // Bytes still buffered at fork time would be printed by both processes.
    for _ in 0..5 {
        let run = run_binary(fork_binary(), &[]).expect("Failed to run fork demo");
        if let Err(e) = check_fork_run(&run) {
            panic!("{:#}", e);
        }
    }
}

#[test]
fn test_broken_stdout_exits_with_failure() {
    let run = run_with_closed_stdout(fork_binary(), &[]).expect("Failed to run fork demo");
    let stderr = run.stderr_str();

    assert_eq!(run.exit_code(), Some(1), "stderr:\n{}", stderr);
    assert!(!stderr.contains("panicked"), "demo panicked:\n{}", stderr);
    assert!(stderr.starts_with("write stdout: "), "unexpected diagnostic:\n{}", stderr);
    // The diagnostic appears once, not again as a log record.
    assert_eq!(stderr.lines().count(), 1, "stderr:\n{}", stderr);
}
