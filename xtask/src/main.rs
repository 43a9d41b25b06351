use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
    time::Instant,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

/// Simple developer utility tasks.
#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Build and run the fork demo repeatedly, checking its output each time.
    ForkCheck {
        /// Number of runs
        #[arg(long, default_value_t = 20)]
        runs: u32,
        /// Use this binary instead of building target/debug/fork
        #[arg(long)]
        bin: Option<PathBuf>,
    },
    /// Build the busy-counter and start it under gdb.
    GdbCounter {
        /// Use this binary instead of building target/debug/count_infinite
        #[arg(long)]
        bin: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    match Cli::parse().cmd {
        Cmd::ForkCheck { runs, bin } => fork_check(runs, bin),
        Cmd::GdbCounter { bin } => gdb_counter(bin),
    }
}

/// Build the demo binaries and return the path of `name`
fn build_demo(name: &str) -> Result<PathBuf> {
    println!("Building {}...", name);
    let status = Command::new(env!("CARGO"))
        .args(["build", "-p", "osdemos", "--bin", name])
        .stdin(Stdio::null())
        .status()
        .context("Failed to spawn cargo build")?;
    if !status.success() {
        bail!("cargo build --bin {} failed: {}", name, status);
    }

    let workspace_root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .context("xtask has no parent directory")?;
    let path = workspace_root.join("target").join("debug").join(name);
    if !path.exists() {
        bail!("{} not found after build", path.display());
    }
    Ok(path)
}

fn fork_check(runs: u32, bin: Option<PathBuf>) -> Result<()> {
    let binary = match bin {
        Some(path) => path,
        None => build_demo("fork")?,
    };

    println!("Running {} {} times...", binary.display(), runs);
    let start = Instant::now();
    // How often the child's first line beat the parent's.
    let mut child_first = 0;

    for i in 1..=runs {
        let run = demo_runner::run_binary(&binary, &[])?;
        demo_runner::check_fork_run(&run).with_context(|| {
            format!("run {}/{} failed, output:\n{}", i, runs, run.stdout_str())
        })?;

        let first_after_fork = run
            .pid_lines(demo_runner::markers::AFTER_FORK)
            .first()
            .map(|&(pid, _)| pid);
        if first_after_fork == run.fork_return() {
            child_first += 1;
        }
    }

    println!(
        "[ OK ] {} runs passed in {:.2?} (child printed first in {})",
        runs,
        start.elapsed(),
        child_first
    );
    Ok(())
}

fn gdb_counter(bin: Option<PathBuf>) -> Result<()> {
    let binary = match bin {
        Some(path) => path,
        None => build_demo("count_infinite")?,
    };

    println!("Starting gdb. Type `run`, then Ctrl+C to break into the loop.");
    let status = Command::new("gdb")
        .arg(&binary)
        .status()
        .context("Failed to spawn gdb (is it installed?)")?;

    if !status.success() {
        bail!("gdb exited with {}", status);
    }
    Ok(())
}
