//! Optional CLI for manual demo runs
//!
//! Usage: cargo run -p demo-runner --bin runner -- target/debug/fork
//!        cargo run -p demo-runner --bin runner -- target/debug/count_infinite --for-ms 3000

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use demo_runner::{check_fork_run, markers, run_binary, run_for};

#[derive(Parser)]
#[command(about = "Run an osdemos binary and show what it printed")]
struct Args {
    /// Demo executable
    binary: PathBuf,
    /// Interrupt with SIGINT after this many milliseconds instead of
    /// waiting for exit
    #[arg(long)]
    for_ms: Option<u64>,
}

fn main() {
    let args = Args::parse();

    println!("Running demo: {}", args.binary.display());

    let result = match args.for_ms {
        Some(ms) => run_for(&args.binary, &[], Duration::from_millis(ms), libc::SIGINT),
        None => run_binary(&args.binary, &[]),
    };

    let run = match result {
        Ok(run) => run,
        Err(e) => {
            eprintln!("Run failed: {:#}", e);
            std::process::exit(1);
        }
    };

    print!("{}", run.stdout_str());
    eprint!("{}", run.stderr_str());
    println!(
        "exit code: {:?}, signal: {:?}",
        run.exit_code(),
        run.terminating_signal()
    );

    // Show the property check for fork demo output
    if run.pid_line(markers::BEFORE_FORK).is_some() {
        match check_fork_run(&run) {
            Ok(()) => println!("fork checks passed"),
            Err(e) => {
                eprintln!("fork checks failed: {}", e);
                std::process::exit(1);
            }
        }
    } else if args.for_ms.is_some() {
        println!("{} periods counted", run.counter_values().len());
    }
}
