//! Makes a copy of this process and waits for it.

use std::process::ExitCode;

use clap::Parser;
use osdemos::config::Config;
use osdemos::fork_demo;

#[derive(Parser)]
#[command(version, about = "Walk through fork() and wait(), printing pid/ppid at each step")]
struct Args {}

fn main() -> ExitCode {
    let _args = Args::parse();
    Config::from_env().init_logging();

    match fork_demo::run() {
        Ok(outcome) => {
            log::debug!("{:?}", outcome);
            ExitCode::SUCCESS
        }
        Err(err) => {
            fork_demo::report(&err);
            if err.is_fatal_abort() {
                std::process::abort();
            }
            ExitCode::FAILURE
        }
    }
}
