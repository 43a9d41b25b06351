//! Counts forever, printing the number of elapsed periods.
//!
//! To break into the loop under gdb, press Ctrl+C:
//!
//! ```text
//! $ gdb target/debug/count_infinite
//! (gdb) run
//! ^C
//! (gdb) bt
//! ```

use std::num::NonZeroU64;
use std::process::ExitCode;

use clap::Parser;
use osdemos::config::Config;
use osdemos::counter::{BusyCounter, DEFAULT_PERIOD};

#[derive(Parser)]
#[command(version, about = "Count forever; stop it with a debugger or a signal")]
struct Args {
    /// Increments between output lines
    #[arg(long, default_value_t = DEFAULT_PERIOD, hide = true)]
    period: NonZeroU64,
    /// Exit after this many lines instead of running forever
    #[arg(long, hide = true)]
    periods: Option<u64>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    Config::from_env().init_logging();

    let mut counter = BusyCounter::new(args.period);
    if let Some(periods) = args.periods {
        counter = counter.with_limit(periods);
    }

    let stdout = std::io::stdout();
    match counter.run(&mut stdout.lock()) {
        Ok(lines) => {
            log::info!("stopped after {} periods", lines);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("writing to stdout: {}", e);
            ExitCode::FAILURE
        }
    }
}
