//! Busy-counter
//!
//! An intentionally endless loop that exists to be stopped from outside:
//! attach a debugger (or press Ctrl+C under gdb) and inspect the counter.
//! Every `period` increments it prints how many periods have elapsed.

use std::hint::black_box;
use std::io::{self, Write};
use std::num::NonZeroU64;

/// Increments between two output lines
pub const PERIOD: u64 = 100_000_000;

pub const DEFAULT_PERIOD: NonZeroU64 = match NonZeroU64::new(PERIOD) {
    Some(period) => period,
    None => panic!("PERIOD must be non-zero"),
};

#[derive(Debug, Clone, Copy)]
pub struct BusyCounter {
    period: NonZeroU64,
    /// Stop after this many lines. `None` runs forever.
    limit: Option<u64>,
}

impl Default for BusyCounter {
    fn default() -> Self {
        BusyCounter {
            period: DEFAULT_PERIOD,
            limit: None,
        }
    }
}

impl BusyCounter {
    pub fn new(period: NonZeroU64) -> Self {
        BusyCounter {
            period,
            limit: None,
        }
    }

    pub fn with_limit(mut self, periods: u64) -> Self {
        self.limit = Some(periods);
        self
    }

    pub fn period(&self) -> u64 {
        self.period.get()
    }

    /// Count, writing `<elapsed periods>\n` to `out` every period.
    ///
    /// Without a limit this only returns on a write error. With a limit it
    /// returns the number of lines written once the limit is reached.
    pub fn run<W: Write>(&self, out: &mut W) -> io::Result<u64> {
        let period = self.period.get();
        log::debug!("counting with period {} limit {:?}", period, self.limit);

        if self.limit == Some(0) {
            return Ok(0);
        }

        let mut i: u64 = 0;
        loop {
            // Keep the increment observable so the loop is not folded away.
            i = black_box(i + 1);
            if i % period == 0 {
                let elapsed = i / period;
                writeln!(out, "{}", elapsed)?;
                out.flush()?;
                if self.limit == Some(elapsed) {
                    return Ok(elapsed);
                }
            }
        }
    }
}
