//! # Call timing
//!
//! Optional instrumentation for the order engine. A [`TimingLog`] appends one
//! line per instrumented call to a log file:
//!
//! ```text
//! 0.000001234	: 'algorithm'	 called with '<Iterable, len: 5>'
//! ```
//!
//! Every timed call is also emitted as a `tracing` event at `TRACE` level.
//! A failing log write never interrupts the computation being timed.

use std::{
    cell::RefCell,
    fmt,
    fs::{File, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    time::Instant,
};

use tracing::{trace, warn};

#[derive(Debug)]
pub struct TimingLog {
    path: PathBuf,
    writer: RefCell<BufWriter<File>>,
}

impl TimingLog {
    /// Opens `path` for appending, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(TimingLog {
            path,
            writer: RefCell::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `f` and records how long it took.
    pub fn time<R>(&self, name: &str, args: impl fmt::Display, f: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let ret = f();
        let elapsed = start.elapsed().as_secs_f64();
        let args = args.to_string();

        trace!(call = name, args = %args, elapsed, "timed call");

        let mut writer = self.writer.borrow_mut();
        if let Err(err) = writeln!(writer, "{elapsed:.9}\t: '{name}'\t called with '{args}'") {
            warn!(path = %self.path.display(), %err, "failed to write timing log");
        }
        ret
    }

    pub fn flush(&self) -> io::Result<()> {
        self.writer.borrow_mut().flush()
    }
}

impl Drop for TimingLog {
    fn drop(&mut self) {
        if let Err(err) = self.writer.get_mut().flush() {
            warn!(path = %self.path.display(), %err, "failed to flush timing log");
        }
    }
}

/// Times `f` through `log` when one is configured, otherwise just runs it.
pub fn timed<R>(
    log: Option<&TimingLog>,
    name: &str,
    args: impl fmt::Display,
    f: impl FnOnce() -> R,
) -> R {
    match log {
        Some(log) => log.time(name, args, f),
        None => f(),
    }
}
