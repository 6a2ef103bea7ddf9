//! # Results table
//!
//! Drives an [`OrderEngine`] over a sequence of base lengths and renders one
//! tab-separated row per length:
//!
//! ```text
//! base length	real length	perm. order	cycle count	cycles
//! -----------	-----------	-----------	-----------	------
//! 11		11		15		2		[3, 5]
//! ```
//!
//! Rows are computed on demand, so unbounded length sources can be streamed.

use std::{
    array,
    io::{self, Write},
    iter::FusedIterator,
};

use itertools::Itertools;
use thiserror::Error;
use tracing::warn;

use crate::{
    engine::{OrderEngine, OrderError, OrderRecord},
    transform::{PivotRotation, SequenceTransform},
};

pub const HEADERS: [&str; 5] = [
    "base length",
    "real length",
    "perm. order",
    "cycle count",
    "cycles",
];

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("failed to write results table")]
    Io(#[from] io::Error),
}

/// The header line followed by a line of dashes as wide as each header.
pub fn header_lines() -> [String; 2] {
    [
        HEADERS.iter().join("\t"),
        HEADERS.iter().map(|h| "-".repeat(h.len())).join("\t"),
    ]
}

/// Renders the data row of `record`.
pub fn format_row(record: &OrderRecord) -> String {
    [
        record.base_length().to_string(),
        record.length().to_string(),
        record.order().to_string(),
        record.cycle_count().to_string(),
        format!("[{}]", record.distinct_cycle_lengths().iter().join(", ")),
    ]
    .iter()
    .join("\t\t")
}

pub struct ReportGenerator<'a, S = PivotRotation> {
    engine: &'a OrderEngine<S>,
    length_transform: Box<dyn Fn(usize) -> Option<usize> + 'a>,
    verify: bool,
}

impl<'a, S: SequenceTransform> ReportGenerator<'a, S> {
    pub fn new(engine: &'a OrderEngine<S>) -> Self {
        ReportGenerator {
            engine,
            length_transform: Box::new(Some::<usize>),
            verify: false,
        }
    }

    /// Maps each base length to the length of the sequence actually transformed.
    pub fn with_length_transform(mut self, length_transform: impl Fn(usize) -> usize + 'a) -> Self {
        self.length_transform = Box::new(move |n| Some(length_transform(n)));
        self
    }

    /// Like [`ReportGenerator::with_length_transform`], for a transform that
    /// returns `None` when a base length has no valid sequence length. Such a
    /// base length ends the table with [`OrderError::LengthOverflow`].
    pub fn with_checked_length_transform(
        mut self,
        length_transform: impl Fn(usize) -> Option<usize> + 'a,
    ) -> Self {
        self.length_transform = Box::new(length_transform);
        self
    }

    /// Cross-checks every row with [`OrderEngine::check_order`]. Rows whose
    /// verification runs out of iterations are still emitted.
    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn record(&self, base_length: usize) -> Result<OrderRecord, OrderError> {
        let record = self
            .engine
            .try_record_with(base_length, self.length_transform.as_ref())?;

        if self.verify {
            match self.engine.check_order(&record) {
                Ok(_) => {}
                Err(err) if !err.is_fatal() => {
                    warn!(base_length, length = record.length(), %err, "order left unverified");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(record)
    }

    pub fn row(&self, base_length: usize) -> Result<String, OrderError> {
        self.record(base_length).map(|record| format_row(&record))
    }

    /// The header lines, then one row per base length. The first fatal error is
    /// yielded and ends the iteration.
    pub fn rows<I>(&self, lengths: I) -> Rows<'_, 'a, S, I::IntoIter>
    where
        I: IntoIterator<Item = usize>,
    {
        Rows {
            report: self,
            header: header_lines().into_iter(),
            lengths: lengths.into_iter(),
            done: false,
        }
    }

    /// Writes every line of [`ReportGenerator::rows`] to `writer` as soon as it
    /// is computed. Returns the number of data rows written.
    pub fn write_to<I, W>(&self, lengths: I, mut writer: W) -> Result<usize, ReportError>
    where
        I: IntoIterator<Item = usize>,
        W: Write,
    {
        let mut written = 0;
        for (i, line) in self.rows(lengths).enumerate() {
            writeln!(writer, "{}", line?)?;
            writer.flush()?;
            if i >= HEADERS_LINES {
                written += 1;
            }
        }
        Ok(written)
    }
}

const HEADERS_LINES: usize = 2;

/// Writes everything to `primary` and, when present, to `copy` as well.
#[derive(Debug)]
pub struct Tee<A, B> {
    primary: A,
    copy: Option<B>,
}

impl<A: Write, B: Write> Tee<A, B> {
    pub fn new(primary: A, copy: Option<B>) -> Self {
        Tee { primary, copy }
    }

    pub fn into_inner(self) -> (A, Option<B>) {
        (self.primary, self.copy)
    }
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.primary.write_all(buf)?;
        if let Some(copy) = self.copy.as_mut() {
            copy.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.primary.flush()?;
        if let Some(copy) = self.copy.as_mut() {
            copy.flush()?;
        }
        Ok(())
    }
}

pub struct Rows<'r, 'a, S, I> {
    report: &'r ReportGenerator<'a, S>,
    header: array::IntoIter<String, HEADERS_LINES>,
    lengths: I,
    done: bool,
}

impl<S, I> Iterator for Rows<'_, '_, S, I>
where
    S: SequenceTransform,
    I: Iterator<Item = usize>,
{
    type Item = Result<String, OrderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(line) = self.header.next() {
            return Some(Ok(line));
        }
        let Some(base_length) = self.lengths.next() else {
            self.done = true;
            return None;
        };
        let row = self.report.row(base_length);
        if row.is_err() {
            self.done = true;
        }
        Some(row)
    }
}

impl<S, I> FusedIterator for Rows<'_, '_, S, I>
where
    S: SequenceTransform,
    I: Iterator<Item = usize>,
{
}
