//! Base lengths read from text: one decimal integer per line, blank lines
//! ignored. Used to sweep over a precomputed list of primes.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    num::ParseIntError,
    path::{Path, PathBuf},
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LengthSourceError {
    #[error("failed to open length list {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read line {line} of length list")]
    Io {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: {text:?} is not a length")]
    Parse {
        line: usize,
        text: String,
        #[source]
        source: ParseIntError,
    },
}

/// Lazily parses lengths from `reader`. Line numbers in errors are one-based.
///
/// # Examples
///
/// ```
/// use pivrot::lengths::parse_lengths;
///
/// let lengths: Vec<usize> = parse_lengths("2\n3\n5\n\n7\n".as_bytes())
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(lengths, vec![2, 3, 5, 7]);
/// ```
pub fn parse_lengths<R: BufRead>(
    reader: R,
) -> impl Iterator<Item = Result<usize, LengthSourceError>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let line_no = i + 1;
            let text = match line {
                Ok(text) => text,
                Err(source) => {
                    return Some(Err(LengthSourceError::Io {
                        line: line_no,
                        source,
                    }))
                }
            };
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            Some(
                trimmed
                    .parse::<usize>()
                    .map_err(|source| LengthSourceError::Parse {
                        line: line_no,
                        text: trimmed.to_owned(),
                        source,
                    }),
            )
        })
}

/// Opens `path` and parses it with [`parse_lengths`].
pub fn read_lengths(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<usize, LengthSourceError>>, LengthSourceError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LengthSourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_lengths(BufReader::new(file)))
}

/// Yields the lengths of a fallible source until its first error, which is
/// kept for [`UntilError::finish`]. Lets a consumer that only takes plain
/// lengths stream straight from the source.
///
/// # Examples
///
/// ```
/// use pivrot::lengths::{parse_lengths, UntilError};
///
/// let mut lengths = UntilError::new(parse_lengths("2\n3\nfive\n7\n".as_bytes()));
/// assert_eq!(lengths.by_ref().collect::<Vec<_>>(), vec![2, 3]);
/// assert!(lengths.finish().is_err());
/// ```
#[derive(Debug)]
pub struct UntilError<I> {
    inner: I,
    error: Option<LengthSourceError>,
}

impl<I> UntilError<I>
where
    I: Iterator<Item = Result<usize, LengthSourceError>>,
{
    pub fn new(inner: I) -> Self {
        UntilError { inner, error: None }
    }

    /// The error that ended the iteration, if any.
    pub fn finish(self) -> Result<(), LengthSourceError> {
        self.error.map_or(Ok(()), Err)
    }
}

impl<I> Iterator for UntilError<I>
where
    I: Iterator<Item = Result<usize, LengthSourceError>>,
{
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.error.is_some() {
            return None;
        }
        match self.inner.next()? {
            Ok(length) => Some(length),
            Err(err) => {
                self.error = Some(err);
                None
            }
        }
    }
}
