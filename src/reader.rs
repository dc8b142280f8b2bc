// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Line-level plumbing shared by the grid and cut readers.
//!
//! Both formats are count-then-data: a header declares how many lines
//! follow, and the readers drive bounded loops from those counts. The
//! [`LineReader`] tracks line numbers so errors can point at the offending
//! line, and distinguishes "file ended early" from "token is garbage".

use std::io::BufRead;

use crate::errors::{FormatError, ReadError, TruncatedFileError};

/// A line source that counts lines as they are consumed.
pub(crate) struct LineReader<R: BufRead> {
    lines: std::io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> LineReader<R> {
    pub(crate) fn new(reader: R) -> Self {
        LineReader {
            lines: reader.lines(),
            line_no: 0,
        }
    }

    /// The number of lines consumed so far; also the 1-based number of the
    /// most recently returned line.
    pub(crate) fn line_no(&self) -> usize {
        self.line_no
    }

    /// The next line, or `None` at end of input.
    pub(crate) fn next_line(&mut self) -> Result<Option<String>, ReadError> {
        match self.lines.next() {
            Some(line) => {
                self.line_no += 1;
                Ok(Some(line?))
            }
            None => Ok(None),
        }
    }

    /// The next line that isn't blank, or `None` at end of input.
    pub(crate) fn next_nonblank_line(&mut self) -> Result<Option<String>, ReadError> {
        while let Some(line) = self.next_line()? {
            if !line.trim().is_empty() {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }

    /// A line that a header has promised is present. `missing` is how many
    /// declared data lines (this one included) are still owed, so that a
    /// truncated file reports how short it fell.
    pub(crate) fn expect_line(&mut self, missing: usize) -> Result<String, ReadError> {
        match self.next_line()? {
            Some(line) => Ok(line),
            None => Err(TruncatedFileError {
                line: self.line_no,
                missing,
            }
            .into()),
        }
    }
}

/// Parse a whitespace token as a float, blaming `line` on failure.
pub(crate) fn parse_float(token: &str, line: usize) -> Result<f64, FormatError> {
    token.parse().map_err(|_| FormatError::NotANumber {
        line,
        token: token.to_string(),
    })
}

/// Parse a whitespace token as an integer, blaming `line` on failure.
pub(crate) fn parse_int(token: &str, line: usize) -> Result<i64, FormatError> {
    token.parse().map_err(|_| FormatError::NotANumber {
        line,
        token: token.to_string(),
    })
}

/// Parse an integer that the format requires to be positive, returning it
/// as a count.
pub(crate) fn parse_count(
    token: &str,
    name: &'static str,
    line: usize,
) -> Result<usize, FormatError> {
    let value = parse_int(token, line)?;
    if value <= 0 {
        return Err(FormatError::NonPositiveCount { line, name, value });
    }
    Ok(value as usize)
}

/// Split a line into whitespace fields, requiring at least `expected` of
/// them.
pub(crate) fn require_fields(
    line: &str,
    expected: usize,
    line_no: usize,
) -> Result<Vec<&str>, FormatError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < expected {
        return Err(FormatError::FieldCount {
            line: line_no,
            expected,
            found: fields.len(),
        });
    }
    Ok(fields)
}
