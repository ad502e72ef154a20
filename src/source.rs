//! Where cell text comes from.
//!
//! Decoders never read input themselves. A [`TokenSource`] hands out one cell at a
//! time, row by row, and owns all cursor movement through the underlying data.
//! Real tokenizers (quoting, escapes, multi-line cells) live outside this crate and
//! only need to implement the trait; [`DelimitedSource`] is a minimal one for
//! simple delimited text.
use std::io::BufRead;

use crate::decode_error::{DError, DResult};
use crate::decoders::trim_ascii;

/// A row-major stream of cell tokens.
pub trait TokenSource {
    /// Return the next cell's raw bytes, with surrounding whitespace removed if `trim` is set.
    ///
    /// The returned slice is only valid until the next call on the source.
    fn next_token(&mut self, trim: bool) -> DResult<&[u8]>;

    /// Consume the next cell without returning it.
    fn skip(&mut self) -> DResult<()> {
        self.next_token(false).map(|_| ())
    }

    /// Called after the last cell of each row has been consumed.
    fn finish_record(&mut self) -> DResult<()> {
        Ok(())
    }
}

/// Splits each line of a reader on a single delimiter byte.
///
/// There is no quoting: every delimiter byte separates cells. A trailing `\n` or
/// `\r\n` ends each line. Each line must hold exactly `ncol` cells.
///
/// ```
/// # use std::io::BufReader;
/// # use coldecode::source::{DelimitedSource, TokenSource};
/// let mut src = DelimitedSource::new(BufReader::new("a, b\n".as_bytes()), b',', 2);
/// assert_eq!(src.next_token(false).unwrap(), b"a");
/// assert_eq!(src.next_token(true).unwrap(), b"b");
/// src.finish_record().unwrap();
/// ```
pub struct DelimitedSource<R: BufRead> {
    reader: R,
    delimiter: u8,
    ncol: usize,
    line: Vec<u8>,
    line_num: usize,
    pos: usize,
    has_line: bool,
    line_done: bool,
}

impl<R: BufRead> DelimitedSource<R> {
    pub fn new(reader: R, delimiter: u8, ncol: usize) -> Self {
        Self { reader, delimiter, ncol, line: vec![], line_num: 0, pos: 0, has_line: false, line_done: false }
    }

    /// Discard the next `n` lines, e.g. a header.
    pub fn skip_lines(&mut self, n: usize) -> DResult<()> {
        for _ in 0..n {
            self.load_line()?;
        }
        self.has_line = false;
        Ok(())
    }

    /// The 1-based number of the most recently read line.
    pub fn line_num(&self) -> usize {
        self.line_num
    }

    fn load_line(&mut self) -> DResult<()> {
        self.line.clear();
        let nread = self.reader.read_until(b'\n', &mut self.line)
            .map_err(|e| DError::TableReadError(e, self.line_num + 1))?;
        if nread == 0 {
            return Err(DError::InputEndedEarly);
        }
        self.line_num += 1;

        if self.line.last() == Some(&b'\n') {
            self.line.pop();
            if self.line.last() == Some(&b'\r') {
                self.line.pop();
            }
        }

        self.pos = 0;
        self.has_line = true;
        self.line_done = false;
        Ok(())
    }
}

impl<R: BufRead> TokenSource for DelimitedSource<R> {
    fn next_token(&mut self, trim: bool) -> DResult<&[u8]> {
        if !self.has_line {
            self.load_line()?;
        } else if self.line_done {
            return Err(DError::TableLineEndedEarly { line_num: self.line_num, ncol: self.ncol });
        }

        let delimiter = self.delimiter;
        let start = self.pos;
        let end = self.line[start..].iter()
            .position(|&b| b == delimiter)
            .map_or(self.line.len(), |i| start + i);

        if end == self.line.len() {
            self.line_done = true;
            self.pos = end;
        } else {
            self.pos = end + 1;
        }

        let token = &self.line[start..end];
        Ok(if trim { trim_ascii(token) } else { token })
    }

    fn finish_record(&mut self) -> DResult<()> {
        if self.has_line && !self.line_done {
            return Err(DError::TableLineTooLong { line_num: self.line_num, ncol: self.ncol });
        }
        self.has_line = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;
    use stringreader::StringReader;

    fn source(s: &str, ncol: usize) -> DelimitedSource<BufReader<StringReader<'_>>> {
        DelimitedSource::new(BufReader::new(StringReader::new(s)), b',', ncol)
    }

    #[test]
    fn test_tokens() -> DResult<()> {
        let mut src = source("a,b,c\r\n1, 2 ,\n", 3);
        assert_eq!(src.next_token(false)?, b"a");
        assert_eq!(src.next_token(false)?, b"b");
        assert_eq!(src.next_token(false)?, b"c");
        src.finish_record()?;
        assert_eq!(src.line_num(), 1);

        assert_eq!(src.next_token(false)?, b"1");
        assert_eq!(src.next_token(true)?, b"2");
        assert_eq!(src.next_token(false)?, b"");
        src.finish_record()?;

        assert!(matches!(src.next_token(false), Err(DError::InputEndedEarly)));
        Ok(())
    }

    #[test]
    fn test_skip() -> DResult<()> {
        let mut src = source("x,y\n1,2\n", 2);
        src.skip_lines(1)?;
        src.skip()?;
        assert_eq!(src.next_token(false)?, b"2");
        src.finish_record()?;
        assert_eq!(src.line_num(), 2);
        Ok(())
    }

    #[test]
    fn test_line_short() -> DResult<()> {
        let mut src = source("1,2\n3,4,5\n", 3);
        src.next_token(false)?;
        src.next_token(false)?;
        let e = src.next_token(false).unwrap_err();
        assert!(matches!(e, DError::TableLineEndedEarly { line_num: 1, ncol: 3 }), "Got {e:?}");
        Ok(())
    }

    #[test]
    fn test_line_long() -> DResult<()> {
        let mut src = source("1,2,3\n", 2);
        src.next_token(false)?;
        src.next_token(false)?;
        let e = src.finish_record().unwrap_err();
        assert!(matches!(e, DError::TableLineTooLong { line_num: 1, ncol: 2 }), "Got {e:?}");
        Ok(())
    }
}
