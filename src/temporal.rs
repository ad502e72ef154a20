//! Positional parsing of date and time text.
//!
//! The parser does not take a format string. It walks the text once, skipping
//! any run of non-digit bytes and reading each run of digits as the next field,
//! so `"2020-01-05"`, `"2020/01/05"` and `"xx2020..01//05"` all read as the
//! same date. Dates are read as year, month, day and times as hour, minute,
//! second. A timestamp is a date followed by a time.
//!
//! Digit runs accumulate without an overflow check (32-bit wrapping), so very
//! long runs produce meaningless values rather than an error.
use crate::calendar::{self, SECONDS_IN_DAY};
use crate::decode_error::{DError, DResult};

const DATE_CONTEXT: &str = "date";
const TIME_CONTEXT: &str = "time";
const DATETIME_CONTEXT: &str = "date-time";

/// Forward-only cursor over one cell's bytes.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn has_more(&self) -> bool {
        self.pos < self.bytes.len()
    }

    fn peek_digit(&self) -> Option<u8> {
        self.bytes.get(self.pos)
            .filter(|b| b.is_ascii_digit())
            .map(|b| b - b'0')
    }

    fn skip_non_digit(&mut self) {
        while self.has_more() && self.peek_digit().is_none() {
            self.pos += 1;
        }
    }

    fn read_int(&mut self) -> i32 {
        let mut value: i32 = 0;
        while let Some(d) = self.peek_digit() {
            value = value.wrapping_mul(10).wrapping_add(i32::from(d));
            self.pos += 1;
        }
        value
    }

    /// Skip separators then read the next field, failing if the text ends first.
    fn next_field(&mut self, context: &'static str) -> DResult<i64> {
        self.skip_non_digit();
        if !self.has_more() {
            return Err(DError::TruncatedTemporalValue(context));
        }
        Ok(i64::from(self.read_int()))
    }

    fn read_date(&mut self, context: &'static str) -> DResult<i64> {
        let year = self.next_field(context)?;
        if year < 0 {
            return Err(DError::NegativeYear(year));
        }
        let month = self.next_field(context)?;
        if !(1..=12).contains(&month) {
            return Err(DError::MonthOutOfRange(month));
        }
        let day = self.next_field(context)?;
        calendar::day_offset(year, month, day)
    }

    fn read_time(&mut self, context: &'static str) -> DResult<i64> {
        let hour = self.next_field(context)?;
        if !(0..=23).contains(&hour) {
            return Err(DError::HourOutOfRange(hour));
        }
        let minute = self.next_field(context)?;
        if !(0..=59).contains(&minute) {
            return Err(DError::MinuteOutOfRange(minute));
        }
        let second = self.next_field(context)?;
        calendar::seconds_of_day(hour, minute, second)
    }
}

/// Parse date text into a day offset from 1970-01-01.
pub fn parse_date(text: &[u8]) -> DResult<i64> {
    Cursor::new(text).read_date(DATE_CONTEXT)
}

/// Parse time text into seconds since midnight.
pub fn parse_time(text: &[u8]) -> DResult<i64> {
    Cursor::new(text).read_time(TIME_CONTEXT)
}

/// Parse date-time text into seconds since 1970-01-01 00:00:00.
///
/// The time part is required; text that ends after the day is an error.
pub fn parse_timestamp(text: &[u8]) -> DResult<i64> {
    let mut cursor = Cursor::new(text);
    let days = cursor.read_date(DATETIME_CONTEXT)?;
    let seconds = cursor.read_time(DATETIME_CONTEXT)?;
    Ok(days * SECONDS_IN_DAY + seconds)
}
