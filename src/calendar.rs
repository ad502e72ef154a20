//! Calendar arithmetic for converting date and time fields into offsets.
//!
//! Day offsets count days relative to 1970-01-01, which is day 0. Dates before
//! the baseline get negative offsets. Nothing here calls a system date library;
//! the leap-year correction below is applied separately for dates on either side
//! of the baseline year, so it must not be folded into a single formula.
//!
//! ```
//! # use coldecode::calendar::{day_offset, timestamp_offset};
//! assert_eq!(day_offset(1970, 1, 1).unwrap(), 0);
//! assert_eq!(day_offset(1969, 12, 31).unwrap(), -1);
//! assert_eq!(timestamp_offset(1970, 1, 1, 0, 0, 1).unwrap(), 1);
//! ```
use crate::decode_error::{DError, DResult};

/// The zero-point year for day offsets.
pub const BASELINE_YEAR: i64 = 1970;
pub const DAYS_IN_YEAR: i64 = 365;
pub const SECONDS_IN_DAY: i64 = 86_400;
pub const SECONDS_IN_HOUR: i64 = 3_600;
pub const SECONDS_IN_MINUTE: i64 = 60;

/// Days elapsed before the first of each month in a non-leap year.
const DAYS_AT_MONTH_START: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Gregorian leap year test.
pub fn is_leap_year(year: i64) -> bool {
    if year % 4 != 0 {
        false
    } else if year % 100 != 0 {
        true
    } else {
        year % 400 == 0
    }
}

/// Count leap years from year 1 up to `year`.
///
/// For years after the baseline the count stops one year short, i.e. it covers
/// `[1, year - 1]`; for the baseline year and earlier it covers `[1, year]`.
/// [`day_offset`] depends on this asymmetry.
pub fn count_leap_years(year: i64) -> i64 {
    let direction = i64::from(year > BASELINE_YEAR);
    let y = year - direction;
    y.div_euclid(4) - y.div_euclid(100) + y.div_euclid(400)
}

/// Number of days between 1970-01-01 and the given date.
///
/// Returns an error if the year is negative, the month is not in [1,12], the day
/// is not in [1,31], or the date is February 29th of a non-leap year. Days past
/// the end of shorter months (e.g. April 31st) are not rejected and roll into the
/// next month.
pub fn day_offset(year: i64, month: i64, day: i64) -> DResult<i64> {
    if year < 0 {
        return Err(DError::NegativeYear(year));
    }
    if !(1..=12).contains(&month) {
        return Err(DError::MonthOutOfRange(month));
    }
    if !(1..=31).contains(&day) {
        return Err(DError::DayOutOfRange(day));
    }

    let is_leap = is_leap_year(year);
    if day == 29 && month == 2 && !is_leap {
        return Err(DError::InvalidLeapDay { year });
    }

    let mut days = (year - BASELINE_YEAR) * DAYS_IN_YEAR;
    days += count_leap_years(year) - count_leap_years(BASELINE_YEAR);
    days += DAYS_AT_MONTH_START[(month - 1) as usize];

    if is_leap && year > BASELINE_YEAR && month > 2 {
        days += 1;
    } else if is_leap && year < BASELINE_YEAR && month < 3 {
        days -= 1;
    }

    Ok(days + day - 1)
}

/// Number of seconds since midnight for the given time of day.
pub fn seconds_of_day(hour: i64, minute: i64, second: i64) -> DResult<i64> {
    if !(0..=23).contains(&hour) {
        return Err(DError::HourOutOfRange(hour));
    }
    if !(0..=59).contains(&minute) {
        return Err(DError::MinuteOutOfRange(minute));
    }
    if !(0..=59).contains(&second) {
        return Err(DError::SecondOutOfRange(second));
    }

    Ok(hour * SECONDS_IN_HOUR + minute * SECONDS_IN_MINUTE + second)
}

/// Number of seconds between 1970-01-01 00:00:00 and the given instant.
pub fn timestamp_offset(year: i64, month: i64, day: i64, hour: i64, minute: i64, second: i64) -> DResult<i64> {
    let days = day_offset(year, month, day)?;
    Ok(days * SECONDS_IN_DAY + seconds_of_day(hour, minute, second)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};

    #[test]
    fn test_baseline() -> DResult<()> {
        assert_eq!(day_offset(1970, 1, 1)?, 0);
        assert_eq!(day_offset(1969, 12, 31)?, -1);
        assert_eq!(day_offset(1970, 12, 31)?, 364);
        assert_eq!(day_offset(1971, 1, 1)?, 365);
        Ok(())
    }

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(2000));
        assert!(is_leap_year(1968));
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2100));
        assert!(!is_leap_year(2023));
        assert!(is_leap_year(0));
    }

    #[test]
    fn test_leap_count() {
        assert_eq!(count_leap_years(0), 0);
        assert_eq!(count_leap_years(BASELINE_YEAR), 477);
        // 1972 itself is not counted for years past the baseline
        assert_eq!(count_leap_years(1972), 477);
        assert_eq!(count_leap_years(1973), 478);
        // but 1968 is for years before it
        assert_eq!(count_leap_years(1968), 477);
        assert_eq!(count_leap_years(1967), 476);
    }

    #[test]
    fn test_leap_day() -> DResult<()> {
        assert_eq!(day_offset(2000, 2, 29)?, 11_016);
        assert_eq!(day_offset(2000, 3, 1)?, 11_017);
        assert_eq!(day_offset(1968, 2, 29)?, -672);
        assert_eq!(day_offset(1968, 3, 1)?, -671);

        let e = day_offset(1900, 2, 29).unwrap_err();
        assert!(matches!(e, DError::InvalidLeapDay { year: 1900 }), "Got {e:?}");

        let e = day_offset(2023, 2, 29).unwrap_err();
        assert!(matches!(e, DError::InvalidLeapDay { year: 2023 }), "Got {e:?}");
        Ok(())
    }

    #[test]
    fn test_century_boundaries() -> DResult<()> {
        assert_eq!(day_offset(1900, 1, 1)?, -25_567);
        assert_eq!(day_offset(1900, 3, 1)?, -25_508);
        assert_eq!(day_offset(2100, 3, 1)?, 47_541);
        assert_eq!(day_offset(1, 1, 1)?, -719_162);
        Ok(())
    }

    #[test]
    fn test_field_ranges() {
        assert!(matches!(day_offset(-1, 1, 1), Err(DError::NegativeYear(-1))));
        assert!(matches!(day_offset(2020, 0, 1), Err(DError::MonthOutOfRange(0))));
        assert!(matches!(day_offset(2020, 13, 1), Err(DError::MonthOutOfRange(13))));
        assert!(matches!(day_offset(2020, 1, 0), Err(DError::DayOutOfRange(0))));
        assert!(matches!(day_offset(2020, 1, 32), Err(DError::DayOutOfRange(32))));
        assert!(matches!(seconds_of_day(24, 0, 0), Err(DError::HourOutOfRange(24))));
        assert!(matches!(seconds_of_day(0, 60, 0), Err(DError::MinuteOutOfRange(60))));
        assert!(matches!(seconds_of_day(0, 0, 60), Err(DError::SecondOutOfRange(60))));
    }

    #[test]
    fn test_seconds() -> DResult<()> {
        assert_eq!(seconds_of_day(0, 0, 0)?, 0);
        assert_eq!(seconds_of_day(23, 59, 59)?, 86_399);
        assert_eq!(seconds_of_day(12, 30, 15)?, 45_015);
        assert_eq!(timestamp_offset(1970, 1, 1, 0, 0, 1)?, 1);
        assert_eq!(timestamp_offset(1969, 12, 31, 23, 59, 59)?, -1);
        assert_eq!(timestamp_offset(2000, 1, 1, 0, 0, 0)?, 946_684_800);
        Ok(())
    }

    #[test]
    fn test_matches_reference_calendar() -> DResult<()> {
        // Every valid date in [1, 9999] against chrono's proleptic Gregorian calendar,
        // in both directions.
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        for year in 1..=9999 {
            for month in 1..=12u32 {
                for day in 1..=31u32 {
                    let Some(reference) = NaiveDate::from_ymd_opt(year, month, day) else { continue };
                    let offset = day_offset(year.into(), month.into(), day.into())?;
                    assert_eq!(offset, reference.signed_duration_since(epoch).num_days(), "{year}-{month}-{day}");

                    let back = epoch + chrono::Duration::days(offset);
                    assert_eq!((back.year(), back.month(), back.day()), (year, month, day));
                }
            }
        }
        Ok(())
    }
}
