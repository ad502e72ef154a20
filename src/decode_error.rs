//! Errors raised while building decoders or converting cell text
use std::fmt::Display;

/// Type alias for a `Result` with [`DError`] as the error type.
pub type DResult<T> = Result<T, DError>;

/// An error related to decoding a column of raw text cells.
///
/// All of these are fatal to the column being decoded: nothing is retried and
/// no partial column is returned.
#[derive(Debug)]
pub enum DError {
    /// Indicates that a column type name did not match any supported type.
    UnsupportedColumnType(String),
    /// Indicates that a factor column specification lacked its `levels` or `ordered` field.
    MissingFactorField(&'static str),
    /// Indicates that a factor column specification listed the same level twice.
    DuplicateLevel(String),
    /// Indicates that a row index was outside the length the decoder was created with.
    RowOutOfBounds{row: usize, len: usize},
    /// Indicates that the number of column specifications and columns of cells differ.
    ColumnCountMismatch{specs: usize, columns: usize},

    /// Indicates a logical cell that was not one of `TRUE`, `T`, `FALSE` or `F`.
    MalformedBoolean(String),
    /// Indicates an integer cell that could not be parsed as a base-10 integer.
    MalformedInteger(String),
    /// Indicates a double cell that could not be parsed as a base-10 float.
    MalformedDouble(String),
    /// Indicates a character cell that was not valid UTF-8.
    InvalidUtf8(String),
    /// Indicates a factor cell whose text is not one of the declared levels.
    LevelNotFound(String),

    /// Indicates a date with a negative year.
    NegativeYear(i64),
    /// Indicates a date whose month is not in [1,12].
    MonthOutOfRange(i64),
    /// Indicates a date whose day is not in [1,31].
    DayOutOfRange(i64),
    /// Indicates February 29th in a year that is not a leap year.
    InvalidLeapDay{year: i64},
    /// Indicates a time whose hour is not in [0,23].
    HourOutOfRange(i64),
    /// Indicates a time whose minute is not in [0,59].
    MinuteOutOfRange(i64),
    /// Indicates a time whose second is not in [0,59].
    SecondOutOfRange(i64),
    /// Indicates that the text ended before all required date or time fields were found.
    TruncatedTemporalValue(&'static str),

    /// Indicates that the input ended before all rows were read.
    InputEndedEarly,
    /// Indicates that there was an I/O error while reading in a line of table data.
    TableReadError(std::io::Error, usize),
    /// Indicates that a line of table data ended before all expected columns were read.
    TableLineEndedEarly{line_num: usize, ncol: usize},
    /// Indicates that a line of table data had more cells than there are columns.
    TableLineTooLong{line_num: usize, ncol: usize},

    /// Indicates a failure converting decoded columns into a dataframe.
    #[cfg(feature = "dataframes")]
    DataFrameError(polars::error::PolarsError),
}

impl Display for DError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedColumnType(name) => write!(f, "Unsupported column type: '{name}'"),
            Self::MissingFactorField(field) => write!(f, "Factor column specification is missing its '{field}' field"),
            Self::DuplicateLevel(level) => write!(f, "Factor level '{level}' is declared more than once"),
            Self::RowOutOfBounds { row, len } => write!(f, "Row {row} is out of bounds for a column of length {len}"),
            Self::ColumnCountMismatch { specs, columns } => write!(f, "Got {specs} column specifications for {columns} columns of cells"),
            Self::MalformedBoolean(s) => write!(f, "Could not parse '{s}' as a logical value"),
            Self::MalformedInteger(s) => write!(f, "Could not parse '{s}' as an integer"),
            Self::MalformedDouble(s) => write!(f, "Could not parse '{s}' as a double"),
            Self::InvalidUtf8(s) => write!(f, "Cell text is not valid UTF-8: '{s}'"),
            Self::LevelNotFound(s) => write!(f, "Value '{s}' is not in the list of allowed levels"),
            Self::NegativeYear(y) => write!(f, "Cannot parse date with a negative year ({y})"),
            Self::MonthOutOfRange(m) => write!(f, "Cannot parse date with month {m} not in [1,12]"),
            Self::DayOutOfRange(d) => write!(f, "Cannot parse date with day {d} not in [1,31]"),
            Self::InvalidLeapDay { year } => write!(f, "Cannot parse Feb 29th of non-leap year {year} as a date"),
            Self::HourOutOfRange(h) => write!(f, "Cannot parse time with hour {h} not in [0,23]"),
            Self::MinuteOutOfRange(m) => write!(f, "Cannot parse time with minute {m} not in [0,59]"),
            Self::SecondOutOfRange(s) => write!(f, "Cannot parse time with second {s} not in [0,59]"),
            Self::TruncatedTemporalValue(context) => write!(f, "Text ended before a complete {context} value was read"),
            Self::InputEndedEarly => write!(f, "The input ended before all rows were read"),
            Self::TableReadError(e, line_num) => write!(f, "Error reading line {line_num} of table data: {e}"),
            Self::TableLineEndedEarly { line_num, ncol } => write!(f, "Line {line_num} of table data ended before all {ncol} columns were read"),
            Self::TableLineTooLong { line_num, ncol } => write!(f, "Line {line_num} of table data has more than {ncol} columns"),
            #[cfg(feature = "dataframes")]
            Self::DataFrameError(e) => write!(f, "Error building dataframe: {e}"),
        }
    }
}

impl std::error::Error for DError {}

#[cfg(feature = "dataframes")]
impl From<polars::error::PolarsError> for DError {
    fn from(value: polars::error::PolarsError) -> Self {
        Self::DataFrameError(value)
    }
}

impl DError {
    /// `true` for errors that come from the column specification rather than the cell text.
    pub fn is_config_error(&self) -> bool {
        matches!(self,
            Self::UnsupportedColumnType(_) | Self::MissingFactorField(_) | Self::DuplicateLevel(_)
        )
    }

    /// `true` for errors raised by the date/time parser.
    pub fn is_temporal_error(&self) -> bool {
        matches!(self,
            Self::NegativeYear(_) | Self::MonthOutOfRange(_) | Self::DayOutOfRange(_)
            | Self::InvalidLeapDay { .. } | Self::HourOutOfRange(_) | Self::MinuteOutOfRange(_)
            | Self::SecondOutOfRange(_) | Self::TruncatedTemporalValue(_)
        )
    }

    pub(crate) fn lossy(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }
}
