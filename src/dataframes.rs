//! Convert decoded columns into Polars `Series` and `DataFrame`s.
//!
//! Temporal columns map onto Polars' logical types: dates become `Date` (days),
//! timestamps become `Datetime` in milliseconds with no time zone, and times of day
//! become `Time` (nanoseconds). Factor columns become string series of their level
//! labels. NA cells become nulls.
use polars::prelude::*;

use crate::column::{Column, ColumnData};
use crate::decode_error::{DError, DResult};

const MILLIS_PER_SECOND: i64 = 1_000;
const NANOS_PER_SECOND: i64 = 1_000_000_000;

fn scale_seconds(values: &[Option<i64>], factor: i64, name: &str) -> DResult<Int64Chunked> {
    let scaled = values.iter()
        .map(|v| match v {
            Some(s) => s.checked_mul(factor).map(Some).ok_or_else(|| {
                PolarsError::ComputeError(format!("Value {s} in column '{name}' overflows when scaled to a finer time unit").into())
            }),
            None => Ok(None),
        })
        .collect::<Result<Vec<Option<i64>>, PolarsError>>()?;
    let mut ca: Int64Chunked = scaled.into_iter().collect();
    ca.rename(name);
    Ok(ca)
}

impl Column {
    /// Convert this column into a Polars `Series` named `name`.
    ///
    /// Fails only if a date or timestamp is too far from 1970 to be represented in
    /// Polars' physical type for it.
    pub fn to_series(&self, name: &str) -> DResult<Series> {
        let series = match self.data() {
            ColumnData::Logical(v) => Series::new(name, v),
            ColumnData::Integer(v) => Series::new(name, v),
            ColumnData::Double(v) => Series::new(name, v),
            ColumnData::Character(v) => Series::new(name, v),
            ColumnData::Factor(v) => {
                let labels: Vec<Option<&str>> = (0..v.len()).map(|i| self.factor_label(i)).collect();
                Series::new(name, labels)
            },
            ColumnData::Date(v) => {
                let days = v.iter()
                    .map(|d| d.map(i32::try_from).transpose())
                    .collect::<Result<Vec<Option<i32>>, _>>()
                    .map_err(|_| PolarsError::ComputeError(format!("Column '{name}' has a date outside the range Polars can represent").into()))?;
                let mut ca: Int32Chunked = days.into_iter().collect();
                ca.rename(name);
                ca.into_date().into_series()
            },
            ColumnData::POSIXct(v) => {
                scale_seconds(v, MILLIS_PER_SECOND, name)?
                    .into_datetime(TimeUnit::Milliseconds, None)
                    .into_series()
            },
            ColumnData::Time(v) => {
                scale_seconds(v, NANOS_PER_SECOND, name)?
                    .into_time()
                    .into_series()
            },
        };
        Ok(series)
    }
}

/// Build a dataframe from decoded columns, naming column `i` with `names[i]`.
///
/// This will return an error if:
/// - `names` and `columns` differ in length (`DError::ColumnCountMismatch`),
/// - any column cannot be converted by [`Column::to_series`], or
/// - the columns differ in length (`DError::DataFrameError`).
pub fn to_dataframe<S: AsRef<str>>(names: &[S], columns: &[Column]) -> DResult<DataFrame> {
    if names.len() != columns.len() {
        return Err(DError::ColumnCountMismatch { specs: names.len(), columns: columns.len() });
    }

    let series = names.iter()
        .zip(columns.iter())
        .map(|(n, c)| c.to_series(n.as_ref()))
        .collect::<DResult<Vec<Series>>>()?;
    Ok(DataFrame::new(series)?)
}
