//! Decode whole tables: one decoder per column.
//!
//! [`read_table`] pulls cells row by row from a [`TokenSource`], which is how a
//! streaming reader drives the decoders. [`decode_columns`] takes cells that have
//! already been split into columns and decodes each column on its own rayon task.
//!
//! Both stop at the first bad cell. The error is an [`error_stack::Report`] whose
//! context is a [`TableError`] naming the column and row, with the underlying
//! [`DError`] beneath it:
//!
//! ```
//! use coldecode::column_specs::ColumnSpecs;
//! use coldecode::decode_error::DError;
//! use coldecode::decoders::DecodeSettings;
//! use coldecode::table::decode_columns;
//!
//! let specs = ColumnSpecs::parse("i d").unwrap();
//! let cells = vec![vec!["1", "2"], vec!["1.5", "oops"]];
//! let report = decode_columns(specs.as_slice(), &cells, &DecodeSettings::default()).unwrap_err();
//! assert_eq!(report.current_context().row(), Some(1));
//! assert!(matches!(report.downcast_ref::<DError>(), Some(DError::MalformedDouble(_))));
//! ```
use std::fmt::Display;

use error_stack::Report;
use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::column::Column;
use crate::column_specs::ColumnSpec;
use crate::decode_error::{DError, DResult};
use crate::decoders::{DecodeSettings, Decoder, NaMarkers};
use crate::source::TokenSource;

/// A type alias for `Result` with a [`TableError`] report as the error type.
pub type TResult<T> = error_stack::Result<T, TableError>;

/// Where in a table decoding failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableError {
    column: Option<usize>,
    row: Option<usize>,
}

impl TableError {
    /// The 0-based index of the column being decoded, if the failure belongs to one.
    pub fn column(&self) -> Option<usize> {
        self.column
    }

    /// The 0-based row being decoded, if the failure happened while reading a row.
    pub fn row(&self) -> Option<usize> {
        self.row
    }
}

impl Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.column, self.row) {
            (Some(c), Some(r)) => write!(f, "Could not decode row {r} of column {c}"),
            (Some(c), None) => write!(f, "Could not set up decoding for column {c}"),
            (None, Some(r)) => write!(f, "Could not read row {r}"),
            (None, None) => write!(f, "Could not decode table"),
        }
    }
}

impl std::error::Error for TableError {}

fn abort(err: DError, column: Option<usize>, row: Option<usize>) -> Report<TableError> {
    warn!(?column, ?row, error = %err, "aborting table decode");
    Report::new(err).change_context(TableError { column, row })
}

fn create_decoders(specs: &[ColumnSpec], n_rows: usize) -> TResult<Vec<Decoder>> {
    specs.iter()
        .enumerate()
        .map(|(col, spec)| {
            Decoder::create(spec, n_rows).map_err(|e| {
                abort(e, Some(col), None).attach_printable(format!("Column specification: {spec}"))
            })
        })
        .collect()
}

/// Read `n_rows` rows from `source` and decode them according to `specs`.
///
/// Skipped columns consume their cell but do not appear in the output, so the
/// returned vector holds one column per non-skip specification, in order.
pub fn read_table<S: TokenSource>(source: &mut S, specs: &[ColumnSpec], n_rows: usize, settings: &DecodeSettings) -> TResult<Vec<Column>> {
    debug!(columns = specs.len(), rows = n_rows, "reading table");
    let mut decoders = create_decoders(specs, n_rows)?;
    let na = settings.na();

    for row in 0..n_rows {
        trace!(row, "decoding row");
        for (col, decoder) in decoders.iter_mut().enumerate() {
            let step = if decoder.should_skip() {
                source.skip()
            } else {
                source.next_token(decoder.trims())
                    .and_then(|token| decoder.set(row, token, na))
            };
            step.map_err(|e| abort(e, Some(col), Some(row)))?;
        }
        source.finish_record().map_err(|e| abort(e, None, Some(row)))?;
    }

    let columns: Vec<Column> = decoders.into_iter().filter_map(Decoder::finish).collect();
    debug!(columns = columns.len(), rows = n_rows, "finished reading table");
    Ok(columns)
}

fn decode_column<T: AsRef<[u8]>>(spec: &ColumnSpec, cells: &[T], na: &NaMarkers) -> Result<Option<Column>, (DError, Option<usize>)> {
    let mut decoder = Decoder::create(spec, cells.len()).map_err(|e| (e, None))?;
    for (row, cell) in cells.iter().enumerate() {
        decoder.set(row, cell.as_ref(), na).map_err(|e| (e, Some(row)))?;
    }
    Ok(decoder.finish())
}

/// Decode column-major cells, one column per rayon task.
///
/// `cells[j]` holds every cell of column `j`, which is decoded according to `specs[j]`.
/// Columns may differ in length. The output has one entry per specification, with
/// `None` for skipped columns.
pub fn decode_columns<T>(specs: &[ColumnSpec], cells: &[Vec<T>], settings: &DecodeSettings) -> TResult<Vec<Option<Column>>>
where T: AsRef<[u8]> + Sync
{
    if specs.len() != cells.len() {
        return Err(abort(DError::ColumnCountMismatch { specs: specs.len(), columns: cells.len() }, None, None));
    }
    debug!(columns = specs.len(), "decoding columns in parallel");

    let na = settings.na();
    specs.par_iter()
        .zip(cells.par_iter())
        .enumerate()
        .map(|(col, (spec, column_cells))| {
            decode_column(spec, column_cells, na).map_err(|(e, row)| abort(e, Some(col), row))
        })
        .collect()
}

/// Decode a single column of cells on the current thread.
pub fn decode_column_cells<T: AsRef<[u8]>>(spec: &ColumnSpec, cells: &[T], settings: &DecodeSettings) -> DResult<Option<Column>> {
    decode_column(spec, cells, settings.na()).map_err(|(e, _)| e)
}
