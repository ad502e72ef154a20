//! Decode columns of raw text cells into typed, NA-aware columns.
//!
//! Each column is described by a [`ColumnSpec`](column_specs::ColumnSpec), either built
//! directly, deserialized (with the `serde` feature), or parsed from a compact string
//! such as `"c i d D f[lo,hi] _"`. A [`Decoder`](decoders::Decoder) is created per column;
//! it receives each cell's bytes and produces a [`Column`](column::Column) of
//! logical, integer, double, character, factor, date, date-time or time values.
//!
//! ```
//! use coldecode::column::ColumnData;
//! use coldecode::column_specs::ColumnSpecs;
//! use coldecode::decoders::DecodeSettings;
//! use coldecode::table::decode_columns;
//!
//! let specs = ColumnSpecs::parse("D i").unwrap();
//! let cells = vec![vec!["1970-01-02", "NA"], vec!["7", "8"]];
//! let cols = decode_columns(specs.as_slice(), &cells, &DecodeSettings::default()).unwrap();
//! assert_eq!(cols[0].as_ref().unwrap().data(), &ColumnData::Date(vec![Some(1), None]));
//! ```
//!
//! With the `dataframes` feature, decoded columns can be converted to Polars
//! series and dataframes.
extern crate pest;
#[macro_use]
extern crate pest_derive;

pub mod decode_error;
pub mod calendar;
pub mod temporal;
pub mod column;
pub mod column_specs;
pub mod decoders;
pub mod source;
pub mod table;
#[cfg(feature = "dataframes")]
pub mod dataframes;

pub use column::{Column, ColumnData, TypeTag};
pub use column_specs::{ColumnSpec, ColumnSpecs, ColumnType};
pub use decode_error::{DError, DResult};
pub use decoders::{DecodeSettings, Decoder, NaMarkers};
