//! Decode raw cell text into typed columns, one row at a time.
//!
//! # Basic usage
//!
//! Build one [`Decoder`] per column from its [`ColumnSpec`] and the number of rows,
//! hand it each row's raw cell text with [`Decoder::set`], then call
//! [`Decoder::finish`] to get the finished [`Column`]:
//!
//! ```
//! use coldecode::column_specs::{ColumnSpec, ColumnType};
//! use coldecode::decoders::{Decoder, NaMarkers};
//!
//! let na = NaMarkers::default();
//! let mut dec = Decoder::create(&ColumnSpec::new(ColumnType::Date), 2).unwrap();
//! dec.set(0, b"1970-01-02", &na).unwrap();
//! dec.set(1, b"NA", &na).unwrap();
//! let col = dec.finish().unwrap();
//! assert!(col.is_na(1));
//! ```
//!
//! # Missing values
//!
//! Before any conversion, the cell text is compared byte-for-byte against each NA
//! marker. Character columns compare after trimming (if they trim); all other types
//! compare the text exactly as given. A match stores NA and skips conversion entirely,
//! so a marker such as `"-"` never reaches the integer parser.
//!
//! # Threading
//!
//! A decoder owns its output buffer and is not meant to be shared. Columns are
//! independent, so decode them in parallel by giving each thread its own decoder;
//! [`NaMarkers`] and [`ColumnSpec`]s are read-only and can be shared freely.
use std::collections::HashMap;

use tracing::debug;

use crate::column::{Column, ColumnData, ColumnMeta, TypeTag};
use crate::column_specs::{ColumnSpec, ColumnType};
use crate::decode_error::{DError, DResult};
use crate::temporal;

/// The set of cell texts that mean "missing".
///
/// Defaults to the single marker `"NA"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaMarkers {
    markers: Vec<Vec<u8>>,
}

impl Default for NaMarkers {
    fn default() -> Self {
        Self { markers: vec![b"NA".to_vec()] }
    }
}

impl NaMarkers {
    /// Create a marker set from any list of strings or byte strings, checked in order.
    pub fn new<I, S>(markers: I) -> Self
    where I: IntoIterator<Item = S>,
          S: AsRef<[u8]>
    {
        let markers = markers.into_iter().map(|m| m.as_ref().to_vec()).collect();
        Self { markers }
    }

    /// A marker set that matches nothing, so no cell is ever NA.
    pub fn none() -> Self {
        Self { markers: vec![] }
    }

    /// `true` if `text` is exactly equal to one of the markers.
    pub fn matches(&self, text: &[u8]) -> bool {
        self.markers.iter().any(|m| m.as_slice() == text)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.markers.iter().map(|m| m.as_slice())
    }
}

/// Settings for decoding a table of cells.
///
/// To use, instantiate the default version with `DecodeSettings::default()` and
/// modify the desired settings with the public methods:
///
/// ```
/// # use coldecode::decoders::DecodeSettings;
/// let settings = DecodeSettings::default().na_markers(["", "NA", "-"]);
/// assert!(settings.na().matches(b"-"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DecodeSettings {
    na: NaMarkers,
}

impl DecodeSettings {
    /// Set the cell texts treated as missing values.
    ///
    /// Default is `["NA"]`.
    pub fn na_markers<I, S>(mut self, markers: I) -> Self
    where I: IntoIterator<Item = S>,
          S: AsRef<[u8]>
    {
        self.na = NaMarkers::new(markers);
        self
    }

    pub fn na(&self) -> &NaMarkers {
        &self.na
    }
}

/// Strip leading and trailing ASCII whitespace.
pub(crate) fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(start, |i| i + 1);
    &bytes[start..end]
}

/// Pre-sized output storage shared by the value-producing decoders.
#[derive(Debug)]
struct Buffer<T> {
    data: Vec<Option<T>>,
}

impl<T: Clone> Buffer<T> {
    fn new(n: usize) -> Self {
        Self { data: vec![None; n] }
    }
}

impl<T> Buffer<T> {
    fn slot(&mut self, row: usize) -> DResult<&mut Option<T>> {
        let len = self.data.len();
        self.data.get_mut(row).ok_or(DError::RowOutOfBounds { row, len })
    }

    /// Store NA if `text` is a marker, otherwise the converted value.
    fn store<F>(&mut self, row: usize, text: &[u8], na: &NaMarkers, convert: F) -> DResult<()>
    where F: FnOnce(&[u8]) -> DResult<T>
    {
        let slot = self.slot(row)?;
        *slot = if na.matches(text) { None } else { Some(convert(text)?) };
        Ok(())
    }

    fn into_inner(self) -> Vec<Option<T>> {
        self.data
    }
}

#[derive(Debug)]
struct FactorDecoder {
    buf: Buffer<u32>,
    levels: Vec<String>,
    ordered: bool,
    level_map: HashMap<Box<[u8]>, u32>,
}

impl FactorDecoder {
    fn new(n: usize, levels: Vec<String>, ordered: bool) -> DResult<Self> {
        let mut level_map: HashMap<Box<[u8]>, u32> = HashMap::with_capacity(levels.len());
        for (i, level) in levels.iter().enumerate() {
            let ordinal = i as u32 + 1;
            if level_map.insert(level.as_bytes().into(), ordinal).is_some() {
                return Err(DError::DuplicateLevel(level.clone()));
            }
        }
        Ok(Self { buf: Buffer::new(n), levels, ordered, level_map })
    }

    fn set(&mut self, row: usize, text: &[u8], na: &NaMarkers) -> DResult<()> {
        let level_map = &self.level_map;
        self.buf.store(row, text, na, |t| {
            level_map.get(t)
                .copied()
                .ok_or_else(|| DError::LevelNotFound(DError::lossy(t)))
        })
    }
}

#[derive(Debug)]
enum Variant {
    Logical(Buffer<bool>),
    Integer(Buffer<i32>),
    Double(Buffer<f64>),
    Character{buf: Buffer<String>, trim: bool},
    Factor(FactorDecoder),
    Date(Buffer<i64>),
    POSIXct(Buffer<i64>),
    Time(Buffer<i64>),
    Skip{len: usize},
}

/// A decoder for one column, created from a [`ColumnSpec`] by [`Decoder::create`].
#[derive(Debug)]
pub struct Decoder {
    variant: Variant,
}

impl Decoder {
    /// Create the decoder matching `spec` for a column of `n` rows.
    ///
    /// Factor specifications must carry both `levels` and `ordered`; if either is
    /// missing this returns [`DError::MissingFactorField`], and repeated levels return
    /// [`DError::DuplicateLevel`].
    pub fn create(spec: &ColumnSpec, n: usize) -> DResult<Self> {
        debug!(kind = %spec.kind, rows = n, "creating column decoder");
        let variant = match spec.kind {
            ColumnType::Logical => Variant::Logical(Buffer::new(n)),
            ColumnType::Integer => Variant::Integer(Buffer::new(n)),
            ColumnType::Double => Variant::Double(Buffer::new(n)),
            ColumnType::Character => Variant::Character { buf: Buffer::new(n), trim: spec.trim },
            ColumnType::Factor => {
                let levels = spec.levels.clone().ok_or(DError::MissingFactorField("levels"))?;
                let ordered = spec.ordered.ok_or(DError::MissingFactorField("ordered"))?;
                Variant::Factor(FactorDecoder::new(n, levels, ordered)?)
            },
            ColumnType::Skip => Variant::Skip { len: n },
            ColumnType::Date => Variant::Date(Buffer::new(n)),
            ColumnType::POSIXct => Variant::POSIXct(Buffer::new(n)),
            ColumnType::Time => Variant::Time(Buffer::new(n)),
        };
        Ok(Self { variant })
    }

    /// Decode `token` into row `row`.
    ///
    /// Returns an error if `row` is outside the column or the text cannot be
    /// converted; the column should then be abandoned.
    pub fn set(&mut self, row: usize, token: &[u8], na: &NaMarkers) -> DResult<()> {
        match &mut self.variant {
            Variant::Logical(buf) => buf.store(row, token, na, parse_logical),
            Variant::Integer(buf) => buf.store(row, token, na, parse_integer),
            Variant::Double(buf) => buf.store(row, token, na, parse_double),
            Variant::Character { buf, trim } => {
                let text = if *trim { trim_ascii(token) } else { token };
                buf.store(row, text, na, parse_string)
            },
            Variant::Factor(dec) => dec.set(row, token, na),
            Variant::Date(buf) => buf.store(row, token, na, temporal::parse_date),
            Variant::POSIXct(buf) => buf.store(row, token, na, temporal::parse_timestamp),
            Variant::Time(buf) => buf.store(row, token, na, temporal::parse_time),
            Variant::Skip { len } => {
                if row >= *len {
                    return Err(DError::RowOutOfBounds { row, len: *len });
                }
                Ok(())
            },
        }
    }

    /// Consume the decoder and return its column, or `None` for a skipped column.
    pub fn finish(self) -> Option<Column> {
        let (data, meta) = match self.variant {
            Variant::Logical(buf) => (ColumnData::Logical(buf.into_inner()), ColumnMeta::plain(TypeTag::Logical)),
            Variant::Integer(buf) => (ColumnData::Integer(buf.into_inner()), ColumnMeta::plain(TypeTag::Integer)),
            Variant::Double(buf) => (ColumnData::Double(buf.into_inner()), ColumnMeta::plain(TypeTag::Double)),
            Variant::Character { buf, trim: _ } => (ColumnData::Character(buf.into_inner()), ColumnMeta::plain(TypeTag::Character)),
            Variant::Factor(dec) => {
                let meta = ColumnMeta { type_tag: TypeTag::Factor, levels: Some(dec.levels), ordered: dec.ordered };
                (ColumnData::Factor(dec.buf.into_inner()), meta)
            },
            Variant::Date(buf) => (ColumnData::Date(buf.into_inner()), ColumnMeta::plain(TypeTag::Date)),
            Variant::POSIXct(buf) => (ColumnData::POSIXct(buf.into_inner()), ColumnMeta::plain(TypeTag::POSIXct)),
            Variant::Time(buf) => (ColumnData::Time(buf.into_inner()), ColumnMeta::plain(TypeTag::Time)),
            Variant::Skip { len: _ } => return None,
        };
        Some(Column::new(data, meta))
    }

    /// `true` if this column is consumed without producing output.
    pub fn should_skip(&self) -> bool {
        matches!(self.variant, Variant::Skip { .. })
    }

    /// `true` if this decoder wants its cell text with surrounding whitespace removed.
    pub fn trims(&self) -> bool {
        matches!(self.variant, Variant::Character { trim: true, .. })
    }

    pub fn column_type(&self) -> ColumnType {
        match self.variant {
            Variant::Logical(_) => ColumnType::Logical,
            Variant::Integer(_) => ColumnType::Integer,
            Variant::Double(_) => ColumnType::Double,
            Variant::Character { .. } => ColumnType::Character,
            Variant::Factor(_) => ColumnType::Factor,
            Variant::Date(_) => ColumnType::Date,
            Variant::POSIXct(_) => ColumnType::POSIXct,
            Variant::Time(_) => ColumnType::Time,
            Variant::Skip { .. } => ColumnType::Skip,
        }
    }
}

fn parse_logical(text: &[u8]) -> DResult<bool> {
    match text {
        b"TRUE" | b"T" => Ok(true),
        b"FALSE" | b"F" => Ok(false),
        _ => Err(DError::MalformedBoolean(DError::lossy(text))),
    }
}

fn parse_integer(text: &[u8]) -> DResult<i32> {
    std::str::from_utf8(text).ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| DError::MalformedInteger(DError::lossy(text)))
}

fn parse_double(text: &[u8]) -> DResult<f64> {
    std::str::from_utf8(text).ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| DError::MalformedDouble(DError::lossy(text)))
}

fn parse_string(text: &[u8]) -> DResult<String> {
    std::str::from_utf8(text)
        .map(|s| s.to_owned())
        .map_err(|_| DError::InvalidUtf8(DError::lossy(text)))
}
