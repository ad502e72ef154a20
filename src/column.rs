//! Decoded columns and the metadata that describes them.
//!
//! A [`Column`] is a fixed-length typed buffer. Each cell is either a value or
//! `None`, which plays the role of the type's NA sentinel. Hosts that need their
//! own array types can take the parts apart with [`Column::into_parts`] and attach
//! levels and class tags from [`ColumnMeta`] in whatever way they need.
use std::fmt::Display;

/// The type of a finished column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Logical,
    Integer,
    Double,
    Character,
    Factor,
    Date,
    POSIXct,
    Time,
}

impl TypeTag {
    /// The class vector a column of this type carries, given whether it is ordered.
    ///
    /// Plain vectors (logical, integer, double, character) have no class.
    pub fn classes(&self, ordered: bool) -> &'static [&'static str] {
        match self {
            TypeTag::Factor if ordered => &["ordered", "factor"],
            TypeTag::Factor => &["factor"],
            TypeTag::Date => &["Date"],
            TypeTag::POSIXct => &["POSIXct", "POSIXt"],
            TypeTag::Time => &["Time"],
            TypeTag::Logical | TypeTag::Integer | TypeTag::Double | TypeTag::Character => &[],
        }
    }
}

impl Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TypeTag::Logical => "logical",
            TypeTag::Integer => "integer",
            TypeTag::Double => "double",
            TypeTag::Character => "character",
            TypeTag::Factor => "factor",
            TypeTag::Date => "Date",
            TypeTag::POSIXct => "POSIXct",
            TypeTag::Time => "Time",
        };

        write!(f, "{s}")
    }
}

/// The values of a column.
///
/// Dates are day offsets from 1970-01-01, timestamps are second offsets from
/// 1970-01-01 00:00:00, times are seconds since midnight, and factors are
/// 1-based ordinals into the column's levels.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Logical(Vec<Option<bool>>),
    Integer(Vec<Option<i32>>),
    Double(Vec<Option<f64>>),
    Character(Vec<Option<String>>),
    Factor(Vec<Option<u32>>),
    Date(Vec<Option<i64>>),
    POSIXct(Vec<Option<i64>>),
    Time(Vec<Option<i64>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Logical(v) => v.len(),
            ColumnData::Integer(v) => v.len(),
            ColumnData::Double(v) => v.len(),
            ColumnData::Character(v) => v.len(),
            ColumnData::Factor(v) => v.len(),
            ColumnData::Date(v) => v.len(),
            ColumnData::POSIXct(v) => v.len(),
            ColumnData::Time(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` if row `i` holds NA, `None` if `i` is out of bounds.
    pub fn is_na(&self, i: usize) -> Option<bool> {
        match self {
            ColumnData::Logical(v) => v.get(i).map(Option::is_none),
            ColumnData::Integer(v) => v.get(i).map(Option::is_none),
            ColumnData::Double(v) => v.get(i).map(Option::is_none),
            ColumnData::Character(v) => v.get(i).map(Option::is_none),
            ColumnData::Factor(v) => v.get(i).map(Option::is_none),
            ColumnData::Date(v) => v.get(i).map(Option::is_none),
            ColumnData::POSIXct(v) => v.get(i).map(Option::is_none),
            ColumnData::Time(v) => v.get(i).map(Option::is_none),
        }
    }
}

/// Metadata attached to a finished column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub type_tag: TypeTag,
    /// Level labels in declaration order; only set for factors.
    pub levels: Option<Vec<String>>,
    /// Whether the factor levels are ordered; always `false` for other types.
    pub ordered: bool,
}

impl ColumnMeta {
    pub(crate) fn plain(type_tag: TypeTag) -> Self {
        Self { type_tag, levels: None, ordered: false }
    }

    pub fn classes(&self) -> &'static [&'static str] {
        self.type_tag.classes(self.ordered)
    }
}

/// A fully decoded column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    data: ColumnData,
    meta: ColumnMeta,
}

impl Column {
    pub(crate) fn new(data: ColumnData, meta: ColumnMeta) -> Self {
        Self { data, meta }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `true` if row `i` holds NA. Panics if `i` is out of bounds.
    pub fn is_na(&self, i: usize) -> bool {
        self.data.is_na(i)
            .unwrap_or_else(|| panic!("Row {i} out of bounds for column of length {}", self.len()))
    }

    pub fn type_tag(&self) -> TypeTag {
        self.meta.type_tag
    }

    pub fn levels(&self) -> Option<&[String]> {
        self.meta.levels.as_deref()
    }

    pub fn is_ordered(&self) -> bool {
        self.meta.ordered
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn meta(&self) -> &ColumnMeta {
        &self.meta
    }

    /// The level label of row `i` in a factor column.
    ///
    /// Returns `None` if the column is not a factor, the row is out of bounds, or the cell is NA.
    pub fn factor_label(&self, i: usize) -> Option<&str> {
        let ColumnData::Factor(ordinals) = &self.data else { return None };
        let ordinal = (*ordinals.get(i)?)?;
        self.levels()?.get(ordinal as usize - 1).map(|s| s.as_str())
    }

    /// Consume the column and return the inner data and metadata.
    pub fn into_parts(self) -> (ColumnData, ColumnMeta) {
        (self.data, self.meta)
    }
}
