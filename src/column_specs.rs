//! Describe how each column of raw text should be decoded.
//!
//! A column is described by a [`ColumnSpec`], which can be built directly:
//!
//! ```
//! # use coldecode::column_specs::{ColumnSpec, ColumnType};
//! let spec = ColumnSpec::factor(["low", "mid", "high"], true);
//! assert_eq!(spec.kind, ColumnType::Factor);
//! ```
//!
//! or a whole row layout can be parsed from a compact string with [`ColumnSpecs::parse`],
//! one letter per column:
//!
//! ```
//! # use coldecode::column_specs::{ColumnSpecs, ColumnType};
//! let specs = ColumnSpecs::parse("i d _ D f[a,b,c]").unwrap();
//! assert_eq!(specs.len(), 5);
//! assert_eq!(specs.non_skip_len(), 4);
//! ```
use std::fmt::Display;
use std::str::FromStr;

use itertools::Itertools;
use pest::{Parser, iterators::Pair, RuleType};

use crate::decode_error::DError;

type PResult<T> = std::result::Result<T, PError>;

/// Represents an error in parsing a compact column specification string
#[derive(Debug)]
pub struct PError {
    reason: String,
}

impl <R: RuleType> From<pest::error::Error<R>> for PError {
    fn from(value: pest::error::Error<R>) -> Self {
        Self { reason: value.to_string() }
    }
}

impl Display for PError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Column specification parsing error: {}", self.reason)
    }
}

impl std::error::Error for PError {}

#[derive(Parser)]
#[grammar = "colspec.pest"]
pub(crate) struct ColSpecParser;

/// The decoding rule for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(try_from = "String", into = "String"))]
pub enum ColumnType {
    /// `TRUE`/`T`/`FALSE`/`F`
    Logical,
    /// Base-10 32-bit integers
    Integer,
    /// Base-10 floating point numbers
    Double,
    /// Text, optionally trimmed of surrounding whitespace
    Character,
    /// One of a declared list of levels, stored as a 1-based ordinal
    Factor,
    /// Consume the cell and produce nothing
    Skip,
    /// Calendar date, stored as days since 1970-01-01
    Date,
    /// Date and time, stored as seconds since 1970-01-01 00:00:00
    POSIXct,
    /// Time of day, stored as seconds since midnight
    Time,
}

impl ColumnType {
    /// The name used in specifications for this type.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Logical => "logical",
            ColumnType::Integer => "integer",
            ColumnType::Double => "double",
            ColumnType::Character => "character",
            ColumnType::Factor => "factor",
            ColumnType::Skip => "skip",
            ColumnType::Date => "Date",
            ColumnType::POSIXct => "POSIXct",
            ColumnType::Time => "Time",
        }
    }
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ColumnType {
    type Err = DError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "logical" => Ok(ColumnType::Logical),
            "integer" => Ok(ColumnType::Integer),
            "double" => Ok(ColumnType::Double),
            "character" => Ok(ColumnType::Character),
            "factor" => Ok(ColumnType::Factor),
            "skip" => Ok(ColumnType::Skip),
            "Date" => Ok(ColumnType::Date),
            "POSIXct" => Ok(ColumnType::POSIXct),
            "Time" => Ok(ColumnType::Time),
            _ => Err(DError::UnsupportedColumnType(s.to_owned())),
        }
    }
}

impl TryFrom<String> for ColumnType {
    type Error = DError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColumnType> for String {
    fn from(value: ColumnType) -> Self {
        value.name().to_owned()
    }
}

const fn default_trim() -> bool {
    true
}

/// A full description of how to decode one column.
///
/// `trim` is only used by character columns; `levels` and `ordered` are only used
/// by factor columns, where both are required.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnSpec {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: ColumnType,
    #[cfg_attr(feature = "serde", serde(default = "default_trim"))]
    pub trim: bool,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub levels: Option<Vec<String>>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub ordered: Option<bool>,
}

impl ColumnSpec {
    /// Create a specification for `kind` with default options (trimmed strings, no levels).
    pub fn new(kind: ColumnType) -> Self {
        Self { kind, trim: default_trim(), levels: None, ordered: None }
    }

    /// Create a character column specification.
    pub fn character(trim: bool) -> Self {
        Self { trim, ..Self::new(ColumnType::Character) }
    }

    /// Create a factor column specification with the given levels, in order.
    pub fn factor<I, S>(levels: I, ordered: bool) -> Self
    where I: IntoIterator<Item = S>,
          S: Into<String>
    {
        let levels = levels.into_iter().map(|s| s.into()).collect();
        Self { levels: Some(levels), ordered: Some(ordered), ..Self::new(ColumnType::Factor) }
    }

    /// Create a specification from a type name, e.g. `"integer"` or `"POSIXct"`.
    ///
    /// Returns [`DError::UnsupportedColumnType`] for unknown names.
    pub fn from_type_name(name: &str) -> Result<Self, DError> {
        Ok(Self::new(name.parse()?))
    }

    /// `true` if this column is consumed but not materialized.
    pub fn is_skip(&self) -> bool {
        self.kind == ColumnType::Skip
    }
}

impl Display for ColumnSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.kind, &self.levels) {
            (ColumnType::Factor, Some(levels)) => {
                let prefix = if self.ordered.unwrap_or(false) { "ordered " } else { "" };
                write!(f, "{prefix}factor[{}]", levels.iter().join(","))
            },
            (ColumnType::Character, _) if !self.trim => write!(f, "character (untrimmed)"),
            (kind, _) => write!(f, "{kind}"),
        }
    }
}

/// The specifications for every column of a table, in column order.
///
/// Usually created from a compact string with [`ColumnSpecs::parse`]:
///
/// ```
/// # use coldecode::column_specs::ColumnSpecs;
/// let specs = ColumnSpecs::parse("l i d c C _ D T t o[s,m,l]").unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpecs {
    pub(crate) specs: Vec<ColumnSpec>,
}

impl ColumnSpecs {
    /// Parse a compact column specification string.
    ///
    /// Each column is one letter: `l` logical, `i` integer, `d` double, `c` character
    /// (trimmed), `C` character (untrimmed), `_` or `-` skip, `D` Date, `T` POSIXct, `t` Time.
    /// Factors list their levels in brackets: `f[a,b,c]` for unordered and `o[lo,hi]`
    /// for ordered factors. Whitespace between columns is ignored.
    ///
    /// Returns an error if the string has invalid syntax.
    pub fn parse(spec_str: &str) -> PResult<Self> {
        let mut specs = vec![];
        let tree = ColSpecParser::parse(Rule::spec, spec_str)?
            .next()
            .ok_or_else(|| PError { reason: "empty parse tree".to_owned() })?;

        for pair in tree.into_inner() {
            let spec = match pair.as_rule() {
                Rule::EOI => break,
                Rule::logical => ColumnSpec::new(ColumnType::Logical),
                Rule::integer => ColumnSpec::new(ColumnType::Integer),
                Rule::double => ColumnSpec::new(ColumnType::Double),
                Rule::character => ColumnSpec::character(true),
                Rule::untrimmed => ColumnSpec::character(false),
                Rule::skip => ColumnSpec::new(ColumnType::Skip),
                Rule::date => ColumnSpec::new(ColumnType::Date),
                Rule::datetime => ColumnSpec::new(ColumnType::POSIXct),
                Rule::time => ColumnSpec::new(ColumnType::Time),
                Rule::factor => ColumnSpec::factor(consume_levels_from_pair(pair), false),
                Rule::ordered_factor => ColumnSpec::factor(consume_levels_from_pair(pair), true),

                // Only the rules above are direct children of a spec
                rule => return Err(PError { reason: format!("unexpected {rule:?} at top level") }),
            };
            specs.push(spec);
        }

        Ok(Self { specs })
    }

    /// Consume the `ColumnSpecs` instance and return the inner `Vec<ColumnSpec>`.
    pub fn into_specs(self) -> Vec<ColumnSpec> {
        self.specs
    }

    pub fn as_slice(&self) -> &[ColumnSpec] {
        &self.specs
    }

    /// Iterate over all column specs (including skips)
    pub fn iter(&self) -> std::slice::Iter<'_, ColumnSpec> {
        self.specs.iter()
    }

    /// Iterate over the column specs that produce an output column
    pub fn iter_non_skip(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.specs.iter().filter(|s| !s.is_skip())
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Return the number of columns that produce an output column
    pub fn non_skip_len(&self) -> usize {
        self.iter_non_skip().count()
    }
}

impl From<Vec<ColumnSpec>> for ColumnSpecs {
    fn from(specs: Vec<ColumnSpec>) -> Self {
        Self { specs }
    }
}

fn consume_levels_from_pair(pair: Pair<Rule>) -> Vec<String> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::levels)
        .flat_map(|p| p.into_inner())
        .map(|level| level.as_str().to_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() -> Result<(), DError> {
        for kind in [ColumnType::Logical, ColumnType::Integer, ColumnType::Double, ColumnType::Character,
                     ColumnType::Factor, ColumnType::Skip, ColumnType::Date, ColumnType::POSIXct, ColumnType::Time] {
            assert_eq!(kind.name().parse::<ColumnType>()?, kind, "Round trip of {kind} failed");
        }

        let e = "blob".parse::<ColumnType>().unwrap_err();
        assert!(matches!(&e, DError::UnsupportedColumnType(name) if name == "blob"), "Got {e:?}");

        // Names are case sensitive
        assert!("date".parse::<ColumnType>().is_err());
        assert!(ColumnSpec::from_type_name("posixct").is_err());
        Ok(())
    }

    #[test]
    fn test_simple_letters() -> PResult<()> {
        let v = ColumnSpecs::parse("lidcC_-DTt")?.into_specs();
        let expected = vec![
            ColumnSpec::new(ColumnType::Logical),
            ColumnSpec::new(ColumnType::Integer),
            ColumnSpec::new(ColumnType::Double),
            ColumnSpec::character(true),
            ColumnSpec::character(false),
            ColumnSpec::new(ColumnType::Skip),
            ColumnSpec::new(ColumnType::Skip),
            ColumnSpec::new(ColumnType::Date),
            ColumnSpec::new(ColumnType::POSIXct),
            ColumnSpec::new(ColumnType::Time),
        ];
        assert_eq!(v, expected, "Parsing 'lidcC_-DTt' failed");
        Ok(())
    }

    #[test]
    fn test_surrounding_whitespace() -> PResult<()> {
        let v = ColumnSpecs::parse(" i d \n\t c \r\n")?;
        assert_eq!(v.len(), 3);
        Ok(())
    }

    #[test]
    fn test_factors() -> PResult<()> {
        let v = ColumnSpecs::parse("f[a,b,c] o[low, mid, high]")?.into_specs();
        assert_eq!(v[0], ColumnSpec::factor(["a", "b", "c"], false));
        assert_eq!(v[1], ColumnSpec::factor(["low", "mid", "high"], true));

        let v = ColumnSpecs::parse("f[]")?.into_specs();
        assert_eq!(v[0].levels.as_deref(), Some(&[][..]));
        Ok(())
    }

    #[test]
    fn test_invalid() {
        for s in ["x", "f", "f[a,b", "i d q", "f[a,,b]"] {
            assert!(ColumnSpecs::parse(s).is_err(), "Parsing '{s}' did not return an error");
        }
    }

    #[test]
    fn test_non_skip() -> PResult<()> {
        let v = ColumnSpecs::parse("i _ d - c")?;
        assert_eq!(v.len(), 5);
        assert_eq!(v.non_skip_len(), 3);
        let kinds: Vec<_> = v.iter_non_skip().map(|s| s.kind).collect();
        assert_eq!(kinds, [ColumnType::Integer, ColumnType::Double, ColumnType::Character]);
        Ok(())
    }

    #[test]
    fn test_display() {
        assert_eq!(ColumnSpec::factor(["a", "b"], true).to_string(), "ordered factor[a,b]");
        assert_eq!(ColumnSpec::character(false).to_string(), "character (untrimmed)");
        assert_eq!(ColumnSpec::new(ColumnType::POSIXct).to_string(), "POSIXct");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_record() -> Result<(), serde_json::Error> {
        let specs: Vec<ColumnSpec> = serde_json::from_str(r#"[
            {"type": "integer"},
            {"type": "character", "trim": false},
            {"type": "factor", "levels": ["a", "b"], "ordered": true}
        ]"#)?;
        assert_eq!(specs[0], ColumnSpec::new(ColumnType::Integer));
        assert_eq!(specs[1], ColumnSpec::character(false));
        assert_eq!(specs[2], ColumnSpec::factor(["a", "b"], true));

        let res: Result<ColumnSpec, _> = serde_json::from_str(r#"{"type": "blob"}"#);
        assert!(res.is_err());

        let s = serde_json::to_string(&ColumnSpec::new(ColumnType::Date))?;
        assert_eq!(s, r#"{"type":"Date","trim":true}"#);
        Ok(())
    }
}
