//! Module: value
//! Responsibility: owned runtime datum carried through collect execution.
//! Does not own: encoding formats for persisted or transported values.
//! Boundary: values flow from input rows through groups into output rows.

mod compare;
mod float;
mod tag;


use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

// re-exports
pub use compare::{canonical_cmp, canonical_cmp_with_mode, values_equal};
pub use float::Float64;
pub use tag::ValueTag;

///
/// TextMode
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextMode {
    #[default]
    Cs, // case-sensitive
    Ci, // case-insensitive
}

///
/// NumericRepr
///
/// Numeric projection used by arithmetic aggregates.
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumericRepr {
    Int(i128),
    Float(f64),
}

impl NumericRepr {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }
}

///
/// Value
///
/// Null        → absent datum; also the erased placeholder left behind by a move.
/// List / Map  → composite values produced by collect buffers and aggregates.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Value {
    Bool(bool),
    Float64(Float64),
    Int(i64),
    /// Ordered list of values.
    /// List order is preserved.
    List(Vec<Self>),
    /// Ordered key/value records.
    /// Variable-capture collect buffers emit one map per input row, keyed by
    /// variable name in configured order.
    Map(Vec<(Self, Self)>),
    #[default]
    Null,
    Text(String),
    Uint(u64),
}

impl Value {
    /// Build a text value.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Build a float value, returning `Null` for non-finite input.
    #[must_use]
    pub fn float(v: f64) -> Self {
        Float64::try_new(v).map_or(Self::Null, Self::Float64)
    }

    /// Build a map value from named entries in the given order.
    #[must_use]
    pub fn record<'a>(entries: impl IntoIterator<Item = (&'a str, Self)>) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(name, value)| (Self::text(name), value))
                .collect(),
        )
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Return true when the value participates in numeric comparison.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Uint(_) | Self::Float64(_))
    }

    /// Project this value into its numeric representation, if any.
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn numeric_repr(&self) -> Option<NumericRepr> {
        match self {
            Self::Int(v) => Some(NumericRepr::Int(*v as i128)),
            Self::Uint(v) => Some(NumericRepr::Int(*v as i128)),
            Self::Float64(v) => Some(NumericRepr::Float(v.get())),
            _ => None,
        }
    }

    /// Return the value as an unsigned integer when it is a non-negative integer.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Uint(v) => Some(*v),
            Self::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Look up one entry of a map value by text key.
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&Self> {
        let Self::Map(entries) = self else {
            return None;
        };

        entries
            .iter()
            .find(|(key, _)| key.as_text() == Some(name))
            .map(|(_, value)| value)
    }

    /// Release the owned payload in place, leaving the `Null` placeholder.
    pub fn erase(&mut self) {
        *self = Self::Null;
    }

    /// Move the payload out, leaving the `Null` placeholder behind.
    #[must_use]
    pub fn steal(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Stable canonical variant tag.
    #[must_use]
    pub const fn tag(&self) -> ValueTag {
        tag::canonical_tag(self)
    }

    /// Stable rank used for cross-variant ordering.
    #[must_use]
    pub const fn canonical_rank(&self) -> u8 {
        self.tag().rank()
    }

    /// Canonical total ordering, case-sensitive for text.
    #[must_use]
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        canonical_cmp(self, other)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::text(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Float64> for Value {
    fn from(v: Float64) -> Self {
        Self::Float64(v)
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::List(v)
    }
}
