use crate::value::Value;

///
/// ValueTag
///
/// Stable canonical value-variant tag used by ordering surfaces.
///
/// IMPORTANT:
/// Tag values and ranks are part of grouping behavior and must remain fixed.
/// Numeric variants share one rank so mixed numeric keys compare by value.
///
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueTag {
    Null = 1,
    Bool = 2,
    Int = 3,
    Uint = 4,
    Float64 = 5,
    Text = 6,
    List = 7,
    Map = 8,
}

impl ValueTag {
    /// Cross-variant ordering rank; null < bool < number < text < list < map.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool => 1,
            Self::Int | Self::Uint | Self::Float64 => 2,
            Self::Text => 3,
            Self::List => 4,
            Self::Map => 5,
        }
    }
}

#[must_use]
pub(super) const fn canonical_tag(value: &Value) -> ValueTag {
    match value {
        Value::Null => ValueTag::Null,
        Value::Bool(_) => ValueTag::Bool,
        Value::Int(_) => ValueTag::Int,
        Value::Uint(_) => ValueTag::Uint,
        Value::Float64(_) => ValueTag::Float64,
        Value::Text(_) => ValueTag::Text,
        Value::List(_) => ValueTag::List,
        Value::Map(_) => ValueTag::Map,
    }
}
