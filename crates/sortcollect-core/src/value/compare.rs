use crate::value::{TextMode, Value};
use std::cmp::Ordering;

/// Total canonical comparator, case-sensitive for text.
///
/// Ordering rules:
/// 1. Canonical variant rank
/// 2. Variant-specific comparison for same-ranked values
///
/// Numeric variants share a rank and compare by numeric value.
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    canonical_cmp_with_mode(left, right, TextMode::Cs)
}

/// Total canonical comparator under an explicit text mode.
#[must_use]
pub fn canonical_cmp_with_mode(left: &Value, right: &Value, mode: TextMode) -> Ordering {
    let rank = left.canonical_rank().cmp(&right.canonical_rank());
    if rank != Ordering::Equal {
        return rank;
    }

    canonical_cmp_same_rank(left, right, mode)
}

/// Equality under canonical comparison; used for group membership checks.
#[must_use]
pub fn values_equal(left: &Value, right: &Value, mode: TextMode) -> bool {
    canonical_cmp_with_mode(left, right, mode) == Ordering::Equal
}

fn canonical_cmp_same_rank(left: &Value, right: &Value, mode: TextMode) -> Ordering {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Text(a), Value::Text(b)) => cmp_text(a, b, mode),
        (Value::List(a), Value::List(b)) => canonical_cmp_value_list(a, b, mode),
        (Value::Map(a), Value::Map(b)) => canonical_cmp_value_map(a, b, mode),
        (left, right) if left.is_numeric() && right.is_numeric() => cmp_numeric(left, right),
        _ => Ordering::Equal,
    }
}

fn cmp_text(left: &str, right: &str, mode: TextMode) -> Ordering {
    match mode {
        TextMode::Cs => left.cmp(right),
        TextMode::Ci => left
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(right.chars().flat_map(char::to_lowercase)),
    }
}

// Integers compare exactly; any float operand falls back to f64 total order.
fn cmp_numeric(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Uint(a), Value::Uint(b)) => a.cmp(b),
        (Value::Int(a), Value::Uint(b)) => cmp_signed_unsigned(*a, *b),
        (Value::Uint(a), Value::Int(b)) => cmp_signed_unsigned(*b, *a).reverse(),
        _ => {
            let (Some(left), Some(right)) = (left.numeric_repr(), right.numeric_repr()) else {
                return Ordering::Equal;
            };

            left.as_f64().total_cmp(&right.as_f64())
        }
    }
}

fn cmp_signed_unsigned(signed: i64, unsigned: u64) -> Ordering {
    u64::try_from(signed).map_or(Ordering::Less, |signed| signed.cmp(&unsigned))
}

fn canonical_cmp_value_list(left: &[Value], right: &[Value], mode: TextMode) -> Ordering {
    for (left, right) in left.iter().zip(right.iter()) {
        let cmp = canonical_cmp_with_mode(left, right, mode);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    left.len().cmp(&right.len())
}

fn canonical_cmp_value_map(
    left: &[(Value, Value)],
    right: &[(Value, Value)],
    mode: TextMode,
) -> Ordering {
    for ((left_key, left_value), (right_key, right_value)) in left.iter().zip(right.iter()) {
        let key_cmp = canonical_cmp_with_mode(left_key, right_key, mode);
        if key_cmp != Ordering::Equal {
            return key_cmp;
        }

        let value_cmp = canonical_cmp_with_mode(left_value, right_value, mode);
        if value_cmp != Ordering::Equal {
            return value_cmp;
        }
    }

    left.len().cmp(&right.len())
}
