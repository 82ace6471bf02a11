//! Module: aggregate::kinds
//! Responsibility: built-in reducer state machines.
//! Does not own: name resolution (see registry).
//! Boundary: every reducer here implements `Aggregator` and nothing else.

use crate::{
    aggregate::Aggregator,
    context::ExecutionContext,
    error::InternalError,
    value::{NumericRepr, Value},
};
use std::cmp::Ordering;

// Insert `value` into a canonically sorted vector; return false when present.
fn insert_distinct(set: &mut Vec<Value>, value: &Value, context: &ExecutionContext) -> bool {
    match set.binary_search_by(|probe| context.compare(probe, value)) {
        Ok(_) => false,
        Err(pos) => {
            set.insert(pos, value.clone());
            true
        }
    }
}

///
/// LengthAggregator
///
/// Counts every accumulated value, nulls included.
///

#[derive(Debug, Default)]
pub struct LengthAggregator {
    count: u64,
}

impl Aggregator for LengthAggregator {
    fn reset(&mut self) {
        self.count = 0;
    }

    fn accumulate(&mut self, _value: &Value) -> Result<(), InternalError> {
        self.count = self.count.saturating_add(1);
        Ok(())
    }

    fn extract(&mut self) -> Value {
        Value::Uint(std::mem::take(&mut self.count))
    }
}

///
/// SumState
///

#[derive(Clone, Copy, Debug, Default)]
enum SumState {
    #[default]
    Empty,
    Int(i128),
    Float(f64),
    Invalid,
}

///
/// SumAggregator
///
/// Integer sums stay exact until a float is seen; non-numeric input poisons
/// the result to null. The running total is unbounded `i128`, so only the
/// final value is narrowed: a total outside `Int`/`Uint` comes out as float.
///

#[derive(Debug, Default)]
pub struct SumAggregator {
    state: SumState,
}

impl Aggregator for SumAggregator {
    fn reset(&mut self) {
        self.state = SumState::Empty;
    }

    fn accumulate(&mut self, value: &Value) -> Result<(), InternalError> {
        if value.is_null() {
            return Ok(());
        }
        let Some(repr) = value.numeric_repr() else {
            self.state = SumState::Invalid;
            return Ok(());
        };

        self.state = match (self.state, repr) {
            (SumState::Invalid, _) => SumState::Invalid,
            (SumState::Empty, NumericRepr::Int(v)) => SumState::Int(v),
            (SumState::Empty, NumericRepr::Float(v)) => SumState::Float(v),
            (SumState::Int(acc), NumericRepr::Int(v)) => {
                let sum = acc.checked_add(v).ok_or_else(|| {
                    InternalError::aggregate_internal(format!("SUM overflow: {acc} + {v}"))
                })?;
                SumState::Int(sum)
            }
            (SumState::Int(acc), NumericRepr::Float(v)) => {
                float_sum(NumericRepr::Int(acc).as_f64(), v)?
            }
            (SumState::Float(acc), repr) => float_sum(acc, repr.as_f64())?,
        };

        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn extract(&mut self) -> Value {
        match std::mem::take(&mut self.state) {
            SumState::Empty => Value::Int(0),
            SumState::Int(v) => i64::try_from(v)
                .map(Value::Int)
                .or_else(|_| u64::try_from(v).map(Value::Uint))
                .unwrap_or_else(|_| Value::float(v as f64)),
            SumState::Float(v) => Value::float(v),
            SumState::Invalid => Value::Null,
        }
    }
}

fn float_sum(acc: f64, v: f64) -> Result<SumState, InternalError> {
    let sum = acc + v;
    if !sum.is_finite() {
        return Err(InternalError::aggregate_internal(format!(
            "SUM overflow: {acc} + {v} is not finite"
        )));
    }

    Ok(SumState::Float(sum))
}

///
/// ExtremaAggregator
///
/// MIN / MAX under the execution context ordering; nulls are skipped.
///

#[derive(Debug)]
pub struct ExtremaAggregator {
    context: ExecutionContext,
    keep: Ordering,
    current: Option<Value>,
}

impl ExtremaAggregator {
    #[must_use]
    pub const fn min(context: ExecutionContext) -> Self {
        Self {
            context,
            keep: Ordering::Less,
            current: None,
        }
    }

    #[must_use]
    pub const fn max(context: ExecutionContext) -> Self {
        Self {
            context,
            keep: Ordering::Greater,
            current: None,
        }
    }
}

impl Aggregator for ExtremaAggregator {
    fn reset(&mut self) {
        self.current = None;
    }

    fn accumulate(&mut self, value: &Value) -> Result<(), InternalError> {
        if value.is_null() {
            return Ok(());
        }
        let replace = match self.current.as_ref() {
            Some(current) => self.context.compare(value, current) == self.keep,
            None => true,
        };
        if replace {
            self.current = Some(value.clone());
        }

        Ok(())
    }

    fn extract(&mut self) -> Value {
        self.current.take().unwrap_or_default()
    }
}

///
/// AverageAggregator
///

#[derive(Debug, Default)]
pub struct AverageAggregator {
    sum: f64,
    count: u64,
    invalid: bool,
}

impl Aggregator for AverageAggregator {
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn accumulate(&mut self, value: &Value) -> Result<(), InternalError> {
        if value.is_null() {
            return Ok(());
        }
        let Some(repr) = value.numeric_repr() else {
            self.invalid = true;
            return Ok(());
        };

        self.sum += repr.as_f64();
        self.count = self.count.saturating_add(1);
        if !self.sum.is_finite() {
            return Err(InternalError::aggregate_internal(
                "AVERAGE overflow: running sum is not finite",
            ));
        }

        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn extract(&mut self) -> Value {
        let state = std::mem::take(self);
        if state.invalid || state.count == 0 {
            return Value::Null;
        }

        Value::float(state.sum / state.count as f64)
    }
}

///
/// UniqueAggregator
///
/// Distinct non-null values in first-seen order.
///

#[derive(Debug)]
pub struct UniqueAggregator {
    context: ExecutionContext,
    seen: Vec<Value>,
    ordered: Vec<Value>,
}

impl UniqueAggregator {
    #[must_use]
    pub const fn new(context: ExecutionContext) -> Self {
        Self {
            context,
            seen: Vec::new(),
            ordered: Vec::new(),
        }
    }
}

impl Aggregator for UniqueAggregator {
    fn reset(&mut self) {
        self.seen.clear();
        self.ordered.clear();
    }

    fn accumulate(&mut self, value: &Value) -> Result<(), InternalError> {
        if !value.is_null() && insert_distinct(&mut self.seen, value, &self.context) {
            self.ordered.push(value.clone());
        }

        Ok(())
    }

    fn extract(&mut self) -> Value {
        self.seen.clear();
        Value::List(std::mem::take(&mut self.ordered))
    }
}

///
/// SortedUniqueAggregator
///

#[derive(Debug)]
pub struct SortedUniqueAggregator {
    context: ExecutionContext,
    seen: Vec<Value>,
}

impl SortedUniqueAggregator {
    #[must_use]
    pub const fn new(context: ExecutionContext) -> Self {
        Self {
            context,
            seen: Vec::new(),
        }
    }
}

impl Aggregator for SortedUniqueAggregator {
    fn reset(&mut self) {
        self.seen.clear();
    }

    fn accumulate(&mut self, value: &Value) -> Result<(), InternalError> {
        if !value.is_null() {
            insert_distinct(&mut self.seen, value, &self.context);
        }

        Ok(())
    }

    fn extract(&mut self) -> Value {
        Value::List(std::mem::take(&mut self.seen))
    }
}

///
/// CountDistinctAggregator
///

#[derive(Debug)]
pub struct CountDistinctAggregator {
    context: ExecutionContext,
    seen: Vec<Value>,
}

impl CountDistinctAggregator {
    #[must_use]
    pub const fn new(context: ExecutionContext) -> Self {
        Self {
            context,
            seen: Vec::new(),
        }
    }
}

impl Aggregator for CountDistinctAggregator {
    fn reset(&mut self) {
        self.seen.clear();
    }

    fn accumulate(&mut self, value: &Value) -> Result<(), InternalError> {
        if !value.is_null() {
            insert_distinct(&mut self.seen, value, &self.context);
        }

        Ok(())
    }

    fn extract(&mut self) -> Value {
        let count = u64::try_from(self.seen.len()).unwrap_or(u64::MAX);
        self.seen.clear();

        Value::Uint(count)
    }
}

///
/// BitOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BitOp {
    And,
    Or,
    Xor,
}

impl BitOp {
    const fn apply(self, left: u64, right: u64) -> u64 {
        match self {
            Self::And => left & right,
            Self::Or => left | right,
            Self::Xor => left ^ right,
        }
    }
}

///
/// BitAggregator
///
/// Bitwise fold over non-negative integers; any other non-null input makes
/// the result null.
///

#[derive(Debug)]
pub struct BitAggregator {
    op: BitOp,
    current: Option<u64>,
    invalid: bool,
}

impl BitAggregator {
    #[must_use]
    pub const fn new(op: BitOp) -> Self {
        Self {
            op,
            current: None,
            invalid: false,
        }
    }
}

impl Aggregator for BitAggregator {
    fn reset(&mut self) {
        self.current = None;
        self.invalid = false;
    }

    fn accumulate(&mut self, value: &Value) -> Result<(), InternalError> {
        if value.is_null() || self.invalid {
            return Ok(());
        }
        let Some(bits) = value.as_u64() else {
            self.invalid = true;
            return Ok(());
        };

        self.current = Some(match self.current {
            Some(current) => self.op.apply(current, bits),
            None => bits,
        });

        Ok(())
    }

    fn extract(&mut self) -> Value {
        let current = self.current.take();
        let invalid = std::mem::take(&mut self.invalid);
        if invalid {
            return Value::Null;
        }

        current.map_or(Value::Null, Value::Uint)
    }
}
