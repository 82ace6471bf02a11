//! Module: aggregate
//! Responsibility: aggregator contract, built-in reducers, and the name registry.
//! Does not own: group boundaries or output register placement.
//! Boundary: the collect group only depends on the `Aggregator` trait.

mod kinds;
mod registry;


use crate::{error::InternalError, value::Value};

pub use kinds::{
    AverageAggregator, BitAggregator, BitOp, CountDistinctAggregator, ExtremaAggregator,
    LengthAggregator, SortedUniqueAggregator, SumAggregator, UniqueAggregator,
};
pub use registry::{AggregatorFactory, AggregatorRegistry};

///
/// Aggregator
///
/// One running aggregate computation, reused across groups.
/// `extract` moves the result out and leaves the reducer at its identity, so
/// callers may skip the explicit `reset` after a flush.
///

pub trait Aggregator {
    /// Discard accumulated state and return to identity.
    fn reset(&mut self);

    /// Fold one input value into the running state.
    fn accumulate(&mut self, value: &Value) -> Result<(), InternalError>;

    /// Move the final result out.
    fn extract(&mut self) -> Value;
}

impl<T> Aggregator for Box<T>
where
    T: Aggregator + ?Sized,
{
    fn reset(&mut self) {
        self.as_mut().reset();
    }

    fn accumulate(&mut self, value: &Value) -> Result<(), InternalError> {
        self.as_mut().accumulate(value)
    }

    fn extract(&mut self) -> Value {
        self.as_mut().extract()
    }
}

pub type AggregatorBox = Box<dyn Aggregator>;
