//! Module: context
//! Responsibility: read-only execution capability shared by comparisons and aggregators.
//! Does not own: configuration parsing or executor state.
//! Boundary: built once from config and shared by reference for the executor lifetime.

use crate::value::{TextMode, Value, canonical_cmp_with_mode, values_equal};
use std::cmp::Ordering;

///
/// ExecutionContext
///
/// Value comparison semantics plus executor diagnostics switches.
/// Never mutated after construction.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExecutionContext {
    text_mode: TextMode,
    debug: bool,
}

impl ExecutionContext {
    #[must_use]
    pub const fn new(text_mode: TextMode, debug: bool) -> Self {
        Self { text_mode, debug }
    }

    #[must_use]
    pub const fn text_mode(&self) -> TextMode {
        self.text_mode
    }

    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }

    /// Three-way canonical comparison under this context.
    #[must_use]
    pub fn compare(&self, left: &Value, right: &Value) -> Ordering {
        canonical_cmp_with_mode(left, right, self.text_mode)
    }

    /// Equality under this context.
    #[must_use]
    pub fn equals(&self, left: &Value, right: &Value) -> bool {
        values_equal(left, right, self.text_mode)
    }
}
