//! Module: row
//! Responsibility: input row handles and the output row writer contract.
//! Does not own: row production order or group state.
//! Boundary: fetchers hand out `InputRow`s; executors write into `OutputRowWriter`s.

mod output;


use crate::{config::RegisterId, error::InternalError, value::Value};
use derive_more::Display;
use std::rc::Rc;

pub use output::{OutputBlock, OutputRow, OutputRowWriter};

///
/// RowId
///
/// Monotonic provenance token assigned by the producing fetcher.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("row#{_0}")]
pub struct RowId(u64);

impl RowId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

///
/// InputRow
///
/// Cheap-to-clone handle over one immutable input row.
/// Storage is shared, so holding a handle keeps the row alive without copying
/// its values; "no row" is expressed as `Option::<InputRow>::None`.
///

#[derive(Clone, Debug)]
pub struct InputRow {
    id: RowId,
    values: Rc<[Value]>,
}

impl InputRow {
    #[must_use]
    pub fn new(id: RowId, values: impl Into<Rc<[Value]>>) -> Self {
        Self {
            id,
            values: values.into(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> RowId {
        self.id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Borrow the value at `register`.
    pub fn get_value(&self, register: RegisterId) -> Result<&Value, InternalError> {
        self.values.get(register).ok_or_else(|| {
            InternalError::executor_invariant(format!(
                "input {} has no register {register} (width={})",
                self.id,
                self.values.len()
            ))
        })
    }

    /// Number of live handles sharing this row's storage.
    #[must_use]
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.values)
    }

    /// Return true when both handles refer to the same row storage.
    #[must_use]
    pub fn same_row(&self, other: &Self) -> bool {
        self.id == other.id && Rc::ptr_eq(&self.values, &other.values)
    }
}
