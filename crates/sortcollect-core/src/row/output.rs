//! Module: row::output
//! Responsibility: output row assembly and the writer contract executors target.
//! Does not own: which values are written (executor-owned).
//! Boundary: one output row is produced per completed write sequence.

use crate::{
    config::{RegisterId, SortedCollectConfig},
    error::InternalError,
    row::{InputRow, RowId},
    value::Value,
};

///
/// OutputRowWriter
///
/// Destination for one output row at a time. A row counts as produced once
/// every writable register holds a value; the provenance row supplies every
/// register the executor does not write.
///

pub trait OutputRowWriter {
    /// Move `value` into `register` of the row being assembled.
    fn move_value_into(
        &mut self,
        register: RegisterId,
        provenance: &InputRow,
        value: Value,
    ) -> Result<(), InternalError>;

    /// Copy `value` into `register`; used for freshly built scalars.
    fn clone_value_into(
        &mut self,
        register: RegisterId,
        provenance: &InputRow,
        value: &Value,
    ) -> Result<(), InternalError> {
        self.move_value_into(register, provenance, value.clone())
    }

    /// Return true once the row being assembled is complete.
    fn produced(&self) -> bool;
}

///
/// OutputRow
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutputRow {
    provenance: RowId,
    values: Vec<Value>,
}

impl OutputRow {
    #[must_use]
    pub const fn provenance(&self) -> RowId {
        self.provenance
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn value(&self, register: RegisterId) -> Option<&Value> {
        self.values.get(register)
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

///
/// PendingRow
///

#[derive(Debug)]
struct PendingRow {
    provenance: RowId,
    values: Vec<Value>,
    written: Vec<bool>,
    remaining: usize,
}

impl PendingRow {
    fn new(provenance: RowId, register_count: usize, writable_count: usize) -> Self {
        Self {
            provenance,
            values: vec![Value::Null; register_count],
            written: vec![false; register_count],
            remaining: writable_count,
        }
    }

    const fn is_produced(&self) -> bool {
        self.remaining == 0
    }
}

///
/// OutputBlock
///
/// Buffer of produced output rows plus the row currently being assembled.
/// Rejects writes outside the configured writable registers, duplicate
/// writes, and mixed provenance within one row.
///

#[derive(Debug)]
pub struct OutputBlock {
    register_count: usize,
    writable: Vec<RegisterId>,
    keep: Vec<RegisterId>,
    pending: Option<PendingRow>,
    rows: Vec<OutputRow>,
}

impl OutputBlock {
    #[must_use]
    pub fn new(
        register_count: usize,
        writable: impl IntoIterator<Item = RegisterId>,
        keep: impl IntoIterator<Item = RegisterId>,
    ) -> Self {
        let mut writable = writable.into_iter().collect::<Vec<_>>();
        writable.sort_unstable();
        writable.dedup();

        Self {
            register_count,
            writable,
            keep: keep.into_iter().collect(),
            pending: None,
            rows: Vec::new(),
        }
    }

    /// Build an output block matching a collect config's register layout.
    #[must_use]
    pub fn for_config(config: &SortedCollectConfig) -> Self {
        Self::new(
            config.output_registers(),
            config.writable_registers(),
            config.registers_to_keep().iter().copied(),
        )
    }

    /// Commit the produced row and start a fresh one.
    pub fn advance_row(&mut self) -> Result<(), InternalError> {
        let Some(pending) = self.pending.take() else {
            return Err(InternalError::output_invariant(
                "advance_row called without an output row in progress",
            ));
        };
        if !pending.is_produced() {
            let remaining = pending.remaining;
            self.pending = Some(pending);
            return Err(InternalError::output_invariant(format!(
                "advance_row called with {remaining} writable registers still unset"
            )));
        }

        self.rows.push(OutputRow {
            provenance: pending.provenance,
            values: pending.values,
        });

        Ok(())
    }

    #[must_use]
    pub fn rows(&self) -> &[OutputRow] {
        &self.rows
    }

    /// Move every committed row out of the block.
    pub fn take_rows(&mut self) -> Vec<OutputRow> {
        std::mem::take(&mut self.rows)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Return true when a row has been started but not yet committed.
    #[must_use]
    pub const fn has_pending_row(&self) -> bool {
        self.pending.is_some()
    }
}

impl OutputRowWriter for OutputBlock {
    fn move_value_into(
        &mut self,
        register: RegisterId,
        provenance: &InputRow,
        value: Value,
    ) -> Result<(), InternalError> {
        if register >= self.register_count {
            return Err(InternalError::output_invariant(format!(
                "output register {register} out of range (width={})",
                self.register_count
            )));
        }
        if self.writable.binary_search(&register).is_err() {
            return Err(InternalError::output_invariant(format!(
                "output register {register} is not writable"
            )));
        }

        let (register_count, writable_count) = (self.register_count, self.writable.len());
        let pending = self.pending.get_or_insert_with(|| {
            PendingRow::new(provenance.id(), register_count, writable_count)
        });
        if pending.is_produced() {
            return Err(InternalError::output_invariant(
                "output row already produced; advance_row must be called first",
            ));
        }
        if pending.provenance != provenance.id() {
            return Err(InternalError::output_invariant(format!(
                "output row mixes provenance {} and {}",
                pending.provenance,
                provenance.id()
            )));
        }
        if pending.written[register] {
            return Err(InternalError::output_invariant(format!(
                "output register {register} written twice"
            )));
        }

        pending.values[register] = value;
        pending.written[register] = true;
        pending.remaining -= 1;

        if pending.is_produced() {
            for &register in &self.keep {
                if let Some(slot) = pending.values.get_mut(register) {
                    *slot = provenance
                        .values()
                        .get(register)
                        .cloned()
                        .unwrap_or_default();
                }
            }
        }

        Ok(())
    }

    fn produced(&self) -> bool {
        self.pending.as_ref().is_some_and(PendingRow::is_produced)
    }
}
