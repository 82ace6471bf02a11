//! Module: executor::group
//! Responsibility: accumulation state for the one group currently being built.
//! Does not own: upstream pulls or group boundary decisions.
//! Boundary: the executor folds rows in and flushes through `write_to_output`.

use crate::{
    aggregate::AggregatorBox,
    config::{CollectMode, SortedCollectConfig},
    context::ExecutionContext,
    error::InternalError,
    executor::failpoint,
    row::{InputRow, OutputRowWriter},
    value::Value,
};
use std::sync::Arc;

///
/// CollectGroup
///
/// Key values, aggregator states, and collect buffer for the current group.
/// One instance is reused across every group the executor produces; key slots
/// are erased between groups, never reallocated.
///

pub(crate) struct CollectGroup {
    config: Arc<SortedCollectConfig>,
    context: ExecutionContext,
    key_values: Vec<Value>,
    aggregators: Vec<AggregatorBox>,
    collected: Option<Vec<Value>>,
    row_count: u64,
    lines: u64,
    last_row: Option<InputRow>,
}

impl CollectGroup {
    /// Build an invalid empty group over pre-built aggregators.
    pub(crate) fn new(
        config: Arc<SortedCollectConfig>,
        aggregators: Vec<AggregatorBox>,
    ) -> Result<Self, InternalError> {
        if aggregators.len() != config.aggregates().len() {
            return Err(InternalError::executor_invariant(format!(
                "collect group built with {} aggregators for {} aggregate registers",
                aggregators.len(),
                config.aggregates().len()
            )));
        }

        let context = config.context();
        let key_count = config.group_registers().len();
        let mut group = Self {
            config,
            context,
            key_values: Vec::new(),
            aggregators,
            collected: None,
            row_count: 0,
            lines: 0,
            last_row: None,
        };
        group.initialize(key_count);

        Ok(group)
    }

    /// Allocate one empty key slot per grouping register.
    pub(crate) fn initialize(&mut self, key_register_count: usize) {
        self.key_values.clear();
        self.key_values.resize(key_register_count, Value::Null);
    }

    /// Start a new group from `row`, or become invalid when `row` is `None`.
    pub(crate) fn reset(&mut self, row: Option<InputRow>) -> Result<(), InternalError> {
        self.collected = self.fresh_collect_buffer();
        self.row_count = 0;
        self.lines = 0;
        self.last_row = None;

        for slot in &mut self.key_values {
            slot.erase();
        }
        for aggregator in &mut self.aggregators {
            aggregator.reset();
        }

        let Some(row) = row else {
            return Ok(());
        };

        for (slot, pair) in self
            .key_values
            .iter_mut()
            .zip(self.config.group_registers())
        {
            *slot = row.get_value(pair.input)?.clone();
        }

        self.add_line(row)
    }

    /// Fold one row that belongs to the current group.
    pub(crate) fn add_line(&mut self, row: InputRow) -> Result<(), InternalError> {
        for (aggregator, register) in self.aggregators.iter_mut().zip(self.config.aggregates()) {
            aggregator.accumulate(row.get_value(register.input)?)?;
        }

        if let Some(target) = self.config.collect() {
            match &target.mode {
                CollectMode::Count => {
                    self.row_count = self.row_count.saturating_add(1);
                }
                CollectMode::Expression { input } => {
                    let value = row.get_value(*input)?.clone();
                    collect_buffer(&mut self.collected)?.push(value);
                }
                CollectMode::Variables { variables } => {
                    let record = variables
                        .iter()
                        .map(|variable| {
                            row.get_value(variable.input)
                                .map(|value| (variable.name.as_str(), value.clone()))
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    collect_buffer(&mut self.collected)?.push(Value::record(record));
                }
            }
        }

        self.lines = self.lines.saturating_add(1);
        self.last_row = Some(row);

        failpoint::trigger(failpoint::ADD_LINE)
    }

    /// Return true when `row` carries the same key values as this group.
    pub(crate) fn is_same_group(&self, row: Option<&InputRow>) -> Result<bool, InternalError> {
        let Some(row) = row else {
            return Ok(false);
        };

        for (stored, pair) in self.key_values.iter().zip(self.config.group_registers()) {
            if !self.context.equals(stored, row.get_value(pair.input)?) {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Move keys, aggregate results, and the collect output into one output row.
    pub(crate) fn write_to_output<W>(&mut self, output: &mut W) -> Result<(), InternalError>
    where
        W: OutputRowWriter + ?Sized,
    {
        let Some(provenance) = self.last_row.as_ref() else {
            return Err(InternalError::executor_invariant(
                "collect group flushed without a last input row",
            ));
        };

        for (slot, pair) in self
            .key_values
            .iter_mut()
            .zip(self.config.group_registers())
        {
            output.move_value_into(pair.output, provenance, slot.steal())?;
        }

        for (aggregator, register) in self.aggregators.iter_mut().zip(self.config.aggregates()) {
            output.move_value_into(register.output, provenance, aggregator.extract())?;
        }

        if let Some(target) = self.config.collect() {
            if target.mode.is_count() {
                output.clone_value_into(target.output, provenance, &Value::Uint(self.row_count))?;
            } else {
                let collected = self.collected.take().ok_or_else(|| {
                    InternalError::executor_invariant("collect buffer already moved out")
                })?;
                output.move_value_into(target.output, provenance, Value::List(collected))?;
            }
        }

        Ok(())
    }

    /// Return true once a row has been folded since the last reset.
    pub(crate) const fn is_valid(&self) -> bool {
        self.last_row.is_some()
    }

    /// Number of rows folded into the current group.
    pub(crate) const fn lines(&self) -> u64 {
        self.lines
    }

    #[cfg(test)]
    pub(crate) fn key_values(&self) -> &[Value] {
        &self.key_values
    }

    #[cfg(test)]
    pub(crate) fn has_collect_buffer(&self) -> bool {
        self.collected.is_some()
    }

    fn fresh_collect_buffer(&self) -> Option<Vec<Value>> {
        match self.config.collect() {
            Some(target) if !target.mode.is_count() => Some(Vec::new()),
            _ => None,
        }
    }
}

fn collect_buffer(collected: &mut Option<Vec<Value>>) -> Result<&mut Vec<Value>, InternalError> {
    collected
        .as_mut()
        .ok_or_else(|| InternalError::executor_invariant("collect buffer missing for capture mode"))
}
