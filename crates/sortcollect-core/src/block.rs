//! Module: block
//! Responsibility: batch-level driver pairing one executor with one output block.
//! Does not own: grouping semantics (executor-owned).
//! Boundary: hands committed output rows to the caller in bounded batches.

use crate::{
    config::SortedCollectConfig,
    error::InternalError,
    executor::SortedCollectExecutor,
    fetcher::{ExecutionState, RowFetcher},
    row::{OutputBlock, OutputRow, OutputRowWriter},
};
use std::sync::Arc;

///
/// CollectBlock
///
/// Drives `produce_row` until a batch is full or upstream suspends or ends.
///

pub struct CollectBlock<F> {
    executor: SortedCollectExecutor<F>,
    output: OutputBlock,
    done: bool,
}

impl<F> CollectBlock<F>
where
    F: RowFetcher,
{
    /// Build a block and its executor from one shared config.
    pub fn new(config: Arc<SortedCollectConfig>, fetcher: F) -> Result<Self, InternalError> {
        let output = OutputBlock::for_config(&config);
        let executor = SortedCollectExecutor::new(config, fetcher)?;

        Ok(Self::from_parts(executor, output))
    }

    /// Wrap an already-built executor and output block.
    #[must_use]
    pub const fn from_parts(executor: SortedCollectExecutor<F>, output: OutputBlock) -> Self {
        Self {
            executor,
            output,
            done: false,
        }
    }

    /// Produce up to `at_most` grouped rows.
    ///
    /// The returned state is `Waiting` when upstream suspended (rows produced
    /// before the suspension are still returned), `Done` once the executor is
    /// exhausted, and `HasMore` otherwise.
    pub fn get_some(
        &mut self,
        at_most: usize,
    ) -> Result<(ExecutionState, Vec<OutputRow>), InternalError> {
        if at_most == 0 {
            return Err(InternalError::executor_invariant(
                "get_some requires at_most > 0",
            ));
        }
        if self.done {
            return Ok((ExecutionState::Done, Vec::new()));
        }

        let mut state = ExecutionState::HasMore;
        while self.output.len() < at_most {
            state = self.executor.produce_row(&mut self.output)?;
            if self.output.produced() {
                self.output.advance_row()?;
            }
            if state != ExecutionState::HasMore {
                break;
            }
        }
        if state == ExecutionState::Done {
            self.done = true;
        }

        Ok((state, self.output.take_rows()))
    }

    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    #[must_use]
    pub const fn executor(&self) -> &SortedCollectExecutor<F> {
        &self.executor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fetcher::{VecRowFetcher, WaitingRowFetcher},
        value::Value,
    };

    fn rows(keys: &[&str]) -> Vec<Vec<Value>> {
        keys.iter().map(|key| vec![Value::text(*key)]).collect()
    }

    fn count_config() -> Arc<SortedCollectConfig> {
        Arc::new(SortedCollectConfig::new(1, 2).with_group(0, 0).with_count(1))
    }

    fn keys(batch: &[OutputRow]) -> Vec<Value> {
        batch
            .iter()
            .filter_map(|row| row.value(0).cloned())
            .collect()
    }

    #[test]
    fn get_some_respects_batch_size() {
        let fetcher = VecRowFetcher::from_values(rows(&["a", "b", "b", "c", "d"]));
        let mut block = CollectBlock::new(count_config(), fetcher).expect("block");

        let (state, batch) = block.get_some(2).expect("first batch");
        assert_eq!(state, ExecutionState::HasMore);
        assert_eq!(keys(&batch), vec![Value::text("a"), Value::text("b")]);

        let (state, batch) = block.get_some(8).expect("second batch");
        assert_eq!(state, ExecutionState::Done);
        assert_eq!(keys(&batch), vec![Value::text("c"), Value::text("d")]);
        assert!(block.is_done());

        let (state, batch) = block.get_some(8).expect("after done");
        assert_eq!(state, ExecutionState::Done);
        assert!(batch.is_empty());
    }

    #[test]
    fn get_some_returns_partial_batch_on_waiting() {
        let inner = VecRowFetcher::from_values(rows(&["a", "b", "c"]));
        let fetcher = WaitingRowFetcher::new(inner, [2]);
        let mut block = CollectBlock::new(count_config(), fetcher).expect("block");

        let (state, batch) = block.get_some(10).expect("first batch");
        assert_eq!(state, ExecutionState::Waiting);
        assert_eq!(keys(&batch), vec![Value::text("a")]);

        let (state, batch) = block.get_some(10).expect("second batch");
        assert_eq!(state, ExecutionState::Done);
        assert_eq!(keys(&batch), vec![Value::text("b"), Value::text("c")]);
        assert_eq!(block.executor().stats().fetch_waits, 1);
    }

    #[test]
    fn get_some_rejects_zero_batch() {
        let fetcher = VecRowFetcher::new(Vec::new());
        let mut block = CollectBlock::new(count_config(), fetcher).expect("block");

        let err = block.get_some(0).expect_err("zero batch must fail");
        assert!(err.is_invariant_violation());
    }
}
