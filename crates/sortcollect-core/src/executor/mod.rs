//! Module: executor
//! Responsibility: sorted group-by state machine over a pull-based upstream.
//! Does not own: reducer semantics, row storage, or output row buffering.
//! Boundary: one `produce_row` call yields at most one output row.

pub(crate) mod failpoint;
mod group;


use crate::{
    aggregate::AggregatorRegistry,
    config::SortedCollectConfig,
    context::ExecutionContext,
    error::InternalError,
    fetcher::{ExecutionState, RowFetcher},
    obs::sink::{MetricsEvent, record},
    row::OutputRowWriter,
};
use group::CollectGroup;
use std::sync::Arc;

///
/// CollectStats
///
/// Per-executor counters, independent of the thread-local metrics sink.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CollectStats {
    pub rows_fetched: u64,
    pub groups_emitted: u64,
    pub fetch_waits: u64,
}

///
/// SortedCollectExecutor
///
/// Groups rows that arrive already sorted by the grouping registers.
/// A group ends at the first row whose keys differ; it is flushed before the
/// boundary row starts the next group. Upstream `Waiting` is reported before
/// any state changes, so a retried call resumes where it stopped.
///

pub struct SortedCollectExecutor<F> {
    config: Arc<SortedCollectConfig>,
    context: ExecutionContext,
    fetcher: F,
    current_group: CollectGroup,
    fetcher_done: bool,
    poisoned: bool,
    finished: bool,
    stats: CollectStats,
}

impl<F> SortedCollectExecutor<F>
where
    F: RowFetcher,
{
    /// Build an executor resolving aggregate kinds against the built-in registry.
    pub fn new(config: Arc<SortedCollectConfig>, fetcher: F) -> Result<Self, InternalError> {
        Self::with_registry(config, fetcher, &AggregatorRegistry::with_builtins())
    }

    /// Build an executor resolving aggregate kinds against `registry`.
    pub fn with_registry(
        config: Arc<SortedCollectConfig>,
        fetcher: F,
        registry: &AggregatorRegistry,
    ) -> Result<Self, InternalError> {
        config.validate()?;
        let aggregators = registry.create_all(&config)?;
        let context = config.context();
        let current_group = CollectGroup::new(Arc::clone(&config), aggregators)?;

        Ok(Self {
            config,
            context,
            fetcher,
            current_group,
            fetcher_done: false,
            poisoned: false,
            finished: false,
            stats: CollectStats::default(),
        })
    }

    fn debug_log(&self, s: impl AsRef<str>) {
        if self.context.debug() {
            println!("[debug] {}", s.as_ref());
        }
    }

    #[must_use]
    pub fn config(&self) -> &SortedCollectConfig {
        &self.config
    }

    #[must_use]
    pub const fn stats(&self) -> CollectStats {
        self.stats
    }

    /// Return true once upstream is exhausted and no group is pending.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.fetcher_done && !self.current_group.is_valid()
    }

    /// Return true when an earlier error has disabled this executor.
    #[must_use]
    pub const fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Produce at most one grouped output row into `output`.
    ///
    /// Returns `Waiting` when upstream is blocked (nothing was consumed),
    /// `HasMore` after emitting a row with more input pending, and `Done`
    /// once upstream is exhausted and the last group has been flushed.
    /// After any error every further call fails with an invariant violation.
    pub fn produce_row<W>(&mut self, output: &mut W) -> Result<ExecutionState, InternalError>
    where
        W: OutputRowWriter + ?Sized,
    {
        if self.poisoned {
            return Err(InternalError::executor_invariant(
                "sorted collect executor used after an earlier error",
            ));
        }

        let fetched_before = self.stats.rows_fetched;
        let result = self.produce_row_inner(output);

        let fetched = self.stats.rows_fetched.saturating_sub(fetched_before);
        if fetched > 0 {
            record(MetricsEvent::RowsFetched { rows: fetched });
        }

        match &result {
            Err(err) => {
                self.poisoned = true;
                record(MetricsEvent::ExecFinish { failed: true });
                self.debug_log(format!("SortedCollect failed -> {}", err.display_with_class()));
            }
            Ok(ExecutionState::Done) if !self.finished => {
                self.finished = true;
                record(MetricsEvent::ExecFinish { failed: false });
                self.debug_log(format!(
                    "SortedCollect done -> {} rows in, {} groups out, {} waits",
                    self.stats.rows_fetched, self.stats.groups_emitted, self.stats.fetch_waits
                ));
            }
            Ok(_) => {}
        }

        result
    }

    fn produce_row_inner<W>(&mut self, output: &mut W) -> Result<ExecutionState, InternalError>
    where
        W: OutputRowWriter + ?Sized,
    {
        failpoint::trigger(failpoint::PRODUCE_ROW)?;

        if self.fetcher_done {
            if self.current_group.is_valid() {
                self.flush(output)?;
                self.current_group.reset(None)?;
            }
            return Ok(ExecutionState::Done);
        }

        loop {
            let (state, row) = self.fetcher.fetch_row()?;

            match state {
                ExecutionState::Waiting => {
                    self.stats.fetch_waits = self.stats.fetch_waits.saturating_add(1);
                    record(MetricsEvent::FetchWaiting);
                    return Ok(ExecutionState::Waiting);
                }
                ExecutionState::HasMore if row.is_none() => {
                    return Err(InternalError::executor_invariant(
                        "fetcher reported HasMore without a row",
                    ));
                }
                ExecutionState::HasMore => {}
                ExecutionState::Done => self.fetcher_done = true,
            }
            if row.is_some() {
                self.stats.rows_fetched = self.stats.rows_fetched.saturating_add(1);
            }

            let same_group =
                self.current_group.is_valid() && self.current_group.is_same_group(row.as_ref())?;

            match row {
                Some(row) if same_group => {
                    self.current_group.add_line(row)?;

                    if self.fetcher_done {
                        self.flush(output)?;
                        self.current_group.reset(None)?;
                        return Ok(ExecutionState::Done);
                    }
                }
                row if self.current_group.is_valid() => {
                    self.flush(output)?;

                    let state = if row.is_some() {
                        ExecutionState::HasMore
                    } else {
                        ExecutionState::Done
                    };
                    self.current_group.reset(row)?;

                    return Ok(state);
                }
                None => return Ok(ExecutionState::Done),
                Some(row) => {
                    self.debug_log(format!("SortedCollect group start at {}", row.id()));
                    self.current_group.reset(Some(row))?;
                }
            }
        }
    }

    // Emit the current group as one output row.
    fn flush<W>(&mut self, output: &mut W) -> Result<(), InternalError>
    where
        W: OutputRowWriter + ?Sized,
    {
        let rows = self.current_group.lines();
        self.current_group.write_to_output(output)?;

        if !output.produced() {
            return Err(InternalError::executor_invariant(
                "group flush left the output row incomplete",
            ));
        }

        self.stats.groups_emitted = self.stats.groups_emitted.saturating_add(1);
        record(MetricsEvent::GroupEmitted { rows });
        self.debug_log(format!("SortedCollect group flushed -> {rows} rows"));

        Ok(())
    }

    #[cfg(test)]
    const fn group(&self) -> &CollectGroup {
        &self.current_group
    }
}
