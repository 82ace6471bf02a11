//! Module: fetcher
//! Responsibility: upstream pull contract plus materialized and suspending adapters.
//! Does not own: grouping or output assembly.
//! Boundary: executors only observe `(ExecutionState, Option<InputRow>)` pairs.


use crate::{
    error::InternalError,
    row::{InputRow, RowId},
    value::Value,
};

///
/// ExecutionState
///
/// Outcome of one pull, shared by fetchers and executors.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecutionState {
    /// Blocked on upstream; retry later, nothing was consumed.
    Waiting,
    /// Progress was made and more is expected.
    HasMore,
    /// The stream is finished (possibly together with one final row).
    Done,
}

///
/// RowFetcher
///
/// Internal pull-based upstream contract.
/// `Waiting` carries no row. `Done` carries either the final row or `None`,
/// and every pull after that reports `(Done, None)`.
///

pub trait RowFetcher {
    fn fetch_row(&mut self) -> Result<(ExecutionState, Option<InputRow>), InternalError>;
}

impl<T> RowFetcher for Box<T>
where
    T: RowFetcher + ?Sized,
{
    fn fetch_row(&mut self) -> Result<(ExecutionState, Option<InputRow>), InternalError> {
        self.as_mut().fetch_row()
    }
}

impl<T> RowFetcher for &mut T
where
    T: RowFetcher + ?Sized,
{
    fn fetch_row(&mut self) -> Result<(ExecutionState, Option<InputRow>), InternalError> {
        (**self).fetch_row()
    }
}

///
/// VecRowFetcher
///
/// Adapter that exposes materialized rows through the `RowFetcher` interface.
/// The last row is delivered together with `Done`.
///

#[derive(Debug)]
pub struct VecRowFetcher {
    rows: std::vec::IntoIter<InputRow>,
    pulls: usize,
}

impl VecRowFetcher {
    #[must_use]
    pub fn new(rows: Vec<InputRow>) -> Self {
        Self {
            rows: rows.into_iter(),
            pulls: 0,
        }
    }

    /// Build rows from raw register values, assigning provenance tokens from 1.
    #[must_use]
    pub fn from_values(rows: impl IntoIterator<Item = Vec<Value>>) -> Self {
        let mut id = RowId::new(0);
        let rows = rows
            .into_iter()
            .map(|values| {
                id = id.next();
                InputRow::new(id, values)
            })
            .collect();

        Self::new(rows)
    }

    /// Number of `fetch_row` calls served so far.
    #[must_use]
    pub const fn pulls(&self) -> usize {
        self.pulls
    }
}

impl RowFetcher for VecRowFetcher {
    fn fetch_row(&mut self) -> Result<(ExecutionState, Option<InputRow>), InternalError> {
        self.pulls = self.pulls.saturating_add(1);

        let row = self.rows.next();
        let state = if self.rows.len() == 0 {
            ExecutionState::Done
        } else {
            ExecutionState::HasMore
        };

        Ok((state, row))
    }
}

///
/// WaitingRowFetcher
///
/// Wrapper that reports `Waiting` before selected deliveries without polling
/// the inner fetcher. Schedule entries are delivery indexes (0-based); an
/// index listed `n` times yields `n` consecutive waits.
///

pub struct WaitingRowFetcher<F> {
    inner: F,
    schedule: Vec<usize>,
    cursor: usize,
    delivered: usize,
    waits: usize,
}

impl<F> WaitingRowFetcher<F>
where
    F: RowFetcher,
{
    #[must_use]
    pub fn new(inner: F, schedule: impl IntoIterator<Item = usize>) -> Self {
        let mut schedule = schedule.into_iter().collect::<Vec<_>>();
        schedule.sort_unstable();

        Self {
            inner,
            schedule,
            cursor: 0,
            delivered: 0,
            waits: 0,
        }
    }

    /// Number of `Waiting` responses reported so far.
    #[must_use]
    pub const fn waits(&self) -> usize {
        self.waits
    }

    #[must_use]
    pub fn into_inner(self) -> F {
        self.inner
    }
}

impl<F> RowFetcher for WaitingRowFetcher<F>
where
    F: RowFetcher,
{
    fn fetch_row(&mut self) -> Result<(ExecutionState, Option<InputRow>), InternalError> {
        if self.schedule.get(self.cursor) == Some(&self.delivered) {
            self.cursor += 1;
            self.waits = self.waits.saturating_add(1);
            return Ok((ExecutionState::Waiting, None));
        }

        let fetched = self.inner.fetch_row()?;
        if fetched.0 != ExecutionState::Waiting {
            self.delivered = self.delivered.saturating_add(1);
        }

        Ok(fetched)
    }
}
