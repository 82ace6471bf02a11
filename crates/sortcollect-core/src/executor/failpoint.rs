//! Module: executor::failpoint
//! Responsibility: deterministic fault injection at executor boundaries.
//! Does not own: error classification beyond the injected failure.
//! Boundary: compiled to no-ops outside test builds.

use crate::error::InternalError;

/// Fires once per folded input row, after aggregation and collect work.
pub(crate) const ADD_LINE: &str = "collect_group::add_line";

/// Fires at the start of every `produce_row` call, before any pull.
pub(crate) const PRODUCE_ROW: &str = "sorted_collect::produce_row";


/// Return an injected error when `name` is armed on this thread.
#[cfg(test)]
pub(crate) fn trigger(name: &'static str) -> Result<(), InternalError> {
    if armed::is_armed(name) {
        return Err(InternalError::debug_failpoint(
            crate::error::ErrorOrigin::Executor,
            name,
        ));
    }

    Ok(())
}

#[cfg(not(test))]
#[allow(clippy::unnecessary_wraps)]
#[inline]
pub(crate) const fn trigger(_name: &'static str) -> Result<(), InternalError> {
    Ok(())
}

/// Run `f` with the failpoint `name` armed; disarms on every exit.
#[cfg(test)]
pub(crate) fn with_failpoint<T>(name: &'static str, f: impl FnOnce() -> T) -> T {
    struct Guard(&'static str, bool);

    impl Drop for Guard {
        fn drop(&mut self) {
            if self.1 {
                armed::disarm(self.0);
            }
        }
    }

    let _guard = Guard(name, armed::arm(name));

    f()
}
