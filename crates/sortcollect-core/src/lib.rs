//! Core runtime for SortCollect: a resumable sorted group-by executor with
//! pluggable aggregates, collect modes, and pull-based row I/O.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod aggregate;
pub mod block;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod fetcher;
pub mod obs;
pub mod row;
pub mod value;

///
/// Prelude
///
/// Prelude contains the vocabulary needed to configure and drive an executor.
/// Aggregator internals and metrics plumbing stay one module level down.
///

pub mod prelude {
    pub use crate::{
        block::CollectBlock,
        config::{CollectMode, SortedCollectConfig},
        executor::SortedCollectExecutor,
        fetcher::{ExecutionState, RowFetcher, VecRowFetcher},
        row::{InputRow, OutputBlock, OutputRow, OutputRowWriter, RowId},
        value::{TextMode, Value},
    };
}
