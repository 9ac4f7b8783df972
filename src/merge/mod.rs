//! Merging measurement tables from independent profiling runs.
//!
//! Runs number their call-tree nodes independently, so tables cannot be
//! joined on node ids. The engine re-keys every run by full callpath,
//! inner-joins across all runs, and re-keys the result to the first
//! run's node ids. Before joining, the reconciler splits each run's
//! metrics into a common part (present everywhere) and run-specific
//! remainders, which must not overlap between runs.
//!
//! # Example
//! ```ignore
//! let merged = merge_runs(&[profile_a, profile_b])?;
//! println!(
//!     "Kept {} rows, dropped {}",
//!     merged.report.rows_kept, merged.report.dropped_rows
//! );
//! ```

mod engine;
mod reconciler;

pub use engine::{merge_runs, MergeReport, MergedProfile};
pub use reconciler::{partition_metrics, MetricPartition};

use thiserror::Error;

/// Errors raised while reconciling and joining runs
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MergeError {
    #[error("No runs given to merge")]
    NoRuns,

    #[error(
        "Metric '{metric}' appears in runs {run_a} and {run_b} but not in all runs, \
         so it belongs to neither the common nor a run-specific metric set"
    )]
    AmbiguousMetric {
        metric: String,
        run_a: usize,
        run_b: usize,
    },

    #[error("No callpath and thread combination is present in every run, merged table would be empty")]
    EmptyJoin,
}
