//! Metric-set reconciliation across runs.

use std::collections::BTreeSet;

use crate::merge::MergeError;

/// Split of per-run metric sets into shared and run-specific parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricPartition {
    /// Metrics present in every run
    pub common: BTreeSet<String>,
    /// Per-run remainders after removing the common set, in run order
    pub specific: Vec<BTreeSet<String>>,
}

/// Partition per-run metric sets into common and run-specific metrics
///
/// **Public**
///
/// The common set is the intersection of all runs. Each run's specific
/// set is whatever remains, and those remainders must be pairwise
/// disjoint: a metric in some runs but not all cannot be placed in
/// either part of the partition, so the merge refuses the input rather
/// than guess.
///
/// # Arguments
/// * `metric_sets` - One metric-name set per run, in run order
///
/// # Returns
/// The partition, or an error naming the first ambiguous metric found
///
/// # Errors
/// [`MergeError::NoRuns`] for empty input, [`MergeError::AmbiguousMetric`]
/// when two runs share a metric outside the common set
pub fn partition_metrics(metric_sets: &[BTreeSet<String>]) -> Result<MetricPartition, MergeError> {
    let Some(first) = metric_sets.first() else {
        return Err(MergeError::NoRuns);
    };

    let common: BTreeSet<String> = metric_sets[1..]
        .iter()
        .fold(first.clone(), |common, set| &common & set);

    let specific: Vec<BTreeSet<String>> =
        metric_sets.iter().map(|set| set - &common).collect();

    for (run_a, left) in specific.iter().enumerate() {
        for (offset, right) in specific[run_a + 1..].iter().enumerate() {
            if let Some(metric) = left.intersection(right).next() {
                return Err(MergeError::AmbiguousMetric {
                    metric: metric.clone(),
                    run_a,
                    run_b: run_a + 1 + offset,
                });
            }
        }
    }

    Ok(MetricPartition { common, specific })
}
