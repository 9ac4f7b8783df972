//! Callpath-keyed inner join of N profiling runs.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use log::{debug, warn};
use serde::Serialize;

use crate::calltree::NodeId;
use crate::dump::ProfileData;
use crate::merge::{partition_metrics, MergeError};
use crate::table::{MetricTable, RunMetric, ThreadId};

/// Result of merging several runs into one view
#[derive(Debug, Clone)]
pub struct MergedProfile {
    /// Metrics present in every run, columns run-major
    pub common: MetricTable<RunMetric>,
    /// Metrics private to single runs, columns grouped by run
    pub specific: MetricTable<RunMetric>,
    /// What was kept, what was dropped, and where the runs came from
    pub report: MergeReport,
}

/// Merge provenance and drop accounting.
///
/// Rows that do not survive the join are omitted from the tables by
/// policy; the report is where that omission stays visible.
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    /// RFC 3339 timestamp of the merge
    pub generated_at: String,
    /// Origin label of each run, in input order
    pub run_origins: Vec<String>,
    /// Metrics shared by all runs, sorted
    pub common_metrics: Vec<String>,
    /// Per-run metrics outside the common set, sorted, in run order
    pub specific_metrics: Vec<Vec<String>>,
    /// (node, thread) rows present in the merged tables
    pub rows_kept: usize,
    /// Distinct (callpath, thread) keys dropped by the join
    pub dropped_rows: usize,
    /// Callpaths with at least one dropped key, sorted, deduplicated
    pub dropped_callpaths: Vec<String>,
}

/// Merge the measurement tables of independent runs
///
/// **Public**
///
/// Runs are joined on (full callpath, thread): a row survives only when
/// every run measured that key. Surviving rows are keyed by the first
/// run's node ids, which makes the first run's call tree the canonical
/// one for all downstream lookups. Keys dropped by the join, including
/// callpaths the first run's tree does not know, are counted in the
/// report rather than raised.
///
/// # Arguments
/// * `runs` - Loaded profiles in run order; the first becomes canonical
///
/// # Returns
/// The common and run-specific merged tables plus the merge report
///
/// # Errors
/// [`MergeError::NoRuns`] for an empty slice,
/// [`MergeError::AmbiguousMetric`] when the runs' metric sets cannot be
/// partitioned, [`MergeError::EmptyJoin`] when no key survives
pub fn merge_runs(runs: &[ProfileData]) -> Result<MergedProfile, MergeError> {
    if runs.is_empty() {
        return Err(MergeError::NoRuns);
    }
    debug!("Merging {} run(s)", runs.len());

    let metric_sets: Vec<BTreeSet<String>> =
        runs.iter().map(|run| run.table.metric_names()).collect();
    let partition = partition_metrics(&metric_sets)?;

    // Node ids are run-local, callpaths are not: re-key every run's rows
    // by (full callpath, thread) before joining.
    let mut rekeyed: Vec<BTreeMap<(String, ThreadId), &[f64]>> = Vec::with_capacity(runs.len());
    for run in runs {
        let mut rows: BTreeMap<(String, ThreadId), &[f64]> = BTreeMap::new();
        let mut orphans = 0usize;
        for ((node_id, thread_id), values) in run.table.rows() {
            match run.tree_table.callpath_for_node(node_id) {
                Some(callpath) => {
                    rows.insert((callpath.to_string(), thread_id), values);
                }
                None => orphans += 1,
            }
        }
        if orphans > 0 {
            debug!(
                "Run '{}': skipped {} row(s) without a call-tree node before joining",
                run.origin, orphans
            );
        }
        rekeyed.push(rows);
    }

    // Inner join, walking the first run's keys; survivors are re-keyed
    // through the first run's callpath map.
    let reference = &runs[0].tree_table;
    let mut joined: Vec<JoinedRow<'_>> = Vec::new();
    let mut dropped: BTreeSet<&(String, ThreadId)> = BTreeSet::new();

    'keys: for (key, &first_values) in &rekeyed[0] {
        let mut row_values: Vec<&[f64]> = Vec::with_capacity(runs.len());
        row_values.push(first_values);
        for other in &rekeyed[1..] {
            match other.get(key) {
                Some(&values) => row_values.push(values),
                None => {
                    dropped.insert(key);
                    continue 'keys;
                }
            }
        }
        let Some(node_id) = reference.node_for_callpath(&key.0) else {
            dropped.insert(key);
            continue;
        };
        joined.push(JoinedRow { node_id, thread_id: key.1, rows: row_values });
    }

    // Keys the first run never had are join misses too
    for other in &rekeyed[1..] {
        for key in other.keys() {
            if !rekeyed[0].contains_key(key) {
                dropped.insert(key);
            }
        }
    }

    if joined.is_empty() {
        return Err(MergeError::EmptyJoin);
    }

    let common_metrics: Vec<String> = partition.common.iter().cloned().collect();
    let specific_metrics: Vec<Vec<String>> = partition
        .specific
        .iter()
        .map(|set| set.iter().cloned().collect())
        .collect();

    // Column layout: common is run-major over the sorted common metrics,
    // specific groups each run's own metrics. Source positions are
    // resolved once per run.
    let mut common_columns = Vec::with_capacity(runs.len() * common_metrics.len());
    let mut common_positions: Vec<Vec<usize>> = Vec::with_capacity(runs.len());
    let mut specific_columns = Vec::new();
    let mut specific_positions: Vec<Vec<usize>> = Vec::with_capacity(runs.len());

    for (run_index, run) in runs.iter().enumerate() {
        let positions: Vec<usize> = common_metrics
            .iter()
            .filter_map(|metric| run.table.metric_position(metric))
            .collect();
        // The partition puts a metric in `common` only if every run has it
        debug_assert_eq!(positions.len(), common_metrics.len());
        common_positions.push(positions);
        for metric in &common_metrics {
            common_columns.push(RunMetric { run: run_index, metric: metric.clone() });
        }

        let own = &specific_metrics[run_index];
        let positions: Vec<usize> = own
            .iter()
            .filter_map(|metric| run.table.metric_position(metric))
            .collect();
        debug_assert_eq!(positions.len(), own.len());
        specific_positions.push(positions);
        for metric in own {
            specific_columns.push(RunMetric { run: run_index, metric: metric.clone() });
        }
    }

    let mut common = MetricTable::new(common_columns);
    let mut specific = MetricTable::new(specific_columns);

    for row in &joined {
        let mut common_values = Vec::with_capacity(common.columns().len());
        for (run_values, positions) in row.rows.iter().zip(&common_positions) {
            common_values.extend(positions.iter().map(|&position| run_values[position]));
        }
        common.insert_row(row.node_id, row.thread_id, common_values);

        let mut specific_values = Vec::with_capacity(specific.columns().len());
        for (run_values, positions) in row.rows.iter().zip(&specific_positions) {
            specific_values.extend(positions.iter().map(|&position| run_values[position]));
        }
        specific.insert_row(row.node_id, row.thread_id, specific_values);
    }

    let mut dropped_callpaths: Vec<String> =
        dropped.iter().map(|key| key.0.clone()).collect();
    dropped_callpaths.dedup();

    if !dropped.is_empty() {
        warn!(
            "Merge dropped {} row key(s) not measured in every run ({} callpath(s) affected)",
            dropped.len(),
            dropped_callpaths.len()
        );
    }

    let report = MergeReport {
        generated_at: Utc::now().to_rfc3339(),
        run_origins: runs.iter().map(|run| run.origin.clone()).collect(),
        common_metrics,
        specific_metrics,
        rows_kept: joined.len(),
        dropped_rows: dropped.len(),
        dropped_callpaths,
    };

    Ok(MergedProfile { common, specific, report })
}

struct JoinedRow<'a> {
    node_id: NodeId,
    thread_id: ThreadId,
    rows: Vec<&'a [f64]>,
}
