//! Metric projection over measurement tables.

use log::debug;

use crate::table::{MetricColumn, MetricTable};

/// Result of projecting a table onto a requested metric set
#[derive(Debug, Clone)]
pub struct MetricSelection<C: MetricColumn> {
    /// Table restricted to the requested metrics
    pub table: MetricTable<C>,
    /// Requested metric names absent from the source table, sorted
    pub dropped: Vec<String>,
}

/// Restrict a table to the metrics named in `requested`.
///
/// **Public**
///
/// Selection is lenient: requested metrics the table does not carry are
/// skipped rather than rejected, and reported back in
/// [`MetricSelection::dropped`] so callers can surface them. Columns
/// keep their original relative order. On a merged table a single
/// metric name selects that metric's column from every run.
///
/// # Arguments
/// * `table` - Source table
/// * `requested` - Metric names to keep
///
/// # Returns
/// The projected table together with the names that could not be
/// honoured
pub fn select_metrics<C: MetricColumn, S: AsRef<str>>(
    table: &MetricTable<C>,
    requested: &[S],
) -> MetricSelection<C> {
    let keep: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, column)| requested.iter().any(|name| name.as_ref() == column.metric()))
        .map(|(index, _)| index)
        .collect();

    let columns: Vec<C> = keep.iter().map(|&index| table.columns()[index].clone()).collect();

    let mut projected = MetricTable::new(columns);
    for ((node_id, thread_id), values) in table.rows() {
        let row: Vec<f64> = keep.iter().map(|&index| values[index]).collect();
        projected.insert_row(node_id, thread_id, row);
    }

    let mut dropped: Vec<String> = requested
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| table.metric_position(name).is_none())
        .map(str::to_string)
        .collect();
    dropped.sort();
    dropped.dedup();

    if !dropped.is_empty() {
        debug!("Selection dropped {} requested metric(s): {:?}", dropped.len(), dropped);
    }

    MetricSelection { table: projected, dropped }
}
