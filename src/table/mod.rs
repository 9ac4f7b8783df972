//! Measurement tables keyed by call-tree node and thread.
//!
//! A [`MetricTable`] holds one `f64` per (node, thread, metric) triple.
//! Rows are kept in a sorted map so iteration order is deterministic:
//! ascending node id, then ascending thread id. Columns are a plain
//! vector in insertion order.
//!
//! Tables from a single run use `String` column labels. Merged tables
//! use [`RunMetric`] labels so the same metric name can appear once per
//! run without colliding. The [`MetricColumn`] trait lets selection and
//! summaries work over both.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::calltree::NodeId;

pub mod select;
pub mod summary;

pub use select::{select_metrics, MetricSelection};
pub use summary::{function_means, top_functions, FunctionSummary};

/// Identifier of the thread (or rank) a measurement row belongs to
pub type ThreadId = u32;

/// Row key of a measurement table
pub type RowKey = (NodeId, ThreadId);

/// Column label of a measurement table.
///
/// Every label names exactly one metric; merged tables additionally
/// carry the run the column came from.
pub trait MetricColumn: Clone + Ord + fmt::Display {
    /// The metric name this column measures
    fn metric(&self) -> &str;
}

impl MetricColumn for String {
    fn metric(&self) -> &str {
        self
    }
}

/// Column label of a merged table: a metric qualified by its run index
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RunMetric {
    /// Zero-based index of the run in merge input order
    pub run: usize,
    /// Metric name within that run
    pub metric: String,
}

impl fmt::Display for RunMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run{}:{}", self.run, self.metric)
    }
}

impl MetricColumn for RunMetric {
    fn metric(&self) -> &str {
        &self.metric
    }
}

/// Dense per-node, per-thread measurement table.
///
/// Row values are stored in column order and always have exactly one
/// entry per column.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTable<C: MetricColumn = String> {
    columns: Vec<C>,
    rows: BTreeMap<RowKey, Vec<f64>>,
}

impl<C: MetricColumn> MetricTable<C> {
    /// Create an empty table with the given column labels
    pub fn new(columns: Vec<C>) -> Self {
        Self {
            columns,
            rows: BTreeMap::new(),
        }
    }

    /// Column labels in column order
    pub fn columns(&self) -> &[C] {
        &self.columns
    }

    /// Position of an exact column label
    pub fn column_index(&self, column: &C) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Position of the first column measuring the given metric
    pub fn metric_position(&self, metric: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.metric() == metric)
    }

    /// Distinct metric names across all columns, sorted
    pub fn metric_names(&self) -> BTreeSet<String> {
        self.columns.iter().map(|c| c.metric().to_string()).collect()
    }

    /// Insert one row of values for a (node, thread) key
    ///
    /// # Returns
    /// The previous row for the key, if one existed
    ///
    /// # Panics
    /// Panics when `values` does not have one entry per column. Rows
    /// from external input are arity-checked by the dump reader before
    /// they reach a table.
    pub fn insert_row(
        &mut self,
        node_id: NodeId,
        thread_id: ThreadId,
        values: Vec<f64>,
    ) -> Option<Vec<f64>> {
        assert_eq!(
            values.len(),
            self.columns.len(),
            "Row arity must match column count"
        );
        self.rows.insert((node_id, thread_id), values)
    }

    /// Single cell lookup
    pub fn get(&self, node_id: NodeId, thread_id: ThreadId, column: &C) -> Option<f64> {
        let index = self.column_index(column)?;
        self.rows.get(&(node_id, thread_id)).map(|row| row[index])
    }

    /// Full row for a (node, thread) key
    pub fn row(&self, node_id: NodeId, thread_id: ThreadId) -> Option<&[f64]> {
        self.rows.get(&(node_id, thread_id)).map(Vec::as_slice)
    }

    /// Iterate all rows in key order
    pub fn rows(&self) -> impl Iterator<Item = ((NodeId, ThreadId), &[f64])> {
        self.rows.iter().map(|(&key, values)| (key, values.as_slice()))
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when the table holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct node ids with at least one row, sorted
    pub fn node_ids(&self) -> BTreeSet<NodeId> {
        self.rows.keys().map(|&(node_id, _)| node_id).collect()
    }

    /// Distinct thread ids with at least one row, sorted
    pub fn thread_ids(&self) -> BTreeSet<ThreadId> {
        self.rows.keys().map(|&(_, thread_id)| thread_id).collect()
    }

    /// Extract one column for one thread as a per-node series
    pub fn column_series(&self, column: &C, thread_id: ThreadId) -> Option<MetricSeries> {
        let index = self.column_index(column)?;
        let mut series = MetricSeries::default();
        for (&(node_id, thread), values) in &self.rows {
            if thread == thread_id {
                series.push(node_id, values[index]);
            }
        }
        Some(series)
    }
}

/// Per-node values of a single metric on a single thread.
///
/// Entries keep the order they were pushed in, which for series built
/// from a table is ascending node id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSeries {
    entries: Vec<(NodeId, f64)>,
}

impl MetricSeries {
    /// Build a series from (node, value) pairs
    pub fn from_entries(entries: Vec<(NodeId, f64)>) -> Self {
        Self { entries }
    }

    /// Append one node's value
    pub fn push(&mut self, node_id: NodeId, value: f64) {
        self.entries.push((node_id, value));
    }

    /// Value for one node, if present
    pub fn get(&self, node_id: NodeId) -> Option<f64> {
        self.entries
            .iter()
            .find(|(id, _)| *id == node_id)
            .map(|&(_, value)| value)
    }

    /// Iterate (node, value) pairs in stored order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the series holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_metric_table() -> MetricTable {
        let mut table = MetricTable::new(vec!["time".to_string(), "visits".to_string()]);
        table.insert_row(1, 0, vec![2.5, 4.0]);
        table.insert_row(0, 0, vec![1.0, 1.0]);
        table.insert_row(0, 1, vec![1.5, 1.0]);
        table
    }

    #[test]
    fn test_rows_iterate_in_key_order() {
        let table = two_metric_table();
        let keys: Vec<RowKey> = table.rows().map(|(key, _)| key).collect();
        assert_eq!(keys, vec![(0, 0), (0, 1), (1, 0)]);
    }

    #[test]
    fn test_cell_lookup() {
        let table = two_metric_table();
        assert_eq!(table.get(1, 0, &"time".to_string()), Some(2.5));
        assert_eq!(table.get(1, 0, &"visits".to_string()), Some(4.0));
        assert_eq!(table.get(1, 1, &"time".to_string()), None);
        assert_eq!(table.get(1, 0, &"bogus".to_string()), None);
    }

    #[test]
    fn test_insert_row_replaces_and_returns_previous() {
        let mut table = two_metric_table();
        let previous = table.insert_row(0, 0, vec![9.0, 9.0]);
        assert_eq!(previous, Some(vec![1.0, 1.0]));
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    #[should_panic(expected = "Row arity")]
    fn test_insert_row_rejects_wrong_arity() {
        let mut table = two_metric_table();
        table.insert_row(5, 0, vec![1.0]);
    }

    #[test]
    fn test_node_and_thread_ids() {
        let table = two_metric_table();
        assert_eq!(table.node_ids().into_iter().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(table.thread_ids().into_iter().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_column_series_filters_by_thread() {
        let table = two_metric_table();
        let series = table.column_series(&"time".to_string(), 0).unwrap();
        assert_eq!(series.iter().collect::<Vec<_>>(), vec![(0, 1.0), (1, 2.5)]);
        assert_eq!(series.get(0), Some(1.0));
        assert_eq!(series.get(7), None);
    }

    #[test]
    fn test_run_metric_display_and_lookup() {
        let columns = vec![
            RunMetric { run: 0, metric: "time".to_string() },
            RunMetric { run: 1, metric: "time".to_string() },
        ];
        let table: MetricTable<RunMetric> = MetricTable::new(columns);
        assert_eq!(table.columns()[1].to_string(), "run1:time");
        assert_eq!(table.metric_position("time"), Some(0));
        assert_eq!(table.metric_names().len(), 1);
    }
}
