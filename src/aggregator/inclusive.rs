//! Exclusive-to-inclusive conversion over a call tree.
//!
//! An exclusive value counts only what a node spent itself; the
//! inclusive value adds everything its subtree spent. Conversion is a
//! single bottom-up pass, memoized by node id, so shared subtrees are
//! never walked twice.
//!
//! Conversion is only meaningful for metrics that sum over the tree
//! (time, visit counts, bytes moved). Sampled state metrics such as
//! memory footprints do not add up this way; callers pick the
//! convertible columns before converting, this module does not judge
//! metric semantics. Converting an already inclusive table simply sums
//! subtree sums again and yields inflated numbers.

use std::collections::HashMap;

use log::debug;

use crate::calltree::{CallTreeNode, NodeId};
use crate::table::{MetricColumn, MetricSeries, MetricTable, ThreadId};
use crate::utils::error::AggregationError;

/// Convert one exclusive series into its inclusive counterpart
///
/// **Public**
///
/// # Arguments
/// * `series` - Exclusive values, one per call-tree node
/// * `root` - Call tree the values belong to
///
/// # Returns
/// Inclusive series in preorder, one entry per tree node
///
/// # Errors
/// Returns [`AggregationError::MissingNode`] when a tree node has no
/// value in the series. Series entries for ids outside the tree are
/// ignored.
///
/// # Example
/// ```ignore
/// let inclusive = convert_series_to_inclusive(&exclusive, &root)?;
/// assert_eq!(inclusive.get(root.node_id), Some(total));
/// ```
pub fn convert_series_to_inclusive(
    series: &MetricSeries,
    root: &CallTreeNode,
) -> Result<MetricSeries, AggregationError> {
    let exclusive: HashMap<NodeId, f64> = series.iter().collect();
    let mut inclusive: HashMap<NodeId, f64> = HashMap::with_capacity(root.node_count());

    accumulate_series(root, &exclusive, &mut inclusive)?;

    let extra = exclusive.len().saturating_sub(inclusive.len());
    if extra > 0 {
        debug!("Ignored {} series entr(ies) for nodes outside the tree", extra);
    }

    Ok(MetricSeries::from_entries(
        root.iter().map(|node| (node.node_id, inclusive[&node.node_id])).collect(),
    ))
}

fn accumulate_series(
    node: &CallTreeNode,
    exclusive: &HashMap<NodeId, f64>,
    inclusive: &mut HashMap<NodeId, f64>,
) -> Result<f64, AggregationError> {
    let own = *exclusive
        .get(&node.node_id)
        .ok_or(AggregationError::MissingNode { node_id: node.node_id })?;

    let mut total = own;
    for child in &node.children {
        total += accumulate_series(child, exclusive, inclusive)?;
    }

    inclusive.insert(node.node_id, total);
    Ok(total)
}

/// Convert every column of an exclusive table to inclusive values
///
/// **Public**
///
/// All columns are converted together in one tree walk per thread, so
/// a row's values stay aligned. The output keeps the input's column
/// labels and covers exactly the tree's nodes crossed with the input's
/// threads.
///
/// # Arguments
/// * `table` - Exclusive measurement table
/// * `root` - Call tree the measurements belong to
///
/// # Returns
/// Inclusive table with the same columns
///
/// # Errors
/// Returns [`AggregationError::MissingRow`] when a (tree node, thread)
/// pair has no row in the input. Rows for node ids outside the tree
/// are ignored.
pub fn convert_table_to_inclusive<C: MetricColumn>(
    table: &MetricTable<C>,
    root: &CallTreeNode,
) -> Result<MetricTable<C>, AggregationError> {
    let threads = table.thread_ids();
    let mut result = MetricTable::new(table.columns().to_vec());
    if threads.is_empty() {
        return Ok(result);
    }

    for &thread_id in &threads {
        let mut memo: HashMap<NodeId, Vec<f64>> = HashMap::with_capacity(root.node_count());
        accumulate_rows(root, thread_id, table, &mut memo)?;

        for node in root.iter() {
            // Every tree node was memoized by the walk above
            if let Some(values) = memo.remove(&node.node_id) {
                result.insert_row(node.node_id, thread_id, values);
            }
        }
    }

    let ignored = table.row_count().saturating_sub(result.row_count());
    if ignored > 0 {
        debug!("Ignored {} row(s) for nodes outside the tree", ignored);
    }

    Ok(result)
}

fn accumulate_rows<C: MetricColumn>(
    node: &CallTreeNode,
    thread_id: ThreadId,
    table: &MetricTable<C>,
    memo: &mut HashMap<NodeId, Vec<f64>>,
) -> Result<Vec<f64>, AggregationError> {
    let own = table
        .row(node.node_id, thread_id)
        .ok_or(AggregationError::MissingRow { node_id: node.node_id, thread_id })?;

    let mut totals = own.to_vec();
    for child in &node.children {
        let child_totals = accumulate_rows(child, thread_id, table, memo)?;
        for (total, value) in totals.iter_mut().zip(&child_totals) {
            *total += value;
        }
    }

    memo.insert(node.node_id, totals.clone());
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root -> (a -> c, b), exclusive root=1 a=2 b=3 c=4
    fn diamond_fixture() -> (CallTreeNode, MetricSeries) {
        let mut root = CallTreeNode::new(0, None, "root");
        let mut a = CallTreeNode::new(1, None, "a");
        a.push_child(CallTreeNode::new(3, None, "c"));
        root.push_child(a);
        root.push_child(CallTreeNode::new(2, None, "b"));

        let series =
            MetricSeries::from_entries(vec![(0, 1.0), (1, 2.0), (2, 3.0), (3, 4.0)]);
        (root, series)
    }

    #[test]
    fn test_series_root_carries_total() {
        let (root, series) = diamond_fixture();
        let inclusive = convert_series_to_inclusive(&series, &root).unwrap();

        assert_eq!(inclusive.get(0), Some(10.0));
        assert_eq!(inclusive.get(1), Some(6.0));
        assert_eq!(inclusive.get(2), Some(3.0));
        assert_eq!(inclusive.get(3), Some(4.0));
    }

    #[test]
    fn test_series_output_is_preorder() {
        let (root, series) = diamond_fixture();
        let inclusive = convert_series_to_inclusive(&series, &root).unwrap();
        let order: Vec<NodeId> = inclusive.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![0, 1, 3, 2]);
    }

    #[test]
    fn test_series_missing_node_is_error() {
        let (root, _) = diamond_fixture();
        let partial = MetricSeries::from_entries(vec![(0, 1.0), (1, 2.0), (2, 3.0)]);
        let err = convert_series_to_inclusive(&partial, &root).unwrap_err();
        assert_eq!(err, AggregationError::MissingNode { node_id: 3 });
    }

    #[test]
    fn test_series_extra_nodes_are_ignored() {
        let (root, mut series) = diamond_fixture();
        series.push(42, 100.0);
        let inclusive = convert_series_to_inclusive(&series, &root).unwrap();
        assert_eq!(inclusive.len(), 4);
        assert_eq!(inclusive.get(0), Some(10.0));
        assert_eq!(inclusive.get(42), None);
    }

    #[test]
    fn test_leaf_inclusive_equals_exclusive() {
        let root = CallTreeNode::new(0, None, "only");
        let series = MetricSeries::from_entries(vec![(0, 5.5)]);
        let inclusive = convert_series_to_inclusive(&series, &root).unwrap();
        assert_eq!(inclusive.get(0), Some(5.5));
    }

    #[test]
    fn test_table_converts_all_columns_and_threads() {
        let (root, _) = diamond_fixture();
        let mut table = MetricTable::new(vec!["time".to_string(), "visits".to_string()]);
        for thread in 0..2u32 {
            let scale = (thread + 1) as f64;
            table.insert_row(0, thread, vec![1.0 * scale, 1.0]);
            table.insert_row(1, thread, vec![2.0 * scale, 1.0]);
            table.insert_row(2, thread, vec![3.0 * scale, 1.0]);
            table.insert_row(3, thread, vec![4.0 * scale, 1.0]);
        }

        let inclusive = convert_table_to_inclusive(&table, &root).unwrap();
        assert_eq!(inclusive.row(0, 0), Some(&[10.0, 4.0][..]));
        assert_eq!(inclusive.row(0, 1), Some(&[20.0, 4.0][..]));
        assert_eq!(inclusive.row(1, 0), Some(&[6.0, 2.0][..]));
        assert_eq!(inclusive.row(3, 1), Some(&[8.0, 1.0][..]));
        assert_eq!(inclusive.row_count(), 8);
    }

    #[test]
    fn test_table_missing_row_is_error() {
        let (root, _) = diamond_fixture();
        let mut table = MetricTable::new(vec!["time".to_string()]);
        table.insert_row(0, 0, vec![1.0]);
        table.insert_row(1, 0, vec![2.0]);
        table.insert_row(2, 0, vec![3.0]);
        // node 3 present on thread 0 only
        table.insert_row(3, 0, vec![4.0]);
        table.insert_row(0, 1, vec![1.0]);
        table.insert_row(1, 1, vec![2.0]);
        table.insert_row(2, 1, vec![3.0]);

        let err = convert_table_to_inclusive(&table, &root).unwrap_err();
        assert_eq!(err, AggregationError::MissingRow { node_id: 3, thread_id: 1 });
    }

    #[test]
    fn test_table_empty_input_yields_empty_output() {
        let (root, _) = diamond_fixture();
        let table: MetricTable = MetricTable::new(vec!["time".to_string()]);
        let inclusive = convert_table_to_inclusive(&table, &root).unwrap();
        assert!(inclusive.is_empty());
        assert_eq!(inclusive.columns(), &["time".to_string()]);
    }

    #[test]
    fn test_reconverting_inclusive_overcounts() {
        let (root, series) = diamond_fixture();
        let inclusive = convert_series_to_inclusive(&series, &root).unwrap();
        let twice = convert_series_to_inclusive(&inclusive, &root).unwrap();
        assert_ne!(twice.get(0), inclusive.get(0));
        assert_eq!(twice.get(0), Some(23.0));
    }
}
