use profmerge::aggregator::{convert_series_to_inclusive, convert_table_to_inclusive};
use profmerge::calltree::CallTreeNode;
use profmerge::table::{MetricSeries, MetricTable};
use profmerge::utils::error::AggregationError;

/// root -> (a -> c, b)
fn four_node_tree() -> CallTreeNode {
    let mut root = CallTreeNode::new(0, None, "root");
    let mut a = CallTreeNode::new(1, None, "a");
    a.push_child(CallTreeNode::new(3, None, "c"));
    root.push_child(a);
    root.push_child(CallTreeNode::new(2, None, "b"));
    root
}

fn four_node_exclusive() -> MetricSeries {
    MetricSeries::from_entries(vec![(0, 1.0), (1, 2.0), (2, 3.0), (3, 4.0)])
}

#[test]
fn test_inclusive_series_sums_subtrees() {
    let inclusive = convert_series_to_inclusive(&four_node_exclusive(), &four_node_tree()).unwrap();

    assert_eq!(inclusive.get(0), Some(10.0));
    assert_eq!(inclusive.get(1), Some(6.0));
    assert_eq!(inclusive.get(2), Some(3.0));
    assert_eq!(inclusive.get(3), Some(4.0));
}

#[test]
fn test_inclusive_on_deep_chain() {
    // main -> stage -> step -> leaf
    let mut step = CallTreeNode::new(2, None, "step");
    step.push_child(CallTreeNode::new(3, None, "leaf"));
    let mut stage = CallTreeNode::new(1, None, "stage");
    stage.push_child(step);
    let mut root = CallTreeNode::new(0, None, "main");
    root.push_child(stage);

    let exclusive = MetricSeries::from_entries(vec![(0, 1.0), (1, 10.0), (2, 100.0), (3, 1000.0)]);
    let inclusive = convert_series_to_inclusive(&exclusive, &root).unwrap();

    // Every node carries its whole suffix of the chain
    assert_eq!(inclusive.get(3), Some(1000.0));
    assert_eq!(inclusive.get(2), Some(1100.0));
    assert_eq!(inclusive.get(1), Some(1110.0));
    assert_eq!(inclusive.get(0), Some(1111.0));
}

#[test]
fn test_internal_node_is_own_plus_children() {
    let mut root = CallTreeNode::new(0, None, "main");
    let mut mid = CallTreeNode::new(1, None, "mid");
    mid.push_child(CallTreeNode::new(2, None, "left"));
    mid.push_child(CallTreeNode::new(3, None, "right"));
    root.push_child(mid);

    let exclusive = MetricSeries::from_entries(vec![(0, 0.5), (1, 1.5), (2, 2.0), (3, 3.0)]);
    let inclusive = convert_series_to_inclusive(&exclusive, &root).unwrap();

    assert_eq!(inclusive.get(1), Some(1.5 + 2.0 + 3.0));
    assert_eq!(inclusive.get(0), Some(0.5 + 6.5));
}

#[test]
fn test_missing_node_value_is_loud() {
    let partial = MetricSeries::from_entries(vec![(0, 1.0), (1, 2.0), (2, 3.0)]);
    let err = convert_series_to_inclusive(&partial, &four_node_tree()).unwrap_err();
    assert_eq!(err, AggregationError::MissingNode { node_id: 3 });
}

#[test]
fn test_table_conversion_covers_all_threads() {
    let root = four_node_tree();
    let mut table = MetricTable::new(vec!["time".to_string(), "visits".to_string()]);
    for thread in 0..3u32 {
        table.insert_row(0, thread, vec![1.0, 1.0]);
        table.insert_row(1, thread, vec![2.0, 1.0]);
        table.insert_row(2, thread, vec![3.0, 1.0]);
        table.insert_row(3, thread, vec![4.0, 1.0]);
    }

    let inclusive = convert_table_to_inclusive(&table, &root).unwrap();

    assert_eq!(inclusive.row_count(), 12);
    for thread in 0..3u32 {
        assert_eq!(inclusive.row(0, thread), Some(&[10.0, 4.0][..]));
        assert_eq!(inclusive.row(1, thread), Some(&[6.0, 2.0][..]));
    }
}

#[test]
fn test_missing_row_for_reporting_thread_is_loud() {
    let root = four_node_tree();
    let mut table = MetricTable::new(vec!["time".to_string()]);
    for node in 0..4u32 {
        table.insert_row(node, 0, vec![1.0]);
    }
    // Thread 1 reports only the root
    table.insert_row(0, 1, vec![1.0]);

    let err = convert_table_to_inclusive(&table, &root).unwrap_err();
    assert_eq!(err, AggregationError::MissingRow { node_id: 1, thread_id: 1 });
}

#[test]
fn test_reaggregating_inclusive_is_not_inclusive() {
    let root = four_node_tree();
    let mut table = MetricTable::new(vec!["time".to_string()]);
    for (node, value) in [(0u32, 1.0), (1, 2.0), (2, 3.0), (3, 4.0)] {
        table.insert_row(node, 0, vec![value]);
    }

    let inclusive = convert_table_to_inclusive(&table, &root).unwrap();
    let twice = convert_table_to_inclusive(&inclusive, &root).unwrap();

    assert_ne!(twice, inclusive);
    assert_eq!(twice.get(0, 0, &"time".to_string()), Some(23.0));
}

#[test]
fn test_single_node_tree_is_unchanged() {
    let root = CallTreeNode::new(0, None, "main");
    let exclusive = MetricSeries::from_entries(vec![(0, 7.25)]);
    let inclusive = convert_series_to_inclusive(&exclusive, &root).unwrap();
    assert_eq!(inclusive.get(0), Some(7.25));
    assert_eq!(inclusive.len(), 1);
}
