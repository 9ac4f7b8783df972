//! Per-function summaries over measurement tables.
//!
//! Summaries group rows by short callpath, so every call site of a
//! function contributes to one aggregate line. This is the view the
//! inspect command prints.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::calltree::CallTreeTable;
use crate::table::{MetricColumn, MetricTable};

/// Aggregate of all rows belonging to one function name
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSummary {
    pub function_name: String,
    /// Distinct call-tree nodes carrying this function
    pub call_sites: usize,
    /// Measurement rows that contributed (call sites times threads)
    pub rows: usize,
    /// Mean value per table column, in column order
    pub means: Vec<f64>,
}

/// Mean of every column grouped by function name
///
/// **Public**
///
/// # Arguments
/// * `table` - Measurement table to summarize
/// * `tree_table` - Call-tree table resolving node ids to names
///
/// # Returns
/// One summary per function, sorted by function name. Rows whose node
/// id is not in the call-tree table are skipped.
pub fn function_means<C: MetricColumn>(
    table: &MetricTable<C>,
    tree_table: &CallTreeTable,
) -> Vec<FunctionSummary> {
    let mut groups: BTreeMap<&str, Group> = BTreeMap::new();
    let mut unknown_rows = 0usize;

    for ((node_id, _), values) in table.rows() {
        let Some(row) = tree_table.row_for_node(node_id) else {
            unknown_rows += 1;
            continue;
        };

        let group = groups.entry(row.short_callpath.as_str()).or_insert_with(|| Group {
            sums: vec![0.0; table.columns().len()],
            rows: 0,
            nodes: Vec::new(),
        });
        for (sum, value) in group.sums.iter_mut().zip(values) {
            *sum += value;
        }
        group.rows += 1;
        if !group.nodes.contains(&node_id) {
            group.nodes.push(node_id);
        }
    }

    if unknown_rows > 0 {
        debug!("Skipped {} row(s) with node ids outside the call tree", unknown_rows);
    }

    groups
        .into_iter()
        .map(|(name, group)| FunctionSummary {
            function_name: name.to_string(),
            call_sites: group.nodes.len(),
            rows: group.rows,
            means: group
                .sums
                .iter()
                .map(|sum| sum / group.rows as f64)
                .collect(),
        })
        .collect()
}

/// The `top_n` functions ranked by mean of one metric, descending
///
/// Ties break by function name so output is stable. An unknown metric
/// name yields an empty ranking and a warning.
pub fn top_functions<C: MetricColumn>(
    table: &MetricTable<C>,
    tree_table: &CallTreeTable,
    metric: &str,
    top_n: usize,
) -> Vec<FunctionSummary> {
    let Some(position) = table.metric_position(metric) else {
        warn!("Metric '{}' not present in table, nothing to rank", metric);
        return Vec::new();
    };

    let mut summaries = function_means(table, tree_table);
    summaries.sort_by(|a, b| {
        b.means[position]
            .partial_cmp(&a.means[position])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.function_name.cmp(&b.function_name))
    });
    summaries.truncate(top_n);
    summaries
}

struct Group {
    sums: Vec<f64>,
    rows: usize,
    nodes: Vec<crate::calltree::NodeId>,
}
