//! Dump file reading, validation and session construction.
//!
//! Reads a JSON instrumentation dump, validates it against the schema
//! invariants, and assembles the [`ProfileData`] session that every
//! later stage works on.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{debug, warn};

use crate::calltree::{CallTreeNode, CallTreeTable, NodeId};
use crate::dump::schema::{DumpNode, ProfileDump};
use crate::table::{select_metrics, MetricTable};
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::{AggregationError, DumpError};

/// One loaded profiling run, the context object passed between stages.
///
/// Everything downstream (aggregation, merging, summaries) reads from
/// this; nothing mutates it after construction.
#[derive(Debug, Clone)]
pub struct ProfileData {
    /// Label of the run the dump came from
    pub origin: String,
    /// Call tree the measurements refer to
    pub call_tree: CallTreeNode,
    /// Flattened tree with callpath lookups
    pub tree_table: CallTreeTable,
    /// Exclusive measurements, one row per (node, thread)
    pub table: MetricTable,
    /// Metrics the dump declares safe to convert to inclusive values
    pub convertible: HashSet<String>,
}

/// An inclusive view of a run, restricted to its convertible metrics
#[derive(Debug, Clone)]
pub struct InclusiveView {
    /// Inclusive values for the convertible columns
    pub table: MetricTable,
    /// Metric names left out because the dump does not mark them
    /// convertible, sorted
    pub skipped: Vec<String>,
}

impl ProfileData {
    /// Convert this run's convertible metrics to inclusive values
    ///
    /// **Public**
    ///
    /// Only columns the dump marks `inclusive_convertible` are
    /// converted; the rest are reported in [`InclusiveView::skipped`]
    /// rather than transformed into numbers that would not mean
    /// anything.
    ///
    /// # Errors
    /// Propagates [`AggregationError`] when the table misses a row the
    /// call tree requires
    pub fn inclusive_table(&self) -> Result<InclusiveView, AggregationError> {
        let requested: Vec<&str> = self.convertible.iter().map(String::as_str).collect();
        let selection = select_metrics(&self.table, &requested);

        let table =
            crate::aggregator::convert_table_to_inclusive(&selection.table, &self.call_tree)?;

        let skipped: Vec<String> = self
            .table
            .metric_names()
            .into_iter()
            .filter(|metric| !self.convertible.contains(metric))
            .collect();

        Ok(InclusiveView { table, skipped })
    }
}

/// Read a dump file without validating its contents
///
/// **Public** - parse step only, see [`build_profile`] for validation
///
/// # Arguments
/// * `path` - Path to the dump JSON file
///
/// # Returns
/// The raw deserialized dump
///
/// # Errors
/// * `DumpError::Io` - File cannot be opened or read
/// * `DumpError::Json` - Contents are not valid dump JSON
pub fn read_dump(path: impl AsRef<Path>) -> Result<ProfileDump, DumpError> {
    let path = path.as_ref();
    debug!("Reading dump from: {}", path.display());

    let file = File::open(path)?;
    let dump: ProfileDump = serde_json::from_reader(BufReader::new(file))?;

    if dump.version != SCHEMA_VERSION {
        warn!(
            "Dump version '{}' differs from supported '{}', reading anyway",
            dump.version, SCHEMA_VERSION
        );
    }

    debug!(
        "Dump loaded: origin '{}', {} metric(s), {} record(s)",
        dump.origin,
        dump.metrics.len(),
        dump.records.len()
    );

    Ok(dump)
}

/// Validate a dump and assemble the processing session
///
/// **Public**
///
/// # Arguments
/// * `dump` - Raw dump, typically from [`read_dump`]
///
/// # Returns
/// The session context with the call tree, its flattened table and the
/// exclusive measurement table. Records for node ids absent from the
/// tree are dropped with a debug-log count.
///
/// # Errors
/// * `DumpError::NoMetrics` / `DumpError::DuplicateMetric` - Bad metric list
/// * `DumpError::DuplicateNode` - Node id appears twice in the tree
/// * `DumpError::ValueCountMismatch` - Record arity differs from the metric list
/// * `DumpError::DuplicateRecord` - Two records for one (node, thread)
/// * `DumpError::NoRecords` - No record survived validation
pub fn build_profile(dump: ProfileDump) -> Result<ProfileData, DumpError> {
    if dump.metrics.is_empty() {
        return Err(DumpError::NoMetrics);
    }
    let mut metric_names: HashSet<&str> = HashSet::with_capacity(dump.metrics.len());
    for metric in &dump.metrics {
        if !metric_names.insert(metric.as_str()) {
            return Err(DumpError::DuplicateMetric(metric.clone()));
        }
    }

    let mut seen_nodes: HashSet<NodeId> = HashSet::new();
    let call_tree = build_tree(&dump.call_tree, None, &mut seen_nodes)?;
    let tree_table = CallTreeTable::from_tree(&call_tree);

    let mut table = MetricTable::new(dump.metrics.clone());
    let mut unknown_records = 0usize;
    for record in &dump.records {
        if record.values.len() != dump.metrics.len() {
            return Err(DumpError::ValueCountMismatch {
                node_id: record.node_id,
                thread_id: record.thread_id,
                expected: dump.metrics.len(),
                found: record.values.len(),
            });
        }
        if !seen_nodes.contains(&record.node_id) {
            unknown_records += 1;
            continue;
        }
        let replaced = table.insert_row(record.node_id, record.thread_id, record.values.clone());
        if replaced.is_some() {
            return Err(DumpError::DuplicateRecord {
                node_id: record.node_id,
                thread_id: record.thread_id,
            });
        }
    }

    if unknown_records > 0 {
        debug!(
            "Dropped {} record(s) for node ids outside the call tree",
            unknown_records
        );
    }
    if table.is_empty() {
        return Err(DumpError::NoRecords);
    }

    let mut convertible: HashSet<String> = HashSet::new();
    let mut unknown_convertible = 0usize;
    for name in &dump.inclusive_convertible {
        if metric_names.contains(name.as_str()) {
            convertible.insert(name.clone());
        } else {
            unknown_convertible += 1;
        }
    }
    if unknown_convertible > 0 {
        warn!(
            "Dump lists {} inclusive-convertible name(s) not among its metrics",
            unknown_convertible
        );
    }

    Ok(ProfileData {
        origin: dump.origin,
        call_tree,
        tree_table,
        table,
        convertible,
    })
}

/// Read and validate a dump file in one step
///
/// **Public** - what the CLI calls per input file
pub fn load_profile(path: impl AsRef<Path>) -> Result<ProfileData, DumpError> {
    build_profile(read_dump(path)?)
}

/// Rebuild the owned call tree from its serialized form
///
/// **Private** - internal helper for build_profile
fn build_tree(
    node: &DumpNode,
    parent_id: Option<NodeId>,
    seen: &mut HashSet<NodeId>,
) -> Result<CallTreeNode, DumpError> {
    if !seen.insert(node.node_id) {
        return Err(DumpError::DuplicateNode(node.node_id));
    }

    let mut built = CallTreeNode::new(node.node_id, parent_id, node.function_name.as_str());
    for child in &node.children {
        built.push_child(build_tree(child, Some(node.node_id), seen)?);
    }
    Ok(built)
}
