//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use crate::calltree::NodeId;
use crate::table::ThreadId;
use thiserror::Error;

/// Errors that can occur while reading or validating a profile dump
#[derive(Error, Debug)]
pub enum DumpError {
    #[error("Failed to read dump file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dump JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate call-tree node id {0}")]
    DuplicateNode(NodeId),

    #[error("Duplicate metric name '{0}'")]
    DuplicateMetric(String),

    #[error("Dump declares no metrics")]
    NoMetrics,

    #[error("Dump contains no usable measurement records")]
    NoRecords,

    #[error("Record for node {node_id}, thread {thread_id} has {found} values, expected {expected}")]
    ValueCountMismatch {
        node_id: NodeId,
        thread_id: ThreadId,
        expected: usize,
        found: usize,
    },

    #[error("Duplicate record for node {node_id}, thread {thread_id}")]
    DuplicateRecord { node_id: NodeId, thread_id: ThreadId },
}

/// Errors that can occur during exclusive-to-inclusive aggregation.
///
/// A measurement that is absent where the call tree requires one is a
/// schema gap, never an implicit zero.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AggregationError {
    #[error("No measurement for call-tree node {node_id}")]
    MissingNode { node_id: NodeId },

    #[error("No measurement for call-tree node {node_id} on thread {thread_id}")]
    MissingRow { node_id: NodeId, thread_id: ThreadId },
}
