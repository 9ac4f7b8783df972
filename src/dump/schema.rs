//! JSON schema definitions for instrumentation dump files.
//!
//! This module defines the structure of the dump files the crate reads.
//! Schema is versioned to allow future evolution.

use serde::{Deserialize, Serialize};

use crate::calltree::NodeId;
use crate::table::ThreadId;

/// Top-level dump structure read from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDump {
    /// Schema version for compatibility checking
    pub version: String,

    /// Label identifying the run that produced the dump
    pub origin: String,

    /// Timestamp when the dump was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,

    /// Metric names, in the column order `records[].values` follows
    pub metrics: Vec<String>,

    /// Subset of `metrics` whose values sum over the call tree
    #[serde(default)]
    pub inclusive_convertible: Vec<String>,

    /// Root of the call tree all records refer to
    pub call_tree: DumpNode,

    /// One measurement row per (node, thread) pair
    pub records: Vec<DumpRecord>,
}

/// A call-tree node as serialized in a dump
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpNode {
    /// Node id, unique within the dump
    pub node_id: NodeId,

    /// Name of the profiled function at this call site
    pub function_name: String,

    /// Child call sites, in call order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DumpNode>,
}

/// One measurement row of a dump
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpRecord {
    /// Call-tree node the values belong to
    pub node_id: NodeId,

    /// Thread (or rank) that reported the values
    pub thread_id: ThreadId,

    /// One exclusive value per entry of `metrics`, same order
    pub values: Vec<f64>,
}
