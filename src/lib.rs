//! Profmerge
//!
//! Call-tree profile merging and exclusive-to-inclusive aggregation
//! for instrumentation dumps.
//!
//! This crate provides the core implementation for the
//! `profmerge` CLI tool: loading JSON instrumentation dumps,
//! converting exclusive measurements to inclusive subtree sums, and
//! joining measurements from independent runs into one table.
//!
//! ## Getting Started
//!
//! Most users should install and use the CLI:
//!
//! ```bash
//! cargo install profmerge
//! profmerge --help
//! ```

pub mod aggregator;
pub mod calltree;
pub mod commands;
pub mod dump;
pub mod merge;
pub mod table;
pub mod utils;
