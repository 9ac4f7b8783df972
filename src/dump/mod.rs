//! Dump ingestion and session assembly.
//!
//! This module handles:
//! - The versioned JSON schema of instrumentation dumps
//! - Reading dump files
//! - Validating dumps and building the per-run session context

pub mod reader;
pub mod schema;

// Re-export main types
pub use reader::{build_profile, load_profile, read_dump, InclusiveView, ProfileData};
pub use schema::{DumpNode, DumpRecord, ProfileDump};
