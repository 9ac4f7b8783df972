//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod inspect;
pub mod merge;
pub mod models;

// Re-export main command functions
pub use inspect::{execute_inspect, validate_inspect_args};
pub use merge::{execute_merge, validate_merge_args};
pub use models::{InspectArgs, MergeArgs};
