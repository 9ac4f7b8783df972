//! Configuration and constants for the CLI.

/// Current dump schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

// Callpath conventions
// A full callpath joins the function names from the root down to a node,
// e.g. "main/physics/integrate"; the short callpath is the function name.
pub const CALLPATH_SEPARATOR: char = '/';

/// Default number of functions shown in summary tables
pub const DEFAULT_TOP_FUNCTIONS: usize = 20;

/// Upper bound on --top to keep terminal output usable
pub const MAX_TOP_FUNCTIONS: usize = 1000;
