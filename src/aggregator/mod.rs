//! Aggregation of exclusive measurements into inclusive ones.
//!
//! This module transforms per-node exclusive values into:
//! - Inclusive per-node series (one metric, one thread)
//! - Inclusive tables (every metric column, every thread)

pub mod inclusive;

// Re-export main functions
pub use inclusive::{convert_series_to_inclusive, convert_table_to_inclusive};
