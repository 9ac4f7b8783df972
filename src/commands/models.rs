use std::path::PathBuf;

use crate::table::{FunctionSummary, MetricColumn};
use crate::utils::config::DEFAULT_TOP_FUNCTIONS;

/// Arguments for the inspect command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct InspectArgs {
    /// Path to the dump JSON file
    pub file: PathBuf,

    /// Summarize the inclusive view instead of exclusive values
    pub inclusive: bool,

    /// Print the indented call tree
    pub show_tree: bool,

    /// Number of functions in the summary table
    pub top: usize,

    /// Metric to rank by (None = first metric in the dump)
    pub sort_metric: Option<String>,
}

impl Default for InspectArgs {
    fn default() -> Self {
        Self {
            file: PathBuf::from("profile.json"),
            inclusive: false,
            show_tree: false,
            top: DEFAULT_TOP_FUNCTIONS,
            sort_metric: None,
        }
    }
}

/// Arguments for the merge command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct MergeArgs {
    /// Paths to the dump JSON files, one per run
    pub files: Vec<PathBuf>,

    /// Convert each run to its inclusive view before merging
    pub inclusive: bool,

    /// Restrict the merged view to these metric names (None = keep all)
    pub metrics: Option<Vec<String>>,

    /// Number of functions in each per-run summary table
    pub top: usize,
}

impl Default for MergeArgs {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            inclusive: false,
            metrics: None,
            top: DEFAULT_TOP_FUNCTIONS,
        }
    }
}

/// Print a function-summary table with one column per table metric
///
/// **Public** - shared by the inspect and merge commands
pub fn print_function_table<C: MetricColumn>(summaries: &[FunctionSummary], columns: &[C]) {
    let mut header = format!("  {:<28} {:>6} {:>6}", "function", "sites", "rows");
    for column in columns {
        header.push_str(&format!(" {:>14}", column.to_string()));
    }
    println!("{}", header);

    for summary in summaries {
        let mut line = format!(
            "  {:<28} {:>6} {:>6}",
            summary.function_name, summary.call_sites, summary.rows
        );
        for mean in &summary.means {
            line.push_str(&format!(" {:>14.3}", mean));
        }
        println!("{}", line);
    }
}
