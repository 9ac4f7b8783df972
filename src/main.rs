//! Profmerge CLI
//!
//! A processing tool for call-tree instrumentation dumps.
//! Aggregates exclusive measurements and merges independent runs.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use profmerge::commands::{
    execute_inspect, execute_merge, validate_inspect_args, validate_merge_args, InspectArgs,
    MergeArgs,
};
use profmerge::utils::config::SCHEMA_VERSION;

/// Profmerge - Call-tree profile merging and aggregation
#[derive(Parser, Debug)]
#[command(name = "profmerge")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Summarize a single dump file
    Inspect {
        /// Path to dump JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Summarize inclusive (subtree-summed) values
        #[arg(long)]
        inclusive: bool,

        /// Print the indented call tree
        #[arg(long)]
        tree: bool,

        /// Number of functions in the summary table
        #[arg(long, default_value = "20")]
        top: usize,

        /// Metric to rank functions by (defaults to the first metric)
        #[arg(long)]
        sort_metric: Option<String>,
    },

    /// Merge two or more dump files into one view
    Merge {
        /// Paths to dump JSON files, one per run
        #[arg(short, long, num_args = 1.., required = true)]
        files: Vec<PathBuf>,

        /// Convert each run to inclusive values before merging
        #[arg(long)]
        inclusive: bool,

        /// Comma-separated metric names to keep in the merged view
        #[arg(short, long, value_delimiter = ',')]
        metrics: Option<Vec<String>>,

        /// Number of functions in each per-run summary table
        #[arg(long, default_value = "20")]
        top: usize,
    },

    /// Validate a dump JSON file
    Validate {
        /// Path to dump JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Inspect { file, inclusive, tree, top, sort_metric } => {
            let args = InspectArgs { file, inclusive, show_tree: tree, top, sort_metric };

            // Validate args first
            validate_inspect_args(&args)?;

            execute_inspect(args)?;
        }

        Commands::Merge { files, inclusive, metrics, top } => {
            let args = MergeArgs { files, inclusive, metrics, top };

            validate_merge_args(&args)?;

            execute_merge(args)?;
        }

        Commands::Validate { file } => {
            validate_dump_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Validate a dump JSON file
///
/// **Private** - internal command implementation
fn validate_dump_file(file_path: PathBuf) -> Result<()> {
    use profmerge::dump::{build_profile, read_dump};

    println!("Validating dump: {}", file_path.display());

    let dump = read_dump(&file_path)?;

    println!("✓ Valid dump JSON");
    println!("  Version: {}", dump.version);
    println!("  Origin: {}", dump.origin);
    println!("  Metrics: {}", dump.metrics.join(", "));
    println!("  Inclusive-convertible: {}", dump.inclusive_convertible.join(", "));
    println!("  Records: {}", dump.records.len());

    let profile = build_profile(dump)?;

    println!("✓ Consistent dump");
    println!("  Nodes: {}", profile.call_tree.node_count());
    println!("  Threads: {}", profile.table.thread_ids().len());
    println!("  Rows: {}", profile.table.row_count());

    Ok(())
}

/// Display schema information
///
/// **Private** - internal command implementation
fn display_schema(show_details: bool) {
    println!("Profmerge Dump Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string              - Schema version (e.g., '1.0.0')");
        println!("  origin: string               - Label of the run that produced the dump");
        println!("  generated_at: string?        - ISO 8601 timestamp");
        println!("  metrics: array               - Metric names, the order of record values");
        println!("  inclusive_convertible: array - Metrics that sum over the call tree");
        println!("  call_tree: object            - Root of the call tree");
        println!("    node_id: number            - Unique node id");
        println!("    function_name: string      - Function at this call site");
        println!("    children: array            - Child nodes, same shape");
        println!("  records: array               - One measurement row per (node, thread)");
        println!("    node_id: number            - Call-tree node the values belong to");
        println!("    thread_id: number          - Reporting thread");
        println!("    values: array              - One exclusive value per metric");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
///
/// **Private** - internal command implementation
fn display_version() {
    println!("Profmerge v{}", env!("CARGO_PKG_VERSION"));
    println!("Dump Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Call-tree profile merging and aggregation for instrumentation dumps.");
    println!("https://github.com/your-org/profmerge");
}
