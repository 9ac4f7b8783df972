//! Inspect command implementation.
//!
//! The inspect command:
//! 1. Loads and validates one dump file
//! 2. Prepares the requested measurement view (exclusive or inclusive)
//! 3. Prints run metadata, optionally the call tree, and the top
//!    functions ranked by one metric

use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Instant;

use super::models::{print_function_table, InspectArgs};
use crate::calltree::CallTreeNode;
use crate::dump::load_profile;
use crate::table::{top_functions, MetricTable};
use crate::utils::config::MAX_TOP_FUNCTIONS;

/// Execute the inspect command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Inspect command arguments
///
/// # Returns
/// Ok if the dump was loaded and summarized, Err with context otherwise
///
/// # Errors
/// * Dump loading or validation failures
/// * Inclusive conversion failures (missing rows)
/// * An unknown --sort-metric name
pub fn execute_inspect(args: InspectArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Inspecting dump: {}", args.file.display());

    // Step 1: Load the dump
    info!("Step 1/3: Loading dump...");
    let profile = load_profile(&args.file)
        .with_context(|| format!("Failed to load dump {}", args.file.display()))?;

    debug!(
        "Loaded '{}': {} node(s), {} row(s)",
        profile.origin,
        profile.call_tree.node_count(),
        profile.table.row_count()
    );

    // Step 2: Pick the measurement view
    let (table, view_label, skipped) = if args.inclusive {
        info!("Step 2/3: Converting to the inclusive view...");
        let view = profile
            .inclusive_table()
            .context("Failed to convert measurements to inclusive values")?;
        (view.table, "inclusive", view.skipped)
    } else {
        info!("Step 2/3: Using exclusive values as measured");
        (profile.table.clone(), "exclusive", Vec::new())
    };

    // Step 3: Summarize
    info!("Step 3/3: Summarizing...");

    println!("Profile: {} ({})", profile.origin, args.file.display());
    println!("  View:    {}", view_label);
    println!("  Metrics: {}", join_names(table.columns()));
    if !skipped.is_empty() {
        println!("  Not inclusive-convertible (left out): {}", skipped.join(", "));
    }
    println!(
        "  Nodes: {}, Threads: {}, Rows: {}",
        profile.call_tree.node_count(),
        table.thread_ids().len(),
        table.row_count()
    );

    if args.show_tree {
        println!();
        println!("Call tree:");
        print_tree(&profile.call_tree);
    }

    let Some(sort_metric) = pick_sort_metric(&table, args.sort_metric.as_deref())? else {
        println!();
        println!("No metric columns in this view, nothing to rank");
        return Ok(());
    };

    let top = top_functions(&table, &profile.tree_table, &sort_metric, args.top);
    println!();
    println!("Top {} function(s) by mean {} ({})", top.len(), sort_metric, view_label);
    print_function_table(&top, table.columns());

    let elapsed = start_time.elapsed();
    info!("Inspect completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

/// Validate inspect arguments
///
/// **Public** - can be called before execute_inspect for early validation
///
/// # Arguments
/// * `args` - Arguments to validate
///
/// # Returns
/// Ok if arguments are valid, Err with message if not
pub fn validate_inspect_args(args: &InspectArgs) -> Result<()> {
    if args.file.as_os_str().is_empty() {
        anyhow::bail!("Dump file path cannot be empty");
    }

    if args.top == 0 {
        anyhow::bail!("top must be greater than 0");
    }

    if args.top > MAX_TOP_FUNCTIONS {
        anyhow::bail!("top is too large (max {})", MAX_TOP_FUNCTIONS);
    }

    if let Some(metric) = &args.sort_metric {
        if metric.is_empty() {
            anyhow::bail!("Sort metric name cannot be empty");
        }
    }

    Ok(())
}

/// Resolve the ranking metric against the table's columns
///
/// **Private** - internal helper for execute_inspect
fn pick_sort_metric(table: &MetricTable, requested: Option<&str>) -> Result<Option<String>> {
    match requested {
        Some(metric) => {
            if table.metric_position(metric).is_none() {
                anyhow::bail!(
                    "Metric '{}' is not in this view (available: {})",
                    metric,
                    join_names(table.columns())
                );
            }
            Ok(Some(metric.to_string()))
        }
        None => Ok(table.columns().first().cloned()),
    }
}

/// Print the call tree depth-indented, one node per line
///
/// **Private** - internal helper for execute_inspect
fn print_tree(root: &CallTreeNode) {
    let depths = root.depths();
    for node in root.iter() {
        let depth = depths[&node.node_id] as usize;
        println!("  {}{} (node {})", "  ".repeat(depth), node.function_name, node.node_id);
    }
}

fn join_names(columns: &[String]) -> String {
    columns.join(", ")
}
