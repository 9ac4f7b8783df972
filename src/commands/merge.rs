//! Merge command implementation.
//!
//! The merge command:
//! 1. Loads every dump file
//! 2. Optionally converts each run to its inclusive view
//! 3. Joins the runs on callpaths
//! 4. Prints the metric partition, the drop report and per-run top
//!    functions over the common table

use anyhow::{Context, Result};
use log::info;
use std::time::Instant;

use super::models::{print_function_table, MergeArgs};
use crate::dump::{load_profile, ProfileData};
use crate::merge::{merge_runs, MergedProfile};
use crate::table::{select_metrics, top_functions, MetricTable, RunMetric};
use crate::utils::config::MAX_TOP_FUNCTIONS;

/// Execute the merge command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Merge command arguments
///
/// # Returns
/// Ok if all dumps were merged and summarized, Err with context otherwise
///
/// # Errors
/// * Dump loading or validation failures
/// * Inclusive conversion failures (missing rows)
/// * Merge failures (ambiguous metric sets, empty join)
pub fn execute_merge(args: MergeArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Merging {} dump(s)", args.files.len());

    // Step 1: Load all dumps
    info!("Step 1/4: Loading dumps...");
    let mut runs: Vec<ProfileData> = Vec::with_capacity(args.files.len());
    for file in &args.files {
        let profile = load_profile(file)
            .with_context(|| format!("Failed to load dump {}", file.display()))?;
        info!(
            "  Loaded '{}' ({} node(s), {} row(s))",
            profile.origin,
            profile.call_tree.node_count(),
            profile.table.row_count()
        );
        runs.push(profile);
    }

    // Step 2: Optional inclusive conversion per run
    if args.inclusive {
        info!("Step 2/4: Converting runs to inclusive views...");
        for run in &mut runs {
            let view = run.inclusive_table().with_context(|| {
                format!("Failed to convert run '{}' to inclusive values", run.origin)
            })?;
            if !view.skipped.is_empty() {
                info!(
                    "  Run '{}': left out non-convertible metric(s): {}",
                    run.origin,
                    view.skipped.join(", ")
                );
            }
            run.table = view.table;
        }
    } else {
        info!("Step 2/4: Using exclusive values as measured");
    }

    // Step 3: Join the runs
    info!("Step 3/4: Joining runs on callpaths...");
    let merged = merge_runs(&runs).context("Failed to merge runs")?;

    // Step 4: Optional selection, then summarize
    info!("Step 4/4: Summarizing...");
    let (common, dropped_selection) = match &args.metrics {
        Some(requested) => {
            let selection = select_metrics(&merged.common, requested);
            (selection.table, selection.dropped)
        }
        None => (merged.common.clone(), Vec::new()),
    };

    print_report(&merged, &dropped_selection);

    // Per-run rankings over the common table, keyed by the first run's tree
    let canonical = &runs[0].tree_table;
    match common.columns().first() {
        Some(first_column) => {
            let sort_metric = first_column.metric.clone();
            for (run_index, origin) in merged.report.run_origins.iter().enumerate() {
                let view = run_view(&common, run_index);
                let top = top_functions(&view, canonical, &sort_metric, args.top);
                println!();
                println!(
                    "Run {} '{}': top {} function(s) by mean {}",
                    run_index,
                    origin,
                    top.len(),
                    sort_metric
                );
                print_function_table(&top, view.columns());
            }
        }
        None => {
            println!();
            println!("No common metric columns to summarize");
        }
    }

    let elapsed = start_time.elapsed();
    info!("Merge completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

/// Validate merge arguments
///
/// **Public** - can be called before execute_merge for early validation
///
/// # Arguments
/// * `args` - Arguments to validate
///
/// # Returns
/// Ok if arguments are valid, Err with message if not
pub fn validate_merge_args(args: &MergeArgs) -> Result<()> {
    if args.files.len() < 2 {
        anyhow::bail!("Merging needs at least two dump files, got {}", args.files.len());
    }

    if args.files.iter().any(|file| file.as_os_str().is_empty()) {
        anyhow::bail!("Dump file paths cannot be empty");
    }

    if args.top == 0 {
        anyhow::bail!("top must be greater than 0");
    }

    if args.top > MAX_TOP_FUNCTIONS {
        anyhow::bail!("top is too large (max {})", MAX_TOP_FUNCTIONS);
    }

    if let Some(metrics) = &args.metrics {
        if metrics.is_empty() {
            anyhow::bail!("Metric selection cannot be empty");
        }
        if metrics.iter().any(String::is_empty) {
            anyhow::bail!("Metric names cannot be empty");
        }
    }

    Ok(())
}

/// Print the partition and drop accounting of a merge
///
/// **Private** - internal helper for execute_merge
fn print_report(merged: &MergedProfile, dropped_selection: &[String]) {
    let report = &merged.report;

    println!(
        "Merged {} run(s): {}",
        report.run_origins.len(),
        report.run_origins.join(", ")
    );

    if report.common_metrics.is_empty() {
        println!("  Common metrics: (none)");
    } else {
        println!("  Common metrics: {}", report.common_metrics.join(", "));
    }
    for (run_index, metrics) in report.specific_metrics.iter().enumerate() {
        if !metrics.is_empty() {
            println!("  Run {} specific: {}", run_index, metrics.join(", "));
        }
    }
    if !dropped_selection.is_empty() {
        println!("  Requested but not present: {}", dropped_selection.join(", "));
    }

    println!("  Rows kept: {}, dropped: {}", report.rows_kept, report.dropped_rows);
    if !report.dropped_callpaths.is_empty() {
        println!("  Dropped callpath(s):");
        for callpath in report.dropped_callpaths.iter().take(10) {
            println!("    {}", callpath);
        }
        if report.dropped_callpaths.len() > 10 {
            println!("    ... and {} more", report.dropped_callpaths.len() - 10);
        }
    }
}

/// Project one run's columns out of a merged table
///
/// **Private** - internal helper for execute_merge
fn run_view(table: &MetricTable<RunMetric>, run: usize) -> MetricTable {
    let keep: Vec<(usize, String)> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, column)| column.run == run)
        .map(|(index, column)| (index, column.metric.clone()))
        .collect();

    let mut view = MetricTable::new(keep.iter().map(|(_, metric)| metric.clone()).collect());
    for ((node_id, thread_id), values) in table.rows() {
        let row: Vec<f64> = keep.iter().map(|&(index, _)| values[index]).collect();
        view.insert_row(node_id, thread_id, row);
    }
    view
}
