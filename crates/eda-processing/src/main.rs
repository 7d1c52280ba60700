//! CLI entry point for the EDA pipeline.

use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Parser};
use eda_processing::{
    AnalysisConfig, ColumnClassifier, EdaReport, Pipeline, QualityProfiler, ReportGenerator,
    Session, loader,
};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Automatic cleaning and exploratory analysis of tabular data",
    long_about = "Loads a CSV, Parquet or Excel file (max 50 MB), cleans it, runs descriptive \
                  statistics, correlation, normality and outlier analysis, and selects charts.\n\n\
                  EXAMPLES:\n  \
                  # Summary of a dataset\n  \
                  eda-processing data.csv\n\n  \
                  # Export the cleaned table and a JSON report\n  \
                  eda-processing data.csv -o cleaned.csv --report report.json\n\n  \
                  # Read a workbook, write the cleaned table as a workbook\n  \
                  eda-processing sales.xlsx -o cleaned.xlsx --report-dir outputs\n\n  \
                  # Profile only, no cleaning\n  \
                  eda-processing data.csv --dry-run\n\n  \
                  # Pipe the report to another tool\n  \
                  eda-processing data.csv --json | jq .insights"
)]
struct Args {
    /// Path to the CSV, Parquet, XLSX or XLS file to analyze
    input: PathBuf,

    /// Write the cleaned table to this file (.csv or .xlsx)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the full JSON report to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write the full JSON report as <DIR>/<input name>_report.json
    #[arg(long, value_name = "DIR")]
    report_dir: Option<PathBuf>,

    /// Print the JSON report to stdout instead of the human-readable summary
    ///
    /// Disables all logs so stdout contains only JSON.
    #[arg(long)]
    json: bool,

    /// Profile the table without cleaning or analyzing it
    #[arg(long)]
    dry_run: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Absolute correlation above which a pair is reported as strong (0.0 - 1.0)
    #[arg(long)]
    strong_correlation: Option<f64>,

    /// Outlier percentage above which a column gets an outlier insight (0 - 100)
    #[arg(long)]
    outlier_threshold: Option<f64>,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(verbose: u8, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.json);

    if !args.input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input.display()));
    }

    info!("Loading dataset from: {}", args.input.display());
    let data = loader::load_table(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    let config = build_config(&args)?;
    if args.dry_run {
        return run_dry_run(&args, &config, &data);
    }

    run_pipeline(&args, config, &data)
}

fn build_config(args: &Args) -> Result<AnalysisConfig> {
    let mut builder = AnalysisConfig::builder();
    if let Some(threshold) = args.strong_correlation {
        builder = builder.strong_correlation_threshold(threshold);
    }
    if let Some(threshold) = args.outlier_threshold {
        builder = builder.outlier_percentage_threshold(threshold);
    }
    Ok(builder.build()?)
}

fn run_pipeline(args: &Args, config: AnalysisConfig, data: &DataFrame) -> Result<()> {
    let quiet = args.json;
    let pipeline = Pipeline::builder()
        .config(config.clone())
        .on_progress(move |update| {
            if !quiet {
                info!("[{:>3.0}%] {}", update.progress * 100.0, update.message);
            }
        })
        .build()?;

    let outcome = match pipeline.run(data) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Pipeline failed: {}", e);
            return Err(anyhow!("Pipeline failed: {}", e));
        }
    };

    if let Some(ref path) = args.output {
        let mut session = Session::new(config);
        session.adopt(data.clone(), &outcome);
        session
            .export_to_path(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let input_name = args.input.display().to_string();
    let output_name = args.output.as_ref().map(|p| p.display().to_string());
    let report =
        ReportGenerator::build_report(&input_name, output_name.as_deref(), data, &outcome)?;

    if args.json {
        ReportGenerator::write_report(&report, std::io::stdout().lock())?;
        return Ok(());
    }

    if let Some(ref path) = args.report {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        ReportGenerator::write_report(&report, file)?;
        info!("Report written to: {}", path.display());
    }

    if let Some(ref dir) = args.report_dir {
        ReportGenerator::new(dir.clone()).write_report_to_file(&report, &file_stem(&args.input))?;
    }

    print_human_readable_summary(&report);
    Ok(())
}

/// Profile-only mode.
///
/// Uses `println!` for user-facing output so it shows regardless of log level.
fn run_dry_run(args: &Args, config: &AnalysisConfig, data: &DataFrame) -> Result<()> {
    let quality = QualityProfiler::profile(data)?;
    let columns = QualityProfiler::column_info(data)?;
    let column_types = ColumnClassifier::from_config(config).classify(data);

    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Profile of {}", file_name(&args.input));
    println!("{}\n", "=".repeat(80));

    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  Rows: {}", quality.total_rows);
    println!("  Columns: {}", quality.total_columns);
    println!("  Duplicate rows: {}", quality.duplicate_rows);
    println!("  Memory: {}", format_bytes(quality.memory_bytes as u64));
    println!("  Completeness: {:.1}%", quality.completeness() * 100.0);
    println!();

    println!("COLUMNS");
    println!("{}", "-".repeat(40));
    println!(
        "{:<20} {:<12} {:<12} {:<10} {:<10}",
        "Column", "Storage", "Kind", "Missing %", "Unique"
    );
    println!("{}", "-".repeat(70));
    for col in &columns {
        let kind = column_types
            .get(&col.name)
            .map(|k| k.to_string())
            .unwrap_or_default();
        println!(
            "{:<20} {:<12} {:<12} {:<10.1} {:<10}",
            truncate_str(&col.name, 19),
            truncate_str(&col.dtype, 11),
            kind,
            col.null_percentage,
            col.unique_count
        );
    }
    println!();
    println!("{}", "=".repeat(80));
    println!("To clean and analyze this dataset, run without --dry-run");
    println!("{}", "=".repeat(80));

    Ok(())
}

/// Print a human-readable summary of the run.
fn print_human_readable_summary(report: &EdaReport) {
    let summary = &report.summary;
    let cleaning = &report.cleaning;

    println!();
    println!("{}", "=".repeat(80));
    println!("EDA COMPLETE - {}", report.input_file);
    println!("{}", "=".repeat(80));
    println!();

    println!("Cleaning:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!(
        "  Rows: {} -> {} ({} duplicates removed)",
        summary.rows_before, summary.rows_after, summary.duplicates_removed
    );
    println!(
        "  Missing cells: {} -> {}",
        summary.missing_cells_before, summary.missing_cells_after
    );
    println!(
        "  Memory: {} -> {} ({:.2}% saved)",
        format_bytes(cleaning.optimization.memory_before as u64),
        format_bytes(cleaning.optimization.memory_after as u64),
        summary.memory_saved_percent
    );
    for imputation in &cleaning.imputations {
        println!(
            "  - filled {} missing in '{}' with {:?} ({})",
            imputation.filled, imputation.column, imputation.strategy, imputation.fill_value
        );
    }
    for conversion in &cleaning.optimization.conversions {
        println!(
            "  - '{}': {} -> {}",
            conversion.column, conversion.from, conversion.to
        );
    }
    println!();

    if !report.insights.is_empty() {
        println!("Insights:");
        for insight in &report.insights {
            println!("  - {}", insight);
        }
        println!();
    }

    if !report.descriptive.is_empty() {
        println!("Numeric columns:");
        println!(
            "  {:<20} {:>12} {:>12} {:>12}",
            "Column", "Mean", "Std", "Range"
        );
        for stats in &report.descriptive {
            println!(
                "  {:<20} {:>12.3} {:>12} {:>12.3}",
                truncate_str(&stats.column, 19),
                stats.mean,
                stats
                    .std
                    .value()
                    .map(|std| format!("{:.3}", std))
                    .unwrap_or_else(|| "-".to_string()),
                stats.range()
            );
        }
        println!();
    }

    if !report.correlation.strong_pairs.is_empty() {
        println!("Strong correlations:");
        for pair in &report.correlation.strong_pairs {
            println!(
                "  {} <-> {}: {:.3}",
                pair.column_a, pair.column_b, pair.correlation
            );
        }
        println!();
    }

    println!("Charts ({}):", report.charts.len());
    for chart in &report.charts {
        println!("  - [{}] {}", chart.key(), chart.title());
    }

    if let Some(ref output) = report.output_file {
        println!();
        println!("Output: {}", output);
    }
    println!("{}", "=".repeat(80));
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("input")
        .to_string()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("input")
        .to_string()
}

/// Truncate a string to a maximum length, adding "..." if truncated.
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn format_bytes(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.2} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.2} TB", size)
}
