//! Run command - geocode every row of a CSV sheet.

use std::path::{Path, PathBuf};

use geobatch::batch::{BatchJob, BatchPipeline, BatchReport};
use geobatch::config::{ConfigFile, ProviderCredentials};
use geobatch::provider::ProviderId;
use geobatch::sheet::{
    default_output_path, find_address_column, read_csv, write_csv, write_json, AddressRow,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::common::{build_dispatcher, resolve_provider, ProviderArg};
use crate::error::CliError;
use crate::ui::{format_errors, BatchProgress, MAX_DISPLAYED_ERRORS};

/// Arguments for the run command.
pub struct RunArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub column: Option<String>,
    pub provider: Option<ProviderArg>,
    pub no_progress: bool,
}

/// Run the run command.
pub async fn run(args: RunArgs) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let credentials = ProviderCredentials::resolve(&config);
    let provider = resolve_provider(args.provider, &config, &credentials)?;

    let rows = read_csv(&args.input)?;
    if rows.is_empty() {
        println!("{} has no data rows, nothing to do.", args.input.display());
        return Ok(());
    }

    let column = select_column(&rows, args.column)?;
    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input));
    let total = rows.len();
    let policy = config.rate_policy();

    println!("geobatch v{}", geobatch::VERSION);
    println!("=============");
    println!();
    println!("Input:    {} ({} rows)", args.input.display(), total);
    println!("Column:   {}", column);
    println!(
        "Provider: {} ({} ms between requests)",
        provider.display_name(),
        policy.request_delay(provider).as_millis()
    );
    println!("Output:   {}", output.display());
    println!();

    let cancellation = CancellationToken::new();
    let handler_token = cancellation.clone();
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Received interrupt, stopping after the current row...");
        handler_token.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let dispatcher = build_dispatcher(&config, credentials)?;
    let pipeline = BatchPipeline::new(dispatcher, policy);

    let progress = BatchProgress::new(total, !args.no_progress);
    let report = pipeline
        .run_with(
            BatchJob::new(rows, column, provider),
            Some(progress.callback()),
            cancellation,
        )
        .await;
    progress.finish();

    write_output(&output, &report.rows)?;
    print_summary(&report, provider);

    if provider == ProviderId::Mapbox {
        let stats = pipeline.geocoder().mapbox_cache_stats();
        println!(
            "Cache:      {} hits, {} misses ({:.0}% hit rate)",
            stats.hits,
            stats.misses,
            stats.hit_ratio() * 100.0
        );
    }

    println!();
    println!("Results written to {}", output.display());

    if report.cancelled {
        return Err(CliError::Cancelled {
            processed: report.rows.len(),
            total,
        });
    }
    Ok(())
}

/// Uses the requested column if the sheet has it, otherwise detects one.
fn select_column(rows: &[AddressRow], requested: Option<String>) -> Result<String, CliError> {
    match requested {
        Some(column) => {
            let exists = rows
                .first()
                .map(|row| row.columns().any(|c| c == column))
                .unwrap_or(false);
            if exists {
                Ok(column)
            } else {
                Err(CliError::Config(format!(
                    "Column '{}' not found in input sheet",
                    column
                )))
            }
        }
        None => {
            let column = find_address_column(rows)
                .ok_or_else(|| CliError::Config("Input sheet has no columns".to_string()))?;
            info!(column = %column, "Detected address column");
            Ok(column)
        }
    }
}

/// Writes JSON for `.json` outputs, CSV otherwise.
fn write_output(path: &Path, rows: &[AddressRow]) -> Result<(), CliError> {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        write_json(path, rows)?;
    } else {
        write_csv(path, rows)?;
    }
    Ok(())
}

fn print_summary(report: &BatchReport, provider: ProviderId) {
    let summary = report.summary();

    println!("Summary ({})", provider.display_name());
    println!("───────────────");
    println!("Geocoded:   {}", summary.succeeded);
    println!("No address: {}", summary.no_address);
    println!("Failed:     {}", summary.failed);

    if !report.errors().is_empty() {
        println!();
        println!("Errors:");
        for line in format_errors(report.errors(), MAX_DISPLAYED_ERRORS) {
            println!("  {}", line);
        }
    }
}
