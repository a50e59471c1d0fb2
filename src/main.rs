//! Nutristats command-line entry point.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (config, data file, API failure, etc.)
//!   2 - Patients churned in the period and --fail-on-churn is set

use anyhow::{Context, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use nutristats::analysis::{Aggregator, RosterSummary};
use nutristats::cli::{Args, OutputFormat};
use nutristats::config::{Config, CONFIG_FILE};
use nutristats::models::{Report, ReportMetadata};
use nutristats::report;
use nutristats::source::{RowDecoder, Source};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Where the configuration came from, logged once logging is up.
enum ConfigOrigin {
    Explicit(PathBuf),
    Default,
    Builtin,
    Unreadable(anyhow::Error),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // The config file can turn on verbose logging, so it is read first.
    let (mut config, origin) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(args.log_level(config.general.verbose));

    info!("Nutristats v{}", env!("CARGO_PKG_VERSION"));
    log_config_origin(origin);

    match run_report(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Report failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .nutristats.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to set the data source, locale and report sections.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete report workflow. Returns exit code (0 or 2).
async fn run_report(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    config.validate().context("Invalid configuration")?;

    let today = args.reference_date();
    let period = args.period(today)?;
    let locale = config.report.locale;
    let period_label = locale.period_label(period);
    let offset = config.reporting_offset()?;
    debug!(
        "Reference date {}, period {}, timestamps read at UTC{}",
        today, period_label, offset
    );

    // Step 1: Load the records
    let source = Source::from_config(&config.source)?;
    let source_label = source.describe();

    if !args.quiet {
        println!("📥 Loading records from {}", source_label);
    }

    let spinner = (source.is_remote() && !args.quiet).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Fetching patients and assessments...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let decoder = RowDecoder::new(offset, locale);
    let fetched = source.fetch(&decoder).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let dataset = fetched.with_context(|| format!("Failed to load records from {}", source_label))?;

    info!(
        "Loaded {} patients and {} assessments",
        dataset.patients.len(),
        dataset.assessments.len()
    );
    if dataset.patients.is_empty() {
        warn!("No patients found; the report will be empty");
    }

    // Step 2: Aggregate
    let aggregator = Aggregator::new(today).with_locale(locale);
    let stats = aggregator.compute(&dataset.patients, &dataset.assessments, period);
    let roster = RosterSummary::from_patients(&dataset.patients, aggregator.today());

    // Step 3: Build the report
    let metadata = ReportMetadata {
        practice: config.general.practice.clone(),
        year: period.year(),
        month: period.month(),
        period_label,
        reference_date: today,
        generated_at: Utc::now(),
        source: source_label,
        patients_loaded: dataset.patients.len(),
        assessments_loaded: dataset.assessments.len(),
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };

    let report = Report {
        metadata,
        roster,
        stats,
    };

    // Step 4: Render and save
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report, &config.report),
    };

    let output_path = &config.general.output;
    tokio::fs::write(output_path, &output)
        .await
        .with_context(|| format!("Failed to write report to {}", output_path))?;

    let stats = &report.stats;
    if !args.quiet {
        println!("\n📊 {}:", report.metadata.period_label);
        println!(
            "   Active: {} ({}) | New: {} | Renewed: {} | Churned: {}",
            stats.total_active,
            report::format_growth(stats.growth_rate),
            stats.new_patients,
            stats.renewals,
            stats.churned
        );
        println!(
            "   Assessments: {} | Expiring in 30 days: {}",
            stats.total_assessments,
            stats.expiring_soon.len()
        );
        println!(
            "   Roster today: {} on plan, {} off plan",
            report.roster.on_plan, report.roster.off_plan
        );
        println!("\n✅ Report saved to: {}", output_path);
    }

    if args.fail_on_churn && stats.churned > 0 {
        eprintln!(
            "\n⛔ {} patient(s) churned in {}. Failing (exit code 2).",
            stats.churned, report.metadata.period_label
        );
        return Ok(2);
    }

    Ok(0)
}

/// Load configuration from file or use defaults.
///
/// Only an explicit `--config` file that cannot be loaded is an error.
fn load_config(args: &Args) -> Result<(Config, ConfigOrigin)> {
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigOrigin::Explicit(config_path.clone())));
    }

    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigOrigin::Default)),
        Ok(None) => Ok((Config::default(), ConfigOrigin::Builtin)),
        Err(e) => Ok((Config::default(), ConfigOrigin::Unreadable(e))),
    }
}

fn log_config_origin(origin: ConfigOrigin) {
    match origin {
        ConfigOrigin::Explicit(path) => info!("Loaded config from: {}", path.display()),
        ConfigOrigin::Default => info!("Loaded default config from {}", CONFIG_FILE),
        ConfigOrigin::Builtin => debug!("No config file found, using defaults"),
        ConfigOrigin::Unreadable(e) => warn!("Failed to load config: {:#}", e),
    }
}
