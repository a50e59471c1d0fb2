//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::locale::Locale;
use crate::period::{PeriodError, ReportPeriod, MAX_YEAR, MIN_YEAR};
use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use std::path::PathBuf;

/// Nutristats - monthly practice statistics for nutritionists
///
/// Loads a practitioner's patients and assessments, computes the month's
/// active/new/churned/renewed counts, the 12-month trend, upcoming plan
/// expirations and the event timeline, and writes a Markdown or JSON report.
///
/// Examples:
///   nutristats --data export.json
///   nutristats --data export.json --month 3 --year 2024 --format json
///   nutristats --supabase-url https://xyz.supabase.co --user-id <uuid>
///   nutristats --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Month to report on (1-12)
    ///
    /// Defaults to the month of the reference date.
    #[arg(short, long, value_name = "MONTH")]
    pub month: Option<u32>,

    /// Year to report on
    ///
    /// Defaults to the year of the reference date.
    #[arg(short, long, value_name = "YEAR")]
    pub year: Option<i32>,

    /// Reference date used as "today" (YYYY-MM-DD)
    ///
    /// Drives the churn check, the 30-day expiration forecast and the
    /// 12-month trend window. Defaults to the local date.
    #[arg(long, value_name = "DATE", value_parser = parse_date_arg)]
    pub today: Option<NaiveDate>,

    /// JSON export with `patients` and `assessments` arrays
    #[arg(short, long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Supabase project URL
    #[arg(long, value_name = "URL", env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Supabase API key
    #[arg(long, value_name = "KEY", env = "SUPABASE_KEY", hide_env_values = true)]
    pub supabase_key: Option<String>,

    /// Practitioner user id whose records are loaded
    #[arg(long, value_name = "ID", env = "NUTRISTATS_USER_ID")]
    pub user_id: Option<String>,

    /// Request timeout in seconds for the Supabase API
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Language for month labels and timeline entries
    #[arg(long, value_name = "LOCALE")]
    pub locale: Option<Locale>,

    /// UTC offset used to place stored timestamps on a calendar day (e.g. -03:00)
    ///
    /// Defaults to the config file setting or the machine's local offset.
    #[arg(long, value_name = "OFFSET", allow_hyphen_values = true)]
    pub utc_offset: Option<String>,

    /// Practice name printed in the report header
    #[arg(long, value_name = "NAME")]
    pub practice: Option<String>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Output file path for the report
    ///
    /// Defaults to the config file setting or nutristats_report.md.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .nutristats.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Leave the event timeline out of the Markdown report
    #[arg(long)]
    pub no_timeline: bool,

    /// Leave the per-category patient lists out of the Markdown report
    #[arg(long)]
    pub no_patient_lists: bool,

    /// Exit with code 2 when any patient churned in the period
    #[arg(long)]
    pub fail_on_churn: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .nutristats.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return Err(format!("Month must be between 1 and 12, got {}", month));
            }
        }

        if let Some(year) = self.year {
            if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
                return Err(format!(
                    "Year must be between {} and {}, got {}",
                    MIN_YEAR, MAX_YEAR, year
                ));
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref url) = self.supabase_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Supabase URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref data) = self.data {
            if !data.is_file() {
                return Err(format!("Data file does not exist: {}", data.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the `general.verbose` file setting; `--quiet` wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// The date treated as "today".
    pub fn reference_date(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// The requested period, defaulting to the month of `today`.
    pub fn period(&self, today: NaiveDate) -> Result<ReportPeriod, PeriodError> {
        ReportPeriod::new(
            self.year.unwrap_or_else(|| today.year()),
            self.month.unwrap_or_else(|| today.month()),
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_args() -> Args {
        Args {
            month: None,
            year: None,
            today: None,
            data: None,
            supabase_url: None,
            supabase_key: None,
            user_id: None,
            timeout: None,
            locale: None,
            utc_offset: None,
            practice: None,
            format: OutputFormat::Markdown,
            output: None,
            config: None,
            no_timeline: false,
            no_patient_lists: false,
            fail_on_churn: false,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "nutristats",
            "--month",
            "3",
            "--year",
            "2024",
            "--today",
            "2024-06-01",
            "--locale",
            "en",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.month, Some(3));
        assert_eq!(args.today, Some(date(2024, 6, 1)));
        assert_eq!(args.locale, Some(Locale::En));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_rejects_malformed_today() {
        assert!(Args::try_parse_from(["nutristats", "--today", "01/06/2024"]).is_err());
    }

    #[test]
    fn test_validation_month_out_of_range() {
        let mut args = make_args();
        args.month = Some(13);
        assert!(args.validate().is_err());

        args.month = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_supabase_url() {
        let mut args = make_args();
        args.supabase_url = Some("project.supabase.co".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_data_file() {
        let mut args = make_args();
        args.data = Some(PathBuf::from("/definitely/not/here.json"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_period_defaults_to_reference_month() {
        let mut args = make_args();
        let today = date(2024, 6, 15);
        assert_eq!(args.period(today), ReportPeriod::new(2024, 6));

        args.month = Some(1);
        args.year = Some(2023);
        assert_eq!(args.period(today), ReportPeriod::new(2023, 1));
    }

    #[test]
    fn test_reference_date_override() {
        let mut args = make_args();
        args.today = Some(date(2024, 2, 29));
        assert_eq!(args.reference_date(), date(2024, 2, 29));
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_log_level_honors_config_verbose() {
        let mut args = make_args();
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }

    #[test]
    fn test_parse_negative_utc_offset() {
        let args = Args::try_parse_from(["nutristats", "--utc-offset", "-03:00"]).unwrap();
        assert_eq!(args.utc_offset.as_deref(), Some("-03:00"));
    }
}
