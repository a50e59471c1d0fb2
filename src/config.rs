//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.nutristats.toml` files.

use crate::dates::parse_utc_offset;
use crate::locale::Locale;
use anyhow::{bail, Context, Result};
use chrono::{FixedOffset, Local};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".nutristats.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Where patient and assessment records are loaded from.
    #[serde(default)]
    pub source: SourceConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Practice name printed in the report header.
    #[serde(default)]
    pub practice: Option<String>,

    /// UTC offset used to place stored timestamps on a calendar day,
    /// e.g. `-03:00`. Defaults to the machine's local offset.
    #[serde(default)]
    pub utc_offset: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
            practice: None,
            utc_offset: None,
        }
    }
}

fn default_output() -> String {
    "nutristats_report.md".to_string()
}

/// Kind of record source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// JSON export on disk.
    #[default]
    Snapshot,
    /// Supabase REST API.
    Supabase,
}

/// Record source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,

    /// Path of the JSON export (snapshot sources).
    #[serde(default)]
    pub snapshot_path: Option<String>,

    /// Project URL, e.g. `https://xyz.supabase.co`.
    #[serde(default)]
    pub supabase_url: Option<String>,

    /// API key sent as `apikey` and bearer token.
    #[serde(default)]
    pub supabase_key: Option<String>,

    /// Practitioner whose records are loaded.
    #[serde(default)]
    pub user_id: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            snapshot_path: None,
            supabase_url: None,
            supabase_key: None,
            user_id: None,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Language of month labels and timeline entries.
    #[serde(default)]
    pub locale: Locale,

    /// Include the new/renewed/churned/active patient lists.
    #[serde(default = "default_true")]
    pub include_patient_lists: bool,

    /// Include the event timeline.
    #[serde(default = "default_true")]
    pub include_timeline: bool,

    /// Maximum timeline entries in the Markdown report (0 = all).
    #[serde(default)]
    pub max_timeline_entries: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            include_patient_lists: true,
            include_timeline: true,
            max_timeline_entries: 0,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if args.verbose {
            self.general.verbose = true;
        }
        if let Some(ref practice) = args.practice {
            self.general.practice = Some(practice.clone());
        }
        if let Some(ref offset) = args.utc_offset {
            self.general.utc_offset = Some(offset.clone());
        }

        // An explicit --data wins; otherwise any Supabase flag selects the API.
        if let Some(ref data) = args.data {
            self.source.kind = SourceKind::Snapshot;
            self.source.snapshot_path = Some(data.display().to_string());
        } else if args.supabase_url.is_some() {
            self.source.kind = SourceKind::Supabase;
        }
        if let Some(ref url) = args.supabase_url {
            self.source.supabase_url = Some(url.clone());
        }
        if let Some(ref key) = args.supabase_key {
            self.source.supabase_key = Some(key.clone());
        }
        if let Some(ref user_id) = args.user_id {
            self.source.user_id = Some(user_id.clone());
        }
        if let Some(timeout) = args.timeout {
            self.source.timeout_seconds = timeout;
        }

        if let Some(locale) = args.locale {
            self.report.locale = locale;
        }
        if args.no_timeline {
            self.report.include_timeline = false;
        }
        if args.no_patient_lists {
            self.report.include_patient_lists = false;
        }
    }

    /// Check settings that may have come from the file rather than the CLI.
    pub fn validate(&self) -> Result<()> {
        if self.source.timeout_seconds == 0 {
            bail!("source.timeout_seconds must be at least 1");
        }

        if let Some(ref url) = self.source.supabase_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                bail!("source.supabase_url must start with 'http://' or 'https://'");
            }
        }

        if let Some(ref offset) = self.general.utc_offset {
            parse_utc_offset(offset)?;
        }

        Ok(())
    }

    /// Offset in which stored timestamps are read.
    pub fn reporting_offset(&self) -> Result<FixedOffset> {
        match self.general.utc_offset {
            Some(ref offset) => parse_utc_offset(offset),
            None => Ok(*Local::now().offset()),
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests::make_args;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output, "nutristats_report.md");
        assert_eq!(config.source.kind, SourceKind::Snapshot);
        assert_eq!(config.source.timeout_seconds, 30);
        assert_eq!(config.report.locale, Locale::PtBr);
        assert!(config.report.include_timeline);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "march.md"
practice = "Clínica Equilíbrio"

[source]
kind = "supabase"
supabase_url = "https://project.supabase.co"
user_id = "u-1"

[report]
locale = "en"
max_timeline_entries = 20
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "march.md");
        assert_eq!(config.general.practice.as_deref(), Some("Clínica Equilíbrio"));
        assert_eq!(config.source.kind, SourceKind::Supabase);
        assert_eq!(config.source.user_id.as_deref(), Some("u-1"));
        assert_eq!(config.source.timeout_seconds, 30);
        assert_eq!(config.report.locale, Locale::En);
        assert_eq!(config.report.max_timeline_entries, 20);
        assert!(config.report.include_patient_lists);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[source]\nsnapshot_path = \"export.json\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.source.snapshot_path.as_deref(), Some("export.json"));
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[source\nkind = 3").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_merge_data_overrides_supabase() {
        let mut config = Config::default();
        config.source.kind = SourceKind::Supabase;

        let mut args = make_args();
        args.data = Some(PathBuf::from("export.json"));
        args.locale = Some(Locale::En);
        args.no_timeline = true;
        config.merge_with_args(&args);

        assert_eq!(config.source.kind, SourceKind::Snapshot);
        assert_eq!(config.source.snapshot_path.as_deref(), Some("export.json"));
        assert_eq!(config.report.locale, Locale::En);
        assert!(!config.report.include_timeline);
    }

    #[test]
    fn test_merge_supabase_flags() {
        let mut config = Config::default();

        let mut args = make_args();
        args.supabase_url = Some("https://project.supabase.co".to_string());
        args.supabase_key = Some("key".to_string());
        args.user_id = Some("u-2".to_string());
        args.timeout = Some(5);
        config.merge_with_args(&args);

        assert_eq!(config.source.kind, SourceKind::Supabase);
        assert_eq!(config.source.supabase_key.as_deref(), Some("key"));
        assert_eq!(config.source.user_id.as_deref(), Some("u-2"));
        assert_eq!(config.source.timeout_seconds, 5);
    }

    #[test]
    fn test_merge_keeps_file_values_without_flags() {
        let mut config = Config::default();
        config.general.output = "from_file.md".to_string();
        config.report.locale = Locale::En;

        config.merge_with_args(&make_args());

        assert_eq!(config.general.output, "from_file.md");
        assert_eq!(config.report.locale, Locale::En);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[source]"));
        assert!(toml_str.contains("[report]"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout_from_file() {
        let config: Config = toml::from_str("[source]\ntimeout_seconds = 0").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));

        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url_and_offset() {
        let mut config = Config::default();
        config.source.supabase_url = Some("project.supabase.co".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.general.utc_offset = Some("Brasilia".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reporting_offset() {
        let mut config = Config::default();
        config.general.utc_offset = Some("-03:00".to_string());
        assert_eq!(
            config.reporting_offset().unwrap(),
            FixedOffset::west_opt(3 * 3600).unwrap()
        );

        let mut args = make_args();
        args.utc_offset = Some("+00:00".to_string());
        config.merge_with_args(&args);
        assert_eq!(
            config.reporting_offset().unwrap(),
            FixedOffset::east_opt(0).unwrap()
        );
    }

    #[test]
    fn test_verbose_from_file_survives_merge() {
        let mut config: Config = toml::from_str("[general]\nverbose = true").unwrap();
        config.merge_with_args(&make_args());
        assert!(config.general.verbose);
    }
}
