//! Record sources.
//!
//! Patients and assessments are owned by the hosted data store. They reach
//! the aggregator either from a JSON export on disk or straight from the
//! store's REST API.

pub mod rows;
pub mod snapshot;
pub mod supabase;

pub use rows::RowDecoder;
pub use snapshot::SnapshotSource;
pub use supabase::SupabaseSource;

use crate::config::{SourceConfig, SourceKind};
use crate::models::{Assessment, Patient};
use rows::{AssessmentRow, PatientRow};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading records.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Request to data store failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Data store returned {status} for {table}: {body}")]
    Api {
        table: String,
        status: u16,
        body: String,
    },

    #[error("Missing setting: {0}")]
    MissingSetting(&'static str),
}

/// Everything the aggregator needs, already converted to domain records.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub patients: Vec<Patient>,
    pub assessments: Vec<Assessment>,
}

impl Dataset {
    pub fn from_rows(
        patients: Vec<PatientRow>,
        assessments: Vec<AssessmentRow>,
        decoder: &RowDecoder,
    ) -> Self {
        Self {
            patients: patients.into_iter().map(|r| decoder.patient(r)).collect(),
            assessments: assessments
                .into_iter()
                .map(|r| decoder.assessment(r))
                .collect(),
        }
    }
}

/// A configured record source.
#[derive(Debug, Clone)]
pub enum Source {
    Snapshot(SnapshotSource),
    Supabase(SupabaseSource),
}

impl Source {
    /// Build the source selected in the configuration.
    pub fn from_config(config: &SourceConfig) -> Result<Self, SourceError> {
        match config.kind {
            SourceKind::Snapshot => {
                let path = config
                    .snapshot_path
                    .as_deref()
                    .ok_or(SourceError::MissingSetting("source.snapshot_path (--data)"))?;
                Ok(Source::Snapshot(SnapshotSource::new(path)))
            }
            SourceKind::Supabase => {
                let url = config
                    .supabase_url
                    .as_deref()
                    .ok_or(SourceError::MissingSetting("source.supabase_url (--supabase-url)"))?;
                let key = config
                    .supabase_key
                    .as_deref()
                    .ok_or(SourceError::MissingSetting("source.supabase_key (--supabase-key)"))?;
                let user_id = config
                    .user_id
                    .as_deref()
                    .ok_or(SourceError::MissingSetting("source.user_id (--user-id)"))?;

                Ok(Source::Supabase(SupabaseSource::new(
                    url,
                    key,
                    user_id,
                    config.timeout_seconds,
                )?))
            }
        }
    }

    /// Where the records come from, for logs and report metadata.
    pub fn describe(&self) -> String {
        match self {
            Source::Snapshot(s) => format!("snapshot {}", s.path().display()),
            Source::Supabase(s) => format!("supabase {}", s.base_url()),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Source::Supabase(_))
    }

    pub async fn fetch(&self, decoder: &RowDecoder) -> Result<Dataset, SourceError> {
        match self {
            Source::Snapshot(s) => s.fetch(decoder).await,
            Source::Supabase(s) => s.fetch(decoder).await,
        }
    }
}
