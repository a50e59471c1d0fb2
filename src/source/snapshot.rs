//! Records loaded from a JSON export of the data store.
//!
//! The file holds both tables:
//!
//! ```json
//! { "patients": [ ... ], "assessments": [ ... ] }
//! ```

use super::rows::{AssessmentRow, PatientRow, RowDecoder};
use super::{Dataset, SourceError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// On-disk layout of a snapshot file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub patients: Vec<PatientRow>,
    #[serde(default)]
    pub assessments: Vec<AssessmentRow>,
}

/// Reads a snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and convert every record in the file.
    pub async fn fetch(&self, decoder: &RowDecoder) -> Result<Dataset, SourceError> {
        info!("Reading snapshot: {}", self.path.display());

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;

        let snapshot: Snapshot =
            serde_json::from_str(&content).map_err(|source| SourceError::Parse {
                path: self.path.clone(),
                source,
            })?;

        debug!(
            "Snapshot has {} patient rows and {} assessment rows",
            snapshot.patients.len(),
            snapshot.assessments.len()
        );

        Ok(Dataset::from_rows(
            snapshot.patients,
            snapshot.assessments,
            decoder,
        ))
    }
}
