//! Records fetched from the hosted Supabase project over its REST API.

use super::rows::{AssessmentRow, PatientRow, RowDecoder};
use super::{Dataset, SourceError};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

const PATIENTS_TABLE: &str = "students";
const ASSESSMENTS_TABLE: &str = "assessments";

/// Connection settings for one practitioner's data.
#[derive(Debug, Clone)]
pub struct SupabaseSource {
    base_url: String,
    api_key: String,
    user_id: String,
    http_client: reqwest::Client,
}

impl SupabaseSource {
    pub fn new(
        base_url: &str,
        api_key: &str,
        user_id: &str,
        timeout_seconds: u64,
    ) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            user_id: user_id.to_string(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch both tables concurrently.
    pub async fn fetch(&self, decoder: &RowDecoder) -> Result<Dataset, SourceError> {
        info!("Fetching records from {}", self.base_url);

        let owner = self.owner_filter();
        let patient_query = [("select", "*".to_string()), ("user_id", owner.clone())];
        let assessment_query = [
            ("select", "*".to_string()),
            ("user_id", owner),
            ("order", "date.desc".to_string()),
        ];

        let (patients, assessments) = futures::try_join!(
            self.fetch_table::<PatientRow>(PATIENTS_TABLE, &patient_query),
            self.fetch_table::<AssessmentRow>(ASSESSMENTS_TABLE, &assessment_query),
        )?;

        Ok(Dataset::from_rows(patients, assessments, decoder))
    }

    async fn fetch_table<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, SourceError> {
        let url = self.table_url(table);
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                table: table.to_string(),
                status,
                body,
            });
        }

        let rows: Vec<T> = response.json().await?;
        debug!("Fetched {} rows from {}", rows.len(), table);
        Ok(rows)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn owner_filter(&self) -> String {
        format!("eq.{}", self.user_id)
    }
}
