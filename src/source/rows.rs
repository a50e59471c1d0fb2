//! Wire rows as stored in the hosted database.
//!
//! Column names follow the `students` and `assessments` tables. Everything
//! but the primary key is optional on the wire: one incomplete row degrades
//! to a partial record instead of failing the whole load.

use crate::dates::{parse_record_date, utc};
use crate::locale::Locale;
use crate::models::{Assessment, Patient};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A row of the `students` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRow {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub plan_start_date: Option<String>,
    #[serde(default)]
    pub plan_end_date: Option<String>,
}

/// A row of the `assessments` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentRow {
    pub id: String,
    #[serde(default, alias = "patient_id")]
    pub student_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub calorie_goal: Option<f64>,
    #[serde(default)]
    pub objective: Option<String>,
}

/// Converts wire rows into domain records.
#[derive(Debug, Clone, Copy)]
pub struct RowDecoder {
    offset: FixedOffset,
    locale: Locale,
}

impl Default for RowDecoder {
    fn default() -> Self {
        Self::new(utc(), Locale::default())
    }
}

impl RowDecoder {
    /// Timestamps are read in `offset`; `locale` names patients without one.
    pub fn new(offset: FixedOffset, locale: Locale) -> Self {
        Self { offset, locale }
    }

    pub fn patient(&self, row: PatientRow) -> Patient {
        let created_at = self.date(&row.id, "created_at", row.created_at.as_deref());
        let plan_start_date = self.date(&row.id, "plan_start_date", row.plan_start_date.as_deref());
        let plan_end_date = self.date(&row.id, "plan_end_date", row.plan_end_date.as_deref());

        let name = match non_blank(row.name) {
            Some(name) => name,
            None => {
                warn!("Patient {} has no name", row.id);
                self.locale.unknown_patient().to_string()
            }
        };

        Patient {
            id: row.id,
            name,
            created_at,
            plan_start_date,
            plan_end_date,
        }
    }

    /// An assessment without an owner is kept and shown as an unknown patient.
    pub fn assessment(&self, row: AssessmentRow) -> Assessment {
        let date = self.date(&row.id, "date", row.date.as_deref());

        let patient_id = non_blank(row.student_id);
        if patient_id.is_none() {
            warn!("Assessment {} has no patient", row.id);
        }

        Assessment {
            id: row.id,
            patient_id,
            date,
            weight: row.weight.unwrap_or_default(),
            calorie_goal: row.calorie_goal.unwrap_or_default(),
            objective: non_blank(row.objective),
        }
    }

    fn date(&self, id: &str, field: &str, raw: Option<&str>) -> Option<chrono::NaiveDate> {
        parse_record_date(id, field, raw, &self.offset)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
