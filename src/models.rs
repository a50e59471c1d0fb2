//! Data models for the practice statistics.
//!
//! This module contains the patient and assessment records consumed by the
//! aggregator and the statistics structures it produces.

use crate::analysis::RosterSummary;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A practitioner's patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    /// Store identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Calendar date of the creation timestamp.
    pub created_at: Option<NaiveDate>,
    /// First day of the current plan.
    pub plan_start_date: Option<NaiveDate>,
    /// Last day of the current plan (inclusive).
    pub plan_end_date: Option<NaiveDate>,
}

impl Patient {
    /// Start of the plan used for range checks.
    ///
    /// Falls back to the creation date when no plan start was recorded.
    pub fn effective_plan_start(&self) -> Option<NaiveDate> {
        self.plan_start_date.or(self.created_at)
    }
}

/// A dated snapshot of a patient's measurements and dietary goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: String,
    /// Owning patient; `None` when the row had no owner.
    pub patient_id: Option<String>,
    pub date: Option<NaiveDate>,
    /// Body weight in kilograms.
    pub weight: f64,
    /// Daily calorie goal in kcal.
    pub calorie_goal: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
}

/// Kind of event shown on the monthly timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    NewPatient,
    Assessment,
    Renewal,
    Churn,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::NewPatient => write!(f, "new_patient"),
            EventKind::Assessment => write!(f, "assessment"),
            EventKind::Renewal => write!(f, "renewal"),
            EventKind::Churn => write!(f, "churn"),
        }
    }
}

impl EventKind {
    /// Returns an emoji marker for the event kind.
    pub fn emoji(&self) -> &'static str {
        match self {
            EventKind::NewPatient => "🟢",
            EventKind::Assessment => "📋",
            EventKind::Renewal => "🔄",
            EventKind::Churn => "🔴",
        }
    }
}

/// A single entry on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub date: NaiveDate,
    pub kind: EventKind,
    pub title: String,
    pub description: String,
}

/// Patients grouped by what happened to them in the period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientLists {
    pub new: Vec<Patient>,
    pub churned: Vec<Patient>,
    pub renewed: Vec<Patient>,
    pub active: Vec<Patient>,
}

/// Active patient count for one month of the trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionPoint {
    pub month: String,
    pub active: usize,
}

/// Plan starts and lapses for one month of the trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementPoint {
    pub month: String,
    pub inflow: usize,
    pub outflow: usize,
}

/// Trailing twelve-month series, oldest month first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub evolution: Vec<EvolutionPoint>,
    pub movement: Vec<MovementPoint>,
}

/// Statistics for one reporting month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub total_active: usize,
    pub new_patients: usize,
    pub churned: usize,
    pub renewals: usize,
    /// Percentage change of active patients against the previous month.
    pub growth_rate: f64,
    pub total_assessments: usize,
    /// One plan per in-period assessment.
    pub total_plans: usize,
    pub patients: PatientLists,
    pub chart_data: ChartData,
    /// Plans ending within the next 30 days, soonest first.
    pub expiring_soon: Vec<Patient>,
    pub timeline: Vec<TimelineEvent>,
}

/// Metadata about the generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Practice name, when configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub practice: Option<String>,
    /// Reporting year.
    pub year: i32,
    /// Reporting month (1-12).
    pub month: u32,
    /// Localized name of the reporting month.
    pub period_label: String,
    /// Date treated as "today" by the aggregation.
    pub reference_date: NaiveDate,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Where the records were loaded from.
    pub source: String,
    pub patients_loaded: usize,
    pub assessments_loaded: usize,
    /// Time spent loading and aggregating, in seconds.
    pub duration_seconds: f64,
}

/// The complete monthly report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    /// Plan status of the whole roster on the reference date.
    pub roster: RosterSummary,
    pub stats: MonthlyStats,
}
