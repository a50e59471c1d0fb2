//! Current plan status of each patient.
//!
//! Unlike the monthly statistics, this looks only at the reference date:
//! is the patient's plan still running today, and for how long.

use crate::models::Patient;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Plan state of a patient on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// Plan ends today or later.
    OnPlan,
    /// Plan end date has passed.
    Lapsed,
    /// No plan end date recorded.
    NoPlan,
}

/// Whole days from `today` until the plan end. Negative once lapsed.
pub fn days_remaining(patient: &Patient, today: NaiveDate) -> Option<i64> {
    patient
        .plan_end_date
        .map(|end| end.signed_duration_since(today).num_days())
}

pub fn plan_status(patient: &Patient, today: NaiveDate) -> PlanStatus {
    match days_remaining(patient, today) {
        Some(days) if days >= 0 => PlanStatus::OnPlan,
        Some(_) => PlanStatus::Lapsed,
        None => PlanStatus::NoPlan,
    }
}

/// Counts of patients with and without a running plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSummary {
    pub total: usize,
    pub on_plan: usize,
    /// Lapsed plans plus patients without a plan end date.
    pub off_plan: usize,
}

impl RosterSummary {
    /// Creates a summary from the full patient list.
    pub fn from_patients(patients: &[Patient], today: NaiveDate) -> Self {
        let mut summary = Self {
            total: patients.len(),
            ..Self::default()
        };

        for patient in patients {
            match plan_status(patient, today) {
                PlanStatus::OnPlan => summary.on_plan += 1,
                PlanStatus::Lapsed | PlanStatus::NoPlan => summary.off_plan += 1,
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn patient_ending(end: Option<NaiveDate>) -> Patient {
        Patient {
            id: "p".to_string(),
            name: "Carla".to_string(),
            created_at: Some(date(2024, 1, 1)),
            plan_start_date: None,
            plan_end_date: end,
        }
    }

    #[test]
    fn test_days_remaining() {
        let today = date(2024, 6, 1);
        assert_eq!(days_remaining(&patient_ending(Some(date(2024, 6, 11))), today), Some(10));
        assert_eq!(days_remaining(&patient_ending(Some(today)), today), Some(0));
        assert_eq!(days_remaining(&patient_ending(Some(date(2024, 5, 30))), today), Some(-2));
        assert_eq!(days_remaining(&patient_ending(None), today), None);
    }

    #[test]
    fn test_plan_status() {
        let today = date(2024, 6, 1);
        assert_eq!(plan_status(&patient_ending(Some(today)), today), PlanStatus::OnPlan);
        assert_eq!(
            plan_status(&patient_ending(Some(date(2024, 5, 31))), today),
            PlanStatus::Lapsed
        );
        assert_eq!(plan_status(&patient_ending(None), today), PlanStatus::NoPlan);
    }

    #[test]
    fn test_roster_summary() {
        let today = date(2024, 6, 1);
        let patients = vec![
            patient_ending(Some(date(2024, 7, 1))),
            patient_ending(Some(today)),
            patient_ending(Some(date(2024, 1, 31))),
            patient_ending(None),
        ];

        let summary = RosterSummary::from_patients(&patients, today);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.on_plan, 2);
        assert_eq!(summary.off_plan, 2);
    }
}
