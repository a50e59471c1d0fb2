//! Monthly statistics aggregation.
//!
//! This module turns the practitioner's patients and assessments into the
//! statistics for one reporting month: headline counts, categorized patient
//! lists, a trailing trend, the upcoming expirations and an event timeline.
//!
//! Everything here is a pure function of its inputs and the reference date
//! passed to [`Aggregator::new`].

use crate::locale::Locale;
use crate::models::{
    Assessment, ChartData, EvolutionPoint, EventKind, MonthlyStats, MovementPoint, Patient,
    TimelineEvent,
};
use crate::period::{PeriodError, ReportPeriod};
use chrono::{Days, NaiveDate};
use std::collections::HashMap;
use tracing::debug;

/// Number of months covered by the trend series.
pub const TREND_MONTHS: u32 = 12;

/// How far ahead the expiration forecast looks, in days.
pub const EXPIRING_WINDOW_DAYS: u64 = 30;

/// Computes [`MonthlyStats`] relative to a fixed reference date.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    today: NaiveDate,
    locale: Locale,
}

impl Aggregator {
    /// Create an aggregator that treats `today` as the current date.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            locale: Locale::default(),
        }
    }

    /// Use `locale` for month labels and timeline text.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Compute the statistics for a 0-based month (0 = January) of `year`.
    pub fn compute_monthly_stats(
        &self,
        patients: &[Patient],
        assessments: &[Assessment],
        month0: u32,
        year: i32,
    ) -> Result<MonthlyStats, PeriodError> {
        let period = ReportPeriod::from_zero_based(month0, year)?;
        Ok(self.compute(patients, assessments, period))
    }

    /// Compute the statistics for `period`.
    pub fn compute(
        &self,
        patients: &[Patient],
        assessments: &[Assessment],
        period: ReportPeriod,
    ) -> MonthlyStats {
        let mut stats = MonthlyStats::default();

        for patient in patients {
            if is_active_in(patient, period) {
                stats.total_active += 1;
                stats.patients.active.push(patient.clone());
            }

            if let Some(created) = patient.created_at.filter(|d| period.contains(*d)) {
                stats.new_patients += 1;
                stats.patients.new.push(patient.clone());
                stats
                    .timeline
                    .push(self.event(created, EventKind::NewPatient, &patient.name));
            } else if let Some(start) = self.renewal_start(patient, period) {
                stats.renewals += 1;
                stats.patients.renewed.push(patient.clone());
                stats
                    .timeline
                    .push(self.event(start, EventKind::Renewal, &patient.name));
            }

            if let Some(end) = self.lapse_in(patient, period) {
                stats.churned += 1;
                stats.patients.churned.push(patient.clone());
                stats
                    .timeline
                    .push(self.event(end, EventKind::Churn, &patient.name));
            }
        }

        let names: HashMap<&str, &str> = patients
            .iter()
            .map(|p| (p.id.as_str(), p.name.as_str()))
            .collect();

        for assessment in assessments {
            let Some(date) = assessment.date.filter(|d| period.contains(*d)) else {
                continue;
            };

            stats.total_assessments += 1;
            stats.total_plans += 1;

            let name = assessment
                .patient_id
                .as_deref()
                .and_then(|id| names.get(id).copied())
                .unwrap_or_else(|| self.locale.unknown_patient());
            stats
                .timeline
                .push(self.event(date, EventKind::Assessment, name));
        }

        // Stable: events on the same day keep insertion order.
        stats.timeline.sort_by_key(|e| e.date);

        let prev_active = count_active(patients, period.previous());
        stats.growth_rate = growth_rate(stats.total_active, prev_active);

        stats.chart_data = self.trend(patients);
        stats.expiring_soon = expiring_soon(patients, self.today);

        debug!(
            "Period {}-{:02}: active={} (prev {}), new={}, renewed={}, churned={}, assessments={}, expiring={}",
            period.year(),
            period.month(),
            stats.total_active,
            prev_active,
            stats.new_patients,
            stats.renewals,
            stats.churned,
            stats.total_assessments,
            stats.expiring_soon.len()
        );

        stats
    }

    /// Plan start inside `period` for a patient created before it.
    fn renewal_start(&self, patient: &Patient, period: ReportPeriod) -> Option<NaiveDate> {
        let start = patient.effective_plan_start()?;
        let created = patient.created_at?;
        (period.contains(start) && created < period.first_day()).then_some(start)
    }

    /// Plan end inside `period` that has already passed.
    fn lapse_in(&self, patient: &Patient, period: ReportPeriod) -> Option<NaiveDate> {
        patient
            .plan_end_date
            .filter(|end| period.contains(*end) && *end < self.today)
    }

    /// Active, inflow and outflow counts for the trailing months ending today.
    fn trend(&self, patients: &[Patient]) -> ChartData {
        let mut chart = ChartData::default();

        for month in ReportPeriod::trailing(self.today, TREND_MONTHS) {
            let label = self.locale.month_short(month.month()).to_string();

            let active = count_active(patients, month);
            let inflow = patients
                .iter()
                .filter(|p| p.effective_plan_start().is_some_and(|d| month.contains(d)))
                .count();
            let outflow = patients
                .iter()
                .filter(|p| self.lapse_in(p, month).is_some())
                .count();

            chart.evolution.push(EvolutionPoint {
                month: label.clone(),
                active,
            });
            chart.movement.push(MovementPoint {
                month: label,
                inflow,
                outflow,
            });
        }

        chart
    }

    fn event(&self, date: NaiveDate, kind: EventKind, patient_name: &str) -> TimelineEvent {
        TimelineEvent {
            date,
            kind,
            title: self.locale.event_title(kind).to_string(),
            description: self.locale.event_description(kind, patient_name),
        }
    }
}

/// Whether the patient's plan overlaps `period`.
///
/// A patient without a plan end date is never active.
pub fn is_active_in(patient: &Patient, period: ReportPeriod) -> bool {
    match (patient.effective_plan_start(), patient.plan_end_date) {
        (Some(start), Some(end)) => start <= period.last_day() && end >= period.first_day(),
        _ => false,
    }
}

/// Number of patients active in `period`.
pub fn count_active(patients: &[Patient], period: ReportPeriod) -> usize {
    patients.iter().filter(|p| is_active_in(p, period)).count()
}

/// Signed percentage change from `previous` to `current`.
///
/// With no previous activity the rate is 100 when anything is active now and
/// 0 otherwise.
pub fn growth_rate(current: usize, previous: usize) -> f64 {
    if previous > 0 {
        (current as f64 - previous as f64) / previous as f64 * 100.0
    } else if current > 0 {
        100.0
    } else {
        0.0
    }
}

/// Patients whose plan ends between `today` and `today + 30 days`, both
/// inclusive, soonest first.
pub fn expiring_soon(patients: &[Patient], today: NaiveDate) -> Vec<Patient> {
    let horizon = today
        .checked_add_days(Days::new(EXPIRING_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MAX);

    let mut expiring: Vec<Patient> = patients
        .iter()
        .filter(|p| {
            p.plan_end_date
                .is_some_and(|end| today <= end && end <= horizon)
        })
        .cloned()
        .collect();

    expiring.sort_by_key(|p| p.plan_end_date);
    expiring
}
