//! Nutristats - monthly practice statistics for nutritionists
//!
//! Loads a practitioner's patients and assessments and computes the
//! statistics of a reporting month: active/new/churned/renewed counts,
//! growth, the 12-month trend, upcoming plan expirations and an event
//! timeline. The `nutristats` binary renders them as Markdown or JSON.
//!
//! ```no_run
//! use nutristats::analysis::Aggregator;
//! use chrono::NaiveDate;
//!
//! let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
//! // March 2024, months counted from zero.
//! let stats = Aggregator::new(today).compute_monthly_stats(&[], &[], 2, 2024)?;
//! assert_eq!(stats.total_active, 0);
//! # Ok::<(), nutristats::period::PeriodError>(())
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod dates;
pub mod locale;
pub mod models;
pub mod period;
pub mod report;
pub mod source;
