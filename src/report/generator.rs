//! Markdown and JSON report generation.
//!
//! This module renders a monthly [`Report`] for the practitioner. Markdown
//! headings and fixed text follow the configured
//! [`Locale`](crate::locale::Locale).

use crate::analysis::{days_remaining, RosterSummary};
use crate::config::ReportConfig;
use crate::locale::ReportLabels;
use crate::models::{
    ChartData, MonthlyStats, Patient, PatientLists, Report, ReportMetadata, TimelineEvent,
};
use anyhow::Result;
use chrono::NaiveDate;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &ReportConfig) -> String {
    let labels = options.locale.report_labels();
    let mut output = String::new();

    // Title
    output.push_str(&format!(
        "# {}: {}\n\n",
        labels.title, report.metadata.period_label
    ));

    output.push_str(&generate_metadata_section(&report.metadata, labels));
    output.push_str(&generate_table_of_contents(options, labels));
    output.push_str(&generate_summary_section(
        &report.stats,
        &report.roster,
        labels,
    ));

    if options.include_patient_lists {
        output.push_str(&generate_patients_section(&report.stats.patients, labels));
    }

    output.push_str(&generate_trend_section(&report.stats.chart_data, labels));
    output.push_str(&generate_expiring_section(
        &report.stats.expiring_soon,
        report.metadata.reference_date,
        labels,
    ));

    if options.include_timeline {
        output.push_str(&generate_timeline_section(
            &report.stats.timeline,
            options.max_timeline_entries,
            labels,
        ));
    }

    output.push_str(&generate_footer(labels));

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata, labels: &ReportLabels) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", labels.metadata));
    if let Some(ref practice) = metadata.practice {
        section.push_str(&format!("- **{}:** {}\n", labels.practice, practice));
    }
    section.push_str(&format!(
        "- **{}:** {} ({}-{:02})\n",
        labels.period, metadata.period_label, metadata.year, metadata.month
    ));
    section.push_str(&format!(
        "- **{}:** {}\n",
        labels.reference_date,
        metadata.reference_date.format("%Y-%m-%d")
    ));
    section.push_str(&format!(
        "- **{}:** {}\n",
        labels.generated,
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **{}:** {}\n", labels.source, metadata.source));
    section.push_str(&format!(
        "- **{}:** {} {}, {} {}\n",
        labels.records,
        metadata.patients_loaded,
        labels.patients_word,
        metadata.assessments_loaded,
        labels.assessments_word
    ));
    section.push_str(&format!(
        "- **{}:** {:.2}s\n",
        labels.duration, metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(options: &ReportConfig, labels: &ReportLabels) -> String {
    let mut toc = String::new();

    toc.push_str(&format!("## {}\n\n", labels.contents));

    let mut headings = vec![labels.metadata, labels.summary];
    if options.include_patient_lists {
        headings.push(labels.patients);
    }
    headings.push(labels.trend);
    headings.push(labels.expiring);
    if options.include_timeline {
        headings.push(labels.timeline);
    }

    for heading in headings {
        toc.push_str(&format!("- [{}](#{})\n", heading, anchor(heading)));
    }
    toc.push('\n');

    toc
}

/// Generate the summary section.
fn generate_summary_section(
    stats: &MonthlyStats,
    roster: &RosterSummary,
    labels: &ReportLabels,
) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", labels.summary));

    section.push_str(&format!(
        "| {} | {} | {} | {} | {} | {} | {} |\n",
        labels.active,
        labels.new,
        labels.renewed,
        labels.churned,
        labels.growth,
        labels.assessments,
        labels.plans
    ));
    section.push_str("|:---:|:---:|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| **{}** | {} | {} | {} | {} | {} | {} |\n\n",
        stats.total_active,
        stats.new_patients,
        stats.renewals,
        stats.churned,
        format_growth(stats.growth_rate),
        stats.total_assessments,
        stats.total_plans
    ));

    section.push_str(&format!("### {}\n\n", labels.roster));
    section.push_str(&format!(
        "- **{}:** {} {} {}\n",
        labels.on_plan, roster.on_plan, labels.of, roster.total
    ));
    section.push_str(&format!(
        "- **{}:** {}\n\n",
        labels.off_plan, roster.off_plan
    ));

    section
}

/// Generate the per-category patient lists.
fn generate_patients_section(lists: &PatientLists, labels: &ReportLabels) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", labels.patients));

    let groups: [(&str, &[Patient]); 4] = [
        (labels.new, lists.new.as_slice()),
        (labels.renewed, lists.renewed.as_slice()),
        (labels.churned, lists.churned.as_slice()),
        (labels.active, lists.active.as_slice()),
    ];

    for (label, patients) in groups {
        section.push_str(&format!("### {} ({})\n\n", label, patients.len()));

        if patients.is_empty() {
            section.push_str(&format!("_{}_\n\n", labels.none));
            continue;
        }

        section.push_str(&format!(
            "| {} | {} | {} |\n",
            labels.name, labels.plan_start, labels.plan_end
        ));
        section.push_str("|:---|:---:|:---:|\n");
        for patient in patients {
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&patient.name),
                format_optional_date(patient.effective_plan_start()),
                format_optional_date(patient.plan_end_date)
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate the trailing trend table.
fn generate_trend_section(chart: &ChartData, labels: &ReportLabels) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", labels.trend));
    section.push_str(&format!(
        "| {} | {} | {} | {} |\n",
        labels.month, labels.active, labels.inflow, labels.outflow
    ));
    section.push_str("|:---|:---:|:---:|:---:|\n");

    for (evolution, movement) in chart.evolution.iter().zip(&chart.movement) {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            evolution.month, evolution.active, movement.inflow, movement.outflow
        ));
    }
    section.push('\n');

    section
}

/// Generate the expiration forecast.
fn generate_expiring_section(
    expiring: &[Patient],
    today: NaiveDate,
    labels: &ReportLabels,
) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", labels.expiring));

    if expiring.is_empty() {
        section.push_str(&format!("{}\n\n", labels.no_expiring));
        return section;
    }

    section.push_str(&format!(
        "| {} | {} | {} |\n",
        labels.name, labels.plan_end, labels.days_left
    ));
    section.push_str("|:---|:---:|:---:|\n");
    for patient in expiring {
        let days = days_remaining(patient, today)
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            escape_cell(&patient.name),
            format_optional_date(patient.plan_end_date),
            days
        ));
    }
    section.push('\n');

    section
}

/// Generate the timeline, optionally capped to the first `max_entries`.
fn generate_timeline_section(
    timeline: &[TimelineEvent],
    max_entries: usize,
    labels: &ReportLabels,
) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", labels.timeline));

    if timeline.is_empty() {
        section.push_str(&format!("{}\n\n", labels.no_events));
        return section;
    }

    let shown = if max_entries == 0 {
        timeline.len()
    } else {
        max_entries.min(timeline.len())
    };

    for event in &timeline[..shown] {
        section.push_str(&format!(
            "- {} **{}** {}: {}\n",
            event.kind.emoji(),
            event.date.format("%Y-%m-%d"),
            event.title,
            event.description
        ));
    }

    if shown < timeline.len() {
        section.push_str(&format!(
            "- _+{} {}_\n",
            timeline.len() - shown,
            labels.more_events
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer(labels: &ReportLabels) -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!("*{}*\n", labels.footer));

    footer
}

/// Format a growth rate with sign and one decimal.
pub fn format_growth(rate: f64) -> String {
    if rate > 0.0 {
        format!("+{:.1}%", rate)
    } else {
        format!("{:.1}%", rate)
    }
}

/// Link target Markdown renderers derive from a heading.
fn anchor(heading: &str) -> String {
    heading
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .flat_map(char::to_lowercase)
        .map(|c| if c == ' ' { '-' } else { c })
        .collect()
}

fn format_optional_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;
    use crate::models::{EventKind, EvolutionPoint, MovementPoint};
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_patient(name: &str, end: Option<NaiveDate>) -> Patient {
        Patient {
            id: name.to_lowercase(),
            name: name.to_string(),
            created_at: Some(date(2024, 1, 5)),
            plan_start_date: Some(date(2024, 1, 5)),
            plan_end_date: end,
        }
    }

    fn english() -> ReportConfig {
        ReportConfig {
            locale: Locale::En,
            ..ReportConfig::default()
        }
    }

    fn create_test_report() -> Report {
        let ana = create_test_patient("Ana", Some(date(2024, 6, 11)));
        let metadata = ReportMetadata {
            practice: Some("Clínica Equilíbrio".to_string()),
            year: 2024,
            month: 6,
            period_label: "junho de 2024".to_string(),
            reference_date: date(2024, 6, 1),
            generated_at: Utc::now(),
            source: "snapshot export.json".to_string(),
            patients_loaded: 1,
            assessments_loaded: 2,
            duration_seconds: 0.01,
        };

        let stats = MonthlyStats {
            total_active: 1,
            new_patients: 0,
            churned: 0,
            renewals: 0,
            growth_rate: -50.0,
            total_assessments: 2,
            total_plans: 2,
            patients: PatientLists {
                active: vec![ana.clone()],
                ..PatientLists::default()
            },
            chart_data: ChartData {
                evolution: vec![EvolutionPoint {
                    month: "jun.".to_string(),
                    active: 1,
                }],
                movement: vec![MovementPoint {
                    month: "jun.".to_string(),
                    inflow: 0,
                    outflow: 0,
                }],
            },
            expiring_soon: vec![ana],
            timeline: vec![
                TimelineEvent {
                    date: date(2024, 6, 3),
                    kind: EventKind::Assessment,
                    title: "Avaliação Realizada".to_string(),
                    description: "Avaliação física de Ana.".to_string(),
                },
                TimelineEvent {
                    date: date(2024, 6, 20),
                    kind: EventKind::Assessment,
                    title: "Avaliação Realizada".to_string(),
                    description: "Avaliação física de Ana.".to_string(),
                },
            ],
        };

        Report {
            metadata,
            roster: RosterSummary {
                total: 1,
                on_plan: 1,
                off_plan: 0,
            },
            stats,
        }
    }

    #[test]
    fn test_generate_markdown_report_in_portuguese() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report, &ReportConfig::default());

        assert!(markdown.contains("# Relatório Mensal: junho de 2024"));
        assert!(markdown.contains("## Metadados"));
        assert!(markdown.contains("- **Consultório:** Clínica Equilíbrio"));
        assert!(markdown.contains("## Resumo"));
        assert!(markdown.contains("| Ativos | Novos | Renovações | Encerrados |"));
        assert!(markdown.contains("| **1** | 0 | 0 | 0 | -50.0% | 2 | 2 |"));
        assert!(markdown.contains("### Ativos (1)"));
        assert!(markdown.contains("- [Tendência de 12 meses](#tendência-de-12-meses)"));
        assert!(markdown.contains("| jun. | 1 | 0 | 0 |"));
        assert!(markdown.contains("| Ana | 2024-06-11 | 10 |"));
        assert!(markdown.contains("Avaliação física de Ana."));
        assert!(!markdown.contains("Monthly Report"));
        assert!(!markdown.contains("## Summary"));
    }

    #[test]
    fn test_generate_markdown_report_in_english() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report, &english());

        assert!(markdown.contains("# Monthly Report: junho de 2024"));
        assert!(markdown.contains("## Summary"));
        assert!(markdown.contains("- [12-Month Trend](#12-month-trend)"));
        assert!(markdown.contains("### Active (1)"));
        assert!(markdown.contains("*Report generated by nutristats*"));
    }

    #[test]
    fn test_optional_sections() {
        let report = create_test_report();
        let options = ReportConfig {
            include_patient_lists: false,
            include_timeline: false,
            ..english()
        };
        let markdown = generate_markdown_report(&report, &options);

        assert!(!markdown.contains("## Patients"));
        assert!(!markdown.contains("## Timeline"));
        assert!(!markdown.contains("(#timeline)"));
        assert!(markdown.contains("## Expiring Soon"));
    }

    #[test]
    fn test_timeline_cap() {
        let report = create_test_report();
        let section =
            generate_timeline_section(&report.stats.timeline, 1, Locale::En.report_labels());

        assert!(section.contains("2024-06-03"));
        assert!(!section.contains("2024-06-20"));
        assert!(section.contains("+1 more events"));
    }

    #[test]
    fn test_empty_sections() {
        let pt = Locale::PtBr.report_labels();
        assert!(generate_expiring_section(&[], date(2024, 6, 1), pt).contains("Nenhum plano vence"));
        assert!(generate_timeline_section(&[], 0, pt).contains("Nenhum evento"));

        let en = Locale::En.report_labels();
        assert!(generate_patients_section(&PatientLists::default(), en).contains("### New (0)"));
    }

    #[test]
    fn test_anchor() {
        assert_eq!(anchor("12-Month Trend"), "12-month-trend");
        assert_eq!(anchor("Linha do tempo"), "linha-do-tempo");
        assert_eq!(anchor("Sumário"), "sumário");
    }

    #[test]
    fn test_format_growth() {
        assert_eq!(format_growth(0.0), "0.0%");
        assert_eq!(format_growth(100.0), "+100.0%");
        assert_eq!(format_growth(-33.3333), "-33.3%");
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("Ana | Bia"), "Ana \\| Bia");
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"metadata\""));
        assert!(json.contains("\"growth_rate\": -50.0"));
        assert!(json.contains("\"expiring_soon\""));
        assert!(json.contains("\"kind\": \"assessment\""));
        assert!(json.contains("\"reference_date\": \"2024-06-01\""));
    }
}
