//! Localized labels for charts and timeline entries.

use crate::models::EventKind;
use crate::period::ReportPeriod;
use serde::{Deserialize, Serialize};
use std::fmt;

const MONTHS_PT_BR: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

const MONTHS_SHORT_PT_BR: [&str; 12] = [
    "jan.", "fev.", "mar.", "abr.", "mai.", "jun.", "jul.", "ago.", "set.", "out.", "nov.", "dez.",
];

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MONTHS_SHORT_EN: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Language used for month labels and timeline text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Locale {
    /// Brazilian Portuguese (default)
    #[default]
    PtBr,
    /// English
    En,
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::PtBr => write!(f, "pt-BR"),
            Locale::En => write!(f, "en"),
        }
    }
}

impl Locale {
    /// Short month name used on chart axes. `month` is 1-based.
    pub fn month_short(&self, month: u32) -> &'static str {
        let idx = month_index(month);
        match self {
            Locale::PtBr => MONTHS_SHORT_PT_BR[idx],
            Locale::En => MONTHS_SHORT_EN[idx],
        }
    }

    /// Full month name. `month` is 1-based.
    pub fn month_long(&self, month: u32) -> &'static str {
        let idx = month_index(month);
        match self {
            Locale::PtBr => MONTHS_PT_BR[idx],
            Locale::En => MONTHS_EN[idx],
        }
    }

    /// Human-readable name of a reporting month, e.g. "janeiro de 2024".
    pub fn period_label(&self, period: ReportPeriod) -> String {
        match self {
            Locale::PtBr => format!("{} de {}", self.month_long(period.month()), period.year()),
            Locale::En => format!("{} {}", self.month_long(period.month()), period.year()),
        }
    }

    pub fn event_title(&self, kind: EventKind) -> &'static str {
        match (self, kind) {
            (Locale::PtBr, EventKind::NewPatient) => "Novo Paciente",
            (Locale::PtBr, EventKind::Assessment) => "Avaliação Realizada",
            (Locale::PtBr, EventKind::Renewal) => "Renovação de Plano",
            (Locale::PtBr, EventKind::Churn) => "Encerramento de Plano",
            (Locale::En, EventKind::NewPatient) => "New Patient",
            (Locale::En, EventKind::Assessment) => "Assessment Performed",
            (Locale::En, EventKind::Renewal) => "Plan Renewal",
            (Locale::En, EventKind::Churn) => "Plan Ended",
        }
    }

    pub fn event_description(&self, kind: EventKind, patient_name: &str) -> String {
        match (self, kind) {
            (Locale::PtBr, EventKind::NewPatient) => {
                format!("{} iniciou o acompanhamento.", patient_name)
            }
            (Locale::PtBr, EventKind::Assessment) => {
                format!("Avaliação física de {}.", patient_name)
            }
            (Locale::PtBr, EventKind::Renewal) => format!("Plano de {} renovado.", patient_name),
            (Locale::PtBr, EventKind::Churn) => {
                format!("Vencimento do plano de {}.", patient_name)
            }
            (Locale::En, EventKind::NewPatient) => format!("{} started follow-up.", patient_name),
            (Locale::En, EventKind::Assessment) => {
                format!("Body assessment of {}.", patient_name)
            }
            (Locale::En, EventKind::Renewal) => format!("{}'s plan was renewed.", patient_name),
            (Locale::En, EventKind::Churn) => format!("{}'s plan expired.", patient_name),
        }
    }

    /// Headings and fixed text of the Markdown report.
    pub fn report_labels(&self) -> &'static ReportLabels {
        match self {
            Locale::PtBr => &LABELS_PT_BR,
            Locale::En => &LABELS_EN,
        }
    }

    /// Placeholder name for assessments whose patient is not in the data set.
    pub fn unknown_patient(&self) -> &'static str {
        match self {
            Locale::PtBr => "Paciente",
            Locale::En => "Patient",
        }
    }
}

/// Fixed text of the Markdown report.
#[derive(Debug)]
pub struct ReportLabels {
    pub title: &'static str,
    pub metadata: &'static str,
    pub practice: &'static str,
    pub period: &'static str,
    pub reference_date: &'static str,
    pub generated: &'static str,
    pub source: &'static str,
    pub records: &'static str,
    pub patients_word: &'static str,
    pub assessments_word: &'static str,
    pub duration: &'static str,
    pub contents: &'static str,
    pub summary: &'static str,
    pub active: &'static str,
    pub new: &'static str,
    pub renewed: &'static str,
    pub churned: &'static str,
    pub growth: &'static str,
    pub assessments: &'static str,
    pub plans: &'static str,
    pub roster: &'static str,
    pub on_plan: &'static str,
    pub of: &'static str,
    pub off_plan: &'static str,
    pub patients: &'static str,
    pub none: &'static str,
    pub name: &'static str,
    pub plan_start: &'static str,
    pub plan_end: &'static str,
    pub trend: &'static str,
    pub month: &'static str,
    pub inflow: &'static str,
    pub outflow: &'static str,
    pub expiring: &'static str,
    pub no_expiring: &'static str,
    pub days_left: &'static str,
    pub timeline: &'static str,
    pub no_events: &'static str,
    pub more_events: &'static str,
    pub footer: &'static str,
}

static LABELS_PT_BR: ReportLabels = ReportLabels {
    title: "Relatório Mensal",
    metadata: "Metadados",
    practice: "Consultório",
    period: "Período",
    reference_date: "Data de referência",
    generated: "Gerado em",
    source: "Fonte",
    records: "Registros",
    patients_word: "pacientes",
    assessments_word: "avaliações",
    duration: "Duração",
    contents: "Sumário",
    summary: "Resumo",
    active: "Ativos",
    new: "Novos",
    renewed: "Renovações",
    churned: "Encerrados",
    growth: "Crescimento",
    assessments: "Avaliações",
    plans: "Planos",
    roster: "Carteira hoje",
    on_plan: "Com plano",
    of: "de",
    off_plan: "Sem plano",
    patients: "Pacientes",
    none: "Nenhum.",
    name: "Nome",
    plan_start: "Início do plano",
    plan_end: "Fim do plano",
    trend: "Tendência de 12 meses",
    month: "Mês",
    inflow: "Entradas",
    outflow: "Saídas",
    expiring: "Vencendo em breve",
    no_expiring: "Nenhum plano vence nos próximos 30 dias.",
    days_left: "Dias restantes",
    timeline: "Linha do tempo",
    no_events: "Nenhum evento neste mês.",
    more_events: "eventos a mais",
    footer: "Relatório gerado pelo nutristats",
};

static LABELS_EN: ReportLabels = ReportLabels {
    title: "Monthly Report",
    metadata: "Metadata",
    practice: "Practice",
    period: "Period",
    reference_date: "Reference Date",
    generated: "Generated",
    source: "Source",
    records: "Records",
    patients_word: "patients",
    assessments_word: "assessments",
    duration: "Duration",
    contents: "Table of Contents",
    summary: "Summary",
    active: "Active",
    new: "New",
    renewed: "Renewed",
    churned: "Churned",
    growth: "Growth",
    assessments: "Assessments",
    plans: "Plans",
    roster: "Roster Today",
    on_plan: "On plan",
    of: "of",
    off_plan: "Off plan",
    patients: "Patients",
    none: "None.",
    name: "Name",
    plan_start: "Plan Start",
    plan_end: "Plan End",
    trend: "12-Month Trend",
    month: "Month",
    inflow: "In",
    outflow: "Out",
    expiring: "Expiring Soon",
    no_expiring: "No plans end in the next 30 days.",
    days_left: "Days Left",
    timeline: "Timeline",
    no_events: "No events this month.",
    more_events: "more events",
    footer: "Report generated by nutristats",
};

fn month_index(month: u32) -> usize {
    (month.clamp(1, 12) - 1) as usize
}
