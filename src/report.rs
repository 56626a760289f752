// Report - one snapshot of everything the dashboard shows for a session

use crate::metrics::{AggregateMetrics, PersonMetrics};
use crate::series::{self, DailyTotal, PersonTotal, TimelinePoint, WeeklyTotal};
use crate::session::Session;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedPerson {
    #[serde(flatten)]
    pub metrics: PersonMetrics,
    pub timeline: Vec<TimelinePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub success: bool,
    pub errors: Vec<String>,
    pub runs: usize,
    pub overall: AggregateMetrics,
    /// Alphabetical by person
    pub by_person: Vec<PersonMetrics>,
    pub daily_totals: Vec<DailyTotal>,
    pub distribution: Vec<PersonTotal>,
    pub weekly_trend: Vec<WeeklyTotal>,
    pub comparison: Vec<PersonMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<SelectedPerson>,
}

impl Report {
    pub fn from_session(session: &Session) -> Self {
        let records = session.records();

        let mut by_person = session.person_metrics().to_vec();
        by_person.sort_by(|a, b| a.person.cmp(&b.person));

        let selected = session.selected_metrics().map(|metrics| SelectedPerson {
            metrics: metrics.clone(),
            timeline: session.selected_timeline(),
        });

        Report {
            success: session.errors().is_empty(),
            errors: session.messages(),
            runs: records.len(),
            overall: session.overall_metrics(),
            comparison: series::runner_comparison(&by_person),
            by_person,
            daily_totals: series::daily_totals(records),
            distribution: series::person_totals(records),
            weekly_trend: series::weekly_trend(records),
            selected,
        }
    }
}
