// Chart series - the datasets the dashboard plots, derived from validated runs
//
// Nothing here draws anything. Each function turns a record set (or the
// per-person metrics) into an ordered series the presentation layer can
// hand straight to a chart.

use crate::metrics::{round2, PersonMetrics};
use crate::record::ValidatedRecord;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// SERIES TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub miles: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonTotal {
    pub person: String,
    pub miles: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTotal {
    pub year: i32,
    pub week: u32,
    pub miles: f64,
    pub runs: usize,
}

impl WeeklyTotal {
    pub fn label(&self) -> String {
        format!("{} Week {}", self.year, self.week)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub miles: f64,
}

// ============================================================================
// SERIES BUILDERS
// ============================================================================

/// Total miles per calendar day, oldest first
pub fn daily_totals(records: &[ValidatedRecord]) -> Vec<DailyTotal> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in records {
        *by_day.entry(record.date).or_insert(0.0) += record.miles;
    }

    by_day
        .into_iter()
        .map(|(date, miles)| DailyTotal {
            date,
            miles: round2(miles),
        })
        .collect()
}

/// Total miles per person (distribution), first-seen order
pub fn person_totals(records: &[ValidatedRecord]) -> Vec<PersonTotal> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<PersonTotal> = Vec::new();

    for record in records {
        let slot = *positions.entry(record.person.as_str()).or_insert_with(|| {
            totals.push(PersonTotal {
                person: record.person.clone(),
                miles: 0.0,
            });
            totals.len() - 1
        });
        totals[slot].miles += record.miles;
    }

    for total in &mut totals {
        total.miles = round2(total.miles);
    }
    totals
}

/// Week of the year, counting Sunday-started weeks with January 1st in week 1
pub fn week_of_year(date: NaiveDate) -> u32 {
    let jan1_weekday = NaiveDate::from_ymd_opt(date.year(), 1, 1)
        .map(|d| d.weekday().num_days_from_sunday())
        .unwrap_or(0);
    (date.ordinal0() + jan1_weekday + 1 + 6) / 7
}

/// Miles and run count per (year, week), oldest first
pub fn weekly_trend(records: &[ValidatedRecord]) -> Vec<WeeklyTotal> {
    let mut by_week: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for record in records {
        let key = (record.date.year(), week_of_year(record.date));
        let entry = by_week.entry(key).or_insert((0.0, 0));
        entry.0 += record.miles;
        entry.1 += 1;
    }

    by_week
        .into_iter()
        .map(|((year, week), (miles, runs))| WeeklyTotal {
            year,
            week,
            miles: round2(miles),
            runs,
        })
        .collect()
}

/// Per-person metrics ordered by average miles, best first (ties by name)
pub fn runner_comparison(person_metrics: &[PersonMetrics]) -> Vec<PersonMetrics> {
    let mut sorted = person_metrics.to_vec();
    sorted.sort_by(|a, b| {
        b.metrics
            .average
            .total_cmp(&a.metrics.average)
            .then_with(|| a.person.cmp(&b.person))
    });
    sorted
}

/// One person's runs, oldest first. Same-day runs keep file order.
pub fn person_timeline(records: &[ValidatedRecord], person: &str) -> Vec<TimelinePoint> {
    let mut points: Vec<TimelinePoint> = records
        .iter()
        .filter(|r| r.person == person)
        .map(|r| TimelinePoint {
            date: r.date,
            miles: r.miles,
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

/// Distinct person names, alphabetical
pub fn people(person_metrics: &[PersonMetrics]) -> Vec<String> {
    let mut names: Vec<String> = person_metrics.iter().map(|pm| pm.person.clone()).collect();
    names.sort();
    names.dedup();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::aggregate_by_person;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<ValidatedRecord> {
        vec![
            ValidatedRecord::new(ymd(2024, 1, 3), "Cara", 4.0),
            ValidatedRecord::new(ymd(2024, 1, 1), "Alice", 2.5),
            ValidatedRecord::new(ymd(2024, 1, 3), "Alice", 1.25),
            ValidatedRecord::new(ymd(2024, 1, 9), "Bob", 6.0),
            ValidatedRecord::new(ymd(2024, 1, 2), "Alice", 3.0),
        ]
    }

    #[test]
    fn test_daily_totals_sorted_and_summed() {
        let totals = daily_totals(&sample());
        assert_eq!(
            totals,
            vec![
                DailyTotal { date: ymd(2024, 1, 1), miles: 2.5 },
                DailyTotal { date: ymd(2024, 1, 2), miles: 3.0 },
                DailyTotal { date: ymd(2024, 1, 3), miles: 5.25 },
                DailyTotal { date: ymd(2024, 1, 9), miles: 6.0 },
            ]
        );
    }

    #[test]
    fn test_person_totals_first_seen_order() {
        let totals = person_totals(&sample());
        let names: Vec<&str> = totals.iter().map(|t| t.person.as_str()).collect();
        assert_eq!(names, vec!["Cara", "Alice", "Bob"]);
        assert_eq!(totals[1].miles, 6.75);
    }

    #[test]
    fn test_person_totals_rounded() {
        let records = vec![
            ValidatedRecord::new(ymd(2024, 1, 1), "A", 0.1),
            ValidatedRecord::new(ymd(2024, 1, 2), "A", 0.2),
        ];
        assert_eq!(person_totals(&records)[0].miles, 0.3);
    }

    #[test]
    fn test_week_of_year() {
        // 2024-01-01 is a Monday
        assert_eq!(week_of_year(ymd(2024, 1, 1)), 1);
        assert_eq!(week_of_year(ymd(2024, 1, 6)), 1);
        assert_eq!(week_of_year(ymd(2024, 1, 7)), 2);
        // 2023-01-01 is a Sunday
        assert_eq!(week_of_year(ymd(2023, 1, 1)), 1);
        assert_eq!(week_of_year(ymd(2023, 1, 8)), 2);
        assert_eq!(week_of_year(ymd(2024, 12, 31)), 53);
    }

    #[test]
    fn test_weekly_trend_buckets() {
        let trend = weekly_trend(&sample());
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].week, 1);
        assert_eq!(trend[0].runs, 4);
        assert_eq!(trend[0].miles, 10.75);
        assert_eq!(trend[1].week, 2);
        assert_eq!(trend[1].runs, 1);
        assert_eq!(trend[1].label(), "2024 Week 2");
    }

    #[test]
    fn test_weekly_trend_separates_years() {
        let records = vec![
            ValidatedRecord::new(ymd(2024, 1, 2), "A", 1.0),
            ValidatedRecord::new(ymd(2023, 1, 3), "A", 2.0),
        ];
        let trend = weekly_trend(&records);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].year, 2023);
        assert_eq!(trend[1].year, 2024);
    }

    #[test]
    fn test_runner_comparison_sorted_by_average() {
        let metrics = aggregate_by_person(&sample());
        let ranked = runner_comparison(&metrics);
        let names: Vec<&str> = ranked.iter().map(|pm| pm.person.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Cara", "Alice"]);
    }

    #[test]
    fn test_runner_comparison_ties_by_name() {
        let records = vec![
            ValidatedRecord::new(ymd(2024, 1, 1), "Zoe", 3.0),
            ValidatedRecord::new(ymd(2024, 1, 1), "Abe", 3.0),
        ];
        let ranked = runner_comparison(&aggregate_by_person(&records));
        assert_eq!(ranked[0].person, "Abe");
    }

    #[test]
    fn test_person_timeline_sorted() {
        let points = person_timeline(&sample(), "Alice");
        let dates: Vec<NaiveDate> = points.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![ymd(2024, 1, 1), ymd(2024, 1, 2), ymd(2024, 1, 3)]);
        assert!(person_timeline(&sample(), "Nobody").is_empty());
    }

    #[test]
    fn test_people_alphabetical() {
        let names = people(&aggregate_by_person(&sample()));
        assert_eq!(names, vec!["Alice", "Bob", "Cara"]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(daily_totals(&[]).is_empty());
        assert!(person_totals(&[]).is_empty());
        assert!(weekly_trend(&[]).is_empty());
        assert!(people(&[]).is_empty());
    }
}
