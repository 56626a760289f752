// Metrics Engine - average/min/max miles, overall and per person

use crate::record::ValidatedRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonMetrics {
    pub person: String,
    #[serde(flatten)]
    pub metrics: AggregateMetrics,
}

/// Round to 2 decimal places, halves away from zero.
///
/// Works on the binary value, so inputs like 1.005 (stored as
/// 1.00499999...) round down.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Average, minimum and maximum miles over `records`, each rounded to
/// 2 decimals. Empty input gives all zeros.
pub fn aggregate(records: &[ValidatedRecord]) -> AggregateMetrics {
    aggregate_miles(records.iter().map(|r| r.miles))
}

fn aggregate_miles<I>(miles: I) -> AggregateMetrics
where
    I: IntoIterator<Item = f64>,
{
    let mut count = 0usize;
    let mut total = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for m in miles {
        count += 1;
        total += m;
        min = min.min(m);
        max = max.max(m);
    }

    if count == 0 {
        return AggregateMetrics::default();
    }

    AggregateMetrics {
        average: round2(total / count as f64),
        min: round2(min),
        max: round2(max),
    }
}

/// One [`PersonMetrics`] per distinct person (exact, case-sensitive match).
///
/// Groups come out in first-seen order; callers that need a stable
/// presentation order sort the result themselves.
pub fn aggregate_by_person(records: &[ValidatedRecord]) -> Vec<PersonMetrics> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<f64>)> = Vec::new();

    for record in records {
        let slot = *positions.entry(record.person.as_str()).or_insert_with(|| {
            groups.push((record.person.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(record.miles);
    }

    groups
        .into_iter()
        .map(|(person, miles)| PersonMetrics {
            person: person.to_string(),
            metrics: aggregate_miles(miles),
        })
        .collect()
}
