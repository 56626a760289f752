// Running-log records - raw rows, validated rows and the upload outcome

use crate::error::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// RAW RECORD
// ============================================================================

/// RawRecord - one tokenized data row, column name → cell text.
/// Nothing here has been validated yet; it only lives while the pipeline runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record by zipping header names with cell values.
    /// Duplicate column names keep the first value; missing cells are absent.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut fields = HashMap::new();
        for (key, value) in pairs {
            fields.entry(key.into()).or_insert_with(|| value.into());
        }
        RawRecord { fields }
    }

    /// Builder pattern: set one column
    pub fn with_field(mut self, key: &str, value: &str) -> Self {
        self.fields.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ============================================================================
// VALIDATED RECORD
// ============================================================================

/// One run that passed every row rule. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedRecord {
    pub date: NaiveDate,
    pub person: String,
    pub miles: f64,
}

impl ValidatedRecord {
    pub fn new(date: NaiveDate, person: impl Into<String>, miles: f64) -> Self {
        ValidatedRecord {
            date,
            person: person.into(),
            miles,
        }
    }
}

// ============================================================================
// VALIDATION OUTCOME
// ============================================================================

/// Result of one upload. All-or-nothing: either every row was accepted
/// and `errors` is empty, or `records` is empty and `errors` says why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub success: bool,
    pub records: Vec<ValidatedRecord>,
    pub errors: Vec<ValidationError>,
}

impl ValidationOutcome {
    pub fn accepted(records: Vec<ValidatedRecord>) -> Self {
        ValidationOutcome {
            success: true,
            records,
            errors: Vec::new(),
        }
    }

    /// Reject the upload. An empty error list is still a rejection, so
    /// callers must pass at least one error to keep `success == errors.is_empty()`.
    pub fn rejected(errors: Vec<ValidationError>) -> Self {
        debug_assert!(!errors.is_empty(), "rejected outcome needs at least one error");
        ValidationOutcome {
            success: false,
            records: Vec::new(),
            errors,
        }
    }

    /// Human-readable error messages in report order
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}
