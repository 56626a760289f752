// Header and row rules for uploaded run logs

use crate::dates::DateGrammar;
use crate::error::ValidationError;
use crate::record::{RawRecord, ValidatedRecord};

pub const DATE_COLUMN: &str = "date";
pub const PERSON_COLUMN: &str = "person";
pub const MILES_COLUMN: &str = "miles run";

/// Columns every upload must carry. Order matters: missing headers are
/// reported in this order.
pub const REQUIRED_HEADERS: [&str; 3] = [DATE_COLUMN, PERSON_COLUMN, MILES_COLUMN];

// ============================================================================
// HEADER VALIDATOR
// ============================================================================

/// Check the parsed column names against the required schema.
///
/// Returns one combined error listing every missing column, or an empty
/// vector when all are present. Extra columns are allowed.
pub fn validate_headers<S: AsRef<str>>(headers: &[S]) -> Vec<ValidationError> {
    let missing: Vec<String> = REQUIRED_HEADERS
        .iter()
        .filter(|required| !headers.iter().any(|h| h.as_ref() == **required))
        .map(|required| required.to_string())
        .collect();

    if missing.is_empty() {
        Vec::new()
    } else {
        vec![ValidationError::MissingHeaders { missing }]
    }
}

// ============================================================================
// ROW VALIDATOR
// ============================================================================

/// Validate one data row using the default date grammar.
///
/// `index` is the zero-based position among data rows; messages use
/// `index + 2` so they line up with what a spreadsheet shows.
pub fn validate_row(row: &RawRecord, index: usize) -> (Option<ValidatedRecord>, Vec<ValidationError>) {
    validate_row_with(row, index, &DateGrammar::default())
}

/// Same as [`validate_row`] with an explicit date grammar.
pub fn validate_row_with(
    row: &RawRecord,
    index: usize,
    grammar: &DateGrammar,
) -> (Option<ValidatedRecord>, Vec<ValidationError>) {
    let row_num = index + 2;
    let mut errors = Vec::new();

    // Date
    let date_str = row.get(DATE_COLUMN).unwrap_or("").trim();
    let date = if date_str.is_empty() {
        errors.push(ValidationError::MissingDate { row: row_num });
        None
    } else {
        let parsed = grammar.parse(date_str);
        if parsed.is_none() {
            errors.push(ValidationError::InvalidDate {
                row: row_num,
                raw: date_str.to_string(),
            });
        }
        parsed
    };

    // Person
    let person = row.get(PERSON_COLUMN).unwrap_or("").trim();
    if person.is_empty() {
        errors.push(ValidationError::MissingPerson { row: row_num });
    }

    // Miles - a literal "0" is present, not missing
    let miles_str = row.get(MILES_COLUMN).unwrap_or("").trim();
    let miles = if miles_str.is_empty() && miles_str != "0" {
        errors.push(ValidationError::MissingMiles { row: row_num });
        None
    } else {
        let parsed = parse_miles(miles_str);
        if parsed.is_none() {
            errors.push(ValidationError::InvalidMiles {
                row: row_num,
                raw: miles_str.to_string(),
            });
        }
        parsed
    };

    match (date, miles) {
        (Some(date), Some(miles)) if errors.is_empty() => {
            (Some(ValidatedRecord::new(date, person, miles)), errors)
        }
        _ => (None, errors),
    }
}

/// Finite, non-negative decimal. `-0` is normalized to `0`.
fn parse_miles(input: &str) -> Option<f64> {
    let value: f64 = input.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(value + 0.0)
}
