// Error types for the upload pipeline and session state

use serde::{Serialize, Serializer};

// ============================================================================
// VALIDATION ERRORS
// ============================================================================

/// Which stage of the pipeline rejected the upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Required columns are absent (fatal, reported once)
    Header,
    /// A field in one data row failed its rule
    Row,
    /// The CSV could not be read or tokenized (fatal)
    Tokenizer,
}

/// A single problem found while validating an uploaded CSV.
///
/// `Display` renders the exact message shown to the user, so callers that
/// only need strings can call `to_string()`; callers that need to branch
/// on the failure use `kind()` instead of matching on text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required headers: {}", .missing.join(", "))]
    MissingHeaders { missing: Vec<String> },

    #[error("Row {row}: Date is missing")]
    MissingDate { row: usize },

    #[error("Row {row}: Invalid date format '{raw}'")]
    InvalidDate { row: usize, raw: String },

    #[error("Row {row}: Person name is missing")]
    MissingPerson { row: usize },

    #[error("Row {row}: Miles run is missing")]
    MissingMiles { row: usize },

    #[error("Row {row}: Invalid miles value '{raw}'. Must be a non-negative number.")]
    InvalidMiles { row: usize, raw: String },

    #[error("{message}")]
    Tokenizer { message: String },
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::MissingHeaders { .. } => ErrorKind::Header,
            ValidationError::MissingDate { .. }
            | ValidationError::InvalidDate { .. }
            | ValidationError::MissingPerson { .. }
            | ValidationError::MissingMiles { .. }
            | ValidationError::InvalidMiles { .. } => ErrorKind::Row,
            ValidationError::Tokenizer { .. } => ErrorKind::Tokenizer,
        }
    }

    /// Display row number (1-based, header counted) for row errors
    pub fn row(&self) -> Option<usize> {
        match self {
            ValidationError::MissingDate { row }
            | ValidationError::InvalidDate { row, .. }
            | ValidationError::MissingPerson { row }
            | ValidationError::MissingMiles { row }
            | ValidationError::InvalidMiles { row, .. } => Some(*row),
            _ => None,
        }
    }

    pub fn tokenizer(message: impl Into<String>) -> Self {
        ValidationError::Tokenizer {
            message: message.into(),
        }
    }
}

// Serialized as the display message; the presentation layer only ever shows text
impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

// ============================================================================
// SESSION ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Unknown person: {0}")]
    UnknownPerson(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_headers_message() {
        let err = ValidationError::MissingHeaders {
            missing: vec!["person".to_string(), "miles run".to_string()],
        };
        assert_eq!(err.to_string(), "Missing required headers: person, miles run");
        assert_eq!(err.kind(), ErrorKind::Header);
        assert_eq!(err.row(), None);
    }

    #[test]
    fn test_invalid_miles_message() {
        let err = ValidationError::InvalidMiles {
            row: 2,
            raw: "-2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Row 2: Invalid miles value '-2'. Must be a non-negative number."
        );
        assert_eq!(err.kind(), ErrorKind::Row);
        assert_eq!(err.row(), Some(2));
    }

    #[test]
    fn test_tokenizer_message_passthrough() {
        let err = ValidationError::tokenizer("stream did not contain valid UTF-8");
        assert_eq!(err.to_string(), "stream did not contain valid UTF-8");
        assert_eq!(err.kind(), ErrorKind::Tokenizer);
    }

    #[test]
    fn test_serializes_as_message() {
        let err = ValidationError::MissingDate { row: 5 };
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Row 5: Date is missing\"");
    }
}
