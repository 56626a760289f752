// Date grammar - the explicit set of date spellings a run log may use

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Formats tried after RFC 3339, in order. Each is attempted as a plain
/// date and then as a date-time whose time part is dropped.
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// DateGrammar - turns trimmed cell text into a calendar date.
///
/// Parsing is locale-independent and never consults the local timezone:
/// RFC 3339 timestamps keep the date in their own offset, everything else
/// is read as a naive calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateGrammar {
    formats: Vec<String>,
}

impl Default for DateGrammar {
    fn default() -> Self {
        DateGrammar {
            formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl DateGrammar {
    /// Custom grammar; an empty list falls back to the defaults
    pub fn new(formats: Vec<String>) -> Self {
        if formats.is_empty() {
            return Self::default();
        }
        DateGrammar { formats }
    }

    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    pub fn parse(&self, input: &str) -> Option<NaiveDate> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Some(dt.date_naive());
        }

        self.formats.iter().find_map(|format| {
            NaiveDate::parse_from_str(input, format)
                .ok()
                .or_else(|| {
                    NaiveDateTime::parse_from_str(input, format)
                        .ok()
                        .map(|dt| dt.date())
                })
        })
    }
}
