// CSV Pipeline - tokenize an uploaded run log, validate headers then rows
//
// The pipeline never returns Err: every failure (bad headers, bad rows,
// unreadable input) comes back as a rejected ValidationOutcome.

use crate::dates::DateGrammar;
use crate::error::ValidationError;
use crate::record::{RawRecord, ValidationOutcome};
use crate::validators::{validate_headers, validate_row_with};
use csv::{ReaderBuilder, Trim};
use std::io;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};
use tracing::{debug, info, warn};

// ============================================================================
// PIPELINE
// ============================================================================

/// CsvPipeline - drives the `csv` tokenizer and the validators.
///
/// Dialect: comma-delimited, first line is the header, header names are
/// trimmed, rows may be shorter or longer than the header, blank lines are
/// skipped.
#[derive(Debug, Clone, Default)]
pub struct CsvPipeline {
    grammar: DateGrammar,
}

impl CsvPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: use a specific date grammar
    pub fn with_grammar(mut self, grammar: DateGrammar) -> Self {
        self.grammar = grammar;
        self
    }

    pub fn grammar(&self) -> &DateGrammar {
        &self.grammar
    }

    /// Read the whole stream, then tokenize and validate it.
    /// Completes exactly once with the outcome of this upload.
    pub async fn parse<R>(&self, reader: R) -> ValidationOutcome
    where
        R: AsyncRead + Unpin,
    {
        let mut content = Vec::new();
        let mut reader = BufReader::new(reader);
        if let Err(e) = reader.read_to_end(&mut content).await {
            warn!(error = %e, "failed to read upload");
            return ValidationOutcome::rejected(vec![ValidationError::tokenizer(e.to_string())]);
        }
        debug!(bytes = content.len(), "upload read");
        self.parse_reader(content.as_slice())
    }

    /// Open a file and run it through [`CsvPipeline::parse`]
    pub async fn parse_path(&self, path: &Path) -> ValidationOutcome {
        match tokio::fs::File::open(path).await {
            Ok(file) => self.parse(file).await,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to open upload");
                ValidationOutcome::rejected(vec![ValidationError::tokenizer(format!(
                    "Failed to open file {}: {}",
                    path.display(),
                    e
                ))])
            }
        }
    }

    pub fn parse_str(&self, content: &str) -> ValidationOutcome {
        self.parse_reader(content.as_bytes())
    }

    /// Synchronous entry point over any `io::Read`
    pub fn parse_reader<R: io::Read>(&self, reader: R) -> ValidationOutcome {
        match self.tokenize_and_validate(reader) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "CSV tokenizer failed");
                ValidationOutcome::rejected(vec![ValidationError::tokenizer(e.to_string())])
            }
        }
    }

    fn tokenize_and_validate<R: io::Read>(&self, reader: R) -> Result<ValidationOutcome, csv::Error> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(b',')
            .trim(Trim::Headers)
            .flexible(true)
            .from_reader(reader);

        // 1. Headers - failure here is fatal and rows are never looked at
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        debug!(?headers, "CSV headers");

        let header_errors = validate_headers(&headers);
        if !header_errors.is_empty() {
            warn!(headers = ?headers, "upload rejected: missing required headers");
            return Ok(ValidationOutcome::rejected(header_errors));
        }

        // 2. Rows - collect every error, keep valid rows in file order
        let mut records = Vec::new();
        let mut errors = Vec::new();
        let mut index = 0;

        for result in reader.records() {
            let record = result?;
            if record.is_empty() {
                continue;
            }

            let raw = RawRecord::from_pairs(headers.iter().map(String::as_str).zip(record.iter()));
            let (validated, row_errors) = validate_row_with(&raw, index, &self.grammar);
            index += 1;

            if !row_errors.is_empty() {
                errors.extend(row_errors);
            } else if let Some(validated) = validated {
                records.push(validated);
            }
        }

        // 3. All-or-nothing
        if errors.is_empty() {
            info!(rows = records.len(), "upload accepted");
            Ok(ValidationOutcome::accepted(records))
        } else {
            warn!(rows = index, errors = errors.len(), "upload rejected: invalid rows");
            Ok(ValidationOutcome::rejected(errors))
        }
    }
}

// ============================================================================
// CONVENIENCE FUNCTIONS (default date grammar)
// ============================================================================

pub async fn parse<R>(reader: R) -> ValidationOutcome
where
    R: AsyncRead + Unpin,
{
    CsvPipeline::new().parse(reader).await
}

pub async fn parse_path(path: &Path) -> ValidationOutcome {
    CsvPipeline::new().parse_path(path).await
}

pub fn parse_str(content: &str) -> ValidationOutcome {
    CsvPipeline::new().parse_str(content)
}
