// Runner Analytics - Core Library
// CSV upload validation, run metrics and dashboard state for the CLI and tests

pub mod config;
pub mod dates;
pub mod error;
pub mod metrics;
pub mod parser;
pub mod record;
pub mod report;
pub mod series;
pub mod session;
pub mod validators;

// Re-export commonly used types
pub use config::{load_config, Config, OutputFormat};
pub use dates::{DateGrammar, DEFAULT_DATE_FORMATS};
pub use error::{ErrorKind, SessionError, ValidationError};
pub use metrics::{aggregate, aggregate_by_person, AggregateMetrics, PersonMetrics};
pub use parser::{parse, parse_path, parse_str, CsvPipeline};
pub use record::{RawRecord, ValidatedRecord, ValidationOutcome};
pub use report::{Report, SelectedPerson};
pub use series::{
    daily_totals, people, person_timeline, person_totals, runner_comparison, weekly_trend,
    DailyTotal, PersonTotal, TimelinePoint, WeeklyTotal,
};
pub use session::{upload, Session, UploadTicket};
pub use validators::{validate_headers, validate_row, validate_row_with, REQUIRED_HEADERS};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
