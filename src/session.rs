// Session - the dashboard's state, owned by the caller and passed in explicitly
//
// Holds the current dataset, the current error list and the selected
// person. A dataset is replaced wholesale by each upload and never
// mutated in place. Uploads are ticketed so a slow, superseded parse
// cannot overwrite the result of a newer one.

use crate::error::{SessionError, ValidationError};
use crate::metrics::{aggregate, aggregate_by_person, AggregateMetrics, PersonMetrics};
use crate::parser::CsvPipeline;
use crate::record::{ValidatedRecord, ValidationOutcome};
use crate::series::{self, TimelinePoint};
use tokio::io::AsyncRead;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Identifies one upload. Only the most recently issued ticket may
/// complete; older ones are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UploadTicket(u64);

impl UploadTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct Session {
    records: Vec<ValidatedRecord>,
    errors: Vec<ValidationError>,
    selected_person: Option<String>,
    processing: bool,
    latest_ticket: u64,

    // Derived from `records`, rebuilt whenever the dataset changes
    overall: AggregateMetrics,
    person_metrics: Vec<PersonMetrics>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // UPLOAD LIFECYCLE
    // ========================================================================

    /// Start a new upload. Clears the current dataset, errors and
    /// selection, and supersedes any upload still in flight.
    pub fn begin_upload(&mut self) -> UploadTicket {
        self.latest_ticket += 1;
        self.processing = true;
        self.selected_person = None;
        self.errors.clear();
        self.set_records(Vec::new());
        debug!(ticket = self.latest_ticket, "upload started");
        UploadTicket(self.latest_ticket)
    }

    /// Apply an upload's outcome. Returns false (and changes nothing) if a
    /// newer upload has started since `ticket` was issued.
    pub fn complete_upload(&mut self, ticket: UploadTicket, outcome: ValidationOutcome) -> bool {
        if ticket.0 != self.latest_ticket {
            warn!(
                ticket = ticket.0,
                latest = self.latest_ticket,
                "discarding stale upload result"
            );
            return false;
        }

        self.processing = false;
        if outcome.success {
            self.errors.clear();
            self.set_records(outcome.records);
        } else {
            self.errors = outcome.errors;
            self.set_records(Vec::new());
        }
        true
    }

    fn set_records(&mut self, records: Vec<ValidatedRecord>) {
        self.overall = aggregate(&records);
        self.person_metrics = aggregate_by_person(&records);
        self.records = records;
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    // ========================================================================
    // DATASET
    // ========================================================================

    pub fn records(&self) -> &[ValidatedRecord] {
        &self.records
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn has_data(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn overall_metrics(&self) -> AggregateMetrics {
        self.overall
    }

    /// Per-person metrics in first-seen order
    pub fn person_metrics(&self) -> &[PersonMetrics] {
        &self.person_metrics
    }

    /// Person names, alphabetical
    pub fn people(&self) -> Vec<String> {
        series::people(&self.person_metrics)
    }

    // ========================================================================
    // SELECTION
    // ========================================================================

    pub fn select_person(&mut self, person: &str) -> Result<(), SessionError> {
        if !self.person_metrics.iter().any(|pm| pm.person == person) {
            return Err(SessionError::UnknownPerson(person.to_string()));
        }
        self.selected_person = Some(person.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected_person = None;
    }

    pub fn selected_person(&self) -> Option<&str> {
        self.selected_person.as_deref()
    }

    pub fn selected_metrics(&self) -> Option<&PersonMetrics> {
        let person = self.selected_person.as_deref()?;
        self.person_metrics.iter().find(|pm| pm.person == person)
    }

    pub fn selected_timeline(&self) -> Vec<TimelinePoint> {
        match self.selected_person.as_deref() {
            Some(person) => series::person_timeline(&self.records, person),
            None => Vec::new(),
        }
    }
}

/// Run one upload against a shared session.
///
/// The lock is held only to begin and to complete; parsing happens
/// without it, so a second upload may start meanwhile and win. Returns
/// whether this upload's result was applied.
pub async fn upload<R>(session: &Mutex<Session>, pipeline: &CsvPipeline, reader: R) -> bool
where
    R: AsyncRead + Unpin,
{
    let ticket = session.lock().await.begin_upload();
    let outcome = pipeline.parse(reader).await;
    session.lock().await.complete_upload(ticket, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;
    use tokio::io::AsyncWriteExt;

    const GOOD: &str = "date,person,miles run\n\
                        2024-01-01,Dana,2\n\
                        2024-01-02,Dana,4\n\
                        2024-01-03,Alice,5.5\n";

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new();
        assert!(!session.has_data());
        assert!(!session.is_processing());
        assert_eq!(session.overall_metrics(), AggregateMetrics::default());
        assert!(session.people().is_empty());
    }

    #[test]
    fn test_successful_upload_populates_dataset() {
        let mut session = Session::new();
        let ticket = session.begin_upload();
        assert!(session.is_processing());

        assert!(session.complete_upload(ticket, parse_str(GOOD)));
        assert!(!session.is_processing());
        assert_eq!(session.records().len(), 3);
        assert!(session.errors().is_empty());
        assert_eq!(session.people(), vec!["Alice", "Dana"]);
        assert_eq!(session.overall_metrics().max, 5.5);
    }

    #[test]
    fn test_failed_upload_exposes_errors_only() {
        let mut session = Session::new();
        let ticket = session.begin_upload();
        session.complete_upload(ticket, parse_str("date,person\n"));

        assert!(!session.has_data());
        assert_eq!(session.messages(), vec!["Missing required headers: miles run"]);
        assert!(session.person_metrics().is_empty());
    }

    #[test]
    fn test_success_clears_previous_errors() {
        let mut session = Session::new();
        let bad = session.begin_upload();
        session.complete_upload(bad, parse_str("date,person,miles run\n,Bob,3\n"));
        assert_eq!(session.errors().len(), 1);

        let good = session.begin_upload();
        session.complete_upload(good, parse_str(GOOD));
        assert!(session.errors().is_empty());
        assert!(session.has_data());
    }

    #[test]
    fn test_begin_upload_resets_dataset_and_selection() {
        let mut session = Session::new();
        let ticket = session.begin_upload();
        session.complete_upload(ticket, parse_str(GOOD));
        session.select_person("Dana").unwrap();

        session.begin_upload();
        assert!(!session.has_data());
        assert_eq!(session.selected_person(), None);
        assert_eq!(session.overall_metrics(), AggregateMetrics::default());
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut session = Session::new();
        let first = session.begin_upload();
        let second = session.begin_upload();
        assert!(second > first);

        assert!(session.complete_upload(second, parse_str(GOOD)));
        let stale = parse_str("date,person,miles run\n2024-05-05,Zed,1\n");
        assert!(!session.complete_upload(first, stale));

        assert_eq!(session.records().len(), 3);
        assert!(!session.people().contains(&"Zed".to_string()));
    }

    #[test]
    fn test_select_person() {
        let mut session = Session::new();
        let ticket = session.begin_upload();
        session.complete_upload(ticket, parse_str(GOOD));

        session.select_person("Dana").unwrap();
        let metrics = session.selected_metrics().unwrap();
        assert_eq!(metrics.metrics.average, 3.0);
        assert_eq!(metrics.metrics.min, 2.0);
        assert_eq!(metrics.metrics.max, 4.0);
        assert_eq!(session.selected_timeline().len(), 2);

        session.clear_selection();
        assert!(session.selected_metrics().is_none());
        assert!(session.selected_timeline().is_empty());
    }

    #[test]
    fn test_select_unknown_person() {
        let mut session = Session::new();
        let ticket = session.begin_upload();
        session.complete_upload(ticket, parse_str(GOOD));

        let err = session.select_person("dana").unwrap_err();
        assert_eq!(err, SessionError::UnknownPerson("dana".to_string()));
        assert_eq!(session.selected_person(), None);
    }

    #[tokio::test]
    async fn test_upload_applies_result() {
        let session = Mutex::new(Session::new());
        let pipeline = CsvPipeline::new();

        assert!(upload(&session, &pipeline, GOOD.as_bytes()).await);
        assert_eq!(session.lock().await.records().len(), 3);
    }

    #[tokio::test]
    async fn test_slow_superseded_upload_does_not_overwrite() {
        let session = Mutex::new(Session::new());
        let pipeline = CsvPipeline::new();
        let (mut slow_tx, slow_rx) = tokio::io::duplex(1024);
        let (done_tx, done_rx) = tokio::sync::oneshot::channel::<()>();

        // First upload starts, then blocks waiting for input
        let first = upload(&session, &pipeline, slow_rx);

        // Second upload starts after it and finishes immediately
        let second = async {
            let applied = upload(&session, &pipeline, GOOD.as_bytes()).await;
            let _ = done_tx.send(());
            applied
        };

        // The first upload's input only arrives once the second is done
        let feeder = async move {
            let _ = done_rx.await;
            slow_tx
                .write_all(b"date,person,miles run\n2024-05-05,Zed,1\n")
                .await
                .unwrap();
            drop(slow_tx);
        };

        let (first_applied, second_applied, ()) = tokio::join!(first, second, feeder);

        assert!(!first_applied);
        assert!(second_applied);
        let session = session.lock().await;
        assert_eq!(session.people(), vec!["Alice", "Dana"]);
        assert!(!session.is_processing());
    }
}
