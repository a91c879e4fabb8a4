//! Simulation session - the selected file, mapping, and latest result.
//!
//! # Lifecycle
//!
//! ```text
//! select_file ──► submit ──► loading ──┬─► result (view reset to table)
//!      ▲                               └─► error  (prior result kept)
//!      └── clears result and error
//! ```
//!
//! `loading` is set for exactly the duration of a request. It is cleared on
//! success, on failure, and if the backend panics.

use std::path::Path;

use dsim_client::{ApiClient, ClientError};
use dsim_ingest::{IngestError, UploadedFile};
use dsim_model::{MappingConfig, Payload, PredictionRow, SimulationResult};
use tracing::{debug, info, warn};

use crate::filter::SearchFilter;
use crate::view::{ActiveView, ViewData};

/// Something that can run a simulation.
pub trait SimulationBackend {
    /// Sends the file and mapping text; returns the raw response tree.
    fn simulate(&self, file: &UploadedFile, mapping: &str) -> Result<Payload, ClientError>;
}

impl SimulationBackend for ApiClient {
    fn simulate(&self, file: &UploadedFile, mapping: &str) -> Result<Payload, ClientError> {
        ApiClient::simulate(self, file.name(), file.bytes(), mapping)
    }
}

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No file selected; nothing was sent.
    NoFile,
    /// A submission is already in flight; nothing was sent.
    Busy,
    /// A new result replaced the old one.
    Succeeded,
    /// The request failed with this user-facing message.
    Failed { message: String },
}

/// A submission that has started but not finished.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub file: UploadedFile,
    pub mapping: String,
}

/// Owned state of one simulator workspace.
#[derive(Debug, Default)]
pub struct Session {
    file: Option<UploadedFile>,
    mapping: MappingConfig,
    result: Option<SimulationResult>,
    error: Option<String>,
    loading: bool,
    view: ActiveView,
    filter: SearchFilter,
    /// Bumped whenever `result` changes.
    generation: u64,
}

/// Clears `loading` when dropped, including during unwinding.
struct LoadingGuard<'a> {
    session: &'a mut Session,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.session.loading = false;
    }
}

impl Session {
    pub fn new(mapping: MappingConfig) -> Self {
        Self {
            mapping,
            ..Self::default()
        }
    }

    // === File Intake ===

    /// Makes `file` current, discarding any result and error.
    pub fn select_file(&mut self, file: UploadedFile) {
        info!(file = file.name(), bytes = file.len(), "File selected");
        self.file = Some(file);
        self.error = None;
        self.set_result(None);
    }

    /// Validates and selects a file from disk.
    ///
    /// On rejection the session is left unchanged.
    pub fn select_path(&mut self, path: &Path) -> Result<(), IngestError> {
        let file = UploadedFile::open(path)?;
        self.select_file(file);
        Ok(())
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        self.file.as_ref()
    }

    // === Mapping ===

    pub fn mapping(&self) -> &MappingConfig {
        &self.mapping
    }

    /// Replaces the mapping text. It is not validated.
    pub fn set_mapping_text(&mut self, text: impl Into<String>) {
        self.mapping.set_text(text);
    }

    // === Submission ===

    /// Submits the current file and mapping through `backend`.
    pub fn submit(&mut self, backend: &dyn SimulationBackend) -> SubmitOutcome {
        let pending = match self.begin_submit() {
            Ok(pending) => pending,
            Err(outcome) => return outcome,
        };

        let guard = LoadingGuard { session: self };
        let response = backend.simulate(&pending.file, &pending.mapping);
        guard.session.finish_submit(response)
    }

    /// Enters the loading state and returns what to send.
    ///
    /// Fails with [`SubmitOutcome::NoFile`] or [`SubmitOutcome::Busy`]
    /// without touching any state.
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, SubmitOutcome> {
        let Some(file) = self.file.as_ref() else {
            debug!("Submit ignored: no file selected");
            return Err(SubmitOutcome::NoFile);
        };
        if self.loading {
            warn!("Submit ignored: a submission is already in flight");
            return Err(SubmitOutcome::Busy);
        }

        let pending = PendingSubmission {
            file: file.clone(),
            mapping: self.mapping.text().to_string(),
        };
        self.loading = true;
        self.error = None;
        Ok(pending)
    }

    /// Applies a backend response and leaves the loading state.
    pub fn finish_submit(&mut self, response: Result<Payload, ClientError>) -> SubmitOutcome {
        self.loading = false;
        match response {
            Ok(payload) => {
                let result = SimulationResult::from_payload(payload);
                info!(
                    predictions = result.predictions.len(),
                    anomalies = result.anomalies_map.len(),
                    clusters = result.clusters_map.len(),
                    "Simulation succeeded"
                );
                self.set_result(Some(result));
                self.view = ActiveView::Table;
                SubmitOutcome::Succeeded
            }
            Err(err) => {
                warn!(error = %err, "Simulation failed");
                let message = err.user_message().to_string();
                self.error = Some(message.clone());
                SubmitOutcome::Failed { message }
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    // === Result & Error ===

    pub fn result(&self) -> Option<&SimulationResult> {
        self.result.as_ref()
    }

    /// Error banner text, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Hides the error banner.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Increments whenever the result is replaced or cleared.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn set_result(&mut self, result: Option<SimulationResult>) {
        self.result = result;
        self.generation += 1;
    }

    // === Presentation ===

    pub fn view(&self) -> ActiveView {
        self.view
    }

    /// Selects a view. Nothing else changes.
    pub fn set_view(&mut self, view: ActiveView) {
        self.view = view;
    }

    /// Data for the selected view.
    pub fn view_data(&self) -> ViewData<'_> {
        ViewData::select(self.view, self.result.as_ref())
    }

    pub fn search_term(&self) -> &str {
        self.filter.term()
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.filter.set_term(term);
    }

    /// Predictions matching the search term, in result order.
    pub fn filtered_predictions(&mut self) -> Vec<&PredictionRow> {
        let rows = self
            .result
            .as_ref()
            .map(|result| result.predictions.as_slice())
            .unwrap_or_default();
        self.filter.apply(self.generation, rows)
    }

    /// The search filter, for inspecting memo reuse.
    pub fn filter(&self) -> &SearchFilter {
        &self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv(name: &str) -> UploadedFile {
        UploadedFile::from_bytes(name, b"district,state\n".to_vec()).unwrap()
    }

    #[test]
    fn test_begin_submit_requires_file() {
        let mut session = Session::default();
        assert_eq!(session.begin_submit().unwrap_err(), SubmitOutcome::NoFile);
        assert!(!session.is_loading());
    }

    #[test]
    fn test_second_begin_is_busy() {
        let mut session = Session::default();
        session.select_file(csv("a.csv"));

        let pending = session.begin_submit().unwrap();
        assert_eq!(pending.file.name(), "a.csv");
        assert_eq!(pending.mapping, MappingConfig::default().text());
        assert!(session.is_loading());
        assert_eq!(session.begin_submit().unwrap_err(), SubmitOutcome::Busy);

        session.finish_submit(Err(ClientError::Network("refused".to_string())));
        assert!(!session.is_loading());
        assert_eq!(session.error(), Some("Server connection failed."));
    }

    #[test]
    fn test_begin_clears_error() {
        let mut session = Session::default();
        session.select_file(csv("a.csv"));
        session.begin_submit().unwrap();
        session.finish_submit(Err(ClientError::from_response(500, r#"{"error":"x"}"#)));
        assert_eq!(session.error(), Some("x"));

        session.begin_submit().unwrap();
        assert_eq!(session.error(), None);
    }

    #[test]
    fn test_dismiss_error() {
        let mut session = Session::default();
        session.select_file(csv("a.csv"));
        session.begin_submit().unwrap();
        session.finish_submit(Err(ClientError::Network("x".to_string())));
        session.dismiss_error();
        assert_eq!(session.error(), None);
    }
}
