//! Session lifecycle tests against scripted backends.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fs;
use std::panic::{AssertUnwindSafe, catch_unwind};

use dsim_client::{ClientError, GENERIC_FAILURE};
use dsim_core::{
    ActiveView, Session, SimulationBackend, SubmitOutcome, ViewData, filter_predictions,
};
use dsim_ingest::UploadedFile;
use dsim_model::{Payload, PredictionRow, Report};
use proptest::prelude::*;
use tempfile::TempDir;

const RESULT_BODY: &str = r#"{
    "predictions": [
        {"district": "Pune", "state": "MH", "success_probability": NaN, "performance_label": "Low", "anomaly_status": "none"},
        {"district": "Agra", "state": "UP", "success_probability": 81.0, "performance_label": "High", "anomaly_status": "none"},
        {"district": "Nagpur", "state": "MH", "success_probability": 40.5, "performance_label": "Low", "anomaly_status": "Alert"}
    ],
    "anomalies_map": [],
    "clusters_map": [],
    "report": "Summary line.\nDetail line."
}"#;

/// Backend that replays canned responses and records every call.
#[derive(Default)]
struct Scripted {
    responses: RefCell<VecDeque<Result<Payload, ClientError>>>,
    calls: RefCell<Vec<(String, Vec<u8>, String)>>,
}

impl Scripted {
    fn new(responses: Vec<Result<Payload, ClientError>>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            ..Self::default()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl SimulationBackend for Scripted {
    fn simulate(&self, file: &UploadedFile, mapping: &str) -> Result<Payload, ClientError> {
        self.calls.borrow_mut().push((
            file.name().to_string(),
            file.bytes().to_vec(),
            mapping.to_string(),
        ));
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Network("no scripted response".to_string())))
    }
}

fn ok_result() -> Result<Payload, ClientError> {
    Ok(Payload::parse(RESULT_BODY).unwrap())
}

fn csv(name: &str) -> UploadedFile {
    UploadedFile::from_bytes(name, b"district,state\nPune,MH\n".to_vec()).unwrap()
}

fn session_with_result() -> Session {
    let mut session = Session::default();
    session.select_file(csv("districts.csv"));
    let backend = Scripted::new(vec![ok_result()]);
    assert_eq!(session.submit(&backend), SubmitOutcome::Succeeded);
    session
}

#[test]
fn end_to_end_nan_is_sanitized_and_report_split() {
    let mut session = Session::default();
    session.select_file(csv("districts.csv"));
    session.set_mapping_text(r#"{"labor": "labor_score"}"#);
    let backend = Scripted::new(vec![ok_result()]);

    assert_eq!(session.submit(&backend), SubmitOutcome::Succeeded);
    assert!(!session.is_loading());
    assert_eq!(session.error(), None);

    let calls = backend.calls.borrow();
    assert_eq!(calls[0].0, "districts.csv");
    assert_eq!(calls[0].1, b"district,state\nPune,MH\n");
    assert_eq!(calls[0].2, r#"{"labor": "labor_score"}"#);

    let result = session.result().unwrap();
    assert_eq!(result.predictions[0].success_probability, Some(0.0));
    assert_eq!(
        result.report.paragraphs(),
        vec!["Summary line.", "Detail line."]
    );
}

#[test]
fn submit_without_file_sends_nothing() {
    let mut session = Session::default();
    let backend = Scripted::new(vec![ok_result()]);
    assert_eq!(session.submit(&backend), SubmitOutcome::NoFile);
    assert_eq!(backend.call_count(), 0);
    assert!(!session.is_loading());
}

#[test]
fn successful_submit_resets_view_to_table() {
    let mut session = session_with_result();
    session.set_view(ActiveView::Report);

    let backend = Scripted::new(vec![ok_result()]);
    assert_eq!(session.submit(&backend), SubmitOutcome::Succeeded);
    assert_eq!(session.view(), ActiveView::Table);
}

#[test]
fn failed_submit_keeps_view_and_prior_result() {
    let mut session = session_with_result();
    session.set_view(ActiveView::Anomaly);
    let before = session.result().cloned();

    let backend = Scripted::new(vec![Err(ClientError::from_response(
        500,
        r#"{"error":"bad mapping"}"#,
    ))]);
    let outcome = session.submit(&backend);

    assert_eq!(
        outcome,
        SubmitOutcome::Failed {
            message: "bad mapping".to_string()
        }
    );
    assert_eq!(session.error(), Some("bad mapping"));
    assert!(!session.is_loading());
    assert_eq!(session.result().cloned(), before);
    assert_eq!(session.view(), ActiveView::Anomaly);
}

#[test]
fn unparsable_error_body_shows_generic_message() {
    let mut session = Session::default();
    session.select_file(csv("districts.csv"));
    let backend = Scripted::new(vec![Err(ClientError::from_response(502, "Bad Gateway"))]);

    session.submit(&backend);
    assert_eq!(session.error(), Some(GENERIC_FAILURE));
    assert!(!session.is_loading());

    session.dismiss_error();
    assert_eq!(session.error(), None);
}

#[test]
fn loading_is_cleared_when_backend_panics() {
    struct Exploding;
    impl SimulationBackend for Exploding {
        fn simulate(&self, _: &UploadedFile, _: &str) -> Result<Payload, ClientError> {
            panic!("backend exploded");
        }
    }

    let mut session = Session::default();
    session.select_file(csv("districts.csv"));
    let outcome = catch_unwind(AssertUnwindSafe(|| session.submit(&Exploding)));

    assert!(outcome.is_err());
    assert!(!session.is_loading());
}

#[test]
fn rejected_file_leaves_state_unchanged() {
    let dir = TempDir::new().unwrap();
    let txt = dir.path().join("data.txt");
    fs::write(&txt, "district,state\n").unwrap();

    let mut session = session_with_result();
    let generation = session.generation();

    assert!(session.select_path(&txt).is_err());
    assert_eq!(session.file().unwrap().name(), "districts.csv");
    assert!(session.result().is_some());
    assert_eq!(session.generation(), generation);
}

#[test]
fn accepted_file_clears_result_and_error() {
    let dir = TempDir::new().unwrap();
    let upper = dir.path().join("data.CSV");
    fs::write(&upper, "district,state\n").unwrap();

    let mut session = session_with_result();
    let backend = Scripted::new(vec![Err(ClientError::Network("down".to_string()))]);
    session.submit(&backend);
    assert!(session.error().is_some());

    session.select_path(&upper).unwrap();
    assert_eq!(session.file().unwrap().name(), "data.CSV");
    assert!(session.result().is_none());
    assert_eq!(session.error(), None);
    assert!(session.filtered_predictions().is_empty());
}

#[test]
fn view_switches_never_call_the_backend() {
    let mut session = Session::default();
    session.select_file(csv("districts.csv"));
    let backend = Scripted::new(vec![ok_result()]);
    assert_eq!(session.submit(&backend), SubmitOutcome::Succeeded);
    assert_eq!(backend.call_count(), 1);

    let generation = session.generation();
    let result = session.result().cloned();
    for view in ActiveView::ALL {
        session.set_view(view);
        let _ = session.view_data();
    }

    assert_eq!(backend.call_count(), 1);
    assert_eq!(session.generation(), generation);
    assert_eq!(session.result().cloned(), result);
    session.set_view(ActiveView::Report);
    assert!(matches!(
        session.view_data(),
        ViewData::Report {
            report: Report::Narrative(_),
            ..
        }
    ));
}

#[test]
fn search_selects_matching_rows_in_order() {
    let mut session = session_with_result();

    session.set_search_term("pu");
    let names: Vec<String> = session
        .filtered_predictions()
        .iter()
        .map(|row| row.district.clone())
        .collect();
    assert_eq!(names, vec!["Pune", "Nagpur"]);

    session.set_search_term("");
    let names: Vec<String> = session
        .filtered_predictions()
        .iter()
        .map(|row| row.district.clone())
        .collect();
    assert_eq!(names, vec!["Pune", "Agra", "Nagpur"]);
}

#[test]
fn search_is_memoized_per_result_and_term() {
    let mut session = session_with_result();
    session.set_search_term("agra");

    assert_eq!(session.filtered_predictions().len(), 1);
    assert_eq!(session.filtered_predictions().len(), 1);
    assert_eq!(session.filter().recomputations(), 1);

    let backend = Scripted::new(vec![Ok(Payload::parse(
        r#"{"predictions": [{"district": "Agra"}, {"district": "Agartala"}]}"#,
    )
    .unwrap())]);
    session.submit(&backend);
    assert_eq!(session.filtered_predictions().len(), 1);
    assert_eq!(session.filter().recomputations(), 2);

    session.set_search_term("ag");
    assert_eq!(session.filtered_predictions().len(), 2);
    assert_eq!(session.filter().recomputations(), 3);
}

#[test]
fn submitted_bytes_are_the_validated_bytes() {
    let calls = Cell::new(0);
    struct Counting<'a>(&'a Cell<usize>);
    impl SimulationBackend for Counting<'_> {
        fn simulate(&self, file: &UploadedFile, _: &str) -> Result<Payload, ClientError> {
            self.0.set(self.0.get() + 1);
            assert_eq!(file.bytes(), b"district,state\nPune,MH\n");
            Ok(Payload::Object(Vec::new()))
        }
    }

    let mut session = Session::default();
    session.select_file(csv("districts.csv"));
    assert_eq!(session.submit(&Counting(&calls)), SubmitOutcome::Succeeded);
    assert_eq!(calls.get(), 1);
    assert!(session.view_data().is_empty());
}

fn arb_rows() -> impl Strategy<Value = Vec<PredictionRow>> {
    prop::collection::vec(("[a-cA-C]{0,4}", "[a-cA-C]{0,3}"), 0..12).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(district, state)| PredictionRow {
                district,
                state,
                ..PredictionRow::default()
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn filter_is_an_ordered_selection_of_matches(rows in arb_rows(), term in "[a-cA-C]{0,2}") {
        let selected = filter_predictions(&rows, &term);
        let needle = term.to_lowercase();

        let expected: Vec<&PredictionRow> = rows
            .iter()
            .filter(|row| {
                row.district.to_lowercase().contains(&needle)
                    || row.state.to_lowercase().contains(&needle)
            })
            .collect();
        prop_assert_eq!(&selected, &expected);

        if term.is_empty() {
            prop_assert_eq!(selected.len(), rows.len());
        }
    }
}
