use super::*;
use async_trait::async_trait;
use shared::domain::{QUESTION_CATALOG, QUESTION_PLACEHOLDER};
use std::sync::atomic::{AtomicUsize, Ordering};

struct ScriptedBackend {
    outcome: Result<EvaluationResult, EvaluationError>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    fn ok(json: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(serde_json::from_str(json).expect("json")),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(err: EvaluationError) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(err),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EvaluationBackend for ScriptedBackend {
    async fn evaluate(&self, _submission: &Submission) -> Result<EvaluationResult, EvaluationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

fn question() -> &'static str {
    QUESTION_CATALOG[2]
}

#[test]
fn validation_rejects_placeholder_unknown_question_and_empty_answer() {
    assert_eq!(
        validate_submission(QUESTION_PLACEHOLDER, "answer"),
        Err(EvaluationError::Validation)
    );
    assert_eq!(
        validate_submission("not in the catalog", "answer"),
        Err(EvaluationError::Validation)
    );
    assert_eq!(
        validate_submission(question(), ""),
        Err(EvaluationError::Validation)
    );
    let submission = validate_submission(question(), " ").expect("whitespace is an answer");
    assert_eq!(submission.answer, " ");
}

#[test]
fn render_without_result_shows_nothing() {
    assert!(render(None).is_none());
    let panels = render(Some(&EvaluationResult::default())).expect("panels");
    assert_eq!(panels.score, "0");
}

#[tokio::test]
async fn successful_submission_stores_result_and_clears_flag() {
    let backend = ScriptedBackend::ok(r#"{"score":85,"reason":"Clear","improvement":"Add examples"}"#);
    let controller = SubmissionController::new(backend.clone());
    let session = Mutex::new(SessionState::new());

    let result = controller
        .submit(&session, question(), "I value honesty")
        .await
        .expect("result");
    assert_eq!(result.panels().score, "85");

    let state = session.lock().await;
    assert!(!state.is_in_flight());
    let panels = state.panels().expect("stored result");
    assert_eq!(panels.reason, "Clear");
    assert_eq!(panels.improvement, "Add examples");
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn invalid_input_never_reaches_backend_and_clears_previous_result() {
    let backend = ScriptedBackend::ok(r#"{"score":1}"#);
    let controller = SubmissionController::new(backend.clone());
    let session = Mutex::new(SessionState::new());
    controller
        .submit(&session, question(), "first")
        .await
        .expect("first");
    assert_eq!(backend.calls(), 1);

    let err = controller
        .submit(&session, QUESTION_PLACEHOLDER, "second")
        .await
        .expect_err("placeholder");
    assert_eq!(err, EvaluationError::Validation);

    let err = controller
        .submit(&session, question(), "")
        .await
        .expect_err("empty answer");
    assert_eq!(err, EvaluationError::Validation);

    assert_eq!(backend.calls(), 1);
    let state = session.lock().await;
    assert!(!state.is_in_flight());
    assert!(state.last_result().is_none());
}

#[tokio::test]
async fn backend_failure_clears_result_slot_and_flag() {
    let backend = ScriptedBackend::failing(EvaluationError::MalformedResponse {
        body: "not json".into(),
    });
    let controller = SubmissionController::new(backend.clone());
    let session = Mutex::new(SessionState::new());
    session
        .lock()
        .await
        .complete(&Ok(EvaluationResult::default()));

    let err = controller
        .submit(&session, question(), "answer")
        .await
        .expect_err("malformed");
    assert!(matches!(err, EvaluationError::MalformedResponse { .. }));

    let state = session.lock().await;
    assert!(!state.is_in_flight());
    assert!(state.last_result().is_none());
}

#[tokio::test]
async fn activation_is_refused_while_in_flight() {
    let controller = SubmissionController::new(ScriptedBackend::ok("{}"));
    let mut state = SessionState::new();
    controller.activate(&mut state).expect("first activation");
    assert!(state.is_in_flight());
    assert_eq!(
        controller.activate(&mut state),
        Err(EvaluationError::Busy)
    );
}

#[tokio::test]
async fn processing_an_idle_session_is_a_no_op() {
    let backend = ScriptedBackend::ok("{}");
    let controller = SubmissionController::new(backend.clone());
    let session = Mutex::new(SessionState::new());

    let outcome = controller
        .process_pending_submission(&session, question(), "answer")
        .await;
    assert!(outcome.is_none());
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn every_outcome_leaves_the_flag_cleared() {
    let outcomes = [
        EvaluationError::EndpointNotFound {
            endpoint: "http://h/evaluate".into(),
        },
        EvaluationError::ServerInternal { body: "boom".into() },
        EvaluationError::UnexpectedStatus {
            status: 418,
            body: "teapot".into(),
        },
        EvaluationError::Connection {
            endpoint: "http://h/evaluate".into(),
            detail: "refused".into(),
        },
        EvaluationError::Timeout {
            endpoint: "http://h/evaluate".into(),
            timeout_secs: 600,
        },
        EvaluationError::Unclassified {
            kind: "builder".into(),
            message: "bad url".into(),
        },
    ];

    for err in outcomes {
        let controller = SubmissionController::new(ScriptedBackend::failing(err.clone()));
        let session = Mutex::new(SessionState::new());
        let got = controller
            .submit(&session, question(), "answer")
            .await
            .expect_err("failure");
        assert_eq!(got, err);
        assert!(!session.lock().await.is_in_flight());
    }
}
