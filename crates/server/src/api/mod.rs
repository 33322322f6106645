use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use evaluator_client::SessionState;
use maud::Markup;
use serde::Deserialize;
use shared::{
    domain::{EvaluationResult, Submission},
    error::{ApiError, EvaluationError},
    notice::Banner,
    protocol::{question_entries, EvaluateResponse, QuestionEntry},
};
use tokio::sync::Mutex;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info};

use crate::{
    app_state::AppState,
    render::{render_page, PageView},
    sessions::{session_cookie, session_id_from_headers, ResolvedSession},
};

const MAX_BODY_BYTES: usize = 256 * 1024;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SubmitForm {
    #[serde(default)]
    question: String,
    #[serde(default)]
    answer: String,
}

pub(crate) fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/submit", post(submit))
        .route("/healthz", get(healthz))
        .route("/api/questions", get(api_questions))
        .route("/api/evaluate", post(api_evaluate))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let session = state
        .sessions
        .resolve(session_id_from_headers(&headers))
        .await;
    let (busy, panels) = {
        let current = session.state.lock().await;
        (current.is_in_flight(), current.panels())
    };

    let page = render_page(&PageView {
        busy,
        panels: panels.as_ref(),
        backend_caption: state.backend_caption.as_deref(),
        ..PageView::default()
    });
    page_response(&session, page)
}

async fn submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<SubmitForm>,
) -> Response {
    let session = state
        .sessions
        .resolve(session_id_from_headers(&headers))
        .await;

    let outcome = run_submission(&state, &session, &form).await;
    match &outcome {
        Ok(_) => info!(session_id = %session.id, "submission completed"),
        Err(err) => info!(session_id = %session.id, code = ?err.code(), "submission failed"),
    }

    // The flag is already cleared here unless another request still owns the cycle, in which
    // case the page renders busy and reloads `/` until that cycle ends.
    let banner = outcome.as_ref().err().map(Banner::from);
    let (busy, panels) = {
        let current = session.state.lock().await;
        (current.is_in_flight(), current.panels())
    };

    let page = render_page(&PageView {
        selected_question: &form.question,
        answer: &form.answer,
        busy,
        banner: banner.as_ref(),
        panels: panels.as_ref(),
        backend_caption: state.backend_caption.as_deref(),
    });
    page_response(&session, page)
}

/// Detached from the request so a dropped connection still finishes the cycle.
async fn run_submission(
    state: &AppState,
    session: &ResolvedSession,
    form: &SubmitForm,
) -> Result<EvaluationResult, EvaluationError> {
    let controller = state.controller.clone();
    let handle = session.state.clone();
    let question = form.question.clone();
    let answer = form.answer.clone();

    let task =
        tokio::spawn(async move { controller.submit(&handle, &question, &answer).await });
    match task.await {
        Ok(outcome) => outcome,
        Err(join_error) => {
            error!(session_id = %session.id, error = %join_error, "submission task aborted");
            session.state.lock().await.reset();
            Err(EvaluationError::Unclassified {
                kind: "task".to_string(),
                message: join_error.to_string(),
            })
        }
    }
}

fn page_response(session: &ResolvedSession, page: Markup) -> Response {
    let mut response = page.into_response();
    if session.created {
        if let Ok(value) = HeaderValue::from_str(&session_cookie(session.id)) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

async fn api_questions() -> Json<Vec<QuestionEntry>> {
    Json(question_entries())
}

async fn api_evaluate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<Submission>,
) -> Result<Json<EvaluateResponse>, (StatusCode, Json<ApiError>)> {
    let session = Mutex::new(SessionState::new());
    state
        .controller
        .submit(&session, &req.question, &req.answer)
        .await
        .map(|result| Json(EvaluateResponse::from(result)))
        .map_err(|err| (status_for(&err), Json(ApiError::from(&err))))
}

fn status_for(err: &EvaluationError) -> StatusCode {
    match err {
        EvaluationError::Validation => StatusCode::BAD_REQUEST,
        EvaluationError::Busy => StatusCode::CONFLICT,
        EvaluationError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
