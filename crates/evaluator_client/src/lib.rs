use std::{error::Error as _, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::{
    domain::{EvaluationResult, Submission},
    error::EvaluationError,
    protocol::backend_evaluate_route,
};
use tracing::{info, warn};

mod controller;
mod session;

pub use controller::{render, validate_submission, SubmissionController};
pub use session::SessionState;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// Seam between the controller and whatever answers evaluation requests.
#[async_trait]
pub trait EvaluationBackend: Send + Sync {
    async fn evaluate(&self, submission: &Submission) -> Result<EvaluationResult, EvaluationError>;

    /// Human-readable target, used for captions and logs.
    fn describe(&self) -> String;
}

/// Strips every trailing slash from `base_url` and appends the evaluate route.
pub fn evaluate_endpoint(base_url: &str) -> String {
    format!(
        "{}{}",
        base_url.trim_end_matches('/'),
        backend_evaluate_route()
    )
}

pub struct HttpEvaluationBackend {
    http: Client,
    base_url: Option<String>,
    timeout: Duration,
}

impl HttpEvaluationBackend {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> Option<String> {
        self.base_url.as_deref().map(evaluate_endpoint)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl EvaluationBackend for HttpEvaluationBackend {
    async fn evaluate(&self, submission: &Submission) -> Result<EvaluationResult, EvaluationError> {
        let Some(endpoint) = self.endpoint() else {
            warn!("evaluation requested but no backend address is configured");
            return Err(EvaluationError::Unclassified {
                kind: "configuration".to_string(),
                message: "backend base address is not configured".to_string(),
            });
        };

        info!(
            %endpoint,
            answer_len = submission.answer.len(),
            "dispatching evaluation request"
        );
        let response = self
            .http
            .post(&endpoint)
            .timeout(self.timeout)
            .json(submission)
            .send()
            .await
            .map_err(|err| classify_transport_error(&endpoint, self.timeout, &err))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| classify_transport_error(&endpoint, self.timeout, &err))?;

        let outcome = classify_response(status, &body, &endpoint);
        match &outcome {
            Ok(_) => info!(%endpoint, status = status.as_u16(), "evaluation received"),
            Err(err) => warn!(
                %endpoint,
                status = status.as_u16(),
                code = ?err.code(),
                "evaluation backend answered with an error"
            ),
        }
        outcome
    }

    fn describe(&self) -> String {
        self.endpoint()
            .unwrap_or_else(|| "<backend address not configured>".to_string())
    }
}

/// Maps an HTTP status plus body onto the evaluation outcome. Only an exact 200 counts as
/// success, and only a body that is not JSON at all is malformed.
pub fn classify_response(
    status: StatusCode,
    body: &str,
    endpoint: &str,
) -> Result<EvaluationResult, EvaluationError> {
    match status {
        StatusCode::OK => {
            let document: serde_json::Value =
                serde_json::from_str(body).map_err(|_| EvaluationError::MalformedResponse {
                    body: body.to_string(),
                })?;
            if !document.is_object() {
                warn!(%endpoint, "evaluation body is not a JSON object, showing defaults");
            }
            Ok(EvaluationResult::from(document))
        }
        StatusCode::NOT_FOUND => Err(EvaluationError::EndpointNotFound {
            endpoint: endpoint.to_string(),
        }),
        StatusCode::INTERNAL_SERVER_ERROR => Err(EvaluationError::ServerInternal {
            body: body.to_string(),
        }),
        other => Err(EvaluationError::UnexpectedStatus {
            status: other.as_u16(),
            body: body.to_string(),
        }),
    }
}

/// Timeouts win over connection failures: a connect attempt that runs out the clock is
/// reported as a timeout.
pub fn classify_transport_error(
    endpoint: &str,
    timeout: Duration,
    err: &reqwest::Error,
) -> EvaluationError {
    if err.is_timeout() {
        warn!(%endpoint, timeout_secs = timeout.as_secs(), "evaluation request timed out");
        return EvaluationError::Timeout {
            endpoint: endpoint.to_string(),
            timeout_secs: timeout.as_secs(),
        };
    }
    if err.is_connect() {
        warn!(%endpoint, error = %err, "cannot connect to evaluation backend");
        return EvaluationError::Connection {
            endpoint: endpoint.to_string(),
            detail: error_chain(err),
        };
    }

    let kind = if err.is_builder() {
        "builder"
    } else if err.is_redirect() {
        "redirect"
    } else if err.is_body() {
        "body"
    } else if err.is_decode() {
        "decode"
    } else if err.is_request() {
        "request"
    } else {
        "unknown"
    };
    warn!(%endpoint, kind, error = %err, "evaluation request failed");
    EvaluationError::Unclassified {
        kind: kind.to_string(),
        message: error_chain(err),
    }
}

fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
