//! User-facing banners derived from classified submission failures.

use serde::{Deserialize, Serialize};

use crate::error::EvaluationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub level: BannerLevel,
    pub headline: String,
    /// Secondary line shown under the headline.
    pub hint: Option<String>,
    /// Collapsible raw text: response bodies or error internals.
    pub detail: Option<BannerDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerDetail {
    pub summary: String,
    pub body: String,
}

impl Banner {
    fn new(level: BannerLevel, headline: impl Into<String>) -> Self {
        Self {
            level,
            headline: headline.into(),
            hint: None,
            detail: None,
        }
    }

    fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    fn detail(mut self, summary: impl Into<String>, body: impl Into<String>) -> Self {
        self.detail = Some(BannerDetail {
            summary: summary.into(),
            body: body.into(),
        });
        self
    }
}

impl From<&EvaluationError> for Banner {
    fn from(error: &EvaluationError) -> Self {
        match error {
            EvaluationError::Validation => Banner::new(
                BannerLevel::Warning,
                "Please choose a question and fill in the answer!",
            ),
            EvaluationError::Busy => Banner::new(
                BannerLevel::Warning,
                "An evaluation is already running for this session.",
            )
            .hint("This page reloads on its own and shows the result once it is ready."),
            EvaluationError::MalformedResponse { body } => Banner::new(
                BannerLevel::Error,
                "The server responded, but the data format is broken (not JSON).",
            )
            .detail("Show raw server response", body.clone()),
            EvaluationError::EndpointNotFound { endpoint } => {
                Banner::new(BannerLevel::Error, "Wrong URL (404 Not Found).").hint(format!(
                    "The system tried to reach: `{endpoint}`. Make sure the backend address is up to date."
                ))
            }
            EvaluationError::ServerInternal { body } => Banner::new(
                BannerLevel::Error,
                "The evaluation server hit an internal error (500).",
            )
            .detail("Error details from the server", body.clone()),
            EvaluationError::UnexpectedStatus { status, body } => Banner::new(
                BannerLevel::Error,
                format!("The server rejected the request with status: {status}"),
            )
            .detail("Server response", body.clone()),
            EvaluationError::Connection { .. } => {
                Banner::new(BannerLevel::Error, "Failed to connect to the server!").hint(
                    "Possible causes: \
                     1. The evaluation backend has not been started. \
                     2. The tunnel exposing the backend is not running. \
                     3. The configured backend address has expired; replace it with the current one.",
                )
            }
            EvaluationError::Timeout { .. } => {
                Banner::new(BannerLevel::Error, "Timed out!").hint(
                    "The server is too busy or its queue is full. Try pressing Evaluate again in a minute.",
                )
            }
            EvaluationError::Unclassified { kind, message } => {
                Banner::new(BannerLevel::Error, "An unexpected error occurred").detail(
                    "Show technical details",
                    format!("Error Type: {kind}\nError Message: {message}"),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_is_a_warning_without_detail() {
        let banner = Banner::from(&EvaluationError::Validation);
        assert_eq!(banner.level, BannerLevel::Warning);
        assert!(banner.detail.is_none());
    }

    #[test]
    fn not_found_hint_names_the_endpoint() {
        let banner = Banner::from(&EvaluationError::EndpointNotFound {
            endpoint: "http://h/evaluate".into(),
        });
        assert!(banner
            .hint
            .as_deref()
            .is_some_and(|hint| hint.contains("`http://h/evaluate`")));
    }

    #[test]
    fn connection_and_timeout_banners_differ() {
        let connection = Banner::from(&EvaluationError::Connection {
            endpoint: "http://h/evaluate".into(),
            detail: "refused".into(),
        });
        let timeout = Banner::from(&EvaluationError::Timeout {
            endpoint: "http://h/evaluate".into(),
            timeout_secs: 600,
        });
        assert_ne!(connection.headline, timeout.headline);
        assert!(connection.hint.expect("hint").contains("backend"));
        assert!(timeout.hint.expect("hint").contains("again"));
    }

    #[test]
    fn malformed_response_exposes_raw_body() {
        let banner = Banner::from(&EvaluationError::MalformedResponse {
            body: "not json".into(),
        });
        assert_eq!(banner.detail.expect("detail").body, "not json");
    }

    #[test]
    fn unclassified_detail_lists_kind_and_message() {
        let banner = Banner::from(&EvaluationError::Unclassified {
            kind: "builder".into(),
            message: "relative URL without a base".into(),
        });
        let detail = banner.detail.expect("detail");
        assert!(detail.body.contains("Error Type: builder"));
        assert!(detail.body.contains("relative URL without a base"));
    }
}
