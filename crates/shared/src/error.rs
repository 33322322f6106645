use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    Busy,
    MalformedResponse,
    EndpointNotFound,
    ServerInternal,
    UnexpectedStatus,
    Connection,
    Timeout,
    Unclassified,
}

/// Every way one submission cycle can fail. Nothing here escapes the controller
/// boundary other than as a banner or an [`ApiError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("a question must be selected and the answer must not be empty")]
    Validation,
    #[error("a submission is already in progress for this session")]
    Busy,
    #[error("backend answered 200 but the body is not a valid evaluation")]
    MalformedResponse { body: String },
    #[error("evaluation endpoint not found (404): {endpoint}")]
    EndpointNotFound { endpoint: String },
    #[error("backend internal server error (500)")]
    ServerInternal { body: String },
    #[error("backend rejected the request with status {status}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("cannot connect to evaluation backend at {endpoint}: {detail}")]
    Connection { endpoint: String, detail: String },
    #[error("evaluation backend did not answer within {timeout_secs}s")]
    Timeout { endpoint: String, timeout_secs: u64 },
    #[error("unexpected {kind} error: {message}")]
    Unclassified { kind: String, message: String },
}

impl EvaluationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation => ErrorCode::Validation,
            Self::Busy => ErrorCode::Busy,
            Self::MalformedResponse { .. } => ErrorCode::MalformedResponse,
            Self::EndpointNotFound { .. } => ErrorCode::EndpointNotFound,
            Self::ServerInternal { .. } => ErrorCode::ServerInternal,
            Self::UnexpectedStatus { .. } => ErrorCode::UnexpectedStatus,
            Self::Connection { .. } => ErrorCode::Connection,
            Self::Timeout { .. } => ErrorCode::Timeout,
            Self::Unclassified { .. } => ErrorCode::Unclassified,
        }
    }

    /// Raw text worth showing behind a disclosure, if the failure carries any.
    pub fn raw_detail(&self) -> Option<String> {
        match self {
            Self::MalformedResponse { body }
            | Self::ServerInternal { body }
            | Self::UnexpectedStatus { body, .. } => Some(body.clone()),
            Self::Unclassified { kind, message } => {
                Some(format!("Error Type: {kind}\nError Message: {message}"))
            }
            _ => None,
        }
    }

    /// Input problems never reached the backend.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation | Self::Busy)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl From<&EvaluationError> for ApiError {
    fn from(value: &EvaluationError) -> Self {
        let error = ApiError::new(value.code(), value.to_string());
        match value.raw_detail() {
            Some(detail) => error.with_detail(detail),
            None => error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_not_found_message_names_endpoint() {
        let err = EvaluationError::EndpointNotFound {
            endpoint: "http://h/evaluate".into(),
        };
        assert!(err.to_string().contains("http://h/evaluate"));
        assert_eq!(err.code(), ErrorCode::EndpointNotFound);
    }

    #[test]
    fn api_error_carries_raw_body_for_server_errors() {
        let err = EvaluationError::ServerInternal {
            body: "Traceback".into(),
        };
        let api = ApiError::from(&err);
        assert_eq!(api.code, ErrorCode::ServerInternal);
        assert_eq!(api.detail.as_deref(), Some("Traceback"));

        let json = serde_json::to_value(&api).expect("json");
        assert_eq!(json["code"], "server_internal");
    }

    #[test]
    fn transport_errors_have_no_raw_detail() {
        let err = EvaluationError::Timeout {
            endpoint: "http://h/evaluate".into(),
            timeout_secs: 600,
        };
        assert!(err.raw_detail().is_none());
        assert!(!err.is_local());
        assert!(EvaluationError::Validation.is_local());
    }
}
