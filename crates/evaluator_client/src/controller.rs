//! Submission state machine: `Idle -> Validating -> (Idle | AwaitingResponse) -> Idle`.

use std::sync::Arc;

use shared::{
    domain::{is_catalog_question, EvaluationResult, ResultPanels, Submission},
    error::EvaluationError,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{session::SessionState, EvaluationBackend};

/// Rejects the placeholder (or any non-catalog question) and empty answers.
pub fn validate_submission(question: &str, answer: &str) -> Result<Submission, EvaluationError> {
    if !is_catalog_question(question) || answer.is_empty() {
        return Err(EvaluationError::Validation);
    }
    Ok(Submission::new(question, answer))
}

pub fn render(last_result: Option<&EvaluationResult>) -> Option<ResultPanels> {
    last_result.map(ResultPanels::from)
}

#[derive(Clone)]
pub struct SubmissionController {
    backend: Arc<dyn EvaluationBackend>,
}

impl SubmissionController {
    pub fn new(backend: Arc<dyn EvaluationBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn EvaluationBackend> {
        &self.backend
    }

    /// Arms the session for one submission. No network activity happens here.
    pub fn activate(&self, state: &mut SessionState) -> Result<(), EvaluationError> {
        if state.arm() {
            debug!("submission armed");
            Ok(())
        } else {
            Err(EvaluationError::Busy)
        }
    }

    /// Runs the armed submission, if any. Returns `None` when the session is idle.
    ///
    /// The session lock is released while the backend call is outstanding; the in-flight
    /// flag is cleared on every path before this returns.
    pub async fn process_pending_submission(
        &self,
        session: &Mutex<SessionState>,
        question: &str,
        answer: &str,
    ) -> Option<Result<EvaluationResult, EvaluationError>> {
        if !session.lock().await.is_in_flight() {
            return None;
        }

        let outcome = match validate_submission(question, answer) {
            Ok(submission) => self.backend.evaluate(&submission).await,
            Err(err) => {
                info!("submission rejected by validation");
                Err(err)
            }
        };

        session.lock().await.complete(&outcome);
        Some(outcome)
    }

    /// `activate` followed by `process_pending_submission`.
    pub async fn submit(
        &self,
        session: &Mutex<SessionState>,
        question: &str,
        answer: &str,
    ) -> Result<EvaluationResult, EvaluationError> {
        self.activate(&mut *session.lock().await)?;
        self.process_pending_submission(session, question, answer)
            .await
            .unwrap_or(Err(EvaluationError::Busy))
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
