use serde::{Deserialize, Serialize};

use crate::domain::{EvaluationResult, ResultPanels, QUESTION_CATALOG};

/// Path segment appended to the backend base address.
pub fn backend_evaluate_route() -> &'static str {
    "/evaluate"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionEntry {
    pub number: usize,
    pub question: String,
}

pub fn question_entries() -> Vec<QuestionEntry> {
    QUESTION_CATALOG
        .iter()
        .enumerate()
        .map(|(index, question)| QuestionEntry {
            number: index + 1,
            question: (*question).to_string(),
        })
        .collect()
}

/// Successful reply of the server's JSON evaluate route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub result: EvaluationResult,
    pub panels: ResultPanels,
}

impl From<EvaluationResult> for EvaluateResponse {
    fn from(result: EvaluationResult) -> Self {
        let panels = result.panels();
        Self { result, panels }
    }
}
