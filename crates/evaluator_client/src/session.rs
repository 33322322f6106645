use shared::{
    domain::{EvaluationResult, ResultPanels},
    error::EvaluationError,
};

/// Per-session submission state: the in-flight flag and the last successful result.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    in_flight: bool,
    last_result: Option<EvaluationResult>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn last_result(&self) -> Option<&EvaluationResult> {
        self.last_result.as_ref()
    }

    pub fn panels(&self) -> Option<ResultPanels> {
        self.last_result.as_ref().map(ResultPanels::from)
    }

    /// Drops the result and releases the flag, e.g. after an aborted cycle.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns false when a submission is already in flight.
    pub(crate) fn arm(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Ends a cycle: success replaces the slot, anything else empties it.
    pub(crate) fn complete(&mut self, outcome: &Result<EvaluationResult, EvaluationError>) {
        self.last_result = outcome.as_ref().ok().cloned();
        self.in_flight = false;
    }
}
