use evaluator_client::SubmissionController;

use crate::sessions::SessionRegistry;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) controller: SubmissionController,
    pub(crate) sessions: SessionRegistry,
    pub(crate) backend_caption: Option<String>,
}
