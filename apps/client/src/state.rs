use crate::config::Config;
use crate::session::controller::SubmissionController;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Holds exactly one controller: one session per running client.
#[derive(Clone)]
pub struct AppState {
    pub controller: SubmissionController,
    pub config: Config,
}
