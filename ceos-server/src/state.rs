use crate::config::Settings;
use crate::github::{GitHubClient, GitHubError};
use crate::session::{SessionCodec, SessionError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Errors that prevent the server from starting
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to initialize session codec: {0}")]
    Session(#[from] SessionError),
    #[error("Failed to initialize GitHub client: {0}")]
    GitHub(#[from] GitHubError),
}

/// Read-only state shared by every request
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub sessions: Arc<SessionCodec>,
    /// Baseline client, per-request credentials are layered on with `with_credential`
    pub github: GitHubClient,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self, StartupError> {
        let sessions = SessionCodec::from_config(&settings.session)?;
        let github = GitHubClient::new(&settings.github)?;
        Ok(Self {
            settings: Arc::new(settings),
            sessions: Arc::new(sessions),
            github,
            started_at: Utc::now(),
        })
    }
}
