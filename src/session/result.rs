use crate::error::DialogueError;
use crate::turn::TurnError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Success,
    InvalidUser,
    Interrupted,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    HangUp,
    PlatformError,
    Timeout,
    Channel,
    UnexpectedResponse,
    Descriptor,
}

/// Structured description of the failure that ended a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorCause {
    pub kind: ErrorKind,
    pub message: String,
    /// Interaction in progress when the failure happened
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction: Option<String>,
}

impl ErrorCause {
    pub fn from_error(error: &DialogueError, interaction: Option<&str>) -> Self {
        let kind = match error {
            DialogueError::HangUp { .. } => ErrorKind::HangUp,
            DialogueError::PlatformError { .. } => ErrorKind::PlatformError,
            DialogueError::Turn(TurnError::Timeout(_)) => ErrorKind::Timeout,
            DialogueError::Turn(_) => ErrorKind::Channel,
            DialogueError::UnexpectedResponse { .. } => ErrorKind::UnexpectedResponse,
            DialogueError::Descriptor(_) => ErrorKind::Descriptor,
        };

        Self {
            kind,
            message: error.to_string(),
            interaction: interaction.map(str::to_string),
        }
    }
}

/// Final outcome of a session, built once by the driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    cause: Option<ErrorCause>,
}

impl SessionResult {
    pub fn success() -> Self {
        Self::with_status(SessionStatus::Success)
    }

    pub fn invalid_user() -> Self {
        Self::with_status(SessionStatus::InvalidUser)
    }

    pub fn interrupted() -> Self {
        Self::with_status(SessionStatus::Interrupted)
    }

    pub fn error(cause: ErrorCause) -> Self {
        Self {
            status: SessionStatus::Error,
            cause: Some(cause),
        }
    }

    fn with_status(status: SessionStatus) -> Self {
        Self {
            status,
            cause: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn cause(&self) -> Option<&ErrorCause> {
        self.cause.as_ref()
    }
}

/// Session result plus bookkeeping, as reported over HTTP and NATS
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: String,

    pub result: SessionResult,

    /// When the session started
    pub started_at: DateTime<Utc>,

    /// Total duration in seconds
    pub duration_secs: f64,

    /// Number of turns exchanged with the remote endpoint
    pub turns: u64,
}
