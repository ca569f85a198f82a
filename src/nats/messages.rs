use crate::session::{SessionReport, SessionResult};
use crate::turn::{InteractionDescriptor, TurnResponse};
use serde::{Deserialize, Serialize};

/// Turn request published to `ivr.turn.{session_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRequestMessage {
    pub session_id: String,
    /// Per-session turn counter; replies echo it back
    pub sequence: u64,
    pub descriptor: InteractionDescriptor,
    /// How long the session waits for the reply
    pub timeout_ms: u64,
    pub timestamp: String, // RFC3339 timestamp
}

/// Reply published by the remote endpoint to the request's reply subject
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnReplyMessage {
    pub session_id: String,
    pub sequence: u64,
    pub response: TurnResponse,
}

/// Final session outcome published to `ivr.result.{session_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResultMessage {
    pub session_id: String,
    pub result: SessionResult,
    pub turns: u64,
    pub duration_secs: f64,
    pub timestamp: String,
}

impl From<&SessionReport> for SessionResultMessage {
    fn from(report: &SessionReport) -> Self {
        Self {
            session_id: report.session_id.clone(),
            result: report.result.clone(),
            turns: report.turns,
            duration_secs: report.duration_secs,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
