use crate::turn::{DescriptorError, TurnError};
use thiserror::Error;

/// Failures that abort a dialogue and reach the session driver
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DialogueError {
    #[error(transparent)]
    Turn(#[from] TurnError),

    #[error("caller hung up{}", suffix(.message))]
    HangUp { message: Option<String> },

    #[error("platform error{}", suffix(.message))]
    PlatformError { message: Option<String> },

    #[error("unexpected response to {interaction}: {detail}")]
    UnexpectedResponse { interaction: String, detail: String },

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

impl DialogueError {
    pub fn is_interrupted(&self) -> bool {
        matches!(self, DialogueError::Turn(TurnError::Interrupted))
    }
}

fn suffix(message: &Option<String>) -> String {
    match message {
        Some(m) if !m.is_empty() => format!(": {}", m),
        _ => String::new(),
    }
}

pub type DialogueResult<T> = std::result::Result<T, DialogueError>;
