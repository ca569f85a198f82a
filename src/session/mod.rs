//! Voicemail session management
//!
//! This module provides the `SessionDriver` that:
//! - Builds the per-session prompt catalog from the session-start context
//! - Runs the voicemail dialogue over the session's turn channel
//! - Converts every outcome, failures included, into a `SessionResult`

mod driver;
mod result;
mod start;

pub use driver::SessionDriver;
pub use result::{ErrorCause, ErrorKind, SessionReport, SessionResult, SessionStatus};
pub use start::{is_valid_session_id, SessionStart, MAX_SESSION_ID_LEN};
