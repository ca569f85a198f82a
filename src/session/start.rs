use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Context delivered with a new call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStart {
    /// Unique session identifier (e.g., "session-0b6c…")
    pub session_id: String,

    /// Base path prompt resource names are resolved against
    pub base_path: String,

    /// Platform-supplied attributes (caller id, called number, …)
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl SessionStart {
    pub fn new(session_id: impl Into<String>, base_path: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            base_path: base_path.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Longest accepted session id
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Session ids become a NATS subject token: ASCII letters, digits, `-` and `_`
pub fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl Default for SessionStart {
    fn default() -> Self {
        Self::new(format!("session-{}", uuid::Uuid::new_v4()), "")
    }
}
