use super::descriptor::serde_millis;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Dotted, hierarchical event category (e.g. `error.badfetch.http`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventCategory(String);

impl EventCategory {
    pub const HANGUP: &'static str = "connection.disconnect.hangup";
    pub const NO_INPUT: &'static str = "noinput";
    pub const NO_MATCH: &'static str = "nomatch";
    pub const ERROR: &'static str = "error";

    pub fn new(category: impl Into<String>) -> Self {
        Self(category.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|s| !s.is_empty())
    }

    /// True when `prefix` names this category or one of its ancestors.
    ///
    /// Matching is per dotted segment and case-insensitive, so `error`
    /// covers `error.badfetch` but `err` does not.
    pub fn is_subtype_of(&self, prefix: &str) -> bool {
        let mut own = self.segments();
        for wanted in prefix.split('.').filter(|s| !s.is_empty()) {
            match own.next() {
                Some(segment) if segment.eq_ignore_ascii_case(wanted) => {}
                _ => return false,
            }
        }
        true
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventCategory {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A platform or control event reported instead of caller input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlEvent {
    pub category: EventCategory,
    #[serde(default)]
    pub message: Option<String>,
}

impl ControlEvent {
    pub fn new(category: impl Into<String>, message: Option<String>) -> Self {
        Self {
            category: EventCategory::new(category),
            message,
        }
    }

    pub fn hangup() -> Self {
        Self::new(EventCategory::HANGUP, None)
    }

    pub fn no_input() -> Self {
        Self::new(EventCategory::NO_INPUT, None)
    }

    pub fn no_match() -> Self {
        Self::new(EventCategory::NO_MATCH, None)
    }

    pub fn platform_error(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(category, Some(message.into()))
    }
}

/// What the remote endpoint answered for one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TurnResponse {
    #[serde(rename_all = "camelCase")]
    Recognition {
        utterance: String,
        interpretation: serde_json::Value,
    },
    #[serde(rename_all = "camelCase")]
    Recording {
        #[serde(with = "base64_bytes")]
        audio_bytes: Vec<u8>,
        mime_type: String,
        #[serde(with = "serde_millis")]
        duration: Duration,
        termination_digit: Option<char>,
    },
    ControlEvent(ControlEvent),
    ScriptResult {
        json: serde_json::Value,
    },
}

impl TurnResponse {
    /// DTMF recognition as the platform reports it: the utterance carries
    /// space-separated digits and the interpretation the joined string.
    pub fn dtmf(digits: &str) -> Self {
        TurnResponse::Recognition {
            utterance: super::dtmf::encode_utterance(digits),
            interpretation: serde_json::Value::String(digits.to_string()),
        }
    }

    pub fn event(event: ControlEvent) -> Self {
        TurnResponse::ControlEvent(event)
    }

    pub fn control_event(&self) -> Option<&ControlEvent> {
        match self {
            TurnResponse::ControlEvent(event) => Some(event),
            _ => None,
        }
    }

    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            TurnResponse::Recognition { .. } => "recognition",
            TurnResponse::Recording { .. } => "recording",
            TurnResponse::ControlEvent(_) => "event",
            TurnResponse::ScriptResult { .. } => "script",
        }
    }
}

mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtype_matches_whole_segments() {
        let category = EventCategory::new("error.badfetch.http");

        assert!(category.is_subtype_of("error"));
        assert!(category.is_subtype_of("error.badfetch"));
        assert!(category.is_subtype_of("error.badfetch.http"));
        assert!(category.is_subtype_of("ERROR.BadFetch"));
        assert!(!category.is_subtype_of("err"));
        assert!(!category.is_subtype_of("error.semantic"));
        assert!(!category.is_subtype_of("error.badfetch.http.404"));
    }

    #[test]
    fn recording_bytes_travel_as_base64() {
        let response = TurnResponse::Recording {
            audio_bytes: vec![1, 2, 3],
            mime_type: "audio/x-wav".to_string(),
            duration: Duration::from_millis(1500),
            termination_digit: Some('#'),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["type"], "recording");
        assert_eq!(json["audioBytes"], "AQID");
        assert_eq!(json["duration"], 1500);

        let back: TurnResponse = serde_json::from_value(json).unwrap();
        assert_eq!(back, response);
    }

    #[test]
    fn control_event_is_tagged() {
        let json = serde_json::json!({
            "type": "controlEvent",
            "category": "connection.disconnect.hangup"
        });

        let response: TurnResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.control_event(), Some(&ControlEvent::hangup()));
    }
}
