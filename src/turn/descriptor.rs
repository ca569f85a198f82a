use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default no-input timeout applied when a descriptor does not set one
pub const DEFAULT_NO_INPUT_TIMEOUT: Duration = Duration::from_secs(5);

/// One item of a prompt, played in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum PromptItem {
    /// Text rendered by the platform's speech synthesizer
    SynthesizedText(String),
    /// Pre-recorded audio resource
    AudioSegment(String),
    /// Replay of a recording captured earlier in the session
    ReplayRecording(String),
}

/// DTMF recognition settings for a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionConfig {
    pub grammar_ref: String,
    pub termination_digit: Option<char>,
    pub expected_digit_count: Option<u32>,
}

impl RecognitionConfig {
    /// Grammar accepting exactly `length` digits
    pub fn fixed_digits(length: u32) -> Self {
        Self {
            grammar_ref: format!("builtin:dtmf/digits?length={}", length),
            termination_digit: None,
            expected_digit_count: Some(length),
        }
    }

    /// Grammar accepting any number of digits, ended by `terminator`
    pub fn open_digits(terminator: char) -> Self {
        Self {
            grammar_ref: format!("builtin:dtmf/digits?terminating={}", terminator),
            termination_digit: Some(terminator),
            expected_digit_count: None,
        }
    }
}

/// Recording settings for a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingConfig {
    pub beep_before_recording: bool,
    pub terminate_on_dtmf: bool,
    pub mime_type: String,
    #[serde(with = "serde_millis")]
    pub max_duration: Duration,
    pub post_recording_to_server: bool,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            beep_before_recording: true,
            terminate_on_dtmf: true,
            mime_type: "audio/x-wav".to_string(),
            max_duration: Duration::from_secs(60),
            post_recording_to_server: true,
        }
    }
}

/// Immutable description of one prompt-then-response turn
///
/// Build it with [`InteractionDescriptor::builder`]. A descriptor collects
/// either a recognition result or a recording, never both. A descriptor with
/// neither is an announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionDescriptor {
    id: String,
    prompt: Vec<PromptItem>,
    recognition: Option<RecognitionConfig>,
    recording: Option<RecordingConfig>,
    #[serde(with = "serde_millis")]
    no_input_timeout: Duration,
}

impl InteractionDescriptor {
    pub fn builder(id: impl Into<String>) -> InteractionBuilder {
        InteractionBuilder::new(id)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn prompt(&self) -> &[PromptItem] {
        &self.prompt
    }

    pub fn recognition(&self) -> Option<&RecognitionConfig> {
        self.recognition.as_ref()
    }

    pub fn recording(&self) -> Option<&RecordingConfig> {
        self.recording.as_ref()
    }

    pub fn no_input_timeout(&self) -> Duration {
        self.no_input_timeout
    }

    pub fn is_announcement(&self) -> bool {
        self.recognition.is_none() && self.recording.is_none()
    }

    /// Longest time the remote side may legitimately take to answer this turn
    pub fn response_window(&self) -> Duration {
        let recording = self
            .recording
            .as_ref()
            .map(|r| r.max_duration)
            .unwrap_or_default();
        self.no_input_timeout + recording
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("interaction id must not be empty")]
    MissingId,

    #[error("interaction {0} configures both recognition and recording")]
    RecognitionAndRecording(String),
}

/// Accumulates prompt items and input configuration for a descriptor
#[derive(Debug, Clone)]
pub struct InteractionBuilder {
    id: String,
    prompt: Vec<PromptItem>,
    recognition: Option<RecognitionConfig>,
    recording: Option<RecordingConfig>,
    no_input_timeout: Option<Duration>,
}

impl InteractionBuilder {
    fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt: Vec::new(),
            recognition: None,
            recording: None,
            no_input_timeout: None,
        }
    }

    pub fn synthesis(mut self, text: impl Into<String>) -> Self {
        self.prompt.push(PromptItem::SynthesizedText(text.into()));
        self
    }

    pub fn audio(mut self, path: impl Into<String>) -> Self {
        self.prompt.push(PromptItem::AudioSegment(path.into()));
        self
    }

    pub fn replay(mut self, location: impl Into<String>) -> Self {
        self.prompt.push(PromptItem::ReplayRecording(location.into()));
        self
    }

    pub fn item(mut self, item: PromptItem) -> Self {
        self.prompt.push(item);
        self
    }

    pub fn recognition(mut self, config: RecognitionConfig) -> Self {
        self.recognition = Some(config);
        self
    }

    /// Expect exactly `length` DTMF digits, with barge-in over the prompt
    pub fn dtmf(self, length: u32) -> Self {
        self.recognition(RecognitionConfig::fixed_digits(length))
    }

    /// Expect DTMF digits ended by `terminator`
    pub fn dtmf_until(self, terminator: char) -> Self {
        self.recognition(RecognitionConfig::open_digits(terminator))
    }

    pub fn recording(mut self, config: RecordingConfig) -> Self {
        self.recording = Some(config);
        self
    }

    pub fn no_input_timeout(mut self, timeout: Duration) -> Self {
        self.no_input_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<InteractionDescriptor, DescriptorError> {
        if self.id.trim().is_empty() {
            return Err(DescriptorError::MissingId);
        }
        if self.recognition.is_some() && self.recording.is_some() {
            return Err(DescriptorError::RecognitionAndRecording(self.id));
        }

        Ok(InteractionDescriptor {
            id: self.id,
            prompt: self.prompt,
            recognition: self.recognition,
            recording: self.recording,
            no_input_timeout: self.no_input_timeout.unwrap_or(DEFAULT_NO_INPUT_TIMEOUT),
        })
    }
}

/// Serializes a `Duration` as integer milliseconds
pub(crate) mod serde_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_recognition_with_recording() {
        let result = InteractionDescriptor::builder("record-name")
            .synthesis("record-name")
            .dtmf(1)
            .recording(RecordingConfig::default())
            .build();

        assert_eq!(
            result,
            Err(DescriptorError::RecognitionAndRecording("record-name".to_string()))
        );
    }

    #[test]
    fn builder_rejects_blank_id() {
        let result = InteractionDescriptor::builder("  ").synthesis("hello").build();
        assert_eq!(result, Err(DescriptorError::MissingId));
    }

    #[test]
    fn builder_applies_default_timeout() {
        let descriptor = InteractionDescriptor::builder("main-menu")
            .synthesis("main-menu")
            .dtmf(1)
            .build()
            .unwrap();

        assert_eq!(descriptor.no_input_timeout(), DEFAULT_NO_INPUT_TIMEOUT);
        assert_eq!(
            descriptor.recognition().map(|r| r.grammar_ref.as_str()),
            Some("builtin:dtmf/digits?length=1")
        );
        assert!(!descriptor.is_announcement());
    }

    #[test]
    fn response_window_includes_recording_time() {
        let descriptor = InteractionDescriptor::builder("ask-message")
            .synthesis("ask-message")
            .recording(RecordingConfig {
                max_duration: Duration::from_secs(30),
                ..RecordingConfig::default()
            })
            .no_input_timeout(Duration::from_secs(4))
            .build()
            .unwrap();

        assert_eq!(descriptor.response_window(), Duration::from_secs(34));
    }

    #[test]
    fn open_grammar_carries_terminator() {
        let config = RecognitionConfig::open_digits('#');
        assert_eq!(config.termination_digit, Some('#'));
        assert_eq!(config.expected_digit_count, None);
        assert_eq!(config.grammar_ref, "builtin:dtmf/digits?terminating=#");
    }
}
