use crate::dialogue::{
    DialogueServices, DialogueSettings, FixedDialOut, FixedExtension, PromptMode, PromptSettings,
    StaticCredentials,
};
use crate::http::Retention;
use crate::session::SessionDriver;
use crate::turn::RecordingConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `VOICEMAIL_IVR__NATS__URL`
pub const ENV_PREFIX: &str = "VOICEMAIL_IVR";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub nats: NatsConfig,
    #[serde(default)]
    pub dialogue: DialogueConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Finished sessions stay queryable for this long
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// Cap on finished sessions kept in the registry
    #[serde(default = "default_max_finished_sessions")]
    pub max_finished_sessions: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    #[serde(default = "default_nats_url")]
    pub url: String,
    /// Turn requests go to `{turn_subject_prefix}.{session_id}`
    #[serde(default = "default_turn_subject_prefix")]
    pub turn_subject_prefix: String,
    /// Session results go to `{result_subject_prefix}.{session_id}`
    #[serde(default = "default_result_subject_prefix")]
    pub result_subject_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DialogueConfig {
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
    #[serde(default = "default_login_timeout_ms")]
    pub login_timeout_ms: u64,
    #[serde(default = "default_turn_grace_ms")]
    pub turn_grace_ms: u64,
    #[serde(default = "default_max_login_attempts")]
    pub max_login_attempts: u32,
    #[serde(default = "default_recording_max_ms")]
    pub recording_max_duration_ms: u64,
    #[serde(default = "default_username")]
    pub valid_username: String,
    #[serde(default = "default_password")]
    pub valid_password: String,
    #[serde(default = "default_directory_number")]
    pub dial_out_number: String,
    #[serde(default = "default_directory_number")]
    pub accepted_extension: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptsConfig {
    #[serde(default = "default_prompt_mode")]
    pub mode: PromptMode,
    #[serde(default = "default_base_path")]
    pub base_path: String,
    #[serde(default = "default_audio_ext")]
    pub audio_ext: String,
    #[serde(default = "default_caller_attribute")]
    pub caller_attribute: String,
    #[serde(default)]
    pub instrumented_callers: Vec<String>,
}

impl Config {
    /// Load `path` (any format the `config` crate knows, extension optional)
    /// layered under `VOICEMAIL_IVR__*` environment variables.
    /// A missing file falls back to defaults.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Session driver wired with the stub collaborators from `[dialogue]`
    pub fn session_driver(&self) -> SessionDriver {
        SessionDriver::new(
            self.dialogue.settings(),
            self.prompts.settings(),
            self.dialogue.services(),
        )
        .with_turn_grace(Duration::from_millis(self.dialogue.turn_grace_ms))
    }
}

impl HttpConfig {
    pub fn retention(&self) -> Retention {
        Retention {
            ttl: Duration::from_secs(self.session_ttl_secs),
            max_finished: self.max_finished_sessions,
        }
    }
}

impl DialogueConfig {
    pub fn settings(&self) -> DialogueSettings {
        DialogueSettings {
            default_timeout: Duration::from_millis(self.default_timeout_ms),
            login_timeout: Duration::from_millis(self.login_timeout_ms),
            max_login_attempts: self.max_login_attempts,
            recording: RecordingConfig {
                max_duration: Duration::from_millis(self.recording_max_duration_ms),
                ..RecordingConfig::default()
            },
            ..DialogueSettings::default()
        }
    }

    pub fn services(&self) -> DialogueServices {
        DialogueServices::new(
            Arc::new(StaticCredentials::new(
                self.valid_username.clone(),
                self.valid_password.clone(),
            )),
            Arc::new(FixedDialOut::new(self.dial_out_number.clone())),
            Arc::new(FixedExtension::new(self.accepted_extension.clone())),
        )
    }
}

impl PromptsConfig {
    pub fn settings(&self) -> PromptSettings {
        PromptSettings {
            mode: self.mode,
            audio_ext: self.audio_ext.clone(),
            caller_attribute: self.caller_attribute.clone(),
            instrumented_callers: self.instrumented_callers.clone(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            session_ttl_secs: default_session_ttl_secs(),
            max_finished_sessions: default_max_finished_sessions(),
        }
    }
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            url: default_nats_url(),
            turn_subject_prefix: default_turn_subject_prefix(),
            result_subject_prefix: default_result_subject_prefix(),
        }
    }
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_timeout_ms(),
            login_timeout_ms: default_login_timeout_ms(),
            turn_grace_ms: default_turn_grace_ms(),
            max_login_attempts: default_max_login_attempts(),
            recording_max_duration_ms: default_recording_max_ms(),
            valid_username: default_username(),
            valid_password: default_password(),
            dial_out_number: default_directory_number(),
            accepted_extension: default_directory_number(),
        }
    }
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            mode: default_prompt_mode(),
            base_path: default_base_path(),
            audio_ext: default_audio_ext(),
            caller_attribute: default_caller_attribute(),
            instrumented_callers: Vec::new(),
        }
    }
}

fn default_service_name() -> String {
    "voicemail-ivr".to_string()
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8088
}

fn default_session_ttl_secs() -> u64 {
    600
}

fn default_max_finished_sessions() -> usize {
    1000
}

fn default_nats_url() -> String {
    "nats://localhost:4222".to_string()
}

fn default_turn_subject_prefix() -> String {
    "ivr.turn".to_string()
}

fn default_result_subject_prefix() -> String {
    "ivr.result".to_string()
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_login_timeout_ms() -> u64 {
    10_000
}

fn default_turn_grace_ms() -> u64 {
    5_000
}

fn default_max_login_attempts() -> u32 {
    3
}

fn default_recording_max_ms() -> u64 {
    60_000
}

fn default_username() -> String {
    "4069".to_string()
}

fn default_password() -> String {
    "6522".to_string()
}

fn default_directory_number() -> String {
    "1234".to_string()
}

fn default_prompt_mode() -> PromptMode {
    PromptMode::Synthesis
}

fn default_base_path() -> String {
    "prompts".to_string()
}

fn default_audio_ext() -> String {
    "wav".to_string()
}

fn default_caller_attribute() -> String {
    "callerId".to_string()
}
