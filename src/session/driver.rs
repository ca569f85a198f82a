use super::result::{ErrorCause, SessionReport, SessionResult};
use super::start::SessionStart;
use crate::dialogue::{
    DialogueOutcome, DialogueServices, DialogueSettings, PromptSettings, VoicemailDialogue,
};
use crate::turn::{TurnChannel, TurnTransport, DEFAULT_TURN_GRACE};
use chrono::Utc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Runs voicemail sessions to completion
///
/// The driver is the single boundary where dialogue failures become a
/// [`SessionResult`]; `run` never returns an error.
#[derive(Debug, Clone)]
pub struct SessionDriver {
    settings: DialogueSettings,
    prompts: PromptSettings,
    services: DialogueServices,
    turn_grace: Duration,
}

impl SessionDriver {
    pub fn new(
        settings: DialogueSettings,
        prompts: PromptSettings,
        services: DialogueServices,
    ) -> Self {
        Self {
            settings,
            prompts,
            services,
            turn_grace: DEFAULT_TURN_GRACE,
        }
    }

    pub fn with_turn_grace(mut self, grace: Duration) -> Self {
        self.turn_grace = grace;
        self
    }

    pub fn settings(&self) -> &DialogueSettings {
        &self.settings
    }

    pub async fn run(
        &self,
        start: SessionStart,
        transport: Box<dyn TurnTransport>,
        cancel: CancellationToken,
    ) -> SessionResult {
        self.run_report(start, transport, cancel).await.result
    }

    pub async fn run_report(
        &self,
        start: SessionStart,
        transport: Box<dyn TurnTransport>,
        cancel: CancellationToken,
    ) -> SessionReport {
        let started_at = Utc::now();
        let caller = start.attribute(&self.prompts.caller_attribute);
        let prompts = self.prompts.catalog(&start.base_path, caller);

        info!(
            "Starting session {} via {} (prompts: {})",
            start.session_id,
            transport.name(),
            prompts.variant()
        );

        let channel = TurnChannel::new(transport, cancel.clone()).with_grace(self.turn_grace);
        let mut dialogue = VoicemailDialogue::new(
            start.session_id.clone(),
            channel,
            prompts,
            self.settings.clone(),
            self.services.clone(),
        );

        let result = match dialogue.run().await {
            Ok(DialogueOutcome::Completed) => SessionResult::success(),
            Ok(DialogueOutcome::InvalidUser) => SessionResult::invalid_user(),
            Err(e) if e.is_interrupted() => {
                warn!("Session {} interrupted", start.session_id);
                // Leave the caller's token cancelled so the interruption is observed upstream
                cancel.cancel();
                SessionResult::interrupted()
            }
            Err(e) => {
                error!("Error during session {}: {}", start.session_id, e);
                SessionResult::error(ErrorCause::from_error(
                    &e,
                    dialogue.channel().last_interaction(),
                ))
            }
        };

        let duration = Utc::now().signed_duration_since(started_at);
        let turns = dialogue.channel().turns();
        info!(
            "Session {} finished: {:?} after {} turns",
            start.session_id,
            result.status(),
            turns
        );

        SessionReport {
            session_id: start.session_id,
            result,
            started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            turns,
        }
    }
}

impl Default for SessionDriver {
    fn default() -> Self {
        Self::new(
            DialogueSettings::default(),
            PromptSettings::default(),
            DialogueServices::default(),
        )
    }
}
