//! Voicemail menu state machine
//!
//! Login gates the main menu; the main menu dispatches to the mailbox
//! configuration, message and advanced-options sub-flows and returns to
//! itself when each completes. Every prompt goes through an
//! [`Interaction`], so hang-ups and platform errors abort the walk.

mod login;
mod menu;
pub mod prompts;
pub mod services;

pub use prompts::{PromptCatalog, PromptMode, PromptSettings, PromptVariant};
pub use services::{
    CredentialValidator, DialOutDirectory, DialogueServices, ExtensionDirectory, FixedDialOut,
    FixedExtension, StaticCredentials, User,
};

use crate::error::{DialogueError, DialogueResult};
use crate::interaction::{EventHandler, Interaction};
use crate::turn::{dtmf, InteractionBuilder, RecordingConfig, TurnChannel, TurnResponse};
use std::time::Duration;
use tracing::{debug, info};

/// Prompt ids, also used as prompt resource names
pub mod ids {
    pub const ASK_LOGIN: &str = "ask-login";
    pub const ASK_PASSWORD: &str = "ask-password";
    pub const INCORRECT_MAILBOX: &str = "incorrect-mailbox";
    pub const GOOD_BYE: &str = "good-bye";
    pub const MAIN_MENU: &str = "main-menu";
    pub const MAILBOX_OPTIONS: &str = "mailbox-options";
    pub const RECORD_NAME: &str = "record-name";
    pub const CONFIRM_NAME: &str = "confirm-name";
    pub const MESSAGE_SAVED: &str = "message-saved";
    pub const PLAY_MESSAGE: &str = "play-message";
    pub const CALL_MENU: &str = "call-menu";
    pub const ASK_FOLDER_TO_SAVE: &str = "ask-folder-to-save";
    pub const ADVANCED_OPTIONS: &str = "advanced-options";
    pub const ASK_NUMBER_TO_CALL: &str = "ask-number-to-call";
    pub const DIAL_OUT: &str = "dial-out";
    pub const INVALID_NUMBER: &str = "invalid-number";
    pub const ASK_EXTENSION: &str = "ask-extension";
    pub const INVALID_EXTENSION: &str = "invalid-extension";
    pub const ASK_MESSAGE: &str = "ask-message";
}

/// Tunables of the voicemail dialogue
#[derive(Debug, Clone)]
pub struct DialogueSettings {
    /// No-input timeout for ordinary prompts
    pub default_timeout: Duration,
    /// Longer no-input timeout for the login prompts
    pub login_timeout: Duration,
    pub max_login_attempts: u32,
    pub login_digits: u32,
    pub recording: RecordingConfig,
}

impl Default for DialogueSettings {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(5),
            login_timeout: Duration::from_secs(10),
            max_login_attempts: 3,
            login_digits: 4,
            recording: RecordingConfig::default(),
        }
    }
}

/// How the dialogue ended when nothing failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueOutcome {
    /// Caller logged in and left through the main menu
    Completed,
    /// Login attempts exhausted
    InvalidUser,
}

/// One caller's walk through the voicemail menus
pub struct VoicemailDialogue {
    session_id: String,
    channel: TurnChannel,
    prompts: PromptCatalog,
    settings: DialogueSettings,
    services: DialogueServices,
    user: Option<User>,
    mailbox_name: Option<String>,
}

impl VoicemailDialogue {
    pub fn new(
        session_id: impl Into<String>,
        channel: TurnChannel,
        prompts: PromptCatalog,
        settings: DialogueSettings,
        services: DialogueServices,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            channel,
            prompts,
            settings,
            services,
            user: None,
            mailbox_name: None,
        }
    }

    pub async fn run(&mut self) -> DialogueResult<DialogueOutcome> {
        let Some(user) = self.login().await? else {
            return Ok(DialogueOutcome::InvalidUser);
        };
        info!("Session {}: mailbox {} logged in", self.session_id, user.username());
        self.user = Some(user);

        self.main_menu().await?;
        Ok(DialogueOutcome::Completed)
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Location of the mailbox name recorded this session, once saved
    pub fn mailbox_name(&self) -> Option<&str> {
        self.mailbox_name.as_deref()
    }

    pub fn channel(&self) -> &TurnChannel {
        &self.channel
    }

    fn prompt(&self, id: &str) -> InteractionBuilder {
        crate::turn::InteractionDescriptor::builder(id)
            .item(self.prompts.item(id))
            .no_input_timeout(self.settings.default_timeout)
    }

    /// Single-digit selection that reprompts on no-input and no-match
    fn menu(&self, id: &str) -> DialogueResult<Interaction> {
        let descriptor = self.prompt(id).dtmf(1).build()?;
        Ok(Interaction::reprompting(descriptor))
    }

    /// Digits ended by `#`
    fn number_entry(&self, id: &str) -> DialogueResult<Interaction> {
        let descriptor = self.prompt(id).dtmf_until('#').build()?;
        Ok(Interaction::reprompting(descriptor))
    }

    fn recording(&self, id: &str) -> DialogueResult<Interaction> {
        let descriptor = self
            .prompt(id)
            .recording(self.settings.recording.clone())
            .build()?;
        Ok(Interaction::new(descriptor).on_no_input(EventHandler::Reprompt))
    }

    /// Play a prompt; any non-failing answer, no-input included, ends it
    async fn announce(&mut self, id: &str) -> DialogueResult<()> {
        let descriptor = self.prompt(id).build()?;
        self.announce_with(Interaction::new(descriptor)).await
    }

    async fn announce_with(&mut self, interaction: Interaction) -> DialogueResult<()> {
        let response = interaction.run(&mut self.channel).await?;
        debug!(
            "Announcement {} ended with {}",
            interaction.descriptor().id(),
            response.kind()
        );
        Ok(())
    }

    /// Run a recognition interaction and return the decoded digits.
    ///
    /// `None` when the interaction ended without a recognition result.
    async fn collect_digits(&mut self, interaction: &Interaction) -> DialogueResult<Option<String>> {
        let response = interaction.run(&mut self.channel).await?;
        let terminator = interaction
            .descriptor()
            .recognition()
            .and_then(|r| r.termination_digit);
        let digits = digits_of(&response, terminator);
        debug!(
            "Interaction {} collected {:?}",
            interaction.descriptor().id(),
            digits
        );
        Ok(digits)
    }

    /// Run a recording interaction; errors if something other than a recording comes back
    async fn record(&mut self, interaction: &Interaction) -> DialogueResult<Duration> {
        match interaction.run(&mut self.channel).await? {
            TurnResponse::Recording {
                duration,
                mime_type,
                audio_bytes,
                ..
            } => {
                debug!(
                    "Interaction {} recorded {:?} of {} ({} bytes)",
                    interaction.descriptor().id(),
                    duration,
                    mime_type,
                    audio_bytes.len()
                );
                Ok(duration)
            }
            other => Err(DialogueError::UnexpectedResponse {
                interaction: interaction.descriptor().id().to_string(),
                detail: format!("expected a recording, got {}", other.kind()),
            }),
        }
    }
}

/// Digits of a recognition result, separators and trailing terminator removed
pub fn digits_of(response: &TurnResponse, terminator: Option<char>) -> Option<String> {
    let TurnResponse::Recognition {
        utterance,
        interpretation,
    } = response
    else {
        return None;
    };

    let raw = match interpretation {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => utterance.clone(),
    };
    let joined = dtmf::decode_utterance(&raw);
    Some(dtmf::strip_terminator(&joined, terminator).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::ControlEvent;

    #[test]
    fn digits_prefer_interpretation() {
        let response = TurnResponse::dtmf("4069");
        assert_eq!(digits_of(&response, None).as_deref(), Some("4069"));
    }

    #[test]
    fn digits_fall_back_to_utterance() {
        let response = TurnResponse::Recognition {
            utterance: "1 2 3 4 #".to_string(),
            interpretation: serde_json::Value::Null,
        };
        assert_eq!(digits_of(&response, Some('#')).as_deref(), Some("1234"));
    }

    #[test]
    fn pound_survives_without_terminator() {
        let response = TurnResponse::dtmf("#");
        assert_eq!(digits_of(&response, None).as_deref(), Some("#"));
    }

    #[test]
    fn events_have_no_digits() {
        let response = TurnResponse::event(ControlEvent::no_input());
        assert_eq!(digits_of(&response, None), None);
    }
}
