use super::ids::*;
use super::VoicemailDialogue;
use crate::error::DialogueResult;
use crate::interaction::Interaction;
use tracing::{debug, info};

impl VoicemailDialogue {
    /// Main menu loop; `#` plays the closing prompt and ends the session
    pub(super) async fn main_menu(&mut self) -> DialogueResult<()> {
        let menu = self.menu(MAIN_MENU)?;

        loop {
            let choice = self.collect_digits(&menu).await?;
            match choice.as_deref() {
                Some("0") => self.mailbox_configuration().await?,
                Some("1") => self.message_menu().await?,
                Some("3") => self.advanced_options().await?,
                Some("#") => break,
                other => debug!("Main menu: no action for {:?}", other),
            }
        }

        self.announce(GOOD_BYE).await
    }

    async fn mailbox_configuration(&mut self) -> DialogueResult<()> {
        let options = self.menu(MAILBOX_OPTIONS)?;

        loop {
            match self.collect_digits(&options).await?.as_deref() {
                Some("*") => return Ok(()),
                Some("3") => self.change_mailbox_name().await?,
                other => debug!("Mailbox options: no action for {:?}", other),
            }
        }
    }

    async fn change_mailbox_name(&mut self) -> DialogueResult<()> {
        let record_name = self.recording(RECORD_NAME)?;
        self.record(&record_name).await?;

        let location = format!("recordings/{}/{}", self.session_id, RECORD_NAME);
        let confirm = Interaction::reprompting(
            self.prompt(CONFIRM_NAME)
                .replay(location.clone())
                .dtmf(1)
                .build()?,
        );

        match self.collect_digits(&confirm).await?.as_deref() {
            Some("1") => {
                info!("Session {}: mailbox name saved", self.session_id);
                self.mailbox_name = Some(location);
                self.announce(MESSAGE_SAVED).await?;
            }
            // Re-record and listen options are not defined yet
            other => debug!("Confirm name: no action for {:?}", other),
        }
        Ok(())
    }

    async fn message_menu(&mut self) -> DialogueResult<()> {
        self.announce(PLAY_MESSAGE).await?;
        let call_menu = self.menu(CALL_MENU)?;

        loop {
            match self.collect_digits(&call_menu).await?.as_deref() {
                Some("*") => return Ok(()),
                Some("9") => self.save_message().await?,
                // Previous, replay and next all replay the current message
                Some("4") | Some("5") | Some("6") => self.announce(PLAY_MESSAGE).await?,
                other => debug!("Call menu: no action for {:?}", other),
            }
        }
    }

    async fn save_message(&mut self) -> DialogueResult<()> {
        let folders = self.menu(ASK_FOLDER_TO_SAVE)?;

        match self.collect_digits(&folders).await?.as_deref() {
            Some("1") => self.announce(MESSAGE_SAVED).await,
            other => {
                debug!("Save message: no folder for {:?}", other);
                Ok(())
            }
        }
    }

    /// Presented once; every option returns to the main menu
    async fn advanced_options(&mut self) -> DialogueResult<()> {
        let options = self.menu(ADVANCED_OPTIONS)?;

        match self.collect_digits(&options).await?.as_deref() {
            Some("4") => self.dial_out().await,
            Some("5") => self.leave_message().await,
            other => {
                debug!("Advanced options: no action for {:?}", other);
                Ok(())
            }
        }
    }

    async fn dial_out(&mut self) -> DialogueResult<()> {
        let ask_number = self.number_entry(ASK_NUMBER_TO_CALL)?;

        loop {
            let number = self.collect_digits(&ask_number).await?.unwrap_or_default();
            if let Some(destination) = self.services.dial_out.resolve(&number) {
                // Blind transfer to `destination` is not wired to the platform yet
                info!("Session {}: dialing out to {}", self.session_id, destination);
                return self.announce(DIAL_OUT).await;
            }

            debug!("Dial out: number {:?} rejected", number);
            self.announce(INVALID_NUMBER).await?;
        }
    }

    async fn leave_message(&mut self) -> DialogueResult<()> {
        let ask_extension = self.number_entry(ASK_EXTENSION)?;

        let mailbox = loop {
            let extension = self.collect_digits(&ask_extension).await?.unwrap_or_default();
            if let Some(mailbox) = self.services.extensions.lookup(&extension) {
                break mailbox;
            }

            debug!("Leave message: extension {:?} rejected", extension);
            self.announce(INVALID_EXTENSION).await?;
        };

        let ask_message = self.recording(ASK_MESSAGE)?;
        let duration = self.record(&ask_message).await?;
        info!(
            "Session {}: left {:?} message for {}",
            self.session_id, duration, mailbox
        );
        Ok(())
    }
}
