use super::ids::{ASK_LOGIN, ASK_PASSWORD, GOOD_BYE, INCORRECT_MAILBOX};
use super::{User, VoicemailDialogue};
use crate::error::DialogueResult;
use crate::interaction::Interaction;
use tracing::{info, warn};

impl VoicemailDialogue {
    fn login_prompt(&self, id: &str) -> DialogueResult<Interaction> {
        let descriptor = self
            .prompt(id)
            .dtmf(self.settings.login_digits)
            .no_input_timeout(self.settings.login_timeout)
            .build()?;
        Ok(Interaction::reprompting(descriptor))
    }

    /// Ask for mailbox and password until they validate or attempts run out.
    ///
    /// Returns `None` after the last rejected attempt, once the closing
    /// prompt has played.
    pub(super) async fn login(&mut self) -> DialogueResult<Option<User>> {
        let ask_login = self.login_prompt(ASK_LOGIN)?;
        let incorrect = self.login_prompt(INCORRECT_MAILBOX)?;
        let ask_password = self.login_prompt(ASK_PASSWORD)?;

        let max_attempts = self.settings.max_login_attempts.max(1);
        let mut mailbox_prompt = &ask_login;

        for attempt in 1..=max_attempts {
            let username = self.collect_digits(mailbox_prompt).await?.unwrap_or_default();
            let password = self.collect_digits(&ask_password).await?.unwrap_or_default();

            if self.services.credentials.validate(&username, &password) {
                return Ok(Some(User::new(username, password)));
            }

            warn!(
                "Session {}: login attempt {}/{} rejected for mailbox {:?}",
                self.session_id, attempt, max_attempts, username
            );
            // Later attempts use the "incorrect mailbox" wording
            mailbox_prompt = &incorrect;
        }

        info!(
            "Session {}: login failed after {} attempts",
            self.session_id, max_attempts
        );
        self.announce(GOOD_BYE).await?;
        Ok(None)
    }
}
