use super::classifier::{classify, Classification};
use super::handlers::{EventHandler, HandlerAction, HandlerTable};
use crate::error::{DialogueError, DialogueResult};
use crate::turn::{EventCategory, InteractionDescriptor, TurnChannel, TurnResponse};
use std::time::Duration;
use tracing::{debug, warn};

/// Consecutive `Respond` actions allowed before the interaction fails
pub const MAX_RESPOND_CHAIN: usize = 16;

/// One descriptor plus the event handlers applied while running it
///
/// Every response is classified; control events are dispatched to the
/// most specific matching handler until a terminal response is produced
/// or a handler raises.
#[derive(Debug, Clone)]
pub struct Interaction {
    descriptor: InteractionDescriptor,
    handlers: HandlerTable,
    timeout: Option<Duration>,
}

impl Interaction {
    /// Interaction with the default table (hang-up and `error` raise)
    pub fn new(descriptor: InteractionDescriptor) -> Self {
        Self {
            descriptor,
            handlers: HandlerTable::defaults(),
            timeout: None,
        }
    }

    /// Interaction that re-sends its prompt on no-input and no-match
    pub fn reprompting(descriptor: InteractionDescriptor) -> Self {
        Self::new(descriptor)
            .on_no_input(EventHandler::Reprompt)
            .on_no_match(EventHandler::Reprompt)
    }

    /// Interaction with an empty handler table
    pub fn bare(descriptor: InteractionDescriptor) -> Self {
        Self {
            descriptor,
            handlers: HandlerTable::empty(),
            timeout: None,
        }
    }

    pub fn on(mut self, prefix: impl Into<String>, handler: EventHandler) -> Self {
        self.handlers.insert(prefix, handler);
        self
    }

    pub fn on_no_input(self, handler: EventHandler) -> Self {
        self.on(EventCategory::NO_INPUT, handler)
    }

    pub fn on_no_match(self, handler: EventHandler) -> Self {
        self.on(EventCategory::NO_MATCH, handler)
    }

    pub fn on_hangup(self, handler: EventHandler) -> Self {
        self.on(EventCategory::HANGUP, handler)
    }

    /// Override the per-turn deadline for every turn of this interaction
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn descriptor(&self) -> &InteractionDescriptor {
        &self.descriptor
    }

    pub fn handlers(&self) -> &HandlerTable {
        &self.handlers
    }

    pub async fn run(&self, channel: &mut TurnChannel) -> DialogueResult<TurnResponse> {
        let id = self.descriptor.id();
        let mut response = channel.execute(&self.descriptor, self.timeout).await?;
        let mut responded = 0;

        loop {
            let (event, kind) = match classify(&response) {
                Classification::Input => {
                    debug!("Interaction {} done with {}", id, response.kind());
                    return Ok(response);
                }
                Classification::Event { event, kind } => (event, kind),
            };

            let Some((pattern, handler)) = self.handlers.lookup(&event.category) else {
                debug!("Interaction {} done with unhandled event {}", id, event.category);
                return Ok(response);
            };

            debug!(
                "Interaction {}: {:?} event {} handled by {:?} ({})",
                id,
                kind,
                event.category,
                handler,
                pattern.as_str()
            );

            match handler.handle(&self.descriptor, &response, event) {
                HandlerAction::Resend(descriptor) => {
                    responded = 0;
                    response = channel.execute(&descriptor, self.timeout).await?;
                }
                HandlerAction::Respond(replacement) => {
                    // No await between passes, so the chain is capped
                    responded += 1;
                    if responded > MAX_RESPOND_CHAIN {
                        warn!("Interaction {}: handlers kept replacing the response", id);
                        return Err(DialogueError::UnexpectedResponse {
                            interaction: id.to_string(),
                            detail: format!(
                                "more than {} consecutive handler responses ending with {}",
                                MAX_RESPOND_CHAIN, event.category
                            ),
                        });
                    }
                    response = replacement;
                }
                HandlerAction::Raise(error) => {
                    warn!("Interaction {} escalated: {}", id, error);
                    return Err(error);
                }
            }
        }
    }
}
