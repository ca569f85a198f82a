use crate::error::DialogueError;
use crate::turn::{ControlEvent, EventCategory, InteractionDescriptor, TurnResponse};
use std::fmt;
use std::sync::Arc;

/// What a handler wants the executor to do next
#[derive(Debug, Clone)]
pub enum HandlerAction {
    /// Send this descriptor and classify the new response
    Resend(InteractionDescriptor),
    /// Classify this response in place of the one handled
    Respond(TurnResponse),
    /// Abort the interaction
    Raise(DialogueError),
}

pub type CustomHandler =
    Arc<dyn Fn(&InteractionDescriptor, &TurnResponse, &ControlEvent) -> HandlerAction + Send + Sync>;

/// Stateless reaction to a control event
#[derive(Clone)]
pub enum EventHandler {
    /// Re-send the original descriptor verbatim
    Reprompt,
    RaiseHangUp,
    RaisePlatformError,
    Custom(CustomHandler),
}

impl EventHandler {
    pub fn custom<F>(handler: F) -> Self
    where
        F: Fn(&InteractionDescriptor, &TurnResponse, &ControlEvent) -> HandlerAction
            + Send
            + Sync
            + 'static,
    {
        EventHandler::Custom(Arc::new(handler))
    }

    pub fn handle(
        &self,
        descriptor: &InteractionDescriptor,
        response: &TurnResponse,
        event: &ControlEvent,
    ) -> HandlerAction {
        match self {
            EventHandler::Reprompt => HandlerAction::Resend(descriptor.clone()),
            EventHandler::RaiseHangUp => HandlerAction::Raise(DialogueError::HangUp {
                message: event.message.clone(),
            }),
            EventHandler::RaisePlatformError => HandlerAction::Raise(DialogueError::PlatformError {
                message: event
                    .message
                    .clone()
                    .or_else(|| Some(event.category.to_string())),
            }),
            EventHandler::Custom(handler) => handler(descriptor, response, event),
        }
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventHandler::Reprompt => f.write_str("Reprompt"),
            EventHandler::RaiseHangUp => f.write_str("RaiseHangUp"),
            EventHandler::RaisePlatformError => f.write_str("RaisePlatformError"),
            EventHandler::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Event category prefix a handler is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPattern {
    prefix: String,
    depth: usize,
}

impl EventPattern {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into().trim_matches('.').to_ascii_lowercase();
        let depth = prefix.split('.').filter(|s| !s.is_empty()).count();
        Self { prefix, depth }
    }

    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    /// Number of dotted segments; deeper patterns are more specific
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn matches(&self, category: &EventCategory) -> bool {
        category.is_subtype_of(&self.prefix)
    }
}

/// Handlers ordered from most to least specific pattern
///
/// `error.badfetch.http` is consulted before `error.badfetch`, which is
/// consulted before `error`. Patterns of equal depth keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct HandlerTable {
    entries: Vec<(EventPattern, EventHandler)>,
}

impl HandlerTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Hang-up raises `HangUp`; any `error` raises `PlatformError`
    pub fn defaults() -> Self {
        let mut table = Self::empty();
        table.insert(EventCategory::HANGUP, EventHandler::RaiseHangUp);
        table.insert(EventCategory::ERROR, EventHandler::RaisePlatformError);
        table
    }

    /// Bind `handler` to `prefix`, replacing any handler already bound to it
    pub fn insert(&mut self, prefix: impl Into<String>, handler: EventHandler) {
        let pattern = EventPattern::new(prefix);

        if let Some(slot) = self.entries.iter_mut().find(|(p, _)| *p == pattern) {
            slot.1 = handler;
            return;
        }

        let position = self
            .entries
            .iter()
            .position(|(p, _)| p.depth() < pattern.depth())
            .unwrap_or(self.entries.len());
        self.entries.insert(position, (pattern, handler));
    }

    pub fn remove(&mut self, prefix: &str) -> Option<EventHandler> {
        let pattern = EventPattern::new(prefix);
        let index = self.entries.iter().position(|(p, _)| *p == pattern)?;
        Some(self.entries.remove(index).1)
    }

    /// First handler, most specific first, whose pattern covers `category`
    pub fn lookup(&self, category: &EventCategory) -> Option<(&EventPattern, &EventHandler)> {
        self.entries
            .iter()
            .find(|(pattern, _)| pattern.matches(category))
            .map(|(pattern, handler)| (pattern, handler))
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
