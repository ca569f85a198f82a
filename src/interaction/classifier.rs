use crate::turn::{ControlEvent, EventCategory, TurnResponse};

/// Coarse kind of a control event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    HangUp,
    NoInput,
    NoMatch,
    PlatformError,
    Other,
}

impl EventKind {
    pub fn of(category: &EventCategory) -> Self {
        if category.is_subtype_of(EventCategory::HANGUP) {
            EventKind::HangUp
        } else if category.is_subtype_of(EventCategory::NO_INPUT) {
            EventKind::NoInput
        } else if category.is_subtype_of(EventCategory::NO_MATCH) {
            EventKind::NoMatch
        } else if category.is_subtype_of(EventCategory::ERROR) {
            EventKind::PlatformError
        } else {
            EventKind::Other
        }
    }
}

/// Result of classifying one turn response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    /// Caller input (recognition, recording, or script result): terminal
    Input,
    /// Control event to run through the handler table
    Event {
        event: &'a ControlEvent,
        kind: EventKind,
    },
}

pub fn classify(response: &TurnResponse) -> Classification<'_> {
    match response {
        TurnResponse::ControlEvent(event) => Classification::Event {
            event,
            kind: EventKind::of(&event.category),
        },
        TurnResponse::Recognition { .. }
        | TurnResponse::Recording { .. }
        | TurnResponse::ScriptResult { .. } => Classification::Input,
    }
}
