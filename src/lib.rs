pub mod config;
pub mod dialogue;
pub mod error;
pub mod http;
pub mod interaction;
pub mod nats;
pub mod session;
pub mod turn;

pub use config::Config;
pub use dialogue::{DialogueOutcome, DialogueServices, DialogueSettings, VoicemailDialogue};
pub use error::{DialogueError, DialogueResult};
pub use http::{create_router, AppState, TransportFactory};
pub use interaction::{EventHandler, HandlerTable, Interaction};
pub use nats::{NatsClient, NatsTransport, TurnReplyMessage, TurnRequestMessage};
pub use session::{SessionDriver, SessionReport, SessionResult, SessionStart, SessionStatus};
pub use turn::{
    local_pair, ControlEvent, InteractionDescriptor, TurnChannel, TurnError, TurnResponse,
    TurnTransport,
};
