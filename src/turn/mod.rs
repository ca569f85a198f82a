//! Turn-level plumbing
//!
//! A turn is one prompt-then-response exchange with the remote endpoint:
//! - `descriptor`: what to play and what input to collect
//! - `response`: what came back (input, recording, or control event)
//! - `channel`: deadline and cancellation around a transport exchange
//! - `local`: in-process transport used by tests and the console
//! - `dtmf`: digit string encoding inside recognition results

pub mod channel;
pub mod descriptor;
pub mod dtmf;
pub mod local;
pub mod response;

pub use channel::{TurnChannel, TurnError, TurnTransport, DEFAULT_TURN_GRACE};
pub use descriptor::{
    DescriptorError, InteractionBuilder, InteractionDescriptor, PromptItem, RecognitionConfig,
    RecordingConfig, DEFAULT_NO_INPUT_TIMEOUT,
};
pub use local::{local_pair, parse_answer, LocalTransport, RemoteEndpoint, TurnRequest};
pub use response::{ControlEvent, EventCategory, TurnResponse};
