pub mod client;
pub mod messages;
pub mod transport;

pub use client::NatsClient;
pub use messages::{SessionResultMessage, TurnReplyMessage, TurnRequestMessage};
pub use transport::{next_reply, NatsTransport};
