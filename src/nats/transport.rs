use super::messages::{TurnReplyMessage, TurnRequestMessage};
use crate::turn::{InteractionDescriptor, TurnError, TurnResponse, TurnTransport};
use async_nats::{Client, Subscriber};
use futures::{Stream, StreamExt};
use std::time::Duration;
use tracing::{debug, warn};

/// Request/reply turn transport over NATS
///
/// Each session owns one inbox subscription; every turn is published to
/// `{turn_subject_prefix}.{session_id}` with that inbox as reply subject.
/// Replies carrying another sequence number are stale and skipped.
pub struct NatsTransport {
    client: Client,
    session_id: String,
    subject: String,
    inbox: String,
    replies: Subscriber,
    sequence: u64,
}

impl NatsTransport {
    pub(super) fn new(
        client: Client,
        session_id: String,
        subject: String,
        inbox: String,
        replies: Subscriber,
    ) -> Self {
        Self {
            client,
            session_id,
            subject,
            inbox,
            replies,
            sequence: 0,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

/// Wait for the reply to turn `sequence` on an inbox stream.
///
/// Stale and undecodable payloads are logged and skipped. `Closed` once the
/// stream ends.
pub async fn next_reply<S, P>(
    replies: &mut S,
    session_id: &str,
    sequence: u64,
) -> Result<TurnResponse, TurnError>
where
    S: Stream<Item = P> + Unpin,
    P: AsRef<[u8]>,
{
    while let Some(payload) = replies.next().await {
        let reply: TurnReplyMessage = match serde_json::from_slice(payload.as_ref()) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Dropping malformed reply for session {}: {}", session_id, e);
                continue;
            }
        };
        if reply.sequence != sequence {
            warn!(
                "Dropping stale reply for session {} (sequence {}, expected {})",
                session_id, reply.sequence, sequence
            );
            continue;
        }
        return Ok(reply.response);
    }

    Err(TurnError::Closed)
}

#[async_trait::async_trait]
impl TurnTransport for NatsTransport {
    async fn exchange(
        &mut self,
        descriptor: &InteractionDescriptor,
        deadline: Duration,
    ) -> Result<TurnResponse, TurnError> {
        self.sequence += 1;
        let sequence = self.sequence;

        let request = TurnRequestMessage {
            session_id: self.session_id.clone(),
            sequence,
            descriptor: descriptor.clone(),
            timeout_ms: deadline.as_millis() as u64,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let payload = serde_json::to_vec(&request)
            .map_err(|e| TurnError::Transport(format!("failed to encode turn: {}", e)))?;

        self.client
            .publish_with_reply(self.subject.clone(), self.inbox.clone(), payload.into())
            .await
            .map_err(|e| TurnError::Transport(e.to_string()))?;

        debug!(
            "Published turn {} ({}) to {}",
            sequence,
            descriptor.id(),
            self.subject
        );

        let mut payloads = self.replies.by_ref().map(|message| message.payload);
        next_reply(&mut payloads, &self.session_id, sequence).await
    }

    fn name(&self) -> &str {
        "nats"
    }
}
