use super::descriptor::InteractionDescriptor;
use super::response::TurnResponse;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Slack added on top of a turn's own response window
pub const DEFAULT_TURN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TurnError {
    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("session interrupted")]
    Interrupted,

    #[error("remote endpoint closed the turn channel")]
    Closed,

    #[error("transport failure: {0}")]
    Transport(String),
}

/// One raw exchange with the remote endpoint
///
/// Implementations:
/// - `LocalTransport`: in-process channel pair (tests, console)
/// - `NatsTransport`: request/reply over NATS subjects
#[async_trait::async_trait]
pub trait TurnTransport: Send {
    /// Send the descriptor and wait for whatever the remote side answers
    async fn exchange(
        &mut self,
        descriptor: &InteractionDescriptor,
        deadline: Duration,
    ) -> Result<TurnResponse, TurnError>;

    /// Transport name for logging
    fn name(&self) -> &str;
}

/// Turn channel owned by one session
///
/// Wraps a transport with the per-turn deadline and the session's
/// cancellation token. Exactly one exchange happens per `execute` call.
pub struct TurnChannel {
    transport: Box<dyn TurnTransport>,
    cancel: CancellationToken,
    grace: Duration,
    turns: u64,
    last_interaction: Option<String>,
}

impl TurnChannel {
    pub fn new(transport: Box<dyn TurnTransport>, cancel: CancellationToken) -> Self {
        Self {
            transport,
            cancel,
            grace: DEFAULT_TURN_GRACE,
            turns: 0,
            last_interaction: None,
        }
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Number of exchanges started on this channel
    pub fn turns(&self) -> u64 {
        self.turns
    }

    /// Id of the most recently sent descriptor
    pub fn last_interaction(&self) -> Option<&str> {
        self.last_interaction.as_deref()
    }

    /// Deadline for a turn: the override, or the descriptor's response window plus grace
    pub fn deadline_for(&self, descriptor: &InteractionDescriptor, timeout: Option<Duration>) -> Duration {
        timeout.unwrap_or_else(|| descriptor.response_window() + self.grace)
    }

    pub async fn execute(
        &mut self,
        descriptor: &InteractionDescriptor,
        timeout: Option<Duration>,
    ) -> Result<TurnResponse, TurnError> {
        if self.cancel.is_cancelled() {
            return Err(TurnError::Interrupted);
        }

        let deadline = self.deadline_for(descriptor, timeout);
        self.turns += 1;
        self.last_interaction = Some(descriptor.id().to_string());
        debug!(
            "Turn {} via {}: sending {} (deadline {:?})",
            self.turns,
            self.transport.name(),
            descriptor.id(),
            deadline
        );

        let cancel = self.cancel.clone();
        let exchange = self.transport.exchange(descriptor, deadline);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Turn {} interrupted while waiting on {}", self.turns, descriptor.id());
                Err(TurnError::Interrupted)
            }
            outcome = tokio::time::timeout(deadline, exchange) => match outcome {
                Ok(Ok(response)) => {
                    debug!("Turn {} answered with {}", self.turns, response.kind());
                    Ok(response)
                }
                Ok(Err(e)) => {
                    warn!("Turn {} failed on {}: {}", self.turns, descriptor.id(), e);
                    Err(e)
                }
                Err(_) => {
                    warn!("Turn {} timed out on {} after {:?}", self.turns, descriptor.id(), deadline);
                    Err(TurnError::Timeout(deadline))
                }
            },
        }
    }
}
