use super::channel::{TurnError, TurnTransport};
use super::descriptor::InteractionDescriptor;
use super::dtmf;
use super::response::{ControlEvent, TurnResponse};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// A turn waiting for the remote side to answer
#[derive(Debug)]
pub struct TurnRequest {
    descriptor: InteractionDescriptor,
    deadline: Duration,
    reply: oneshot::Sender<TurnResponse>,
}

impl TurnRequest {
    pub fn descriptor(&self) -> &InteractionDescriptor {
        &self.descriptor
    }

    pub fn id(&self) -> &str {
        self.descriptor.id()
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Answer the turn. Fails with `Closed` if the session stopped waiting.
    pub fn reply(self, response: TurnResponse) -> Result<(), TurnError> {
        self.reply.send(response).map_err(|_| TurnError::Closed)
    }

    pub fn reply_dtmf(self, digits: &str) -> Result<(), TurnError> {
        self.reply(TurnResponse::dtmf(digits))
    }

    pub fn reply_event(self, event: ControlEvent) -> Result<(), TurnError> {
        self.reply(TurnResponse::event(event))
    }

    pub fn no_input(self) -> Result<(), TurnError> {
        self.reply_event(ControlEvent::no_input())
    }

    pub fn no_match(self) -> Result<(), TurnError> {
        self.reply_event(ControlEvent::no_match())
    }

    pub fn hang_up(self) -> Result<(), TurnError> {
        self.reply_event(ControlEvent::hangup())
    }

    /// Answer with an empty recording of the given length
    pub fn reply_recording(self, duration: Duration) -> Result<(), TurnError> {
        let mime_type = self
            .descriptor
            .recording()
            .map(|r| r.mime_type.clone())
            .unwrap_or_else(|| "audio/x-wav".to_string());
        self.reply(TurnResponse::Recording {
            audio_bytes: Vec::new(),
            mime_type,
            duration,
            termination_digit: Some('#'),
        })
    }
}

/// Session side of an in-process turn channel
pub struct LocalTransport {
    requests: mpsc::Sender<TurnRequest>,
}

/// Remote side of an in-process turn channel
pub struct RemoteEndpoint {
    requests: mpsc::Receiver<TurnRequest>,
}

impl RemoteEndpoint {
    /// Next prompt sent by the session, or `None` once the session is gone
    pub async fn next_turn(&mut self) -> Option<TurnRequest> {
        self.requests.recv().await
    }

    /// Non-blocking check used to assert that nothing more was sent
    pub fn try_next_turn(&mut self) -> Option<TurnRequest> {
        self.requests.try_recv().ok()
    }
}

/// Create a connected transport/endpoint pair
pub fn local_pair() -> (LocalTransport, RemoteEndpoint) {
    // One outstanding turn at a time per session
    let (tx, rx) = mpsc::channel(1);
    (LocalTransport { requests: tx }, RemoteEndpoint { requests: rx })
}

#[async_trait::async_trait]
impl TurnTransport for LocalTransport {
    async fn exchange(
        &mut self,
        descriptor: &InteractionDescriptor,
        deadline: Duration,
    ) -> Result<TurnResponse, TurnError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let request = TurnRequest {
            descriptor: descriptor.clone(),
            deadline,
            reply: reply_tx,
        };

        self.requests
            .send(request)
            .await
            .map_err(|_| TurnError::Closed)?;

        reply_rx.await.map_err(|_| TurnError::Closed)
    }

    fn name(&self) -> &str {
        "local"
    }
}

/// Parse one scripted caller answer.
///
/// Accepted forms: `noinput`, `nomatch`, `hangup`, `error` or
/// `error:<category>`, `record` or `record:<seconds>`, or a DTMF digit
/// string. Returns `None` for anything else.
pub fn parse_answer(answer: &str) -> Option<TurnResponse> {
    let answer = answer.trim();
    let (word, arg) = match answer.split_once(':') {
        Some((word, arg)) => (word, Some(arg.trim())),
        None => (answer, None),
    };

    match word.to_ascii_lowercase().as_str() {
        "noinput" => Some(TurnResponse::event(ControlEvent::no_input())),
        "nomatch" => Some(TurnResponse::event(ControlEvent::no_match())),
        "hangup" => Some(TurnResponse::event(ControlEvent::hangup())),
        "error" => {
            let category = arg.filter(|c| !c.is_empty()).unwrap_or("error");
            Some(TurnResponse::event(ControlEvent::platform_error(
                category,
                "scripted platform error",
            )))
        }
        "record" => {
            let secs = arg.and_then(|s| s.parse::<u64>().ok()).unwrap_or(5);
            Some(TurnResponse::Recording {
                audio_bytes: Vec::new(),
                mime_type: "audio/x-wav".to_string(),
                duration: Duration::from_secs(secs),
                termination_digit: Some('#'),
            })
        }
        _ if !answer.is_empty() && answer.chars().all(dtmf::is_dtmf_digit) => {
            Some(TurnResponse::dtmf(answer))
        }
        _ => None,
    }
}
