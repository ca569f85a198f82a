use super::messages::SessionResultMessage;
use super::transport::NatsTransport;
use crate::config::NatsConfig;
use crate::http::TransportFactory;
use crate::session::SessionReport;
use crate::turn::TurnTransport;
use anyhow::{Context, Result};
use async_nats::Client;
use tracing::info;

#[derive(Clone)]
pub struct NatsClient {
    client: Client,
    turn_subject_prefix: String,
    result_subject_prefix: String,
}

impl NatsClient {
    /// Connect to NATS server
    pub async fn connect(config: &NatsConfig) -> Result<Self> {
        info!("Connecting to NATS at {}", config.url);

        let client = async_nats::connect(config.url.as_str())
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self {
            client,
            turn_subject_prefix: config.turn_subject_prefix.clone(),
            result_subject_prefix: config.result_subject_prefix.clone(),
        })
    }

    pub fn turn_subject(&self, session_id: &str) -> String {
        format!("{}.{}", self.turn_subject_prefix, session_id)
    }

    pub fn result_subject(&self, session_id: &str) -> String {
        format!("{}.{}", self.result_subject_prefix, session_id)
    }

    /// Subscribe to a private inbox and return a transport bound to `session_id`
    pub async fn open_transport(&self, session_id: &str) -> Result<NatsTransport> {
        let inbox = self.client.new_inbox();
        let replies = self
            .client
            .subscribe(inbox.clone())
            .await
            .context("Failed to subscribe to turn replies")?;

        let subject = self.turn_subject(session_id);
        info!("Session {} exchanging turns on {}", session_id, subject);

        Ok(NatsTransport::new(
            self.client.clone(),
            session_id.to_string(),
            subject,
            inbox,
            replies,
        ))
    }

    /// Publish the final session outcome
    pub async fn publish_result(&self, report: &SessionReport) -> Result<()> {
        let subject = self.result_subject(&report.session_id);
        let payload = serde_json::to_vec(&SessionResultMessage::from(report))?;

        self.client
            .publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish session result")?;

        info!(
            "Published result to {} (status={:?}, turns={})",
            subject,
            report.result.status(),
            report.turns
        );

        Ok(())
    }

    /// Subscribe to every session's turn requests (used by remote endpoints)
    pub async fn subscribe_turns(&self) -> Result<async_nats::Subscriber> {
        let subject = format!("{}.>", self.turn_subject_prefix);

        info!("Subscribing to turn requests on {}", subject);

        self.client
            .subscribe(subject)
            .await
            .context("Failed to subscribe to turn requests")
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait::async_trait]
impl TransportFactory for NatsClient {
    async fn open(&self, session_id: &str) -> Result<Box<dyn TurnTransport>> {
        let transport = self.open_transport(session_id).await?;
        Ok(Box::new(transport))
    }

    async fn publish_result(&self, report: &SessionReport) -> Result<()> {
        NatsClient::publish_result(self, report).await
    }
}
