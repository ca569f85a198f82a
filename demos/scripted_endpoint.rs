// Demo: remote endpoint answering voicemail turns over NATS from a script
//
// Every session gets the same scripted answers in order; once the script
// runs out the endpoint hangs up.
//
// Usage:
//   cargo run -- serve
//   cargo run --example scripted_endpoint -- --answers 4069,6522,0,3,record,1,#
//   curl -X POST localhost:8088/sessions -H 'content-type: application/json' -d '{}'

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use std::collections::HashMap;
use tracing::{info, warn, Level};
use voicemail_ivr::config::NatsConfig;
use voicemail_ivr::turn::{parse_answer, ControlEvent, TurnResponse};
use voicemail_ivr::{NatsClient, TurnReplyMessage, TurnRequestMessage};

#[derive(Parser)]
#[command(name = "scripted_endpoint")]
#[command(about = "Answer voicemail turns from a fixed script")]
struct Args {
    /// Comma-separated answers (digits, noinput, nomatch, hangup, error[:cat], record[:secs])
    #[arg(short, long, default_value = "4069,6522,#")]
    answers: String,

    /// NATS server URL
    #[arg(short, long, default_value = "nats://localhost:4222")]
    nats_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let args = Args::parse();
    let script = args
        .answers
        .split(',')
        .map(|answer| {
            parse_answer(answer).with_context(|| format!("Unrecognized answer: {}", answer))
        })
        .collect::<Result<Vec<TurnResponse>>>()?;

    info!("Loaded {} scripted answers", script.len());

    let nats = NatsClient::connect(&NatsConfig {
        url: args.nats_url,
        ..NatsConfig::default()
    })
    .await?;
    let mut turns = nats.subscribe_turns().await?;
    let mut positions: HashMap<String, usize> = HashMap::new();

    while let Some(message) = turns.next().await {
        let request: TurnRequestMessage = match serde_json::from_slice(&message.payload) {
            Ok(r) => r,
            Err(e) => {
                warn!("Ignoring malformed turn request: {}", e);
                continue;
            }
        };
        let Some(reply_to) = message.reply else {
            warn!("Turn {} has no reply subject", request.sequence);
            continue;
        };

        let position = positions.entry(request.session_id.clone()).or_insert(0);
        let response = script
            .get(*position)
            .cloned()
            .unwrap_or_else(|| TurnResponse::event(ControlEvent::hangup()));
        *position += 1;

        info!(
            "Session {} turn {} ({}) -> {}",
            request.session_id,
            request.sequence,
            request.descriptor.id(),
            response.kind()
        );

        let reply = TurnReplyMessage {
            session_id: request.session_id,
            sequence: request.sequence,
            response,
        };
        nats.inner()
            .publish(reply_to, serde_json::to_vec(&reply)?.into())
            .await
            .context("Failed to publish turn reply")?;
    }

    Ok(())
}
