use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use voicemail_ivr::turn::{local_pair, parse_answer, PromptItem, RemoteEndpoint};
use voicemail_ivr::{create_router, AppState, Config, NatsClient, SessionStart};

#[derive(Parser)]
#[command(name = "voicemail-ivr")]
#[command(about = "Voicemail IVR dialogue engine")]
struct Args {
    /// Configuration file (extension optional)
    #[arg(short, long, default_value = "config/voicemail-ivr")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API; session turns go over NATS
    Serve,

    /// Run one session in the terminal, answering each prompt from stdin
    Console {
        /// Value of the caller attribute (selects the prompt variant)
        #[arg(long)]
        caller: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("Voicemail IVR v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);

    match args.command {
        Command::Serve => serve(cfg).await,
        Command::Console { caller } => console(cfg, caller).await,
    }
}

async fn serve(cfg: Config) -> Result<()> {
    let nats = NatsClient::connect(&cfg.nats).await?;
    let state = AppState::new(
        cfg.session_driver(),
        Arc::new(nats),
        cfg.prompts.base_path.clone(),
    )
    .with_retention(cfg.service.http.retention());

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, create_router(state))
        .await
        .context("HTTP server failed")
}

async fn console(cfg: Config, caller: Option<String>) -> Result<()> {
    let (transport, remote) = local_pair();

    let mut start = SessionStart {
        base_path: cfg.prompts.base_path.clone(),
        ..SessionStart::default()
    };
    if let Some(caller) = caller {
        start = start.with_attribute(cfg.prompts.caller_attribute.clone(), caller);
    }

    let driver = cfg.session_driver();
    let session = tokio::spawn(async move {
        driver
            .run_report(start, Box::new(transport), CancellationToken::new())
            .await
    });

    answer_from_stdin(remote).await?;

    let report = session.await.context("Session task failed")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Print each prompt and reply with the next stdin line; EOF hangs up
async fn answer_from_stdin(mut remote: RemoteEndpoint) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(turn) = remote.next_turn().await {
        let prompt: Vec<String> = turn
            .descriptor()
            .prompt()
            .iter()
            .map(|item| match item {
                PromptItem::SynthesizedText(text) => format!("\"{}\"", text),
                PromptItem::AudioSegment(path) => format!("<{}>", path),
                PromptItem::ReplayRecording(location) => format!("<replay {}>", location),
            })
            .collect();
        stdout
            .write_all(format!("[{}] {} > ", turn.id(), prompt.join(" ")).as_bytes())
            .await?;
        stdout.flush().await?;

        let response = loop {
            match lines.next_line().await? {
                None => break None,
                Some(line) => match parse_answer(&line) {
                    Some(response) => break Some(response),
                    None => {
                        stdout
                            .write_all(
                                b"digits, noinput, nomatch, hangup, error[:category] or record[:secs] > ",
                            )
                            .await?;
                        stdout.flush().await?;
                    }
                },
            }
        };

        let sent = match response {
            Some(response) => turn.reply(response),
            None => {
                info!("stdin closed, hanging up");
                turn.hang_up()
            }
        };
        if let Err(e) = sent {
            warn!("Session stopped listening: {}", e);
        }
    }

    Ok(())
}
