// Integration tests for the HTTP session API
//
// Sessions started through the router get an in-process turn channel;
// the test plays the remote endpoint.

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tower::ServiceExt;
use voicemail_ivr::turn::{local_pair, RemoteEndpoint, TurnTransport};
use voicemail_ivr::http::Retention;
use voicemail_ivr::{create_router, AppState, SessionDriver, TransportFactory};

/// Hands each new session's remote endpoint to the test
struct LocalFactory {
    endpoints: mpsc::UnboundedSender<RemoteEndpoint>,
    /// Simulated connection setup time
    delay: Duration,
    fail: bool,
    opens: AtomicUsize,
}

impl LocalFactory {
    fn new(endpoints: mpsc::UnboundedSender<RemoteEndpoint>) -> Self {
        Self {
            endpoints,
            delay: Duration::ZERO,
            fail: false,
            opens: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl TransportFactory for LocalFactory {
    async fn open(&self, _session_id: &str) -> Result<Box<dyn TurnTransport>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.fail {
            anyhow::bail!("endpoint unreachable");
        }

        let (transport, remote) = local_pair();
        self.endpoints
            .send(remote)
            .map_err(|_| anyhow::anyhow!("test dropped the endpoint receiver"))?;
        Ok(Box::new(transport))
    }
}

type Endpoints = Arc<Mutex<mpsc::UnboundedReceiver<RemoteEndpoint>>>;

fn app() -> (Router, Endpoints) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = app_with(Arc::new(LocalFactory::new(tx)), Retention::default());
    (app, Arc::new(Mutex::new(rx)))
}

fn app_with(factory: Arc<LocalFactory>, retention: Retention) -> Router {
    let state = AppState::new(SessionDriver::default(), factory, "/prompts").with_retention(retention);
    create_router(state)
}

async fn call(app: &Router, method: &str, uri: &str, body: &str) -> Result<(StatusCode, serde_json::Value)> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))?;

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    Ok((status, json))
}

/// Poll until the session reports a final status
async fn wait_for_result(app: &Router, session_id: &str) -> Result<serde_json::Value> {
    for _ in 0..100 {
        let (status, json) = call(app, "GET", &format!("/sessions/{}", session_id), "").await?;
        assert_eq!(status, StatusCode::OK);
        if json["status"] != "running" {
            return Ok(json);
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    anyhow::bail!("session {} never finished", session_id)
}

#[tokio::test]
async fn test_health() -> Result<()> {
    let (app, _) = app();

    let request = Request::builder().uri("/health").body(Body::empty())?;
    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&bytes[..], b"OK");

    Ok(())
}

#[tokio::test]
async fn test_unknown_session() -> Result<()> {
    let (app, _) = app();

    let (status, json) = call(&app, "GET", "/sessions/nope", "").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("nope"));

    let (status, _) = call(&app, "POST", "/sessions/nope/cancel", "").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_session_runs_to_success() -> Result<()> {
    let (app, endpoints) = app();

    let (status, json) = call(&app, "POST", "/sessions", r#"{"session_id":"call-1"}"#).await?;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(json["session_id"], "call-1");
    assert_eq!(json["status"], "running");

    let (status, _) = call(&app, "POST", "/sessions", r#"{"session_id":"call-1"}"#).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let mut remote = endpoints.lock().await.recv().await.unwrap();
    for (id, digits) in [("ask-login", "4069"), ("ask-password", "6522"), ("main-menu", "#")] {
        let turn = remote.next_turn().await.unwrap();
        assert_eq!(turn.id(), id);
        turn.reply_dtmf(digits)?;
    }
    remote.next_turn().await.unwrap().no_input()?;

    let report = wait_for_result(&app, "call-1").await?;
    assert_eq!(report["session_id"], "call-1");
    assert_eq!(report["result"]["status"], "success");
    assert_eq!(report["turns"], 4);

    let (status, _) = call(&app, "POST", "/sessions/call-1/cancel", "").await?;
    assert_eq!(status, StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn test_cancel_running_session() -> Result<()> {
    let (app, endpoints) = app();

    let (status, json) = call(&app, "POST", "/sessions", "{}").await?;
    assert_eq!(status, StatusCode::ACCEPTED);
    let session_id = json["session_id"].as_str().unwrap().to_string();
    assert!(session_id.starts_with("session-"));

    let mut remote = endpoints.lock().await.recv().await.unwrap();
    let pending = remote.next_turn().await.unwrap();
    assert_eq!(pending.id(), "ask-login");

    let (status, json) = call(&app, "POST", &format!("/sessions/{}/cancel", session_id), "").await?;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(json["status"], "cancelling");

    let report = wait_for_result(&app, &session_id).await?;
    assert_eq!(report["result"]["status"], "interrupted");
    drop(pending);

    Ok(())
}

#[tokio::test]
async fn test_concurrent_duplicate_start() -> Result<()> {
    let (tx, _rx) = mpsc::unbounded_channel();
    let factory = Arc::new(LocalFactory {
        delay: Duration::from_millis(50),
        ..LocalFactory::new(tx)
    });
    let app = app_with(factory.clone(), Retention::default());

    let body = r#"{"session_id":"dup"}"#;
    let (first, second) = tokio::join!(
        call(&app, "POST", "/sessions", body),
        call(&app, "POST", "/sessions", body)
    );

    let mut statuses = vec![first?.0, second?.0];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::ACCEPTED, StatusCode::CONFLICT]);
    assert_eq!(factory.opens.load(Ordering::SeqCst), 1, "only one session started");

    Ok(())
}

#[tokio::test]
async fn test_failed_open_releases_id() -> Result<()> {
    let (tx, _rx) = mpsc::unbounded_channel();
    let factory = Arc::new(LocalFactory {
        fail: true,
        ..LocalFactory::new(tx)
    });
    let app = app_with(factory.clone(), Retention::default());

    let (status, json) = call(&app, "POST", "/sessions", r#"{"session_id":"call-1"}"#).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("endpoint unreachable"));

    let (status, _) = call(&app, "GET", "/sessions/call-1", "").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The id can be retried
    let (status, _) = call(&app, "POST", "/sessions", r#"{"session_id":"call-1"}"#).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(factory.opens.load(Ordering::SeqCst), 2);

    Ok(())
}

#[tokio::test]
async fn test_invalid_session_id_rejected() -> Result<()> {
    let (tx, _rx) = mpsc::unbounded_channel();
    let factory = Arc::new(LocalFactory::new(tx));
    let app = app_with(factory.clone(), Retention::default());

    for id in ["two words", "ivr.>", "*", ""] {
        let body = serde_json::json!({ "session_id": id }).to_string();
        let (status, json) = call(&app, "POST", "/sessions", &body).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "id {:?}", id);
        assert!(json["error"].as_str().unwrap().contains("Invalid session id"));
    }
    assert_eq!(factory.opens.load(Ordering::SeqCst), 0);

    Ok(())
}

#[tokio::test]
async fn test_finished_sessions_are_pruned() -> Result<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut endpoints = rx;
    let app = app_with(
        Arc::new(LocalFactory::new(tx)),
        Retention {
            ttl: Duration::from_secs(600),
            max_finished: 1,
        },
    );

    for id in ["call-1", "call-2"] {
        let body = serde_json::json!({ "session_id": id }).to_string();
        let (status, _) = call(&app, "POST", "/sessions", &body).await?;
        assert_eq!(status, StatusCode::ACCEPTED);

        let mut remote = endpoints.recv().await.unwrap();
        remote.next_turn().await.unwrap().hang_up()?;

        let report = wait_for_result(&app, id).await?;
        assert_eq!(report["result"]["status"], "error");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let (status, _) = call(&app, "GET", "/sessions/call-1", "").await?;
    assert_eq!(status, StatusCode::NOT_FOUND, "oldest finished session evicted");

    let (status, json) = call(&app, "GET", "/sessions/call-2", "").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["session_id"], "call-2");

    Ok(())
}
