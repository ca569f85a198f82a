use crate::session::{SessionDriver, SessionReport};
use crate::turn::TurnTransport;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Opens turn transports for new sessions and receives their final reports
#[async_trait::async_trait]
pub trait TransportFactory: Send + Sync {
    async fn open(&self, session_id: &str) -> Result<Box<dyn TurnTransport>>;

    /// Called once per session after it ends
    async fn publish_result(&self, _report: &SessionReport) -> Result<()> {
        Ok(())
    }
}

/// Registry entry for one session started over HTTP
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub cancel: CancellationToken,
    pub started_at: DateTime<Utc>,
    /// Set once the session task finishes
    pub report: Option<SessionReport>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl SessionHandle {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            started_at: Utc::now(),
            report: None,
            finished_at: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.report.is_none()
    }

    pub fn finish(&mut self, report: SessionReport) {
        self.report = Some(report);
        self.finished_at = Some(Utc::now());
    }
}

/// How long finished sessions stay queryable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retention {
    /// Finished sessions older than this are dropped
    pub ttl: Duration,
    /// At most this many finished sessions are kept; oldest go first
    pub max_finished: usize,
}

impl Default for Retention {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(600),
            max_finished: 1000,
        }
    }
}

impl Retention {
    /// Drop finished sessions past the TTL or beyond the cap. Running sessions are kept.
    pub fn prune(&self, sessions: &mut HashMap<String, SessionHandle>, now: DateTime<Utc>) {
        // A TTL too large for chrono never expires anything
        if let Ok(ttl) = chrono::Duration::from_std(self.ttl) {
            sessions.retain(|_, handle| match handle.finished_at {
                Some(finished_at) => now.signed_duration_since(finished_at) <= ttl,
                None => true,
            });
        }

        let mut finished: Vec<(DateTime<Utc>, String)> = sessions
            .iter()
            .filter_map(|(id, handle)| handle.finished_at.map(|at| (at, id.clone())))
            .collect();
        if finished.len() <= self.max_finished {
            return;
        }

        finished.sort();
        let excess = finished.len() - self.max_finished;
        for (_, id) in finished.into_iter().take(excess) {
            sessions.remove(&id);
        }
    }
}

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Sessions started through the API (session_id → handle)
    pub sessions: Arc<RwLock<HashMap<String, SessionHandle>>>,

    pub driver: Arc<SessionDriver>,

    pub transports: Arc<dyn TransportFactory>,

    /// Prompt base path for sessions that don't supply one
    pub base_path: String,

    pub retention: Retention,
}

impl AppState {
    pub fn new(
        driver: SessionDriver,
        transports: Arc<dyn TransportFactory>,
        base_path: impl Into<String>,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            driver: Arc::new(driver),
            transports,
            base_path: base_path.into(),
            retention: Retention::default(),
        }
    }

    pub fn with_retention(mut self, retention: Retention) -> Self {
        self.retention = retention;
        self
    }
}
