//! HTTP API for starting and inspecting voicemail sessions
//!
//! - POST /sessions - Start a session over the configured turn transport
//! - GET /sessions/:id - `running`, or the final session report
//! - POST /sessions/:id/cancel - Interrupt a running session
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::StartSessionRequest;
pub use routes::create_router;
pub use state::{AppState, Retention, SessionHandle, TransportFactory};
