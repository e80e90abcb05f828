//! HTTP API for the web client
//!
//! This module exposes the session core over HTTP:
//! - POST /reserve - Claim a slot or a place in the queue
//! - POST /ingest, /ingest-raw - Upload an audio chunk
//! - POST /keepalive, /end - Keep a session alive or end it
//! - GET /captions, /notes - Server-sent live feeds
//! - GET /status, /health - Occupancy (or one session) and health check

mod error;
mod handlers;
mod routes;
mod sse;
mod state;

pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;
pub use state::AppState;
