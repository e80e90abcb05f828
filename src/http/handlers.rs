use super::error::ApiError;
use super::sse::{caption_event, notes_event};
use super::state::AppState;
use crate::audio::VadLevel;
use crate::ingest::{AudioPayload, Degraded, IngestRequest};
use crate::notes::{GradeLevel, NotesParams, SubjectMode};
use crate::session::Admission;
use crate::transcribe::LanguageHint;
use axum::{
    body::Bytes,
    extract::{Query, State},
    response::{
        sse::{Event, Sse},
        IntoResponse, Json, Response,
    },
};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tracing::info;

/// Longest accepted session identifier
const MAX_SESSION_ID_LEN: usize = 128;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    /// Report a single session instead of overall occupancy
    pub session: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReserveQuery {
    /// Optional session ID (if not provided, generate UUID)
    pub session: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IngestQuery {
    pub session: Option<String>,

    /// ISO code or class name; `auto` when absent
    pub lang: Option<String>,

    /// Energy gate sensitivity 0-3
    pub vad: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct NotesQuery {
    pub session: Option<String>,
    pub mode: Option<String>,
    pub grade: Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ReserveResponse {
    pub session: String,

    #[serde(flatten)]
    pub admission: Admission,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub ok: bool,
    pub partial: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<Degraded>,
}

fn session_id(raw: Option<&str>) -> Result<String, ApiError> {
    let id = raw.unwrap_or_default().trim();
    if id.is_empty() {
        return Err(ApiError::BadRequest("session is required".to_string()));
    }
    if id.len() > MAX_SESSION_ID_LEN {
        return Err(ApiError::BadRequest(format!(
            "session must be at most {} characters",
            MAX_SESSION_ID_LEN
        )));
    }
    Ok(id.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(OkResponse { ok: true })
}

/// GET /status?session=
/// Active sessions, capacity and queue length, or one session's stats
pub async fn status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Response, ApiError> {
    let Some(raw) = query.session.as_deref() else {
        return Ok(Json(state.sessions.stats().await).into_response());
    };

    let session = session_id(Some(raw))?;
    match state.sessions.session_stats(&session).await {
        Some(stats) => Ok(Json(stats).into_response()),
        None => Err(ApiError::NotFound(format!("session {} is not active", session))),
    }
}

/// POST /reserve?session=
/// Claim a slot or a place in the waiting queue
pub async fn reserve(
    State(state): State<AppState>,
    Query(query): Query<ReserveQuery>,
) -> Result<Json<ReserveResponse>, ApiError> {
    let session = match query.session.as_deref() {
        Some(raw) => session_id(Some(raw))?,
        None => uuid::Uuid::new_v4().to_string(),
    };

    let admission = state.sessions.reserve(&session).await;

    Ok(Json(ReserveResponse { session, admission }))
}

/// POST /ingest?session=&lang=&vad=
/// Transcribe an encoded audio chunk (webm/opus, ogg, wav, ...)
pub async fn ingest(
    State(state): State<AppState>,
    Query(query): Query<IngestQuery>,
    body: Bytes,
) -> Result<Json<IngestResponse>, ApiError> {
    ingest_payload(state, query, AudioPayload::Container(body.to_vec())).await
}

/// POST /ingest-raw?session=&lang=&vad=
/// Transcribe raw s16le 16 kHz mono PCM
pub async fn ingest_raw(
    State(state): State<AppState>,
    Query(query): Query<IngestQuery>,
    body: Bytes,
) -> Result<Json<IngestResponse>, ApiError> {
    if !state.config.audio.allow_raw_ingest {
        return Err(ApiError::NotFound("raw PCM ingest is disabled".to_string()));
    }

    ingest_payload(state, query, AudioPayload::RawPcm(body.to_vec())).await
}

async fn ingest_payload(
    state: AppState,
    query: IngestQuery,
    payload: AudioPayload,
) -> Result<Json<IngestResponse>, ApiError> {
    let request = IngestRequest {
        session_id: session_id(query.session.as_deref())?,
        payload,
        language: query
            .lang
            .as_deref()
            .map(LanguageHint::from_param)
            .unwrap_or_default(),
        vad: query.vad.map(VadLevel::new).unwrap_or_default(),
    };

    let outcome = state.ingestor.ingest(request).await?;

    Ok(Json(IngestResponse {
        ok: true,
        partial: outcome.text,
        degraded: outcome.degraded,
    }))
}

/// POST /keepalive?session=
pub async fn keepalive(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<OkResponse>, ApiError> {
    let session = session_id(query.session.as_deref())?;
    state.sessions.touch(&session).await;

    Ok(Json(OkResponse { ok: true }))
}

/// POST /end?session=
/// End a session (or leave the queue) and free its slot
pub async fn end_session(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<OkResponse>, ApiError> {
    let session = session_id(query.session.as_deref())?;
    info!("Ending session: {}", session);
    state.sessions.remove(&session).await;

    Ok(Json(OkResponse { ok: true }))
}

/// GET /captions?session=
/// Server-sent caption stream
pub async fn captions(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let session = session_id(query.session.as_deref())?;
    info!("Caption stream opened for {}", session);

    let events = state
        .broadcaster
        .captions(session)
        .map(|event| Ok(caption_event(event)));

    Ok(Sse::new(events))
}

/// GET /notes?session=&mode=&grade=
/// Server-sent notes stream
pub async fn notes(
    State(state): State<AppState>,
    Query(query): Query<NotesQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let session = session_id(query.session.as_deref())?;
    let params = NotesParams {
        mode: query
            .mode
            .as_deref()
            .map(SubjectMode::from_param)
            .unwrap_or_default(),
        grade: query.grade.map(GradeLevel::new).unwrap_or_default(),
    };
    info!("Notes stream opened for {} ({} mode)", session, params.mode);

    let events = state
        .broadcaster
        .notes(session, params)
        .map(|event| Ok(notes_event(event)));

    Ok(Sse::new(events))
}
