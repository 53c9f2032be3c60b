//! HTTP routes
//!
//! - `/api/health`: service status
//! - `/api/retell/*`: thin proxy over the Retell voice API
//! - `/api/triage/*`: stateless classification and live call sessions

use crate::error::{ApiError, ApiResult};
use crate::retell::WebCallCredentials;
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use triage::{Assessment, SessionSnapshot, SessionTriageState, TranscriptEntry};

type AppStateArc = Arc<AppState>;

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/api/health", get(health_check))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthServices {
    pub retell: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub services: HealthServices,
    pub uptime_seconds: u64,
    pub active_sessions: usize,
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    let retell = if state.provider.is_configured() {
        "configured"
    } else {
        "missing"
    };
    Json(HealthResponse {
        status: "ok".into(),
        timestamp: Utc::now().to_rfc3339(),
        services: HealthServices {
            retell: retell.into(),
        },
        uptime_seconds: state.start_time.elapsed().as_secs(),
        active_sessions: state.sessions.len().await,
    })
}

// ============================================================================
// Retell Routes
// ============================================================================

pub fn retell_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/retell/create-web-call", post(create_web_call))
        .route("/api/retell/process-call", post(process_call))
        .route("/api/retell/webhook", post(webhook))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWebCallRequest {
    #[serde(default)]
    pub agent_id: Option<String>,
}

async fn create_web_call(
    State(state): State<AppStateArc>,
    body: Option<Json<CreateWebCallRequest>>,
) -> ApiResult<Json<WebCallCredentials>> {
    if !state.provider.is_configured() {
        return Err(ApiError::not_configured(
            "RETELL_API_KEY is not configured on the server.",
        ));
    }

    // A blank agentId in the body falls through to the configured default
    let agent_id = body
        .and_then(|Json(b)| b.agent_id)
        .filter(|id| !id.trim().is_empty())
        .or_else(|| state.default_agent_id.clone())
        .filter(|id| !id.trim().is_empty())
        .ok_or(ApiError::MissingAgentId)?;

    let credentials = state.provider.create_web_call(&agent_id).await?;
    info!(call_id = %credentials.call_id, agent_id = %credentials.agent_id, "Web call created");
    Ok(Json(credentials))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessCallRequest {
    #[serde(default)]
    pub call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessCallResponse {
    pub success: bool,
    pub call_id: String,
    pub status: Option<String>,
    /// Whole seconds, null while the call has no end timestamp
    pub duration: Option<i64>,
    pub transcript: Option<String>,
    /// Triage computed from the finished transcript
    pub triage: Option<SessionTriageState>,
}

async fn process_call(
    State(state): State<AppStateArc>,
    body: Option<Json<ProcessCallRequest>>,
) -> ApiResult<Json<ProcessCallResponse>> {
    if !state.provider.is_configured() {
        return Err(ApiError::not_configured("RETELL_API_KEY not configured"));
    }
    let call_id = body
        .and_then(|Json(b)| b.call_id)
        .filter(|id| !id.trim().is_empty())
        .ok_or(ApiError::MissingCallId)?;

    let call = state.provider.get_call(&call_id).await?;
    let triage = call
        .transcript_entries()
        .map(|entries| state.engine.ingest_transcript(&SessionTriageState::idle(), &entries));

    if let Some(t) = &triage {
        info!(
            call_id = %call_id,
            level = %t.triage_level,
            score = t.urgency_score,
            "Processed call"
        );
    }

    Ok(Json(ProcessCallResponse {
        success: true,
        duration: call.duration_secs(),
        status: call.call_status,
        transcript: call.transcript,
        call_id,
        triage,
    }))
}

/// Events after which a call's live session is no longer needed
const CALL_FINISHED_EVENTS: &[&str] = &["call_ended", "call_analyzed"];

/// Always acknowledges, even when the body is missing or not JSON
async fn webhook(
    State(state): State<AppStateArc>,
    body: Option<Json<serde_json::Value>>,
) -> Json<serde_json::Value> {
    let event = body.map(|Json(v)| v).unwrap_or_default();
    let name = event.get("event").and_then(|v| v.as_str()).unwrap_or("");
    let call_id = event
        .get("call")
        .and_then(|c| c.get("call_id"))
        .and_then(|v| v.as_str());
    info!(event = name, call_id = ?call_id, "Retell webhook");

    if let Some(call_id) = call_id {
        if CALL_FINISHED_EVENTS.contains(&name) {
            let ended = state.sessions.end_by_call(call_id).await;
            if !ended.is_empty() {
                info!(call_id, count = ended.len(), "Discarded sessions for finished call");
            }
        }
    }

    Json(serde_json::json!({ "received": true }))
}

// ============================================================================
// Triage Routes
// ============================================================================

pub fn triage_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/triage/classify", post(classify))
        .route("/api/triage/sessions", post(create_session))
        .route(
            "/api/triage/sessions/:id",
            get(get_session).delete(end_session),
        )
        .route("/api/triage/sessions/:id/transcript", put(replace_transcript))
        .route("/api/triage/sessions/:id/fragments", post(push_fragment))
}

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub text: String,
}

async fn classify(
    State(state): State<AppStateArc>,
    Json(req): Json<ClassifyRequest>,
) -> Json<Assessment> {
    Json(state.engine.assess(&req.text))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub call_id: Option<String>,
}

async fn create_session(
    State(state): State<AppStateArc>,
    body: Option<Json<CreateSessionRequest>>,
) -> (StatusCode, Json<SessionSnapshot>) {
    let call_id = body
        .and_then(|Json(b)| b.call_id)
        .filter(|id| !id.trim().is_empty());
    let snapshot = state.sessions.create(call_id).await;
    (StatusCode::CREATED, Json(snapshot))
}

async fn get_session(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionSnapshot>> {
    state.sessions.get(&id).await.map(Json)
}

#[derive(Debug, Deserialize)]
pub struct TranscriptUpdate {
    pub transcript: Vec<TranscriptEntry>,
}

async fn replace_transcript(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
    Json(update): Json<TranscriptUpdate>,
) -> ApiResult<Json<SessionSnapshot>> {
    let engine = &state.engine;
    state
        .sessions
        .update(&id, |session| {
            session.replace_transcript(engine, update.transcript);
        })
        .await
        .map(Json)
}

async fn push_fragment(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
    Json(entry): Json<TranscriptEntry>,
) -> ApiResult<Json<SessionSnapshot>> {
    if entry.text.trim().is_empty() {
        warn!(session = %id, "Ignoring empty transcript fragment");
        return Err(ApiError::bad_request("text must not be empty"));
    }
    let engine = &state.engine;
    state
        .sessions
        .update(&id, |session| {
            session.push(engine, entry);
        })
        .await
        .map(Json)
}

async fn end_session(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.sessions.end(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
