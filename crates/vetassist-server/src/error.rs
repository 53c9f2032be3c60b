//! API error taxonomy.
//!
//! Every handler returns `Result<_, ApiError>`. Each variant maps to one HTTP
//! status and renders as `{"error": ..., "details": ...}` so the dashboard can
//! show the message verbatim.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias for handlers and upstream clients
pub type ApiResult<T> = Result<T, ApiError>;

/// JSON error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    /// A required server-side credential is absent
    #[error("{message}")]
    NotConfigured { message: String },

    /// Neither the request nor the server config names an agent
    #[error("No agent ID provided. Pass agentId in the request body or set RETELL_AGENT_ID.")]
    MissingAgentId,

    #[error("callId is required")]
    MissingCallId,

    /// Retell answered with a non-success status
    #[error("Retell API error: {status}")]
    Upstream { status: u16, body: String },

    /// Request never completed (connect, timeout, TLS)
    #[error("Upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Retell answered 2xx with a body we could not read
    #[error("Unexpected upstream response: {message}")]
    Decode { message: String },

    #[error("Triage session not found: {id}")]
    SessionNotFound { id: String },

    #[error("{message}")]
    BadRequest { message: String },
}

impl ApiError {
    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::NotConfigured {
            message: message.into(),
        }
    }

    pub fn session_not_found(id: impl Into<String>) -> Self {
        Self::SessionNotFound { id: id.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotConfigured { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingAgentId | Self::MissingCallId | Self::BadRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Transport(_) | Self::Decode { .. } => StatusCode::BAD_GATEWAY,
            Self::SessionNotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    /// Whether the caller may reasonably retry the same request
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Upstream { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    fn body(&self) -> ErrorBody {
        let details = match self {
            Self::Upstream { body, .. } => Some(body.clone()),
            _ => None,
        };
        ErrorBody {
            error: self.to_string(),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), retriable = self.is_retriable(), "{}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "{}", self);
        }
        (status, Json(self.body())).into_response()
    }
}
