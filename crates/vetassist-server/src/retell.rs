//! Retell voice API client.
//!
//! Only two upstream operations are needed: exchanging an agent id for a
//! web-call access token, and fetching a call's status and transcript. Both
//! sit behind [`CallProvider`] so handlers can be exercised without network.

use crate::config::RetellConfig;
use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use triage::{Role, TranscriptEntry};

/// Credential handed to the browser to join a web call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebCallCredentials {
    pub call_id: String,
    pub access_token: String,
    pub agent_id: String,
}

#[derive(Debug, Deserialize)]
struct CreateWebCallResponse {
    call_id: String,
    access_token: String,
    #[serde(default)]
    agent_id: Option<String>,
}

/// One utterance in Retell's `transcript_object`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub role: String,
    pub content: String,
}

impl From<&Utterance> for TranscriptEntry {
    fn from(u: &Utterance) -> Self {
        let role = if u.role == "agent" {
            Role::Agent
        } else {
            Role::User
        };
        TranscriptEntry::new(role, u.content.clone())
    }
}

/// Subset of Retell's call object that the front desk uses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    pub call_id: String,
    #[serde(default)]
    pub call_status: Option<String>,
    /// Epoch milliseconds
    #[serde(default)]
    pub start_timestamp: Option<i64>,
    /// Epoch milliseconds
    #[serde(default)]
    pub end_timestamp: Option<i64>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub transcript_object: Option<Vec<Utterance>>,
}

impl CallRecord {
    /// Whole seconds between start and end, when both are known
    pub fn duration_secs(&self) -> Option<i64> {
        match (self.start_timestamp, self.end_timestamp) {
            (Some(start), Some(end)) => Some(((end - start) as f64 / 1000.0).round() as i64),
            _ => None,
        }
    }

    /// Role-tagged utterances, or the raw transcript text attributed to the caller
    pub fn transcript_entries(&self) -> Option<Vec<TranscriptEntry>> {
        match (&self.transcript_object, &self.transcript) {
            (Some(utterances), _) if !utterances.is_empty() => {
                Some(utterances.iter().map(TranscriptEntry::from).collect())
            }
            (_, Some(text)) if !text.trim().is_empty() => {
                Some(vec![TranscriptEntry::user(text.clone())])
            }
            _ => None,
        }
    }
}

/// Telephony backend used by the HTTP handlers
#[async_trait]
pub trait CallProvider: Send + Sync {
    /// Whether a server-side API key is available
    fn is_configured(&self) -> bool;

    async fn create_web_call(&self, agent_id: &str) -> ApiResult<WebCallCredentials>;

    async fn get_call(&self, call_id: &str) -> ApiResult<CallRecord>;
}

/// reqwest-backed Retell client
pub struct RetellClient {
    config: RetellConfig,
    client: reqwest::Client,
}

impl RetellClient {
    pub fn new(config: RetellConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }

    fn api_key(&self) -> ApiResult<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| ApiError::not_configured("RETELL_API_KEY not configured"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Turn a non-2xx response into [`ApiError::Upstream`]
    async fn check(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        error!(status = status.as_u16(), body = %body, "Retell API error");
        Err(ApiError::Upstream {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl CallProvider for RetellClient {
    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn create_web_call(&self, agent_id: &str) -> ApiResult<WebCallCredentials> {
        let api_key = self.api_key()?;
        debug!(agent_id, "Creating Retell web call");

        let response = self
            .client
            .post(self.url("/v2/create-web-call"))
            .bearer_auth(api_key)
            .json(&serde_json::json!({ "agent_id": agent_id }))
            .send()
            .await?;
        let data: CreateWebCallResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode {
                message: e.to_string(),
            })?;

        Ok(WebCallCredentials {
            call_id: data.call_id,
            access_token: data.access_token,
            agent_id: data.agent_id.unwrap_or_else(|| agent_id.to_string()),
        })
    }

    async fn get_call(&self, call_id: &str) -> ApiResult<CallRecord> {
        let api_key = self.api_key()?;
        debug!(call_id, "Fetching Retell call");

        let response = self
            .client
            .get(self.url(&format!("/v2/get-call/{call_id}")))
            .bearer_auth(api_key)
            .send()
            .await?;
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode {
                message: e.to_string(),
            })
    }
}
