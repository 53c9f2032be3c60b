//! VetAssist front-desk server.
//!
//! Provides:
//! - A thin proxy over the Retell voice API (web-call credentials, call lookup, webhooks)
//! - Live call triage sessions backed by the `triage` crate
//!
//! # Usage
//!
//! ```bash
//! RETELL_API_KEY=key_... RETELL_AGENT_ID=agent_... vetassist-server
//!
//! # Word-boundary matching with a clinic-specific dictionary
//! vetassist-server --match-mode word_boundary --dictionary ./keywords.toml
//! ```

pub mod config;
pub mod error;
pub mod retell;
pub mod routes;
pub mod server;
pub mod sessions;

pub use config::{RetellConfig, ServerConfig};
pub use error::{ApiError, ApiResult, ErrorBody};
pub use retell::{CallProvider, CallRecord, RetellClient, Utterance, WebCallCredentials};
pub use server::{router, run, AppState};
pub use sessions::{SessionRegistry, DEFAULT_SESSION_TTL};
