//! In-memory registry of live triage sessions.
//!
//! Sessions exist only while a call is live. Ending one drops it; nothing is
//! written anywhere. Every mutation holds the write lock for its whole
//! duration, so a session never sees two updates interleaved.
//!
//! A session untouched for longer than the registry TTL is reaped, either on
//! the next `create` or by the background task from `spawn_reaper`.

use crate::error::{ApiError, ApiResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tracing::{debug, info};
use triage::{SessionSnapshot, TriageSession};

/// Idle time after which a session is discarded
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Floor for the background sweep period
const MIN_REAP_PERIOD: Duration = Duration::from_secs(1);

struct LiveSession {
    session: TriageSession,
    last_active: Instant,
}

impl LiveSession {
    fn new(session: TriageSession) -> Self {
        Self {
            session,
            last_active: Instant::now(),
        }
    }
}

pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, LiveSession>>,
    ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn create(&self, call_id: Option<String>) -> SessionSnapshot {
        let session = TriageSession::new(call_id);
        let snapshot = session.snapshot();
        info!(session = %session.short_id(), call_id = ?session.call_id(), "Triage session started");
        let mut sessions = self.sessions.write().await;
        self.evict_idle(&mut sessions);
        sessions.insert(session.id().to_string(), LiveSession::new(session));
        snapshot
    }

    pub async fn get(&self, id: &str) -> ApiResult<SessionSnapshot> {
        self.sessions
            .read()
            .await
            .get(id)
            .map(|live| live.session.snapshot())
            .ok_or_else(|| ApiError::session_not_found(id))
    }

    /// Run `f` against one session under the write lock and mark it active
    pub async fn update<F>(&self, id: &str, f: F) -> ApiResult<SessionSnapshot>
    where
        F: FnOnce(&mut TriageSession),
    {
        let mut sessions = self.sessions.write().await;
        let live = sessions
            .get_mut(id)
            .ok_or_else(|| ApiError::session_not_found(id))?;
        f(&mut live.session);
        live.last_active = Instant::now();
        Ok(live.session.snapshot())
    }

    /// Discard a session, returning its final view
    pub async fn end(&self, id: &str) -> ApiResult<SessionSnapshot> {
        let live = self
            .sessions
            .write()
            .await
            .remove(id)
            .ok_or_else(|| ApiError::session_not_found(id))?;
        log_end(&live.session, "Triage session ended");
        Ok(live.session.snapshot())
    }

    /// Discard every session bound to `call_id`
    pub async fn end_by_call(&self, call_id: &str) -> Vec<SessionSnapshot> {
        let mut sessions = self.sessions.write().await;
        let ids: Vec<String> = sessions
            .values()
            .filter(|live| live.session.call_id() == Some(call_id))
            .map(|live| live.session.id().to_string())
            .collect();
        ids.iter()
            .filter_map(|id| sessions.remove(id))
            .map(|live| {
                log_end(&live.session, "Triage session ended");
                live.session.snapshot()
            })
            .collect()
    }

    /// Drop every session idle for longer than the TTL, returning how many went
    pub async fn reap_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.evict_idle(&mut sessions)
    }

    /// Sweep expired sessions on a fixed period until the task is aborted
    pub fn spawn_reaper(self: Arc<Self>) -> JoinHandle<()> {
        let period = (self.ttl / 4).max(MIN_REAP_PERIOD);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let reaped = self.reap_expired().await;
                if reaped > 0 {
                    debug!(reaped, "Session sweep");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn evict_idle(&self, sessions: &mut HashMap<String, LiveSession>) -> usize {
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, live| {
            let keep = now.duration_since(live.last_active) <= self.ttl;
            if !keep {
                log_end(&live.session, "Triage session expired");
            }
            keep
        });
        before - sessions.len()
    }
}

fn log_end(session: &TriageSession, message: &str) {
    let state = session.state();
    info!(
        session = %session.short_id(),
        level = %state.triage_level,
        score = state.urgency_score,
        symptoms = state.symptoms.len(),
        "{message}"
    );
}
