//! In-memory session store with checkpointed expiry sweeping.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use super::session::DialogSession;

/// Owns every live dialog session. Each session sits behind its own
/// mutex so events for one user apply strictly in arrival order while
/// other users proceed independently.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<DialogSession>>>>,
    lifetime: Duration,
    /// Deletion bound and rate-limit reference for the sweep. Advanced
    /// only inside `sweep_expired_at`.
    checkpoint: Mutex<DateTime<Utc>>,
}

impl SessionStore {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            lifetime,
            checkpoint: Mutex::new(Utc::now() + lifetime),
        }
    }

    /// Existing session for the user, or a fresh one.
    pub async fn resolve(&self, user_id: &str) -> Arc<Mutex<DialogSession>> {
        if let Some(session) = self.sessions.read().await.get(user_id) {
            return Arc::clone(session);
        }

        let mut sessions = self.sessions.write().await;
        Arc::clone(
            sessions
                .entry(user_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(DialogSession::new()))),
        )
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub async fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Utc::now()).await
    }

    /// Rate-limited batch sweep. Runs at most once per lifetime: a call
    /// before `checkpoint + lifetime` is a no-op. When it runs, every
    /// session idle since the checkpoint is removed and the checkpoint
    /// moves to `now + lifetime`. Sessions locked by an in-flight event
    /// are skipped; they are active by definition.
    pub async fn sweep_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut checkpoint = self.checkpoint.lock().await;
        if now - *checkpoint < self.lifetime {
            return 0;
        }
        let bound = *checkpoint;

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|user_id, session| {
            let Ok(session) = session.try_lock() else {
                return true;
            };
            if session.last_activity <= bound {
                debug!(user_id = %user_id, "Dialog expired");
                false
            } else {
                true
            }
        });
        let removed = before - sessions.len();

        *checkpoint = now + self.lifetime;

        if removed > 0 {
            info!(count = removed, "Swept expired dialogs");
        }
        removed
    }
}
