use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{
    sync::{Mutex, RwLock},
    time::Instant,
};
use uuid::Uuid;

use crate::{
    services::{metrics, store::RatingStore},
    workflow::{Action, Effect, Session},
};

pub type SessionHandle = Arc<Mutex<Session>>;

/// How often the idle sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct Entry {
    handle: SessionHandle,
    last_seen: Instant,
}

/// Server-held workflow sessions, keyed by id.
///
/// A session's mutex is only held while dispatching or completing, never
/// across a store call, so a second `submit` arriving mid-flight sees the
/// submitting flag and is dropped.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Entry>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session and runs its initial fetch.
    pub async fn create(&self, store: &dyn RatingStore) -> (Uuid, SessionHandle) {
        let (session, effect) = Session::start();
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(session));
        {
            let mut sessions = self.sessions.write().await;
            sessions.insert(
                id,
                Entry {
                    handle: handle.clone(),
                    last_seen: Instant::now(),
                },
            );
            metrics::SESSIONS_GAUGE.set(sessions.len() as f64);
        }
        metrics::SESSIONS_COUNTER.inc();

        let completion = effect.run(store).await;
        handle.lock().await.complete(completion);
        tracing::info!("Session {id} started");
        (id, handle)
    }

    /// Looks up a session and marks it as used.
    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some(entry.handle.clone())
    }

    /// Ends a session. A fetch still running for it completes into the void.
    pub async fn remove(&self, id: Uuid) -> bool {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(&id).is_some();
        metrics::SESSIONS_GAUGE.set(sessions.len() as f64);
        removed
    }

    /// Drops every session not used within `idle`. Returns how many went.
    pub async fn evict_idle(&self, idle: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < idle);
        let evicted = before - sessions.len();
        metrics::SESSIONS_GAUGE.set(sessions.len() as f64);
        evicted
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Applies one action to `handle`, running the requested effect (if any)
    /// with the session unlocked.
    pub async fn perform(handle: &SessionHandle, action: Action, store: &dyn RatingStore) {
        let effect = handle.lock().await.dispatch(action);
        if let Some(effect) = effect {
            let submitting = matches!(effect, Effect::Insert(_));
            let completion = effect.run(store).await;
            if submitting {
                metrics::record_submission(&completion);
            }
            handle.lock().await.complete(completion);
        }
    }
}

/// Spawn the background sweep that ends sessions idle for longer than `idle`.
pub fn start_sweeper(registry: Arc<SessionRegistry>, idle: Duration) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(SWEEP_INTERVAL).await;
            let evicted = registry.evict_idle(idle).await;
            if evicted > 0 {
                tracing::info!("Evicted {evicted} idle session(s)");
            }
        }
    });
}
