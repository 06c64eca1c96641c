//! Application state: the shared word bank and the per-player session store.
//!
//! This module owns:
//!   - the word bank (names + artwork cache), loaded once at startup
//!   - the session store: one async mutex per session id, so requests for the same
//!     player are applied one at a time while different players proceed in parallel
//!   - idle-session expiry

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::{load_config_from_env, GameConfig};
use crate::domain::SessionState;
use crate::wordbank::{SpeciesBank, WordBank};

#[derive(Debug)]
pub struct SessionEntry {
    pub state: SessionState,
    pub last_seen: Instant,
}

pub type SessionHandle = Arc<Mutex<SessionEntry>>;

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, SessionHandle>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self { inner: Arc::new(RwLock::new(HashMap::new())), ttl }
    }

    /// Look up a live session by id, or create one ("first contact").
    /// Unknown and expired ids get a brand-new id rather than being adopted.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_or_create(&self, id: Option<&str>) -> (String, SessionHandle) {
        if let Some(id) = id {
            let found = { self.inner.read().await.get(id).cloned() };
            if let Some(handle) = found {
                let expired = {
                    let mut entry = handle.lock().await;
                    let expired = entry.last_seen.elapsed() > self.ttl;
                    if !expired {
                        entry.last_seen = Instant::now();
                    }
                    expired
                };
                if !expired {
                    return (id.to_string(), handle);
                }
                self.inner.write().await.remove(id);
                debug!(target: "pokemon_hangman_backend", session = %id, "Session expired on access");
            }
        }

        let id = Uuid::new_v4().to_string();
        let handle = Arc::new(Mutex::new(SessionEntry {
            state: SessionState::default(),
            last_seen: Instant::now(),
        }));
        self.inner.write().await.insert(id.clone(), handle.clone());
        info!(target: "pokemon_hangman_backend", session = %id, "Session created");
        (id, handle)
    }

    /// Drop sessions idle for longer than the TTL. Entries currently locked by a
    /// request are in use and are left alone.
    #[instrument(level = "debug", skip(self))]
    pub async fn sweep_expired(&self) -> usize {
        let mut map = self.inner.write().await;
        let before = map.len();
        map.retain(|_, handle| match handle.try_lock() {
            Ok(entry) => entry.last_seen.elapsed() <= self.ttl,
            Err(_) => true,
        });
        let removed = before - map.len();
        if removed > 0 {
            info!(target: "pokemon_hangman_backend", removed, remaining = map.len(), "Expired sessions swept");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub bank: Arc<dyn WordBank>,
    pub sessions: SessionStore,
    pub config: GameConfig,
}

impl AppState {
    /// Build state from env: load config, word list and the artwork client.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let config = load_config_from_env();
        let bank = SpeciesBank::from_config(&config);
        info!(target: "pokemon_hangman_backend", species = bank.list_names().len(), "Startup word bank inventory");
        Self::with_bank(Arc::new(bank), config)
    }

    pub fn with_bank(bank: Arc<dyn WordBank>, config: GameConfig) -> Self {
        let sessions = SessionStore::new(config.sessions.ttl());
        Self { bank, sessions, config }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AlertKind, Round};
    use crate::logic::submit_guess;
    use crate::protocol::GameView;

    #[tokio::test]
    async fn known_id_is_reused_unknown_is_replaced() {
        let store = SessionStore::new(Duration::from_secs(60));
        let (id, handle) = store.get_or_create(None).await;
        handle.lock().await.state.rounds_won = 3;

        let (same, again) = store.get_or_create(Some(id.as_str())).await;
        assert_eq!(same, id);
        assert_eq!(again.lock().await.state.rounds_won, 3);

        let (fresh, _) = store.get_or_create(Some("not-a-session")).await;
        assert_ne!(fresh, "not-a-session");
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let store = SessionStore::new(Duration::from_millis(10));
        let (id, _) = store.get_or_create(None).await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(store.sweep_expired().await, 1);
        assert_eq!(store.len().await, 0);

        let (new_id, handle) = store.get_or_create(Some(id.as_str())).await;
        assert_ne!(new_id, id);
        assert_eq!(handle.lock().await.state.rounds_won, 0);
    }

    #[tokio::test]
    async fn expired_id_on_access_starts_over() {
        let store = SessionStore::new(Duration::from_millis(10));
        let (id, handle) = store.get_or_create(None).await;
        handle.lock().await.state.rounds_lost = 2;
        tokio::time::sleep(Duration::from_millis(30)).await;

        let (new_id, fresh) = store.get_or_create(Some(id.as_str())).await;
        assert_ne!(new_id, id);
        assert_eq!(fresh.lock().await.state.rounds_lost, 0);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_guesses_on_one_session_apply_one_at_a_time() {
        let store = SessionStore::new(Duration::from_secs(60));
        let (id, handle) = store.get_or_create(None).await;
        handle.lock().await.state.active_round = Some(Round::new("Pikachu", 10, None));
        let (other_id, other) = store.get_or_create(None).await;

        // Two hits and four misses, each sent by several requests at once.
        let letters = ["p", "i", "z", "x", "q", "w"];
        let mut tasks = Vec::new();
        for _ in 0..8 {
            for letter in letters {
                let store = store.clone();
                let id = id.clone();
                tasks.push(tokio::spawn(async move {
                    let (_, handle) = store.get_or_create(Some(id.as_str())).await;
                    tokio::task::yield_now().await;
                    let mut entry = handle.lock().await;
                    submit_guess(&mut entry.state, letter).unwrap()
                }));
            }
        }

        let mut first_time = 0;
        for task in tasks {
            match task.await.unwrap() {
                GameView::Round(v) if v.alert_type != AlertKind::Warning => first_time += 1,
                GameView::Round(_) => {}
                other => panic!("unexpected view {other:?}"),
            }
        }
        assert_eq!(first_time, letters.len());

        let entry = handle.lock().await;
        let round = entry.state.active_round.as_ref().unwrap();
        let mut recorded = round.guessed_letters.clone();
        recorded.sort_unstable();
        assert_eq!(recorded, vec!['i', 'p', 'q', 'w', 'x', 'z']);
        assert_eq!(round.attempts_left, 10 - 4);
        assert!(round.is_active);

        assert_ne!(other_id, id);
        assert!(other.lock().await.state.active_round.is_none());
        assert_eq!(store.len().await, 2);
    }
}
