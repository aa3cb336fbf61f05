//! In-memory conversation state, one entry per session id

use saathi_domain::{unix_timestamp, Record, TurnLog};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Shared handle to one session
///
/// The async mutex is held for a whole turn, so turns of a session run in
/// arrival order.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Record and conversation of one user
#[derive(Debug)]
pub struct Session {
    id: String,
    record: Record,
    log: TurnLog,
    greeted: bool,
    created_at: u64,
    last_active: u64,
}

impl Session {
    fn new(id: &str) -> Self {
        let now = unix_timestamp();
        Self {
            id: id.to_string(),
            record: Record::new(),
            log: TurnLog::new(),
            greeted: false,
            created_at: now,
            last_active: now,
        }
    }

    /// Session id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Values collected so far
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Record access for merges; writes go through `Record::apply_patch`
    pub(crate) fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    /// Conversation so far
    pub fn log(&self) -> &TurnLog {
        &self.log
    }

    pub(crate) fn log_mut(&mut self) -> &mut TurnLog {
        &mut self.log
    }

    /// Whether the greeting has been logged
    pub fn greeted(&self) -> bool {
        self.greeted
    }

    pub(crate) fn mark_greeted(&mut self) {
        self.greeted = true;
    }

    /// Unix timestamp of creation
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Unix timestamp of the last activity
    pub fn last_active(&self) -> u64 {
        self.last_active
    }

    /// Record activity now
    pub fn touch(&mut self) {
        self.last_active = unix_timestamp();
    }

    /// Drop the record and the conversation
    pub(crate) fn reset(&mut self) {
        self.record.clear();
        self.log.clear();
        self.greeted = false;
    }
}

/// Map of live sessions
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionHandle>>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for `id`, creating the session on first use
    pub fn get_or_create(&self, id: &str) -> SessionHandle {
        if let Some(handle) = self.get(id) {
            return handle;
        }

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                info!("Created session {}", id);
                Arc::new(Mutex::new(Session::new(id)))
            })
            .clone()
    }

    /// Handle for `id`, if the session is live
    pub fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Drop a session; returns whether it existed
    pub fn remove(&self, id: &str) -> bool {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some();
        if removed {
            info!("Closed session {}", id);
        }
        removed
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no session is live
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of live sessions, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    /// Remove sessions idle for at least `idle_secs` as of `now`
    ///
    /// A session that is locked or whose handle is held elsewhere counts as
    /// active and is kept. Returns the evicted ids, sorted.
    pub fn evict_idle(&self, idle_secs: u64, now: u64) -> Vec<String> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let mut evicted = Vec::new();

        sessions.retain(|id, handle| {
            if is_idle(handle, idle_secs, now) {
                debug!("Evicting idle session {}", id);
                evicted.push(id.clone());
                false
            } else {
                true
            }
        });

        evicted.sort();
        evicted
    }

    /// Ids that [`SessionStore::evict_idle`] would remove, sorted
    pub fn idle_candidates(&self, idle_secs: u64, now: u64) -> Vec<String> {
        let mut ids: Vec<String> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, handle)| is_idle(handle, idle_secs, now))
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}

/// Idle and not in use by anyone but the store
fn is_idle(handle: &SessionHandle, idle_secs: u64, now: u64) -> bool {
    if Arc::strong_count(handle) > 1 {
        return false;
    }
    match handle.try_lock() {
        Ok(session) => now.saturating_sub(session.last_active) >= idle_secs,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_or_create_reuses_session() {
        let store = SessionStore::new();
        let first = store.get_or_create("a");
        first.lock().await.log_mut().append_user("hello");

        let second = store.get_or_create("a");
        assert_eq!(second.lock().await.log().len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_unknown_session() {
        let store = SessionStore::new();
        assert!(store.get("missing").is_none());
        assert!(!store.remove("missing"));
    }

    #[test]
    fn test_ids_sorted() {
        let store = SessionStore::new();
        store.get_or_create("b");
        store.get_or_create("a");
        assert_eq!(store.ids(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_evict_idle_sessions() {
        let store = SessionStore::new();
        store.get_or_create("old");
        let now = unix_timestamp();

        assert!(store.evict_idle(60, now).is_empty());
        assert_eq!(store.idle_candidates(60, now + 61), vec!["old".to_string()]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.evict_idle(60, now + 61), vec!["old".to_string()]);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_evict_skips_busy_sessions() {
        let store = SessionStore::new();
        let handle = store.get_or_create("busy");
        let _guard = handle.lock().await;

        let evicted = store.evict_idle(0, unix_timestamp() + 1000);
        assert!(evicted.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_evict_skips_held_handles() {
        let store = SessionStore::new();
        let handle = store.get_or_create("held");

        assert!(store.evict_idle(0, unix_timestamp() + 1000).is_empty());
        drop(handle);
        assert_eq!(store.evict_idle(0, unix_timestamp() + 1000), vec!["held".to_string()]);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut session = Session::new("s");
        session.log_mut().append_user("hi");
        session.mark_greeted();
        session.reset();
        assert!(session.log().is_empty());
        assert!(session.record().is_empty());
        assert!(!session.greeted());
    }
}
