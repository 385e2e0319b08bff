use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::types::internal::session::SessionState;

/// In-memory session store keyed by the session id cookie.
///
/// Each client credential maps to its own entry; nothing is shared between
/// sessions beyond the map itself.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, session_id: &str) -> Option<SessionState> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Store a new session under a freshly generated id and return the id
    pub async fn insert(&self, state: SessionState) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), state);
        session_id
    }

    pub async fn remove(&self, session_id: &str) -> Option<SessionState> {
        self.sessions.write().await.remove(session_id)
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_and_get_round_trip() {
        let store = SessionStore::new();
        let state = SessionState::authenticated("alice", "Member", 1, None);

        let id = store.insert(state.clone()).await;

        assert_eq!(store.get(&id).await, Some(state));
    }

    #[tokio::test]
    async fn remove_clears_the_entry() {
        let store = SessionStore::new();
        let id = store
            .insert(SessionState::authenticated("alice", "Member", 1, None))
            .await;

        assert!(store.remove(&id).await.is_some());
        assert!(store.get(&id).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn unknown_session_id_yields_none() {
        let store = SessionStore::new();
        assert!(store.get("no-such-session").await.is_none());
    }
}
