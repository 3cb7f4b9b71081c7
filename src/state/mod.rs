//! Session store
//!
//! Maps session ids to independent conversation states. Each state sits behind
//! its own mutex so turns for one session run strictly one after another while
//! other sessions proceed in parallel. Nothing survives a restart.

use crate::conversation::ConversationState;
use crate::error::AdvisorError;
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

pub type SharedState = Arc<Mutex<ConversationState>>;

/// Trait for session lookup
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn get_or_create(&self, session_id: Uuid) -> SharedState;
    async fn get(&self, session_id: Uuid) -> Result<SharedState>;
    async fn remove(&self, session_id: Uuid) -> bool;
    async fn len(&self) -> usize;
}

/// In-memory session store
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SharedState>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self, session_id: Uuid) -> SharedState {
        {
            let sessions = self.sessions.read().await;
            if let Some(state) = sessions.get(&session_id) {
                return state.clone();
            }
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id)
            .or_insert_with(|| Arc::new(Mutex::new(ConversationState::new())))
            .clone()
    }

    async fn get(&self, session_id: Uuid) -> Result<SharedState> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&session_id)
            .cloned()
            .ok_or(AdvisorError::SessionNotFound(session_id))
    }

    async fn remove(&self, session_id: Uuid) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&session_id).is_some()
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let store = InMemorySessionStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let state_a = store.get_or_create(a).await;
        state_a.lock().await.set_goal("save for a car");

        let state_b = store.get_or_create(b).await;
        assert!(state_b.lock().await.goal().is_none());

        let again = store.get_or_create(a).await;
        assert_eq!(again.lock().await.goal(), Some("save for a car"));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_missing_session() {
        let store = InMemorySessionStore::new();
        let id = Uuid::new_v4();

        assert!(matches!(store.get(id).await, Err(AdvisorError::SessionNotFound(_))));
        assert!(!store.remove(id).await);

        store.get_or_create(id).await;
        assert!(store.remove(id).await);
        assert_eq!(store.len().await, 0);
    }
}
