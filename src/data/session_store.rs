use crate::domain::repository::SessionStore;
use crate::domain::session::Session;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

#[derive(Clone)]
pub struct InMemorySessionStore {
    storage: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    #[instrument(skip(self, token), fields(user_id = session.user_id))]
    async fn insert(&self, token: String, session: Session) -> Result<()> {
        trace!("Acquiring write lock for session storage");
        let mut storage = self.storage.write().await;
        storage.insert(token, session);
        debug!("Session stored");
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn get(&self, token: &str) -> Result<Option<Session>> {
        trace!("Acquiring read lock for session storage");
        let storage = self.storage.read().await;
        let session = storage.get(token).cloned();
        match &session {
            Some(s) => debug!(user_id = s.user_id, "Session found"),
            None => trace!("Session not found"),
        }
        Ok(session)
    }

    #[instrument(skip(self, token))]
    async fn remove(&self, token: &str) -> Result<()> {
        trace!("Acquiring write lock for session storage");
        let mut storage = self.storage.write().await;
        if storage.remove(token).is_some() {
            debug!("Session removed");
        } else {
            trace!("Session already absent");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get_session() {
        let store = InMemorySessionStore::new();

        store
            .insert("token-1".to_string(), Session::new(7))
            .await
            .unwrap();

        let session = store.get("token-1").await.unwrap();
        assert!(session.is_some());
        assert_eq!(session.unwrap().user_id, 7);
    }

    #[tokio::test]
    async fn test_get_unknown_token_returns_none() {
        let store = InMemorySessionStore::new();

        let session = store.get("missing").await.unwrap();
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn test_remove_clears_session() {
        let store = InMemorySessionStore::new();
        store
            .insert("token-2".to_string(), Session::new(1))
            .await
            .unwrap();

        store.remove("token-2").await.unwrap();

        assert!(store.get("token-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = InMemorySessionStore::new();

        assert!(store.remove("never-existed").await.is_ok());
        store
            .insert("token-3".to_string(), Session::new(2))
            .await
            .unwrap();
        store.remove("token-3").await.unwrap();
        assert!(store.remove("token-3").await.is_ok());
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let store = InMemorySessionStore::new();
        store
            .insert("token-a".to_string(), Session::new(1))
            .await
            .unwrap();
        store
            .insert("token-b".to_string(), Session::new(2))
            .await
            .unwrap();

        store.remove("token-a").await.unwrap();

        assert!(store.get("token-a").await.unwrap().is_none());
        assert_eq!(store.get("token-b").await.unwrap().unwrap().user_id, 2);
    }
}
