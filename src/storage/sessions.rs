use crate::sessions::models::{PickerSession, SessionHandle};
use crate::storage::interface::{ISessionStorage, SessionRepo};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

#[derive(Clone, Default)]
pub struct HashMapSessionStorage {
    storage: Arc<RwLock<HashMap<String, SessionHandle>>>,
}

impl ISessionStorage for HashMapSessionStorage {}

impl SessionRepo for HashMapSessionStorage {
    async fn insert(&self, session: PickerSession) -> SessionHandle {
        let session_id = session.id.clone();
        let handle = Arc::new(Mutex::new(session));
        self.storage
            .write()
            .await
            .insert(session_id, Arc::clone(&handle));
        handle
    }

    async fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.storage.read().await.get(session_id).cloned()
    }

    async fn remove(&self, session_id: &str) -> Option<SessionHandle> {
        self.storage.write().await.remove(session_id)
    }

    async fn count(&self) -> usize {
        self.storage.read().await.len()
    }

    async fn all(&self) -> Vec<SessionHandle> {
        self.storage.read().await.values().cloned().collect()
    }
}
