use crate::sessions::models::{PickerSession, SessionHandle};

pub trait ISessionStorage: SessionRepo + Clone + Send + Sync + 'static {}

pub trait SessionRepo {
    async fn insert(&self, session: PickerSession) -> SessionHandle;

    async fn get(&self, session_id: &str) -> Option<SessionHandle>;

    async fn remove(&self, session_id: &str) -> Option<SessionHandle>;

    async fn count(&self) -> usize;

    async fn all(&self) -> Vec<SessionHandle>;
}
