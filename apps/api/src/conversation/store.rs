//! In-memory session registry. Sessions are gone when the process exits.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::conversation::Session;

pub type SharedSession = Arc<Mutex<Session>>;

/// Cheap to clone; all clones see the same sessions.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> (Uuid, SharedSession) {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(Session::new(id)));
        self.sessions.write().await.insert(id, Arc::clone(&session));
        (id, session)
    }

    pub async fn get(&self, id: &Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Looks up a session from an untrusted id string.
    pub async fn find(&self, raw_id: &str) -> Option<(Uuid, SharedSession)> {
        let id = Uuid::parse_str(raw_id.trim()).ok()?;
        self.get(&id).await.map(|s| (id, s))
    }

    /// Returns whether a session was removed.
    pub async fn remove(&self, id: &Uuid) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
