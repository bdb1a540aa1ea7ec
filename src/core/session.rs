//! # Sessions
//!
//! One `Session` per player, keyed by the id stored in their cookie.
//!
//! ```text
//! SessionRegistry
//! └── sessions: Mutex<HashMap<id, Arc<Mutex<Session>>>>
//!                                     │
//!                                     ├── story: Option<StoryState>
//!                                     └── images: ImageCache
//! ```
//!
//! The registry lock is only held long enough to find or create a handle.
//! Each session has its own lock, so requests for one player run one at a
//! time while different players never wait on each other. Sessions live in
//! memory and are gone when the process exits.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};
use tokio::sync::Mutex;

use crate::core::state::StoryState;
use crate::core::story::{Story, StoryError};
use crate::images::ImageCache;

pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Debug, Default)]
pub struct Session {
    story: Option<StoryState>,
    pub images: ImageCache,
}

impl Session {
    /// Replaces any story in progress and starts the new one at chapter 0.
    pub fn start(&mut self, story: Story) -> &StoryState {
        self.story.insert(StoryState::new(story))
    }

    pub fn has_story(&self) -> bool {
        self.story.is_some()
    }

    pub fn story(&self) -> Result<&StoryState, StoryError> {
        self.story.as_ref().ok_or(StoryError::NoActiveSession)
    }

    pub fn story_mut(&mut self) -> Result<&mut StoryState, StoryError> {
        self.story.as_mut().ok_or(StoryError::NoActiveSession)
    }
}

/// Generate a new UUID v4 session ID.
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `(id, handle, created)` for `id`.
    ///
    /// A missing or unknown id gets a brand new empty session under a fresh
    /// id; client-chosen ids are never adopted.
    pub async fn open(&self, id: Option<&str>) -> (String, SessionHandle, bool) {
        let mut sessions = self.sessions.lock().await;

        if let Some(id) = id
            && let Some(handle) = sessions.get(id)
        {
            debug!("Resuming session {}", id);
            return (id.to_string(), Arc::clone(handle), false);
        }

        let id = new_session_id();
        let handle: SessionHandle = Arc::default();
        sessions.insert(id.clone(), Arc::clone(&handle));
        info!("New session {} ({} active)", id, sessions.len());
        (id, handle, true)
    }

    /// Looks up an existing session without creating one.
    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.lock().await.get(id).map(Arc::clone)
    }

    /// Drops a session. Returns false if it did not exist.
    pub async fn end(&self, id: &str) -> bool {
        let removed = self.sessions.lock().await.remove(id).is_some();
        if removed {
            info!("Ended session {}", id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_has_no_story() {
        let session = Session::default();
        assert!(!session.has_story());
        assert_eq!(session.story().unwrap_err(), StoryError::NoActiveSession);
    }

    #[test]
    fn test_start_replaces_story_in_progress() {
        let mut session = Session::default();
        session.start(Story::sailing_demo());
        session.story_mut().unwrap().advance("speed up").unwrap();
        assert_eq!(session.story().unwrap().current_index(), 1);

        session.start(Story::sailing_demo());
        assert_eq!(session.story().unwrap().current_index(), 0);
    }

    #[tokio::test]
    async fn test_open_without_id_creates_session() {
        let registry = SessionRegistry::new();
        let (id, _, created) = registry.open(None).await;
        assert!(created);
        assert!(!id.is_empty());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_open_known_id_returns_same_session() {
        let registry = SessionRegistry::new();
        let (id, handle, _) = registry.open(None).await;
        handle.lock().await.start(Story::sailing_demo());

        let (again, resumed, created) = registry.open(Some(&id)).await;
        assert!(!created);
        assert_eq!(again, id);
        assert!(resumed.lock().await.has_story());
    }

    #[tokio::test]
    async fn test_open_unknown_id_gets_fresh_id() {
        let registry = SessionRegistry::new();
        let (id, _, created) = registry.open(Some("made-up")).await;
        assert!(created);
        assert_ne!(id, "made-up");
    }

    #[tokio::test]
    async fn test_get_never_creates() {
        let registry = SessionRegistry::new();
        assert!(registry.get("made-up").await.is_none());
        assert_eq!(registry.len().await, 0);

        let (id, handle, _) = registry.open(None).await;
        let found = registry.get(&id).await.unwrap();
        assert!(Arc::ptr_eq(&found, &handle));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let registry = SessionRegistry::new();
        let (_, first, _) = registry.open(None).await;
        let (_, second, _) = registry.open(None).await;

        first.lock().await.start(Story::sailing_demo());
        assert!(!second.lock().await.has_story());
    }

    #[tokio::test]
    async fn test_end_removes_session() {
        let registry = SessionRegistry::new();
        let (id, _, _) = registry.open(None).await;
        assert!(registry.end(&id).await);
        assert!(!registry.end(&id).await);
        assert_eq!(registry.len().await, 0);
    }
}
