//! Optional persistence seam for session snapshots.
//!
//! The engine operates correctly against its in-memory registries alone;
//! a store only adds durability across process restarts. Writes are
//! fire-and-forget: a failing store is logged and never fails the command
//! that triggered it.

use crate::error::Result;
use crate::session::types::{CookingSession, SessionId};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Trait for durably recording session snapshots.
///
/// This trait allows swapping implementations (host database vs in-memory
/// vs none).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist the latest snapshot of a session.
    async fn save_session(&self, session: &CookingSession) -> Result<()>;

    /// Remove a session's stored state.
    async fn remove_session(&self, id: &SessionId) -> Result<()>;

    /// Load a previously stored session, if present.
    async fn load_session(&self, id: &SessionId) -> Result<Option<CookingSession>>;
}

/// Store that discards everything. The default when no durability is
/// wanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSessionStore;

#[async_trait]
impl SessionStore for NullSessionStore {
    async fn save_session(&self, _session: &CookingSession) -> Result<()> {
        Ok(())
    }

    async fn remove_session(&self, _id: &SessionId) -> Result<()> {
        Ok(())
    }

    async fn load_session(&self, _id: &SessionId) -> Result<Option<CookingSession>> {
        Ok(None)
    }
}

/// In-memory store keyed by session id. Useful for tests and as a
/// reference implementation of the snapshot contract.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, CookingSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save_session(&self, session: &CookingSession) -> Result<()> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn remove_session(&self, id: &SessionId) -> Result<()> {
        self.sessions.write().await.remove(id);
        Ok(())
    }

    async fn load_session(&self, id: &SessionId) -> Result<Option<CookingSession>> {
        Ok(self.sessions.read().await.get(id).cloned())
    }
}
