//! The session store boundary and its in-memory implementation.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::RwLock;

use quizhall_protocol::{Pin, SessionId};

use crate::{Session, StoreError};

/// Durable home of session records.
///
/// The engine reads a record when it builds live state, and writes the whole
/// record back after every accepted mutation. Sessions are never deleted.
pub trait SessionStore: Send + Sync + 'static {
    /// Inserts a new session.
    ///
    /// # Errors
    /// [`StoreError::DuplicatePin`] if another session holds the same PIN,
    /// [`StoreError::DuplicateSession`] if the id exists.
    fn create(&self, session: Session) -> impl Future<Output = Result<Session, StoreError>> + Send;

    /// Finds the session holding `pin`, ended or not.
    fn find_by_pin(
        &self,
        pin: &Pin,
    ) -> impl Future<Output = Result<Option<Session>, StoreError>> + Send;

    fn find_by_id(
        &self,
        id: SessionId,
    ) -> impl Future<Output = Result<Option<Session>, StoreError>> + Send;

    /// Replaces the stored record with `session`.
    ///
    /// # Errors
    /// [`StoreError::SessionNotFound`] if the session was never created.
    fn save(&self, session: &Session) -> impl Future<Output = Result<Session, StoreError>> + Send;
}

#[derive(Debug, Default)]
struct Tables {
    sessions: HashMap<SessionId, Session>,
    /// PIN → owner. PINs are never released, so a PIN is never reissued
    /// within one process.
    pins: HashMap<Pin, SessionId>,
}

/// A session store held in memory.
///
/// [`set_unavailable`](Self::set_unavailable) makes every call fail with
/// [`StoreError::Unavailable`], which lets tests check that a failed write
/// leaves live state untouched.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
    writes: AtomicU64,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles simulated outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of successful `create` and `save` calls.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.sessions.len()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("session store offline".into()));
        }
        Ok(())
    }
}

impl SessionStore for MemorySessionStore {
    async fn create(&self, session: Session) -> Result<Session, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if tables.pins.contains_key(&session.pin) {
            return Err(StoreError::DuplicatePin(session.pin));
        }
        if tables.sessions.contains_key(&session.id) {
            return Err(StoreError::DuplicateSession(session.id));
        }
        tables.pins.insert(session.pin.clone(), session.id);
        tables.sessions.insert(session.id, session.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(session)
    }

    async fn find_by_pin(&self, pin: &Pin) -> Result<Option<Session>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .pins
            .get(pin)
            .and_then(|id| tables.sessions.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: SessionId) -> Result<Option<Session>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().await.sessions.get(&id).cloned())
    }

    async fn save(&self, session: &Session) -> Result<Session, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let slot = tables
            .sessions
            .get_mut(&session.id)
            .ok_or(StoreError::SessionNotFound(session.id))?;
        *slot = session.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(session.clone())
    }
}
