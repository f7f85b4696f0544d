//! The lobby: creates session actors and routes callers to them.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use quizhall_access::{Member, Outbox};
use quizhall_protocol::{HostId, LeaderboardEntry, Pin, QuizId, SessionId, SessionSummary};
use quizhall_store::{QuizCatalog, SessionStore};
use quizhall_transport::ConnectionId;

use crate::engine::{Departure, Joined, SessionHandle, Welcome, spawn_session};
use crate::{GameConfig, GameError, PinAllocator, ScoringPolicy, SessionPhase, StandardScoring};

/// Owns the map from session id to live actor.
///
/// The map lock is held only to look up, insert or remove handles (and,
/// when rebuilding a torn-down session, across the store read so two hosts
/// cannot spawn two actors for one session). Commands to actors are sent
/// after the lock is released.
pub struct Lobby<S, Q> {
    store: Arc<S>,
    catalog: Arc<Q>,
    scoring: Arc<dyn ScoringPolicy>,
    pins: PinAllocator,
    config: GameConfig,
    sessions: Mutex<HashMap<SessionId, SessionHandle>>,
}

impl<S: SessionStore, Q: QuizCatalog> Lobby<S, Q> {
    pub fn new(store: Arc<S>, catalog: Arc<Q>, config: GameConfig) -> Self {
        Self {
            store,
            catalog,
            scoring: Arc::new(StandardScoring),
            pins: PinAllocator::new(config.pin_attempts),
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Replaces the scoring rules for sessions created from now on.
    pub fn with_scoring(mut self, scoring: Arc<dyn ScoringPolicy>) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_pin_allocator(mut self, pins: PinAllocator) -> Self {
        self.pins = pins;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Creates a `PENDING` session for a quiz the host owns and attaches the
    /// host's connection to it.
    ///
    /// # Errors
    /// - [`GameError::NotFound`] if the quiz is missing or owned by someone else
    /// - [`GameError::ResourceExhausted`] if no PIN could be allocated
    pub async fn create_session(
        &self,
        host_id: &HostId,
        quiz_id: &QuizId,
        conn: ConnectionId,
        outbox: Outbox,
    ) -> Result<SessionSummary, GameError> {
        let quiz = self.catalog.get(quiz_id).await?;
        if quiz.host_id != *host_id {
            tracing::debug!(%quiz_id, %host_id, "create_session for a quiz the host does not own");
            return Err(GameError::not_found("quiz not found"));
        }

        let session = self
            .pins
            .create_session(self.store.as_ref(), quiz_id, host_id)
            .await?;
        let session_id = session.id;
        tracing::info!(%session_id, pin = %session.pin, %quiz_id, %host_id, "session created");

        let handle = spawn_session(
            session,
            quiz,
            Arc::clone(&self.store),
            Arc::clone(&self.scoring),
            &self.config,
            Vec::new(),
        );
        self.sessions.lock().await.insert(session_id, handle.clone());

        handle
            .attach_host(conn, host_id.clone(), outbox, Welcome::Created)
            .await
    }

    /// Re-attaches a host connection to a session it owns.
    ///
    /// If the session has no live actor (its last host left), one is rebuilt
    /// from the stored record, seeded with `room`: the connections still
    /// bound to the session.
    ///
    /// # Errors
    /// - [`GameError::NotFound`] if the session does not exist
    /// - [`GameError::Unauthorized`] if `host_id` does not own it
    /// - [`GameError::Conflict`] if it has ended
    pub async fn attach_host(
        &self,
        host_id: &HostId,
        session_id: SessionId,
        conn: ConnectionId,
        outbox: Outbox,
        room: Vec<Member>,
    ) -> Result<SessionSummary, GameError> {
        let handle = {
            let mut sessions = self.sessions.lock().await;
            match sessions.get(&session_id).filter(|h| !h.is_closed()) {
                Some(handle) => handle.clone(),
                None => {
                    let session = self
                        .store
                        .find_by_id(session_id)
                        .await?
                        .ok_or_else(|| GameError::not_found("session not found"))?;
                    if session.host_id != *host_id {
                        return Err(GameError::unauthorized("not the host of this session"));
                    }
                    if SessionPhase::of(&session).is_ended() {
                        return Err(GameError::conflict("session has ended"));
                    }
                    let quiz = self.catalog.get(&session.quiz_id).await?;

                    tracing::info!(%session_id, members = room.len(), "rebuilding live session");
                    let handle = spawn_session(
                        session,
                        quiz,
                        Arc::clone(&self.store),
                        Arc::clone(&self.scoring),
                        &self.config,
                        room,
                    );
                    sessions.insert(session_id, handle.clone());
                    handle
                }
            }
        };

        handle
            .attach_host(conn, host_id.clone(), outbox, Welcome::Rejoined)
            .await
    }

    /// Adds a player to the session holding `pin`.
    ///
    /// # Errors
    /// - [`GameError::NotFound`] if no live session with that PIN accepts joins
    /// - [`GameError::Validation`] for a blank or overlong name
    /// - [`GameError::Conflict`] if the name is taken
    pub async fn join_player(
        &self,
        pin: &Pin,
        name: &str,
        conn: ConnectionId,
        outbox: Outbox,
    ) -> Result<Joined, GameError> {
        let session = self
            .store
            .find_by_pin(pin)
            .await?
            .filter(|s| !s.is_ended())
            .ok_or_else(|| GameError::not_found("no joinable session for this pin"))?;

        let handle = self
            .live(session.id)
            .await
            .ok_or_else(|| GameError::not_found("no joinable session for this pin"))?;
        handle.join(conn, name, outbox).await
    }

    /// Looks up the live actor for a session.
    ///
    /// # Errors
    /// [`GameError::Conflict`] if the session has ended,
    /// [`GameError::NotFound`] if it has no live actor.
    pub async fn session(&self, session_id: SessionId) -> Result<SessionHandle, GameError> {
        if let Some(handle) = self.live(session_id).await {
            return Ok(handle);
        }
        match self.store.find_by_id(session_id).await? {
            Some(session) if session.is_ended() => Err(GameError::conflict("session has ended")),
            Some(_) => Err(GameError::not_found("session is not live")),
            None => Err(GameError::not_found("session not found")),
        }
    }

    /// Removes a departing connection from its session, if the session is
    /// still live. Stops tracking the actor when it shut down.
    pub async fn leave(&self, session_id: SessionId, conn: ConnectionId) -> Departure {
        let Some(handle) = self.live(session_id).await else {
            return Departure::Unknown;
        };
        let departure = handle.leave(conn).await.unwrap_or(Departure::Unknown);
        if departure == Departure::LastHost {
            self.forget(session_id).await;
        }
        departure
    }

    /// Ends a session and stops tracking its actor.
    ///
    /// # Errors
    /// As [`SessionHandle::end_game`].
    pub async fn end_game(
        &self,
        session_id: SessionId,
        conn: ConnectionId,
    ) -> Result<Vec<LeaderboardEntry>, GameError> {
        let handle = self.session(session_id).await?;
        let board = handle.end_game(conn).await?;
        self.forget(session_id).await;
        Ok(board)
    }

    /// Number of sessions with a live actor.
    pub async fn live_sessions(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, h| !h.is_closed());
        sessions.len()
    }

    async fn live(&self, session_id: SessionId) -> Option<SessionHandle> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(&session_id) {
            Some(handle) if !handle.is_closed() => Some(handle.clone()),
            Some(_) => {
                sessions.remove(&session_id);
                None
            }
            None => None,
        }
    }

    async fn forget(&self, session_id: SessionId) {
        if self.sessions.lock().await.remove(&session_id).is_some() {
            tracing::debug!(%session_id, "live session removed");
        }
    }
}
