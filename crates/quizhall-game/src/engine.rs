//! Session actor: one Tokio task per live session.
//!
//! The actor exclusively owns everything that must change atomically for a
//! session: the in-memory copy of the session record, the room (which
//! connections receive broadcasts), and the question countdown. Commands
//! arrive on a bounded mpsc channel and are handled one at a time, and the
//! countdown is polled from the same `select!` loop, so a timer-driven lock
//! and a host- or player-driven command can never interleave.
//!
//! Every mutation follows the same shape: clone the record, apply the
//! change to the clone, persist the clone, and only then replace the
//! in-memory copy and broadcast. A failed write leaves the session exactly
//! as it was.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::ControlFlow;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};

use quizhall_access::{Member, Outbox, Role};
use quizhall_protocol::{
    HostId, LeaderboardEntry, Pin, PlayerId, Recipient, RosterEntry, ServerEvent, SessionId,
    SessionSummary,
};
use quizhall_store::{AnswerRecord, Participant, Quiz, Session, SessionStore};
use quizhall_timer::Countdown;
use quizhall_transport::ConnectionId;

use crate::leaderboard::rank;
use crate::{GameConfig, GameError, ScoringPolicy, SessionPhase};

/// How a host attachment should be acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Welcome {
    /// The host just created the session: reply `server:session_created`.
    Created,
    /// The host re-attached: reply `server:session_joined`.
    Rejoined,
}

/// A successful player join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Joined {
    pub session_id: SessionId,
    pub player_id: PlayerId,
    /// The stored (trimmed) display name.
    pub name: String,
    pub player_count: usize,
}

/// The private result of an accepted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub points: u64,
    pub total_score: u64,
}

/// What happened when a connection left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    /// A player left and was removed from the roster.
    Player,
    /// A host connection left; other host connections remain.
    Host,
    /// The last host connection left; the actor has stopped.
    LastHost,
    /// The connection was not part of this session.
    Unknown,
}

type Reply<T> = oneshot::Sender<Result<T, GameError>>;

/// Commands sent to a session actor.
pub(crate) enum SessionCommand {
    AttachHost {
        conn: ConnectionId,
        host_id: HostId,
        outbox: Outbox,
        welcome: Welcome,
        reply: Reply<SessionSummary>,
    },
    Join {
        conn: ConnectionId,
        name: String,
        outbox: Outbox,
        reply: Reply<Joined>,
    },
    StartQuestion {
        conn: ConnectionId,
        question_index: u32,
        reply: Reply<()>,
    },
    SubmitAnswer {
        conn: ConnectionId,
        question_index: u32,
        answer_index: u8,
        elapsed_ms: u64,
        reply: Reply<AnswerOutcome>,
    },
    NextQuestion {
        conn: ConnectionId,
        reply: Reply<Vec<LeaderboardEntry>>,
    },
    EndGame {
        conn: ConnectionId,
        reply: Reply<Vec<LeaderboardEntry>>,
    },
    Leave {
        conn: ConnectionId,
        reply: oneshot::Sender<Departure>,
    },
    Snapshot {
        reply: oneshot::Sender<Session>,
    },
}

/// Handle to a running session actor.
///
/// Cheap to clone: it wraps an `mpsc::Sender`. Every method fails with
/// [`GameError::NotFound`] once the actor has stopped.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    pin: Pin,
    sender: mpsc::Sender<SessionCommand>,
}

impl std::fmt::Debug for SessionCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::AttachHost { .. } => "AttachHost",
            Self::Join { .. } => "Join",
            Self::StartQuestion { .. } => "StartQuestion",
            Self::SubmitAnswer { .. } => "SubmitAnswer",
            Self::NextQuestion { .. } => "NextQuestion",
            Self::EndGame { .. } => "EndGame",
            Self::Leave { .. } => "Leave",
            Self::Snapshot { .. } => "Snapshot",
        };
        f.write_str(name)
    }
}

impl SessionHandle {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn pin(&self) -> &Pin {
        &self.pin
    }

    /// `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    pub async fn attach_host(
        &self,
        conn: ConnectionId,
        host_id: HostId,
        outbox: Outbox,
        welcome: Welcome,
    ) -> Result<SessionSummary, GameError> {
        self.request(|reply| SessionCommand::AttachHost {
            conn,
            host_id,
            outbox,
            welcome,
            reply,
        })
        .await?
    }

    pub async fn join(
        &self,
        conn: ConnectionId,
        name: &str,
        outbox: Outbox,
    ) -> Result<Joined, GameError> {
        self.request(|reply| SessionCommand::Join {
            conn,
            name: name.to_owned(),
            outbox,
            reply,
        })
        .await?
    }

    pub async fn start_question(
        &self,
        conn: ConnectionId,
        question_index: u32,
    ) -> Result<(), GameError> {
        self.request(|reply| SessionCommand::StartQuestion {
            conn,
            question_index,
            reply,
        })
        .await?
    }

    pub async fn submit_answer(
        &self,
        conn: ConnectionId,
        question_index: u32,
        answer_index: u8,
        elapsed_ms: u64,
    ) -> Result<AnswerOutcome, GameError> {
        self.request(|reply| SessionCommand::SubmitAnswer {
            conn,
            question_index,
            answer_index,
            elapsed_ms,
            reply,
        })
        .await?
    }

    /// Locks the current question if still open, then publishes the
    /// leaderboard. Does not advance the question pointer.
    pub async fn next_question(
        &self,
        conn: ConnectionId,
    ) -> Result<Vec<LeaderboardEntry>, GameError> {
        self.request(|reply| SessionCommand::NextQuestion { conn, reply })
            .await?
    }

    /// Ends the session and returns the final leaderboard. The actor stops
    /// after replying.
    pub async fn end_game(&self, conn: ConnectionId) -> Result<Vec<LeaderboardEntry>, GameError> {
        self.request(|reply| SessionCommand::EndGame { conn, reply }).await?
    }

    pub async fn leave(&self, conn: ConnectionId) -> Result<Departure, GameError> {
        self.request(|reply| SessionCommand::Leave { conn, reply }).await
    }

    /// The actor's current in-memory record.
    pub async fn snapshot(&self) -> Result<Session, GameError> {
        self.request(|reply| SessionCommand::Snapshot { reply }).await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| self.not_live())?;
        reply_rx.await.map_err(|_| self.not_live())
    }

    fn not_live(&self) -> GameError {
        tracing::debug!(session_id = %self.session_id, "command sent to stopped session");
        GameError::not_found("session is not live")
    }
}

/// Why a question was locked.
#[derive(Debug, Clone, Copy)]
enum LockCause {
    Timer,
    Host,
    Resume,
}

enum Step {
    Command(SessionCommand),
    Expired(u32),
}

/// The internal actor state. Runs inside a Tokio task.
struct SessionActor<S> {
    session: Session,
    quiz: Arc<Quiz>,
    store: Arc<S>,
    scoring: Arc<dyn ScoringPolicy>,
    config: GameConfig,
    hosts: BTreeSet<ConnectionId>,
    players: BTreeMap<ConnectionId, PlayerId>,
    /// Every connection in the room, hosts and players alike.
    outboxes: BTreeMap<ConnectionId, Outbox>,
    countdown: Countdown,
    receiver: mpsc::Receiver<SessionCommand>,
}

impl<S: SessionStore> SessionActor<S> {
    async fn run(mut self) {
        tracing::info!(
            session_id = %self.session.id,
            pin = %self.session.pin,
            phase = %self.phase(),
            scoring = self.scoring.version(),
            "session actor started"
        );
        self.reconcile().await;

        loop {
            // Expiry is polled first: a deadline that has passed always locks
            // before any queued answer is looked at.
            let step = tokio::select! {
                biased;
                expiry = self.countdown.expired() => Step::Expired(expiry.question_index),
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => Step::Command(cmd),
                    None => break,
                },
            };

            match step {
                Step::Command(cmd) => {
                    if let Some(expiry) = self.countdown.take_due() {
                        self.lock(expiry.question_index, LockCause::Timer).await;
                    }
                    if self.handle(cmd).await.is_break() {
                        break;
                    }
                }
                Step::Expired(question_index) => {
                    self.lock(question_index, LockCause::Timer).await;
                }
            }
        }

        self.countdown.cancel();
        tracing::info!(session_id = %self.session.id, "session actor stopped");
    }

    async fn handle(&mut self, cmd: SessionCommand) -> ControlFlow<()> {
        tracing::trace!(session_id = %self.session.id, command = ?cmd, "session command");
        let session_id = self.session.id;
        match cmd {
            SessionCommand::AttachHost {
                conn,
                host_id,
                outbox,
                welcome,
                reply,
            } => {
                let result = self.attach_host(conn, &host_id, outbox, welcome);
                respond(session_id, "attach_host", reply, result);
            }
            SessionCommand::Join {
                conn,
                name,
                outbox,
                reply,
            } => {
                let result = self.join(conn, &name, outbox).await;
                respond(session_id, "join", reply, result);
            }
            SessionCommand::StartQuestion {
                conn,
                question_index,
                reply,
            } => {
                let result = self.start_question(conn, question_index).await;
                respond(session_id, "start_question", reply, result);
            }
            SessionCommand::SubmitAnswer {
                conn,
                question_index,
                answer_index,
                elapsed_ms,
                reply,
            } => {
                let result = self
                    .submit_answer(conn, question_index, answer_index, elapsed_ms)
                    .await;
                respond(session_id, "submit_answer", reply, result);
            }
            SessionCommand::NextQuestion { conn, reply } => {
                let result = self.next_question(conn).await;
                respond(session_id, "next_question", reply, result);
            }
            SessionCommand::EndGame { conn, reply } => {
                let result = self.end_game(conn).await;
                let ended = result.is_ok();
                respond(session_id, "end_game", reply, result);
                if ended {
                    return ControlFlow::Break(());
                }
            }
            SessionCommand::Leave { conn, reply } => {
                let departure = self.leave(conn).await;
                respond(session_id, "leave", reply, departure);
                if departure == Departure::LastHost {
                    return ControlFlow::Break(());
                }
            }
            SessionCommand::Snapshot { reply } => {
                respond(session_id, "snapshot", reply, self.session.clone());
            }
        }
        ControlFlow::Continue(())
    }

    fn phase(&self) -> SessionPhase {
        SessionPhase::of(&self.session)
    }

    // -- operations ---------------------------------------------------------

    fn attach_host(
        &mut self,
        conn: ConnectionId,
        host_id: &HostId,
        outbox: Outbox,
        welcome: Welcome,
    ) -> Result<SessionSummary, GameError> {
        if *host_id != self.session.host_id {
            return Err(GameError::unauthorized("not the host of this session"));
        }
        if self.phase().is_ended() {
            return Err(GameError::conflict("session has ended"));
        }

        self.hosts.insert(conn);
        self.outboxes.insert(conn, outbox);

        let summary = self.summary(None);
        let event = match welcome {
            Welcome::Created => ServerEvent::SessionCreated {
                session_id: self.session.id,
                pin: self.session.pin.clone(),
                quiz: self.quiz.summary(),
            },
            Welcome::Rejoined => ServerEvent::SessionJoined(summary.clone()),
        };
        self.send(Recipient::Connection(conn), event);

        tracing::info!(
            session_id = %self.session.id,
            %conn,
            hosts = self.hosts.len(),
            "host attached"
        );
        Ok(summary)
    }

    async fn join(
        &mut self,
        conn: ConnectionId,
        name: &str,
        outbox: Outbox,
    ) -> Result<Joined, GameError> {
        if !self.phase().accepts_joins() {
            return Err(GameError::not_found("no joinable session for this pin"));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::validation("name is required"));
        }
        if name.chars().count() > self.config.max_name_chars {
            return Err(GameError::validation("name too long"));
        }
        if self.outboxes.contains_key(&conn) {
            return Err(GameError::conflict("connection already joined this session"));
        }
        if self.session.has_name(name) {
            return Err(GameError::conflict("name already taken"));
        }

        let player_id = PlayerId::from(conn);
        let mut next = self.session.clone();
        next.participants.push(Participant::new(player_id, name));
        self.commit(next).await?;

        self.players.insert(conn, player_id);
        self.outboxes.insert(conn, outbox);
        let player_count = self.session.participants.len();

        self.send(
            Recipient::Connection(conn),
            ServerEvent::SessionJoined(self.summary(Some(player_id))),
        );
        self.send(
            Recipient::RoomExcept(conn),
            ServerEvent::PlayerJoined {
                player_id,
                name: name.to_owned(),
                player_count,
            },
        );

        tracing::info!(
            session_id = %self.session.id,
            %player_id,
            name = %name,
            player_count,
            "player joined"
        );
        Ok(Joined {
            session_id: self.session.id,
            player_id,
            name: name.to_owned(),
            player_count,
        })
    }

    async fn start_question(
        &mut self,
        conn: ConnectionId,
        question_index: u32,
    ) -> Result<(), GameError> {
        self.require_host(conn)?;
        if self.phase().is_ended() {
            return Err(GameError::conflict("session has ended"));
        }
        let question = self
            .quiz
            .question(question_index)
            .ok_or_else(|| GameError::validation("question index out of range"))?
            .clone();

        let mut next = self.session.clone();
        next.current_question = Some(question_index);
        next.is_active = true;
        next.is_locked = false;
        next.started_at.get_or_insert_with(Utc::now);
        self.commit(next).await?;

        if let Some(previous) = self.countdown.arm(question_index, question.time_limit()) {
            tracing::debug!(
                session_id = %self.session.id,
                previous,
                question_index,
                "open question superseded"
            );
        }

        self.send(
            Recipient::Room,
            ServerEvent::Question {
                question_index,
                question: question.view(),
            },
        );
        self.send(
            Recipient::Room,
            ServerEvent::Timer {
                question_index,
                duration: question.time_limit_secs,
            },
        );

        tracing::info!(
            session_id = %self.session.id,
            question_index,
            time_limit_secs = question.time_limit_secs,
            "question opened"
        );
        Ok(())
    }

    async fn submit_answer(
        &mut self,
        conn: ConnectionId,
        question_index: u32,
        answer_index: u8,
        elapsed_ms: u64,
    ) -> Result<AnswerOutcome, GameError> {
        let player_id = *self
            .players
            .get(&conn)
            .ok_or_else(|| GameError::unauthorized("only players can submit answers"))?;

        let current = match self.phase() {
            SessionPhase::Ended => return Err(GameError::conflict("session has ended")),
            SessionPhase::Pending => return Err(GameError::validation("no question is open")),
            SessionPhase::QuestionLocked { .. } => {
                return Err(GameError::conflict("question is locked"));
            }
            SessionPhase::QuestionOpen { index } => index,
        };
        if question_index != current {
            return Err(GameError::validation("question index does not match the current question"));
        }
        let question = self
            .quiz
            .question(current)
            .ok_or_else(|| GameError::Internal(format!("quiz has no question {current}")))?;
        if usize::from(answer_index) >= question.options.len() {
            return Err(GameError::validation("answer index out of range"));
        }

        let mut next = self.session.clone();
        let participant = next
            .participant_mut(player_id)
            .ok_or_else(|| GameError::Internal(format!("player {player_id} missing from roster")))?;
        if participant.answer_for(question_index).is_some() {
            return Err(GameError::conflict("answer already submitted"));
        }

        let is_correct = answer_index == question.correct_index;
        let points = self.scoring.points(is_correct, elapsed_ms);
        participant.answers.push(AnswerRecord {
            question_index,
            answer_index,
            elapsed_ms,
            was_correct: is_correct,
            points,
        });
        participant.score += points;
        let total_score = participant.score;
        self.commit(next).await?;

        self.send(
            Recipient::Connection(conn),
            ServerEvent::AnswerReceived {
                question_index,
                is_correct,
                points,
                total_score,
            },
        );
        tracing::debug!(
            session_id = %self.session.id,
            %player_id,
            question_index,
            is_correct,
            points,
            "answer accepted"
        );
        Ok(AnswerOutcome {
            is_correct,
            points,
            total_score,
        })
    }

    async fn next_question(
        &mut self,
        conn: ConnectionId,
    ) -> Result<Vec<LeaderboardEntry>, GameError> {
        self.require_host(conn)?;
        let question_index = match self.phase() {
            SessionPhase::Ended => return Err(GameError::conflict("session has ended")),
            SessionPhase::Pending => {
                return Err(GameError::validation("no question has been started"));
            }
            SessionPhase::QuestionOpen { index } | SessionPhase::QuestionLocked { index } => index,
        };

        self.lock(question_index, LockCause::Host).await;

        let leaderboard = rank(&self.session.participants);
        self.send(
            Recipient::Room,
            ServerEvent::Leaderboard {
                question_index,
                leaderboard: leaderboard.clone(),
            },
        );
        Ok(leaderboard)
    }

    async fn end_game(&mut self, conn: ConnectionId) -> Result<Vec<LeaderboardEntry>, GameError> {
        self.require_host(conn)?;
        if self.phase().is_ended() {
            return Err(GameError::conflict("session has already ended"));
        }

        let mut next = self.session.clone();
        next.is_active = false;
        next.ended_at = Some(Utc::now());
        self.commit(next).await?;

        self.countdown.cancel();
        let final_leaderboard = rank(&self.session.participants);
        self.send(
            Recipient::Room,
            ServerEvent::GameOver {
                final_leaderboard: final_leaderboard.clone(),
            },
        );

        tracing::info!(
            session_id = %self.session.id,
            players = self.session.participants.len(),
            "game over"
        );
        Ok(final_leaderboard)
    }

    async fn leave(&mut self, conn: ConnectionId) -> Departure {
        if self.hosts.remove(&conn) {
            self.outboxes.remove(&conn);
            if !self.hosts.is_empty() {
                tracing::info!(session_id = %self.session.id, %conn, "host connection left");
                return Departure::Host;
            }

            // The record is left as is so a returning host can resume.
            self.countdown.cancel();
            self.send(
                Recipient::Room,
                ServerEvent::HostLeft {
                    session_id: self.session.id,
                },
            );
            tracing::info!(session_id = %self.session.id, "last host left, detaching live state");
            return Departure::LastHost;
        }

        let Some(player_id) = self.players.remove(&conn) else {
            return Departure::Unknown;
        };
        self.outboxes.remove(&conn);

        let mut next = self.session.clone();
        let name = next
            .participants
            .iter()
            .position(|p| p.id == player_id)
            .map(|i| next.participants.remove(i).name)
            .unwrap_or_default();
        // The connection is already gone; the roster follows even if the
        // write fails.
        if let Err(e) = self.store.save(&next).await {
            tracing::warn!(session_id = %self.session.id, %player_id, error = %e, "failed to persist player departure");
        }
        self.session = next;

        let player_count = self.session.participants.len();
        self.send(
            Recipient::Room,
            ServerEvent::PlayerLeft {
                player_id,
                name: name.clone(),
                player_count,
            },
        );
        tracing::info!(session_id = %self.session.id, %player_id, name = %name, player_count, "player left");
        Departure::Player
    }

    /// Closes the answer window for `question_index`.
    ///
    /// No-op unless that question is the current one and still open, which
    /// makes it safe to call from both the countdown and the host.
    async fn lock(&mut self, question_index: u32, cause: LockCause) -> bool {
        if self.phase() != (SessionPhase::QuestionOpen { index: question_index }) {
            tracing::trace!(session_id = %self.session.id, question_index, ?cause, "lock skipped");
            return false;
        }
        self.countdown.cancel();

        let mut next = self.session.clone();
        next.is_locked = true;
        // The lock stands in memory even if the write fails: reopening the
        // window would let late answers in.
        if let Err(e) = self.store.save(&next).await {
            tracing::warn!(session_id = %self.session.id, question_index, error = %e, "failed to persist lock");
        }
        self.session = next;

        self.send(Recipient::Room, ServerEvent::Lock { question_index });
        tracing::info!(session_id = %self.session.id, question_index, ?cause, "question locked");
        true
    }

    /// Brings a freshly spawned actor in line with its room.
    ///
    /// Players whose connections are gone are dropped from the roster, and a
    /// question left open without a countdown is locked.
    async fn reconcile(&mut self) {
        if self.phase().is_ended() {
            return;
        }

        let connected: BTreeSet<PlayerId> = self.players.values().copied().collect();
        let before = self.session.participants.len();
        if before != connected.len() || self.session.participants.iter().any(|p| !connected.contains(&p.id)) {
            let mut next = self.session.clone();
            next.participants.retain(|p| connected.contains(&p.id));
            if let Err(e) = self.store.save(&next).await {
                tracing::warn!(session_id = %self.session.id, error = %e, "failed to persist roster reconciliation");
            }
            tracing::info!(
                session_id = %self.session.id,
                dropped = before - next.participants.len(),
                "roster reconciled"
            );
            self.session = next;
        }
        // Players seeded from the room but absent from the record have no
        // score to resume; they are not part of this session's roster.
        let roster: BTreeSet<PlayerId> = self.session.participants.iter().map(|p| p.id).collect();
        let stale: Vec<ConnectionId> = self
            .players
            .iter()
            .filter(|(_, id)| !roster.contains(id))
            .map(|(conn, _)| *conn)
            .collect();
        for conn in stale {
            self.players.remove(&conn);
            self.outboxes.remove(&conn);
        }

        if let SessionPhase::QuestionOpen { index } = self.phase() {
            self.lock(index, LockCause::Resume).await;
        }
    }

    // -- helpers ------------------------------------------------------------

    fn require_host(&self, conn: ConnectionId) -> Result<(), GameError> {
        if self.hosts.contains(&conn) {
            Ok(())
        } else {
            Err(GameError::unauthorized("only the host can do that"))
        }
    }

    /// Persists `next`, then makes it the live record.
    async fn commit(&mut self, next: Session) -> Result<(), GameError> {
        if let Err(e) = self.store.save(&next).await {
            tracing::error!(session_id = %self.session.id, error = %e, "session write failed, change rejected");
            return Err(e.into());
        }
        self.session = next;
        Ok(())
    }

    fn summary(&self, player_id: Option<PlayerId>) -> SessionSummary {
        let s = &self.session;
        SessionSummary {
            session_id: s.id,
            pin: s.pin.clone(),
            quiz_id: s.quiz_id.clone(),
            quiz_title: self.quiz.title.clone(),
            question_count: self.quiz.question_count(),
            players: s
                .participants
                .iter()
                .map(|p| RosterEntry {
                    player_id: p.id,
                    name: p.name.clone(),
                    score: p.score,
                })
                .collect(),
            player_count: s.participants.len(),
            current_question_index: s.current_question_wire(),
            is_active: s.is_active,
            is_locked: s.is_locked,
            player_id,
        }
    }

    /// Delivers an event. A closed outbox means the connection is already
    /// going away; its cleanup will arrive as a `Leave`.
    fn send(&self, recipient: Recipient, event: ServerEvent) {
        match recipient {
            Recipient::Room => {
                for outbox in self.outboxes.values() {
                    let _ = outbox.send(event.clone());
                }
            }
            Recipient::Connection(conn) => {
                if let Some(outbox) = self.outboxes.get(&conn) {
                    let _ = outbox.send(event);
                }
            }
            Recipient::RoomExcept(excluded) => {
                for (conn, outbox) in &self.outboxes {
                    if *conn != excluded {
                        let _ = outbox.send(event.clone());
                    }
                }
            }
        }
    }
}

/// Sends a command's reply. The caller may have given up waiting; the
/// command has taken effect either way.
fn respond<T>(session_id: SessionId, command: &'static str, reply: oneshot::Sender<T>, value: T) {
    if reply.send(value).is_err() {
        tracing::trace!(%session_id, command, "reply dropped, caller gone");
    }
}

/// Spawns a session actor seeded with `members` and returns its handle.
pub(crate) fn spawn_session<S: SessionStore>(
    session: Session,
    quiz: Arc<Quiz>,
    store: Arc<S>,
    scoring: Arc<dyn ScoringPolicy>,
    config: &GameConfig,
    members: Vec<Member>,
) -> SessionHandle {
    let (tx, rx) = mpsc::channel(config.command_buffer.max(1));

    let mut hosts = BTreeSet::new();
    let mut players = BTreeMap::new();
    let mut outboxes = BTreeMap::new();
    for member in members {
        match member.role {
            Role::Host => {
                hosts.insert(member.conn);
            }
            Role::Player => {
                players.insert(member.conn, member.player_id);
            }
        }
        outboxes.insert(member.conn, member.outbox);
    }

    let handle = SessionHandle {
        session_id: session.id,
        pin: session.pin.clone(),
        sender: tx,
    };

    let actor = SessionActor {
        session,
        quiz,
        store,
        scoring,
        config: config.clone(),
        hosts,
        players,
        outboxes,
        countdown: Countdown::new(config.late_timer_warn),
        receiver: rx,
    };
    tokio::spawn(actor.run());

    handle
}
