//! Per-connection handler: registration, event routing and cleanup.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register the connection as anonymous and start its writer task
//!   2. Loop: receive a frame → decode → validate → dispatch
//!   3. On close, idle timeout or error: unregister and leave the session
//!
//! Everything the server says to a connection goes through its outbox,
//! including error replies, so a reply can never overtake a broadcast that
//! the session actor queued first.

use std::sync::Arc;

use chrono::Utc;
use quizhall_access::{IdentityGate, Membership, Outbox, Role};
use quizhall_game::{GameError, SessionHandle};
use quizhall_protocol::{ClientEvent, Codec, HostId, PlayerId, ServerEvent, SessionId};
use quizhall_store::{QuizCatalog, SessionStore};
use quizhall_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::QuizhallError;
use crate::server::ServerState;

/// Drop guard that unregisters a connection when the handler exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, the async part runs in a fire-and-forget task.
struct ConnectionGuard<G, S, Q, C>
where
    G: IdentityGate,
    S: SessionStore,
    Q: QuizCatalog,
    C: Codec,
{
    conn_id: ConnectionId,
    state: Arc<ServerState<G, S, Q, C>>,
}

impl<G, S, Q, C> Drop for ConnectionGuard<G, S, Q, C>
where
    G: IdentityGate,
    S: SessionStore,
    Q: QuizCatalog,
    C: Codec,
{
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let binding = state.registry.lock().await.disconnect(conn_id);
            let Some(membership) = binding.and_then(|b| b.membership) else {
                return;
            };
            let departure = state.lobby.leave(membership.session_id, conn_id).await;
            tracing::debug!(
                %conn_id,
                session_id = %membership.session_id,
                ?departure,
                "connection cleaned up"
            );
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<G, S, Q, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<G, S, Q, C>>,
) -> Result<(), QuizhallError>
where
    G: IdentityGate,
    S: SessionStore,
    Q: QuizCatalog,
    C: Codec,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, peer = %conn.peer_addr(), "handling new connection");

    let (outbox, outbound) = mpsc::unbounded_channel();
    state.registry.lock().await.connect(conn_id, outbox.clone())?;
    let _guard = ConnectionGuard {
        conn_id,
        state: Arc::clone(&state),
    };
    let writer = tokio::spawn(write_outbound(
        Arc::clone(&conn),
        outbound,
        Arc::clone(&state),
    ));

    loop {
        let frame = match tokio::time::timeout(state.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(frame))) => frame,
            Ok(Ok(None)) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(%conn_id, "connection idle, closing");
                break;
            }
        };

        let event = match decode_event(&state.codec, &frame) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "rejected frame");
                reply_error(&outbox, &e);
                continue;
            }
        };

        let name = event.name();
        if let Err(e) = dispatch(&state, conn_id, &outbox, event).await {
            match &e {
                GameError::Internal(_) => {
                    tracing::error!(%conn_id, event = name, error = %e, "event failed")
                }
                _ => tracing::debug!(%conn_id, event = name, error = %e, "event rejected"),
            }
            reply_error(&outbox, &e);
        }
    }

    writer.abort();
    let _ = conn.close().await;
    // _guard drops here → registry and session cleanup fires.
    Ok(())
}

/// Drains the outbox onto the socket until every sender is gone or the
/// socket fails.
async fn write_outbound<G, S, Q, C>(
    conn: Arc<WebSocketConnection>,
    mut outbound: mpsc::UnboundedReceiver<ServerEvent>,
    state: Arc<ServerState<G, S, Q, C>>,
) where
    C: Codec,
{
    while let Some(event) = outbound.recv().await {
        let frame = match state.codec.encode(&event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(conn_id = %conn.id(), error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&frame).await {
            tracing::debug!(conn_id = %conn.id(), error = %e, "send failed, writer stopping");
            break;
        }
    }
}

/// Decodes a frame and range-checks its payload.
fn decode_event(codec: &impl Codec, frame: &[u8]) -> Result<ClientEvent, GameError> {
    let event: ClientEvent = codec.decode(frame)?;
    event.validate()?;
    Ok(event)
}

/// Routes one event to the registry or the engine.
async fn dispatch<G, S, Q, C>(
    state: &ServerState<G, S, Q, C>,
    conn_id: ConnectionId,
    outbox: &Outbox,
    event: ClientEvent,
) -> Result<(), GameError>
where
    G: IdentityGate,
    S: SessionStore,
    Q: QuizCatalog,
    C: Codec,
{
    match event {
        ClientEvent::Authenticate { token } => {
            let identity = state.gate.verify(&token).await?;
            let host_id = identity.host_id.clone();
            state.registry.lock().await.authenticate(conn_id, identity)?;
            let _ = outbox.send(ServerEvent::Authenticated { host_id });
        }

        ClientEvent::CreateSession { quiz_id } => {
            let host_id = require_host(state, conn_id).await?;
            ensure_unbound(state, conn_id).await?;
            let summary = state
                .lobby
                .create_session(&host_id, &quiz_id, conn_id, outbox.clone())
                .await?;
            bind(state, conn_id, summary.session_id, Role::Host, host_id.0).await?;
        }

        ClientEvent::JoinSession { session_id } => {
            let host_id = require_host(state, conn_id).await?;
            ensure_unbound(state, conn_id).await?;
            let room = state.registry.lock().await.room(session_id);
            state
                .lobby
                .attach_host(&host_id, session_id, conn_id, outbox.clone(), room)
                .await?;
            bind(state, conn_id, session_id, Role::Host, host_id.0).await?;
        }

        ClientEvent::PlayerJoin { pin, name } => {
            ensure_unbound(state, conn_id).await?;
            let joined = state
                .lobby
                .join_player(&pin, &name, conn_id, outbox.clone())
                .await?;
            bind(state, conn_id, joined.session_id, Role::Player, joined.name).await?;
        }

        ClientEvent::StartQuestion { question_index } => {
            let (_, handle) = current_session(state, conn_id).await?;
            handle.start_question(conn_id, question_index).await?;
        }

        ClientEvent::NextQuestion {} => {
            let (_, handle) = current_session(state, conn_id).await?;
            handle.next_question(conn_id).await?;
        }

        ClientEvent::EndGame {} => {
            let (session_id, _) = current_session(state, conn_id).await?;
            state.lobby.end_game(session_id, conn_id).await?;
        }

        ClientEvent::SubmitAnswer {
            question_index,
            answer_index,
            time_taken_ms,
        } => {
            let (_, handle) = current_session(state, conn_id).await?;
            handle
                .submit_answer(conn_id, question_index, answer_index, time_taken_ms)
                .await?;
        }

        ClientEvent::Ping { client_time } => {
            let server_time = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
            let _ = outbox.send(ServerEvent::Pong {
                client_time,
                server_time,
            });
        }
    }
    Ok(())
}

/// The authenticated host behind a connection.
async fn require_host<G, S, Q, C>(
    state: &ServerState<G, S, Q, C>,
    conn_id: ConnectionId,
) -> Result<HostId, GameError> {
    state
        .registry
        .lock()
        .await
        .identity(conn_id)
        .map(|identity| identity.host_id.clone())
        .ok_or_else(|| GameError::Authentication("authentication required".into()))
}

/// Fails if the connection is bound to a session that is still going.
/// A binding to an ended session is released.
async fn ensure_unbound<G, S, Q, C>(
    state: &ServerState<G, S, Q, C>,
    conn_id: ConnectionId,
) -> Result<(), GameError>
where
    S: SessionStore,
    Q: QuizCatalog,
{
    let Some(session_id) = state
        .registry
        .lock()
        .await
        .membership(conn_id)
        .map(|m| m.session_id)
    else {
        return Ok(());
    };

    match state.lobby.session(session_id).await {
        Err(GameError::Conflict(_)) => {
            state.registry.lock().await.leave(conn_id);
            tracing::debug!(%conn_id, %session_id, "released binding to ended session");
            Ok(())
        }
        _ => Err(GameError::Conflict(
            "connection already joined a session".into(),
        )),
    }
}

async fn bind<G, S, Q, C>(
    state: &ServerState<G, S, Q, C>,
    conn_id: ConnectionId,
    session_id: SessionId,
    role: Role,
    display_name: String,
) -> Result<(), GameError> {
    let membership = Membership {
        session_id,
        role,
        player_id: PlayerId::from(conn_id),
        display_name,
    };
    state.registry.lock().await.join(conn_id, membership)?;
    Ok(())
}

/// The session a connection is bound to, with its live actor.
async fn current_session<G, S, Q, C>(
    state: &ServerState<G, S, Q, C>,
    conn_id: ConnectionId,
) -> Result<(SessionId, SessionHandle), GameError>
where
    S: SessionStore,
    Q: QuizCatalog,
{
    let session_id = state
        .registry
        .lock()
        .await
        .membership(conn_id)
        .map(|m| m.session_id)
        .ok_or_else(|| GameError::Unauthorized("join a session first".into()))?;
    let handle = state.lobby.session(session_id).await?;
    Ok((session_id, handle))
}

/// Queues a `server:error` for the connection.
fn reply_error(outbox: &Outbox, err: &GameError) {
    let _ = outbox.send(ServerEvent::Error {
        code: err.code(),
        message: err.client_message(),
    });
}
