//! `QuizhallServer` builder and accept loop.
//!
//! This is the entry point for running a Quizhall server. It ties together
//! all the layers: transport → protocol → access → game.

use std::sync::Arc;
use std::time::Duration;

use quizhall_access::{IdentityGate, ParticipantRegistry};
use quizhall_game::{GameConfig, Lobby};
use quizhall_protocol::{Codec, JsonCodec};
use quizhall_store::{QuizCatalog, SessionStore};
use quizhall_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::QuizhallError;
use crate::handler::handle_connection;

/// Connections silent for longer than this are closed.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(120);

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<G, S, Q, C> {
    pub(crate) registry: Mutex<ParticipantRegistry>,
    pub(crate) lobby: Lobby<S, Q>,
    pub(crate) gate: G,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a Quizhall server.
///
/// # Example
///
/// ```rust,ignore
/// use quizhall::prelude::*;
///
/// let server = QuizhallServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build(JwtGate::hs256(secret), store, catalog)
///     .await?;
/// server.run().await
/// ```
pub struct QuizhallServerBuilder {
    bind_addr: String,
    idle_timeout: Duration,
    game_config: GameConfig,
}

impl QuizhallServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            game_config: GameConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets how long a connection may stay silent before it is closed.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.game_config = config;
        self
    }

    /// Binds the listener and wires the server to its collaborators.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build<G, S, Q>(
        self,
        gate: G,
        store: Arc<S>,
        catalog: Arc<Q>,
    ) -> Result<QuizhallServer<G, S, Q, JsonCodec>, QuizhallError>
    where
        G: IdentityGate,
        S: SessionStore,
        Q: QuizCatalog,
    {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry: Mutex::new(ParticipantRegistry::new()),
            lobby: Lobby::new(store, catalog, self.game_config),
            gate,
            codec: JsonCodec,
            idle_timeout: self.idle_timeout,
        });

        Ok(QuizhallServer { transport, state })
    }
}

impl Default for QuizhallServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Quizhall server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct QuizhallServer<G, S, Q, C> {
    transport: WebSocketTransport,
    state: Arc<ServerState<G, S, Q, C>>,
}

impl<G, S, Q, C> QuizhallServer<G, S, Q, C>
where
    G: IdentityGate,
    S: SessionStore,
    Q: QuizCatalog,
    C: Codec,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop, spawning a handler task per connection. Runs
    /// until the process is terminated.
    pub async fn run(mut self) -> Result<(), QuizhallError> {
        tracing::info!(
            idle_timeout_secs = self.state.idle_timeout.as_secs(),
            "quizhall server running"
        );

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
