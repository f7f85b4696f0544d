//! The participant registry: which connection is who, and where.
//!
//! Every live connection gets a [`Binding`] the moment it is accepted. The
//! binding starts anonymous; authenticating attaches an [`Identity`], and
//! creating/joining a session attaches a [`Membership`]. Handlers look the
//! binding up on every inbound event instead of tagging the socket itself,
//! which keeps transport identity and game identity apart.
//!
//! The registry also indexes connections by session. That index is the
//! durable notion of a session's room: if a session's live state is torn
//! down and rebuilt, the rebuilt engine re-seeds its broadcast list from
//! [`ParticipantRegistry::room`].
//!
//! # Concurrency note
//!
//! Like the rest of the per-process bookkeeping, `ParticipantRegistry` is a
//! plain struct. The server wraps it in a mutex and never holds that mutex
//! across a call into the game engine.

use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use quizhall_protocol::{PlayerId, ServerEvent, SessionId};
use quizhall_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::{AccessError, Identity};

/// Channel that delivers outbound events to one connection's writer task.
pub type Outbox = mpsc::UnboundedSender<ServerEvent>;

/// What a connection is allowed to do inside its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Host,
    Player,
}

/// A connection's place in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub session_id: SessionId,
    pub role: Role,
    pub player_id: PlayerId,
    pub display_name: String,
}

/// Everything the registry knows about one live connection.
#[derive(Debug)]
pub struct Binding {
    pub conn: ConnectionId,
    pub outbox: Outbox,
    pub identity: Option<Identity>,
    pub membership: Option<Membership>,
    pub connected_at: Instant,
}

/// One entry of a session's room, as handed to a rebuilt engine.
#[derive(Debug, Clone)]
pub struct Member {
    pub conn: ConnectionId,
    pub role: Role,
    pub player_id: PlayerId,
    pub outbox: Outbox,
}

/// Maps live connections to identities and sessions.
#[derive(Debug, Default)]
pub struct ParticipantRegistry {
    bindings: HashMap<ConnectionId, Binding>,
    /// Session → connections bound to it. Kept in sync with `bindings`.
    rooms: HashMap<SessionId, BTreeSet<ConnectionId>>,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly accepted connection as anonymous.
    ///
    /// # Errors
    /// [`AccessError::AlreadyConnected`] if the id is already registered.
    pub fn connect(&mut self, conn: ConnectionId, outbox: Outbox) -> Result<(), AccessError> {
        if self.bindings.contains_key(&conn) {
            return Err(AccessError::AlreadyConnected(conn));
        }
        self.bindings.insert(
            conn,
            Binding {
                conn,
                outbox,
                identity: None,
                membership: None,
                connected_at: Instant::now(),
            },
        );
        tracing::debug!(%conn, "connection registered");
        Ok(())
    }

    /// Attaches a verified host identity. Re-authenticating replaces the
    /// previous identity, but a connection bound to a session may only
    /// refresh the identity it joined with.
    ///
    /// # Errors
    /// - [`AccessError::UnknownConnection`] if the connection is not registered
    /// - [`AccessError::AlreadyJoined`] if it is bound to a session and the
    ///   identity names a different host
    pub fn authenticate(&mut self, conn: ConnectionId, identity: Identity) -> Result<(), AccessError> {
        let binding = self
            .bindings
            .get_mut(&conn)
            .ok_or(AccessError::UnknownConnection(conn))?;
        if let Some(membership) = &binding.membership {
            let same_host = binding
                .identity
                .as_ref()
                .is_some_and(|current| current.host_id == identity.host_id);
            if !same_host {
                tracing::warn!(
                    %conn,
                    session_id = %membership.session_id,
                    host_id = %identity.host_id,
                    "identity change rejected while joined"
                );
                return Err(AccessError::AlreadyJoined(conn, membership.session_id));
            }
        }
        tracing::info!(%conn, host_id = %identity.host_id, "host authenticated");
        binding.identity = Some(identity);
        Ok(())
    }

    /// Binds a connection to a session and adds it to that session's room.
    ///
    /// # Errors
    /// - [`AccessError::UnknownConnection`] if the connection is not registered
    /// - [`AccessError::AlreadyJoined`] if it is already bound to a session
    pub fn join(&mut self, conn: ConnectionId, membership: Membership) -> Result<(), AccessError> {
        let binding = self
            .bindings
            .get_mut(&conn)
            .ok_or(AccessError::UnknownConnection(conn))?;
        if let Some(existing) = &binding.membership {
            return Err(AccessError::AlreadyJoined(conn, existing.session_id));
        }

        self.rooms
            .entry(membership.session_id)
            .or_default()
            .insert(conn);
        binding.membership = Some(membership);
        Ok(())
    }

    /// Unbinds a connection from its session but keeps it registered, so it
    /// can join another one.
    pub fn leave(&mut self, conn: ConnectionId) -> Option<Membership> {
        let membership = self.bindings.get_mut(&conn)?.membership.take()?;
        self.remove_from_room(conn, membership.session_id);
        Some(membership)
    }

    /// Removes a connection entirely and returns what was known about it.
    pub fn disconnect(&mut self, conn: ConnectionId) -> Option<Binding> {
        let binding = self.bindings.remove(&conn)?;
        if let Some(membership) = &binding.membership {
            self.remove_from_room(conn, membership.session_id);
        }
        tracing::debug!(%conn, "connection unregistered");
        Some(binding)
    }

    fn remove_from_room(&mut self, conn: ConnectionId, session_id: SessionId) {
        if let Some(room) = self.rooms.get_mut(&session_id) {
            room.remove(&conn);
            if room.is_empty() {
                self.rooms.remove(&session_id);
            }
        }
    }

    pub fn get(&self, conn: ConnectionId) -> Option<&Binding> {
        self.bindings.get(&conn)
    }

    /// The verified identity of a connection, if it authenticated.
    pub fn identity(&self, conn: ConnectionId) -> Option<&Identity> {
        self.bindings.get(&conn)?.identity.as_ref()
    }

    /// The session membership of a connection, if it joined one.
    pub fn membership(&self, conn: ConnectionId) -> Option<&Membership> {
        self.bindings.get(&conn)?.membership.as_ref()
    }

    /// Every connection bound to `session_id`, in connection order.
    pub fn room(&self, session_id: SessionId) -> Vec<Member> {
        let Some(conns) = self.rooms.get(&session_id) else {
            return Vec::new();
        };
        conns
            .iter()
            .filter_map(|conn| {
                let binding = self.bindings.get(conn)?;
                let membership = binding.membership.as_ref()?;
                Some(Member {
                    conn: *conn,
                    role: membership.role,
                    player_id: membership.player_id,
                    outbox: binding.outbox.clone(),
                })
            })
            .collect()
    }

    /// Number of connections bound to `session_id`.
    pub fn room_size(&self, session_id: SessionId) -> usize {
        self.rooms.get(&session_id).map_or(0, BTreeSet::len)
    }

    /// Number of registered connections (bound or not).
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use quizhall_protocol::HostId;

    use super::*;

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    fn outbox() -> Outbox {
        mpsc::unbounded_channel().0
    }

    fn membership(session_id: SessionId, role: Role, id: u64, name: &str) -> Membership {
        Membership {
            session_id,
            role,
            player_id: PlayerId(id),
            display_name: name.into(),
        }
    }

    fn host_identity() -> Identity {
        Identity {
            host_id: HostId::from("host-1"),
            email: None,
        }
    }

    #[test]
    fn test_connect_new_connection_is_anonymous() {
        let mut reg = ParticipantRegistry::new();
        reg.connect(conn(1), outbox()).unwrap();
        assert!(reg.identity(conn(1)).is_none());
        assert!(reg.membership(conn(1)).is_none());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_connect_twice_returns_already_connected() {
        let mut reg = ParticipantRegistry::new();
        reg.connect(conn(1), outbox()).unwrap();
        let err = reg.connect(conn(1), outbox()).unwrap_err();
        assert!(matches!(err, AccessError::AlreadyConnected(_)));
    }

    #[test]
    fn test_authenticate_unknown_connection_returns_error() {
        let mut reg = ParticipantRegistry::new();
        let err = reg.authenticate(conn(5), host_identity()).unwrap_err();
        assert!(matches!(err, AccessError::UnknownConnection(_)));
    }

    #[test]
    fn test_authenticate_attaches_identity() {
        let mut reg = ParticipantRegistry::new();
        reg.connect(conn(1), outbox()).unwrap();
        reg.authenticate(conn(1), host_identity()).unwrap();
        assert_eq!(reg.identity(conn(1)).unwrap().host_id, HostId::from("host-1"));
    }

    #[test]
    fn test_authenticate_while_joined_keeps_host_identity() {
        let mut reg = ParticipantRegistry::new();
        let sid = SessionId::generate();
        reg.connect(conn(1), outbox()).unwrap();
        reg.authenticate(conn(1), host_identity()).unwrap();
        reg.join(conn(1), membership(sid, Role::Host, 1, "Host")).unwrap();

        // Refreshing the same host is fine.
        reg.authenticate(conn(1), host_identity()).unwrap();

        let other = Identity {
            host_id: HostId::from("host-2"),
            email: None,
        };
        let err = reg.authenticate(conn(1), other.clone()).unwrap_err();
        assert!(matches!(err, AccessError::AlreadyJoined(_, s) if s == sid));
        assert_eq!(reg.identity(conn(1)).unwrap().host_id, HostId::from("host-1"));

        // Once released, the connection may authenticate as anyone.
        reg.leave(conn(1));
        reg.authenticate(conn(1), other).unwrap();
        assert_eq!(reg.identity(conn(1)).unwrap().host_id, HostId::from("host-2"));
    }

    #[test]
    fn test_join_adds_connection_to_room() {
        let mut reg = ParticipantRegistry::new();
        let sid = SessionId::generate();
        reg.connect(conn(1), outbox()).unwrap();
        reg.connect(conn(2), outbox()).unwrap();
        reg.join(conn(1), membership(sid, Role::Host, 1, "Host")).unwrap();
        reg.join(conn(2), membership(sid, Role::Player, 2, "Ana")).unwrap();

        let room = reg.room(sid);
        assert_eq!(room.len(), 2);
        assert_eq!(room[0].role, Role::Host);
        assert_eq!(room[1].player_id, PlayerId(2));
        assert_eq!(reg.room_size(sid), 2);
    }

    #[test]
    fn test_join_twice_returns_already_joined() {
        let mut reg = ParticipantRegistry::new();
        let first = SessionId::generate();
        reg.connect(conn(1), outbox()).unwrap();
        reg.join(conn(1), membership(first, Role::Player, 1, "Ana")).unwrap();

        let err = reg
            .join(conn(1), membership(SessionId::generate(), Role::Player, 1, "Ana"))
            .unwrap_err();
        assert!(matches!(err, AccessError::AlreadyJoined(_, sid) if sid == first));
        assert_eq!(reg.membership(conn(1)).unwrap().session_id, first);
    }

    #[test]
    fn test_disconnect_removes_from_room_and_returns_binding() {
        let mut reg = ParticipantRegistry::new();
        let sid = SessionId::generate();
        reg.connect(conn(1), outbox()).unwrap();
        reg.join(conn(1), membership(sid, Role::Player, 1, "Ana")).unwrap();

        let binding = reg.disconnect(conn(1)).unwrap();
        assert_eq!(binding.membership.unwrap().display_name, "Ana");
        assert_eq!(reg.room_size(sid), 0);
        assert!(reg.room(sid).is_empty());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_leave_keeps_connection_and_allows_rejoin() {
        let mut reg = ParticipantRegistry::new();
        let old = SessionId::generate();
        reg.connect(conn(1), outbox()).unwrap();
        reg.authenticate(conn(1), host_identity()).unwrap();
        reg.join(conn(1), membership(old, Role::Host, 1, "Host")).unwrap();

        assert_eq!(reg.leave(conn(1)).unwrap().session_id, old);
        assert_eq!(reg.room_size(old), 0);
        assert!(reg.identity(conn(1)).is_some());
        assert!(reg.leave(conn(1)).is_none());

        let new = SessionId::generate();
        reg.join(conn(1), membership(new, Role::Host, 1, "Host")).unwrap();
        assert_eq!(reg.room_size(new), 1);
    }

    #[test]
    fn test_disconnect_unknown_connection_returns_none() {
        let mut reg = ParticipantRegistry::new();
        assert!(reg.disconnect(conn(9)).is_none());
    }
}
