//! Connections
//!
//! A connection is a directed wire from an output socket to an input
//! socket on a different node. While the user drags a wire it only has a
//! source; that transient state is a [`PendingWire`] and never enters the
//! graph.

use std::fmt;

use super::node::Position;
use super::socket::SocketId;

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ConnectionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wire#{}", self.0)
    }
}

/// A wire attached to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection {
    id: ConnectionId,
    source: SocketId,
    target: SocketId,
}

impl Connection {
    pub fn new(id: ConnectionId, source: SocketId, target: SocketId) -> Self {
        Self { id, source, target }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// The output socket the value comes from.
    pub fn source(&self) -> SocketId {
        self.source
    }

    /// The input socket the value goes to.
    pub fn target(&self) -> SocketId {
        self.target
    }

    /// Whether either end sits on the given socket.
    pub fn touches(&self, socket: SocketId) -> bool {
        self.source == socket || self.target == socket
    }
}

/// A wire being dragged out of an output socket. Its free end follows the
/// pointer until it is released.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingWire {
    pub source: SocketId,
    pub pointer: Position,
}
