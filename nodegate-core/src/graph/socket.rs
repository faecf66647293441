//! Sockets
//!
//! A socket is a connection point owned by a node. Its identity is the
//! owning node plus its direction and index, so socket ids stay valid for
//! as long as the node id does.

use std::fmt;

use smallvec::SmallVec;

use super::connection::ConnectionId;
use super::node::NodeId;

/// Which way values flow through a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketDirection {
    /// Receives a value. Holds at most one connection.
    Input,
    /// Produces a value.
    Output,
}

/// Identifies one socket of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketId {
    pub node: NodeId,
    pub direction: SocketDirection,
    /// Position among the node's sockets of the same direction.
    pub index: usize,
}

impl SocketId {
    pub fn input(node: NodeId, index: usize) -> Self {
        Self { node, direction: SocketDirection::Input, index }
    }

    pub fn output(node: NodeId) -> Self {
        Self { node, direction: SocketDirection::Output, index: 0 }
    }

    pub fn is_input(&self) -> bool {
        self.direction == SocketDirection::Input
    }

    pub fn is_output(&self) -> bool {
        self.direction == SocketDirection::Output
    }
}

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SocketDirection::Input => write!(f, "{}.in{}", self.node, self.index),
            SocketDirection::Output => write!(f, "{}.out", self.node),
        }
    }
}

/// A socket and the connections currently touching it.
#[derive(Debug, Clone, PartialEq)]
pub struct Socket {
    id: SocketId,
    connections: SmallVec<[ConnectionId; 1]>,
}

impl Socket {
    pub(crate) fn new(id: SocketId) -> Self {
        Self { id, connections: SmallVec::new() }
    }

    pub fn id(&self) -> SocketId {
        self.id
    }

    pub fn direction(&self) -> SocketDirection {
        self.id.direction
    }

    pub fn index(&self) -> usize {
        self.id.index
    }

    /// Connections touching this socket, oldest first.
    pub fn connections(&self) -> &[ConnectionId] {
        &self.connections
    }

    /// The first connection, which for an input socket is the only one.
    pub fn connection(&self) -> Option<ConnectionId> {
        self.connections.first().copied()
    }

    pub fn is_connected(&self) -> bool {
        !self.connections.is_empty()
    }

    pub(crate) fn add_connection(&mut self, id: ConnectionId) {
        if !self.connections.contains(&id) {
            self.connections.push(id);
        }
    }

    pub(crate) fn remove_connection(&mut self, id: ConnectionId) {
        self.connections.retain(|c| *c != id);
    }
}
