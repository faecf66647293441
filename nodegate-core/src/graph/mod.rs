//! Circuit Graph Model
//!
//! This module implements the directed graph of nodes, sockets and
//! connections that the editor manipulates.
//!
//! # Overview
//!
//! - Nodes are logic gates, Input fields, or Output displays
//! - Each node owns its sockets; the kind fixes how many there are
//! - A connection runs from one node's output socket to another node's
//!   input socket, and values flow along it
//!
//! An input socket holds at most one connection. An output socket may feed
//! several inputs unless single fan-out is configured.
//!
//! # Design Decisions
//!
//! 1. The graph is indexed by id with insertion-ordered maps, so rendering
//!    order is stable and lookups are O(1).
//!
//! 2. Ids are never reused. Undo and redo put nodes and wires back under
//!    their original ids, so commands further down the history that refer
//!    to them stay valid.
//!
//! 3. Sockets are identified by value (node, direction, index) instead of
//!    by a separate id, since they live and die with their node.

mod circuit;
mod connection;
mod node;
mod socket;

pub use circuit::{CircuitGraph, ConnectionRules, DetachedNode, DEFAULT_INPUT_TEXT};
pub use connection::{Connection, ConnectionId, PendingWire};
pub use node::{DisplayValue, Node, NodeId, NodeKind, NodeState, Position, UnknownKind};
pub use socket::{Socket, SocketDirection, SocketId};
