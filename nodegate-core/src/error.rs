//! Error types shared by the graph, evaluator, history and session.
//!
//! Evaluation failures that the editor simply displays (an unconnected
//! input, a non-binary Input text) are not errors; they are values of
//! [`Resolved`](crate::eval::Resolved) and
//! [`DisplayValue`](crate::graph::DisplayValue).

use thiserror::Error;

use crate::graph::{ConnectionId, NodeId, NodeKind};

/// Why a wire could not be attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConnectionRule {
    #[error("one of the sockets does not exist")]
    UnknownSocket,
    #[error("the source is not an output socket")]
    SourceNotOutput,
    #[error("the target is not an input socket")]
    TargetNotInput,
    #[error("both sockets belong to the same node")]
    SameNode,
    #[error("the target socket already has a connection")]
    TargetOccupied,
    #[error("the source socket already has a connection")]
    OutputOccupied,
    #[error("the wire would close a cycle")]
    WouldCreateCycle,
    #[error("a connection with this id already exists")]
    DuplicateId,
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("invalid connection: {0}")]
    InvalidConnection(#[from] ConnectionRule),

    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("node {0} already exists")]
    DuplicateNode(NodeId),

    #[error("connection {0} not found")]
    ConnectionNotFound(ConnectionId),

    #[error("node {node} is a {kind} node, expected {expected}")]
    WrongKind { node: NodeId, kind: NodeKind, expected: NodeKind },

    #[error("cycle detected while resolving node {0}")]
    CycleDetected(NodeId),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EditorError>;
