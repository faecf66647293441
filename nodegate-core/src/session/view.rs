//! Read-only snapshots handed to whatever draws the editor.

use super::layout::{node_size, socket_anchor};
use crate::graph::{CircuitGraph, ConnectionId, DisplayValue, Node, NodeId, NodeKind, Position, SocketId};

#[derive(Debug, Clone, PartialEq)]
pub struct SocketView {
    pub id: SocketId,
    pub anchor: Position,
    pub connected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    pub id: NodeId,
    pub kind: NodeKind,
    pub label: &'static str,
    pub position: Position,
    pub width: f64,
    pub height: f64,
    pub sockets: Vec<SocketView>,
    /// Text of an Input node.
    pub input_text: Option<String>,
    /// Display value of an Output or Write Output node.
    pub display: Option<DisplayValue>,
    pub selected: bool,
}

impl NodeView {
    pub(crate) fn of(node: &Node, selected: bool) -> Self {
        let (width, height) = node_size(node.kind());
        let sockets = node
            .sockets()
            .map(|socket| SocketView {
                id: socket.id(),
                anchor: socket_anchor(node, socket.id()),
                connected: socket.is_connected(),
            })
            .collect();

        Self {
            id: node.id(),
            kind: node.kind(),
            label: node.kind().label(),
            position: node.position(),
            width,
            height,
            sockets,
            input_text: node.input_text().map(str::to_string),
            display: node.display(),
            selected,
        }
    }
}

/// A wire drawn between two socket anchors.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionView {
    pub id: ConnectionId,
    pub from: Position,
    pub to: Position,
}

impl ConnectionView {
    pub(crate) fn all(graph: &CircuitGraph) -> Vec<Self> {
        graph
            .connections()
            .filter_map(|connection| {
                let source = graph.node(connection.source().node)?;
                let target = graph.node(connection.target().node)?;
                Some(Self {
                    id: connection.id(),
                    from: socket_anchor(source, connection.source()),
                    to: socket_anchor(target, connection.target()),
                })
            })
            .collect()
    }
}
