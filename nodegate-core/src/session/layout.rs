//! Canvas geometry of nodes and sockets.
//!
//! Positions are relative to a node's top-left corner. Input sockets sit
//! on the left edge, the output socket on the right edge, stacked from the
//! top in steps of [`SOCKET_SPACING`].

use crate::graph::{Node, NodeKind, Position, SocketDirection, SocketId};

pub const NODE_WIDTH: f64 = 120.0;
pub const NODE_HEIGHT: f64 = 50.0;
/// Write Output nodes are taller to make room for the write button.
pub const WRITE_OUTPUT_HEIGHT: f64 = 70.0;
pub const SOCKET_RADIUS: f64 = 6.0;
pub const SOCKET_TOP: f64 = 15.0;
pub const SOCKET_SPACING: f64 = 15.0;

/// Width and height of a node of the given kind.
pub fn node_size(kind: NodeKind) -> (f64, f64) {
    match kind {
        NodeKind::WriteOutput => (NODE_WIDTH, WRITE_OUTPUT_HEIGHT),
        _ => (NODE_WIDTH, NODE_HEIGHT),
    }
}

/// Centre of a socket in canvas coordinates.
pub fn socket_anchor(node: &Node, socket: SocketId) -> Position {
    let (width, _) = node_size(node.kind());
    let x = match socket.direction {
        SocketDirection::Input => -SOCKET_RADIUS,
        SocketDirection::Output => width + SOCKET_RADIUS,
    };
    let y = SOCKET_TOP + SOCKET_SPACING * socket.index as f64;
    node.position().offset(x, y)
}
