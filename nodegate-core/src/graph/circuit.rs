//! Circuit Graph
//!
//! The circuit graph owns every node, socket and connection and is the
//! only place where wiring rules are enforced.
//!
//! # Wiring rules
//!
//! A connection is attached only when:
//!
//! 1. its source is an existing output socket and its target an existing
//!    input socket,
//! 2. the two sockets belong to different nodes,
//! 3. the target socket has no connection yet (an occupied input is
//!    rejected, never replaced),
//! 4. with single fan-out configured, the source has no connection yet,
//! 5. unless cycles are allowed, the wire does not close a loop.
//!
//! A rejected connection leaves the graph untouched.
//!
//! # Propagation order
//!
//! [`CircuitGraph::downstream`] walks forward from a set of changed nodes
//! (breadth first), then sorts what it found so that every node comes
//! after the nodes it reads from. Refreshing nodes in that order keeps
//! every display consistent after a single pass.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use tracing::{debug, trace};

use super::connection::{Connection, ConnectionId};
use super::node::{DisplayValue, Node, NodeId, NodeKind, Position};
use super::socket::{Socket, SocketId};
use crate::error::{ConnectionRule, EditorError, Result};

/// Text a freshly created Input node starts with.
pub const DEFAULT_INPUT_TEXT: &str = "1";

/// Structural options for the wiring rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionRules {
    /// Allow one output socket to feed several inputs.
    pub allow_fanout: bool,
    /// Allow wires that close a loop. Evaluation then reports the cycle.
    pub allow_cycles: bool,
}

impl Default for ConnectionRules {
    fn default() -> Self {
        Self { allow_fanout: true, allow_cycles: false }
    }
}

/// A node removed from the graph together with every wire that touched it.
#[derive(Debug, Clone, PartialEq)]
pub struct DetachedNode {
    node: Node,
    connections: Vec<Connection>,
}

impl DetachedNode {
    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }
}

/// The circuit being edited.
#[derive(Debug, Clone, Default)]
pub struct CircuitGraph {
    /// All nodes, in creation order.
    nodes: IndexMap<NodeId, Node>,

    /// All attached connections, in creation order.
    connections: IndexMap<ConnectionId, Connection>,

    rules: ConnectionRules,
    next_node: u64,
    next_connection: u64,
}

impl CircuitGraph {
    /// Create an empty graph with the default wiring rules.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: ConnectionRules) -> Self {
        Self { rules, ..Self::default() }
    }

    pub fn rules(&self) -> ConnectionRules {
        self.rules
    }

    /// The id the next added node will receive.
    pub fn next_node_id(&self) -> NodeId {
        NodeId::from(self.next_node)
    }

    /// The id the next new connection will receive.
    pub fn next_connection_id(&self) -> ConnectionId {
        ConnectionId::from(self.next_connection)
    }

    // nodes

    /// Add a node of the given kind at `(x, y)`.
    pub fn add_node(&mut self, kind: NodeKind, x: f64, y: f64) -> NodeId {
        self.add_node_with_text(kind, Position::new(x, y), DEFAULT_INPUT_TEXT)
    }

    /// Add a node, seeding an Input node's text with `input_text`.
    pub fn add_node_with_text(&mut self, kind: NodeKind, position: Position, input_text: &str) -> NodeId {
        let id = NodeId::from(self.next_node);
        self.next_node += 1;
        self.nodes.insert(id, Node::new(id, kind, position, input_text));
        debug!(node = %id, %kind, "node added");
        id
    }

    /// Remove a node and every connection touching it.
    ///
    /// Does nothing if the node does not exist.
    pub fn remove_node(&mut self, id: NodeId) {
        self.detach_node(id);
    }

    /// Remove a node and return it with the connections it had.
    pub fn detach_node(&mut self, id: NodeId) -> Option<DetachedNode> {
        let touching: Vec<ConnectionId> = self
            .nodes
            .get(&id)?
            .sockets()
            .flat_map(|socket| socket.connections().iter().copied())
            .collect();

        let connections: Vec<Connection> = touching
            .into_iter()
            .filter_map(|connection| self.detach_connection(connection))
            .collect();

        let node = self.nodes.shift_remove(&id)?;
        debug!(node = %id, wires = connections.len(), "node removed");
        Some(DetachedNode { node, connections })
    }

    /// Put a detached node back under its original id and reattach the
    /// connections it was removed with.
    pub fn restore_node(&mut self, detached: &DetachedNode) -> Result<()> {
        let id = detached.node.id();
        if self.nodes.contains_key(&id) {
            return Err(EditorError::DuplicateNode(id));
        }

        self.nodes.insert(id, detached.node.clone());
        self.next_node = self.next_node.max(id.raw() + 1);

        for connection in &detached.connections {
            if let Err(err) = self.attach(*connection) {
                // leave the graph as it was before the restore
                self.detach_node(id);
                return Err(err);
            }
        }
        debug!(node = %id, "node restored");
        Ok(())
    }

    /// Move a node, returning where it was.
    pub fn move_node(&mut self, id: NodeId, position: Position) -> Result<Position> {
        let node = self.nodes.get_mut(&id).ok_or(EditorError::NodeNotFound(id))?;
        let previous = node.position();
        node.set_position(position);
        Ok(previous)
    }

    /// Store new raw text on an Input node, returning the old text.
    ///
    /// The text is not validated here; evaluation decides whether it is a bit.
    pub fn set_input_value(&mut self, id: NodeId, text: impl Into<String>) -> Result<String> {
        let node = self.nodes.get_mut(&id).ok_or(EditorError::NodeNotFound(id))?;
        let kind = node.kind();
        node.set_input_text(text.into())
            .ok_or(EditorError::WrongKind { node: id, kind, expected: NodeKind::Input })
    }

    pub(crate) fn set_display(&mut self, id: NodeId, value: DisplayValue) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.set_display(value);
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// All nodes, in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get the total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // connections

    /// Wire `source` (an output socket) to `target` (an input socket).
    pub fn connect(&mut self, source: SocketId, target: SocketId) -> Result<ConnectionId> {
        self.check_connection(source, target)?;
        let id = ConnectionId::from(self.next_connection);
        self.next_connection += 1;
        self.link(Connection::new(id, source, target));
        Ok(id)
    }

    /// Attach a connection that already has an id, e.g. one being restored.
    pub fn attach(&mut self, connection: Connection) -> Result<()> {
        if self.connections.contains_key(&connection.id()) {
            return Err(ConnectionRule::DuplicateId.into());
        }
        self.check_connection(connection.source(), connection.target())?;
        self.next_connection = self.next_connection.max(connection.id().raw() + 1);
        self.link(connection);
        Ok(())
    }

    /// Check whether a wire from `source` to `target` would be accepted.
    pub fn check_connection(&self, source: SocketId, target: SocketId) -> std::result::Result<(), ConnectionRule> {
        let verdict = self.connection_verdict(source, target);
        if let Err(rule) = verdict {
            debug!(%source, %target, %rule, "connection rejected");
        }
        verdict
    }

    fn connection_verdict(&self, source: SocketId, target: SocketId) -> std::result::Result<(), ConnectionRule> {
        if !source.is_output() {
            return Err(ConnectionRule::SourceNotOutput);
        }
        if !target.is_input() {
            return Err(ConnectionRule::TargetNotInput);
        }
        if source.node == target.node {
            return Err(ConnectionRule::SameNode);
        }
        let source_socket = self.socket(source).ok_or(ConnectionRule::UnknownSocket)?;
        let target_socket = self.socket(target).ok_or(ConnectionRule::UnknownSocket)?;
        if target_socket.is_connected() {
            return Err(ConnectionRule::TargetOccupied);
        }
        if !self.rules.allow_fanout && source_socket.is_connected() {
            return Err(ConnectionRule::OutputOccupied);
        }
        if !self.rules.allow_cycles && self.reaches(target.node, source.node) {
            return Err(ConnectionRule::WouldCreateCycle);
        }
        Ok(())
    }

    fn link(&mut self, connection: Connection) {
        for end in [connection.source(), connection.target()] {
            if let Some(socket) = self.socket_mut(end) {
                socket.add_connection(connection.id());
            }
        }
        debug!(wire = %connection.id(), source = %connection.source(), target = %connection.target(), "connected");
        self.connections.insert(connection.id(), connection);
    }

    /// Remove a connection. Does nothing if it does not exist.
    pub fn disconnect(&mut self, id: ConnectionId) {
        self.detach_connection(id);
    }

    /// Remove a connection and return it.
    pub fn detach_connection(&mut self, id: ConnectionId) -> Option<Connection> {
        let connection = self.connections.shift_remove(&id)?;
        for end in [connection.source(), connection.target()] {
            if let Some(socket) = self.socket_mut(end) {
                socket.remove_connection(id);
            }
        }
        debug!(wire = %id, "disconnected");
        Some(connection)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    /// All connections, in creation order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    // sockets

    pub fn socket(&self, id: SocketId) -> Option<&Socket> {
        self.nodes.get(&id.node)?.socket(id)
    }

    fn socket_mut(&mut self, id: SocketId) -> Option<&mut Socket> {
        self.nodes.get_mut(&id.node)?.socket_mut(id)
    }

    /// The connection feeding an input socket.
    pub fn incoming(&self, input: SocketId) -> Option<&Connection> {
        let id = self.socket(input).filter(|s| s.id().is_input())?.connection()?;
        self.connections.get(&id)
    }

    /// The node whose output feeds input `index` of `node`.
    pub fn source_node(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.incoming(SocketId::input(node, index)).map(|c| c.source().node)
    }

    // traversal

    /// Nodes reading directly from `id`'s output, without duplicates.
    pub fn dependents(&self, id: NodeId) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        self.nodes
            .get(&id)
            .and_then(|node| node.output())
            .map(|output| output.connections())
            .unwrap_or_default()
            .iter()
            .filter_map(|c| self.connections.get(c))
            .map(|c| c.target().node)
            .filter(|node| seen.insert(*node))
            .collect()
    }

    /// `roots` and every node transitively reading from them, ordered so
    /// that each node follows the nodes it depends on.
    ///
    /// Roots that do not exist are skipped.
    pub fn downstream(&self, roots: &[NodeId]) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut visited = HashSet::new();
        let mut queue: VecDeque<NodeId> = roots.iter().copied().collect();

        while let Some(node_id) = queue.pop_front() {
            if !self.nodes.contains_key(&node_id) || !visited.insert(node_id) {
                continue;
            }
            found.push(node_id);
            queue.extend(self.dependents(node_id));
        }

        trace!(roots = roots.len(), found = found.len(), "collected downstream nodes");
        self.topological_sort(found)
    }

    /// Kahn's algorithm over the given nodes. Nodes caught in a cycle never
    /// reach in-degree zero and are appended in their original order.
    fn topological_sort(&self, nodes: Vec<NodeId>) -> Vec<NodeId> {
        let node_set: HashSet<_> = nodes.iter().copied().collect();
        let mut in_degree: HashMap<NodeId, usize> = HashMap::new();
        let mut result = Vec::with_capacity(nodes.len());
        let mut queue = VecDeque::new();

        for &node_id in &nodes {
            let degree = self.dependencies(node_id).filter(|d| node_set.contains(d)).count();
            in_degree.insert(node_id, degree);
            if degree == 0 {
                queue.push_back(node_id);
            }
        }

        while let Some(node_id) = queue.pop_front() {
            result.push(node_id);

            for dependent_id in self.dependents(node_id) {
                if let Some(degree) = in_degree.get_mut(&dependent_id) {
                    // one decrement per wire, fan-in from the same node counts twice
                    let wires = self.dependencies(dependent_id).filter(|d| *d == node_id).count();
                    *degree = degree.saturating_sub(wires);
                    if *degree == 0 {
                        queue.push_back(dependent_id);
                    }
                }
            }
        }

        if result.len() < nodes.len() {
            let placed: HashSet<_> = result.iter().copied().collect();
            result.extend(nodes.into_iter().filter(|n| !placed.contains(n)));
        }
        result
    }

    /// Source nodes of every connected input of `id`, one entry per wire.
    fn dependencies(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .get(&id)
            .map(|node| node.inputs())
            .unwrap_or_default()
            .iter()
            .filter_map(|socket| socket.connection())
            .filter_map(|c| self.connections.get(&c))
            .map(|c| c.source().node)
    }

    /// Whether `to` can be reached from `from` by following wires forward.
    fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        let mut stack = vec![from];
        let mut visited = HashSet::new();
        while let Some(node) = stack.pop() {
            if node == to {
                return true;
            }
            if visited.insert(node) {
                stack.extend(self.dependents(node));
            }
        }
        false
    }
}
