//! The concrete graph commands.
//!
//! Every command captures what it needs to reverse itself while it runs:
//! deleting a node keeps the node and all of its wires, disconnecting keeps
//! the wire, editing keeps the previous text. Undo and redo put things back
//! under their original ids.

use tracing::warn;

use super::command::{Command, Touched};
use crate::error::{EditorError, Result};
use crate::graph::{CircuitGraph, Connection, ConnectionId, DetachedNode, NodeId, NodeKind, Position, SocketId};

/// The node itself plus every node downstream of one of its wires.
fn touched_by(node: NodeId, detached: Option<&DetachedNode>) -> Touched {
    let mut touched = Touched::new();
    touched.push(node);
    for connection in detached.map(|d| d.connections()).unwrap_or_default() {
        let target = connection.target().node;
        if !touched.contains(&target) {
            touched.push(target);
        }
    }
    touched
}

/// Creates a node.
#[derive(Debug)]
pub struct AddNode {
    kind: NodeKind,
    position: Position,
    input_text: String,
    node: Option<NodeId>,
    removed: Option<DetachedNode>,
}

impl AddNode {
    pub fn new(kind: NodeKind, position: Position, input_text: impl Into<String>) -> Self {
        Self { kind, position, input_text: input_text.into(), node: None, removed: None }
    }

    /// The id of the created node, once executed.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }
}

impl Command for AddNode {
    fn execute(&mut self, graph: &mut CircuitGraph) -> Result<()> {
        match &self.removed {
            // redo: bring back the very same node
            Some(detached) => {
                graph.restore_node(detached)?;
                self.removed = None;
            }
            None => {
                let id = graph.add_node_with_text(self.kind, self.position, &self.input_text);
                self.node = Some(id);
            }
        }
        Ok(())
    }

    fn undo(&mut self, graph: &mut CircuitGraph) -> Result<()> {
        let Some(id) = self.node else {
            return Ok(());
        };
        let detached = graph.detach_node(id).ok_or(EditorError::NodeNotFound(id))?;
        self.removed = Some(detached);
        Ok(())
    }

    fn name(&self) -> String {
        format!("Add {} node", self.kind)
    }

    fn touched(&self) -> Touched {
        match self.node {
            Some(node) => touched_by(node, self.removed.as_ref()),
            None => Touched::new(),
        }
    }
}

/// Deletes a node with every wire touching it.
#[derive(Debug)]
pub struct DeleteNode {
    node: NodeId,
    detached: Option<DetachedNode>,
}

impl DeleteNode {
    pub fn new(node: NodeId) -> Self {
        Self { node, detached: None }
    }
}

impl Command for DeleteNode {
    fn execute(&mut self, graph: &mut CircuitGraph) -> Result<()> {
        let detached = graph.detach_node(self.node).ok_or(EditorError::NodeNotFound(self.node))?;
        self.detached = Some(detached);
        Ok(())
    }

    fn undo(&mut self, graph: &mut CircuitGraph) -> Result<()> {
        let detached = self.detached.as_ref().ok_or(EditorError::NodeNotFound(self.node))?;
        graph.restore_node(detached)
    }

    fn name(&self) -> String {
        match &self.detached {
            Some(detached) => format!("Delete {} node", detached.node().kind()),
            None => format!("Delete node {}", self.node),
        }
    }

    fn touched(&self) -> Touched {
        touched_by(self.node, self.detached.as_ref())
    }
}

/// Wires an output socket to an input socket.
#[derive(Debug)]
pub struct Connect {
    source: SocketId,
    target: SocketId,
    connection: Option<Connection>,
}

impl Connect {
    pub fn new(source: SocketId, target: SocketId) -> Self {
        Self { source, target, connection: None }
    }

    /// The id of the created wire, once executed.
    pub fn connection(&self) -> Option<ConnectionId> {
        self.connection.map(|c| c.id())
    }
}

impl Command for Connect {
    fn execute(&mut self, graph: &mut CircuitGraph) -> Result<()> {
        let id = graph.connect(self.source, self.target)?;
        self.connection = Some(Connection::new(id, self.source, self.target));
        Ok(())
    }

    fn undo(&mut self, graph: &mut CircuitGraph) -> Result<()> {
        let Some(id) = self.connection() else {
            return Ok(());
        };
        graph.detach_connection(id).ok_or(EditorError::ConnectionNotFound(id))?;
        Ok(())
    }

    fn redo(&mut self, graph: &mut CircuitGraph) -> Result<()> {
        match self.connection {
            // same id, so a later Disconnect in the history still finds it
            Some(connection) => graph.attach(connection),
            None => self.execute(graph),
        }
    }

    fn name(&self) -> String {
        format!("Connect {} to {}", self.source, self.target)
    }

    fn touched(&self) -> Touched {
        let mut touched = Touched::new();
        touched.push(self.target.node);
        touched
    }
}

/// Removes a wire.
#[derive(Debug)]
pub struct Disconnect {
    connection: ConnectionId,
    removed: Option<Connection>,
}

impl Disconnect {
    pub fn new(connection: ConnectionId) -> Self {
        Self { connection, removed: None }
    }
}

impl Command for Disconnect {
    fn execute(&mut self, graph: &mut CircuitGraph) -> Result<()> {
        let removed = graph
            .detach_connection(self.connection)
            .ok_or(EditorError::ConnectionNotFound(self.connection))?;
        self.removed = Some(removed);
        Ok(())
    }

    fn undo(&mut self, graph: &mut CircuitGraph) -> Result<()> {
        let removed = self.removed.ok_or(EditorError::ConnectionNotFound(self.connection))?;
        graph.attach(removed)
    }

    fn name(&self) -> String {
        format!("Disconnect {}", self.connection)
    }

    fn touched(&self) -> Touched {
        self.removed.iter().map(|c| c.target().node).collect()
    }
}

/// Replaces the text of an Input node.
#[derive(Debug)]
pub struct EditInputValue {
    node: NodeId,
    text: String,
    previous: Option<String>,
}

impl EditInputValue {
    pub fn new(node: NodeId, text: impl Into<String>) -> Self {
        Self { node, text: text.into(), previous: None }
    }
}

impl Command for EditInputValue {
    fn execute(&mut self, graph: &mut CircuitGraph) -> Result<()> {
        let previous = graph.set_input_value(self.node, self.text.clone())?;
        self.previous = Some(previous);
        Ok(())
    }

    fn undo(&mut self, graph: &mut CircuitGraph) -> Result<()> {
        if let Some(previous) = &self.previous {
            graph.set_input_value(self.node, previous.clone())?;
        }
        Ok(())
    }

    fn name(&self) -> String {
        format!("Set input {} to '{}'", self.node, self.text)
    }

    fn touched(&self) -> Touched {
        let mut touched = Touched::new();
        touched.push(self.node);
        touched
    }
}

/// Moves a node on the canvas. Values are unaffected.
#[derive(Debug)]
pub struct MoveNode {
    node: NodeId,
    to: Position,
    from: Option<Position>,
}

impl MoveNode {
    pub fn new(node: NodeId, to: Position) -> Self {
        Self { node, to, from: None }
    }
}

impl Command for MoveNode {
    fn execute(&mut self, graph: &mut CircuitGraph) -> Result<()> {
        self.from = Some(graph.move_node(self.node, self.to)?);
        Ok(())
    }

    fn undo(&mut self, graph: &mut CircuitGraph) -> Result<()> {
        if let Some(from) = self.from {
            graph.move_node(self.node, from)?;
        }
        Ok(())
    }

    fn name(&self) -> String {
        format!("Move node {}", self.node)
    }

    fn touched(&self) -> Touched {
        Touched::new()
    }
}

/// Several commands recorded as one history entry.
///
/// Members run in order and are undone in reverse. If a member fails, the
/// members already applied are rolled back before the error is returned.
#[derive(Debug)]
pub struct Batch {
    name: String,
    commands: Vec<Box<dyn Command>>,
}

impl Batch {
    pub fn new(name: impl Into<String>, commands: Vec<Box<dyn Command>>) -> Self {
        Self { name: name.into(), commands }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn run_all(&mut self, graph: &mut CircuitGraph, redo: bool) -> Result<()> {
        for i in 0..self.commands.len() {
            let outcome = if redo { self.commands[i].redo(graph) } else { self.commands[i].execute(graph) };
            if let Err(err) = outcome {
                for applied in self.commands[..i].iter_mut().rev() {
                    if let Err(rollback) = applied.undo(graph) {
                        warn!(command = %applied.name(), error = %rollback, "batch rollback failed");
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

impl Command for Batch {
    fn execute(&mut self, graph: &mut CircuitGraph) -> Result<()> {
        self.run_all(graph, false)
    }

    fn undo(&mut self, graph: &mut CircuitGraph) -> Result<()> {
        for command in self.commands.iter_mut().rev() {
            command.undo(graph)?;
        }
        Ok(())
    }

    fn redo(&mut self, graph: &mut CircuitGraph) -> Result<()> {
        self.run_all(graph, true)
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn touched(&self) -> Touched {
        let mut touched = Touched::new();
        for node in self.commands.iter().flat_map(|c| c.touched()) {
            if !touched.contains(&node) {
                touched.push(node);
            }
        }
        touched
    }
}
