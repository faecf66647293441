//! Editing Session
//!
//! [`EditorSession`] is the boundary a presentation layer talks to. It
//! owns the graph, the command log and the editor-only state around them:
//! the selection, the clipboard, the status line and a wire that is being
//! dragged out of a socket.
//!
//! # Overview
//!
//! Every user intent becomes a [`Command`] run through the
//! [`CommandLog`]. After a command is executed, undone or redone, the
//! session refreshes the display value of every sink the command could
//! have affected:
//!
//! - `Propagation::Transitive` walks all nodes downstream of the nodes the
//!   command touched
//! - `Propagation::SingleHop` only looks at those nodes and the nodes
//!   wired directly to them
//!
//! A sink keeps showing `--` until its input is wired for the first time.
//! The presentation layer then reads [`NodeView`]s and
//! [`ConnectionView`]s to draw the canvas.

pub mod layout;
mod view;

use std::fs::File;
use std::io::Write;
use std::path::Path;

use indexmap::IndexSet;
use tracing::{debug, info};

use crate::config::{EditorConfig, Propagation};
use crate::error::{ConnectionRule, EditorError, Result};
use crate::eval::{Evaluator, NodeValue};
use crate::graph::{
    CircuitGraph, ConnectionId, DisplayValue, NodeId, NodeKind, PendingWire, Position, SocketId,
};
use crate::history::{
    AddNode, Applied, Batch, Command, CommandLog, Connect, DeleteNode, Disconnect, EditInputValue, MoveNode,
};

pub use view::{ConnectionView, NodeView, SocketView};

/// A copied node, enough to create a fresh one like it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardEntry {
    pub kind: NodeKind,
    pub position: Position,
    pub input_text: Option<String>,
}

/// A sink that was never wired keeps showing `--`.
fn awaiting_first_wire(graph: &CircuitGraph, id: NodeId) -> bool {
    graph.node(id).is_some_and(|node| {
        node.display() == Some(DisplayValue::Pending) && !node.inputs().iter().any(|s| s.is_connected())
    })
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// One open circuit with its history and editor state.
#[derive(Debug)]
pub struct EditorSession {
    graph: CircuitGraph,
    history: CommandLog,
    config: EditorConfig,
    selection: IndexSet<NodeId>,
    clipboard: Vec<ClipboardEntry>,
    status: Option<String>,
    wire: Option<PendingWire>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            graph: CircuitGraph::with_rules(config.connection_rules()),
            history: CommandLog::with_limit(config.history_limit),
            config,
            selection: IndexSet::new(),
            clipboard: Vec::new(),
            status: None,
            wire: None,
        }
    }

    pub fn graph(&self) -> &CircuitGraph {
        &self.graph
    }

    pub fn history(&self) -> &CommandLog {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The last status message, e.g. `Undo: Add AND node`.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    // intents

    /// Add a node; Input nodes start with the configured default text.
    pub fn add_node(&mut self, kind: NodeKind, x: f64, y: f64) -> Result<NodeId> {
        let id = self.graph.next_node_id();
        let command = AddNode::new(kind, Position::new(x, y), self.config.default_input_text.clone());
        self.run(Box::new(command))?;
        Ok(id)
    }

    pub fn delete_node(&mut self, node: NodeId) -> Result<()> {
        self.run(Box::new(DeleteNode::new(node)))?;
        Ok(())
    }

    /// Wire an output socket to an input socket.
    ///
    /// A rejected wire leaves the graph and the history unchanged.
    pub fn connect(&mut self, source: SocketId, target: SocketId) -> Result<ConnectionId> {
        let id = self.graph.next_connection_id();
        self.run(Box::new(Connect::new(source, target)))?;
        Ok(id)
    }

    pub fn disconnect(&mut self, connection: ConnectionId) -> Result<()> {
        self.run(Box::new(Disconnect::new(connection)))?;
        Ok(())
    }

    /// Replace the text of an Input node. Any text is accepted; only `0` and
    /// `1` evaluate to a bit.
    pub fn set_input_value(&mut self, node: NodeId, text: impl Into<String>) -> Result<()> {
        self.run(Box::new(EditInputValue::new(node, text)))?;
        Ok(())
    }

    pub fn move_node(&mut self, node: NodeId, x: f64, y: f64) -> Result<()> {
        self.run(Box::new(MoveNode::new(node, Position::new(x, y))))?;
        Ok(())
    }

    /// Undo the last command, returning its name. `None` if the history is
    /// empty.
    pub fn undo(&mut self) -> Result<Option<String>> {
        let Some(applied) = self.history.undo(&mut self.graph)? else {
            return Ok(None);
        };
        self.settle(&applied)?;
        self.status = Some(format!("Undo: {}", applied.name));
        Ok(Some(applied.name))
    }

    /// Redo the last undone command, returning its name. `None` if there is
    /// nothing to redo.
    pub fn redo(&mut self) -> Result<Option<String>> {
        let Some(applied) = self.history.redo(&mut self.graph)? else {
            return Ok(None);
        };
        self.settle(&applied)?;
        self.status = Some(format!("Redo: {}", applied.name));
        Ok(Some(applied.name))
    }

    /// The current value of any node, computed from the graph as it is now.
    pub fn evaluate(&self, node: NodeId) -> Result<NodeValue> {
        Evaluator::new(&self.graph).evaluate(node)
    }

    fn run(&mut self, command: Box<dyn Command>) -> Result<Applied> {
        let applied = self.history.execute(command, &mut self.graph)?;
        self.settle(&applied)?;
        self.status = Some(applied.name.clone());
        Ok(applied)
    }

    /// Bring displays and selection in line with the graph after a change.
    fn settle(&mut self, applied: &Applied) -> Result<()> {
        let graph = &self.graph;
        self.selection.retain(|id| graph.contains_node(*id));
        if self.wire.is_some_and(|wire| !graph.contains_node(wire.source.node)) {
            self.wire = None;
        }

        let affected: Vec<NodeId> = match self.config.propagation {
            Propagation::Transitive => graph.downstream(&applied.touched),
            Propagation::SingleHop => {
                let mut affected: IndexSet<NodeId> = applied.touched.iter().copied().collect();
                for &node in &applied.touched {
                    affected.extend(graph.dependents(node));
                }
                affected.into_iter().collect()
            }
        };
        let affected: Vec<NodeId> = affected.into_iter().filter(|id| !awaiting_first_wire(graph, *id)).collect();
        let refreshed = Evaluator::refresh_all(&mut self.graph, &affected)?;
        debug!(command = %applied.name, refreshed = refreshed.len(), "displays refreshed");
        Ok(())
    }

    // drag wiring

    /// Start dragging a wire out of an output socket.
    pub fn begin_wire(&mut self, source: SocketId) -> Result<()> {
        let node = self
            .graph
            .node(source.node)
            .filter(|node| node.socket(source).is_some())
            .ok_or(ConnectionRule::UnknownSocket)?;
        if !source.is_output() {
            return Err(ConnectionRule::SourceNotOutput.into());
        }
        let pointer = layout::socket_anchor(node, source);
        self.wire = Some(PendingWire { source, pointer });
        Ok(())
    }

    /// Move the free end of the wire being dragged.
    pub fn drag_wire(&mut self, pointer: Position) {
        if let Some(wire) = &mut self.wire {
            wire.pointer = pointer;
        }
    }

    /// Drop the wire being dragged.
    ///
    /// Over an input socket the wire is connected; over nothing it is
    /// discarded without touching the history. An invalid target discards
    /// the wire too and reports why.
    pub fn release_wire(&mut self, target: Option<SocketId>) -> Result<Option<ConnectionId>> {
        let Some(wire) = self.wire.take() else {
            return Ok(None);
        };
        match target {
            Some(target) => self.connect(wire.source, target).map(Some),
            None => {
                debug!(source = %wire.source, "wire dropped");
                Ok(None)
            }
        }
    }

    pub fn pending_wire(&self) -> Option<PendingWire> {
        self.wire
    }

    // selection

    /// Add a node to the selection. Returns false for unknown nodes.
    pub fn select(&mut self, node: NodeId) -> bool {
        if !self.graph.contains_node(node) {
            return false;
        }
        self.selection.insert(node);
        true
    }

    pub fn deselect(&mut self, node: NodeId) -> bool {
        self.selection.shift_remove(&node)
    }

    pub fn toggle_selection(&mut self, node: NodeId) {
        if !self.deselect(node) {
            self.select(node);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selected nodes, in selection order.
    pub fn selection(&self) -> &IndexSet<NodeId> {
        &self.selection
    }

    pub fn is_selected(&self, node: NodeId) -> bool {
        self.selection.contains(&node)
    }

    // clipboard

    /// Copy the selected nodes. Returns how many were copied.
    pub fn copy(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        self.clipboard = self
            .selection
            .iter()
            .filter_map(|id| self.graph.node(*id))
            .map(|node| ClipboardEntry {
                kind: node.kind(),
                position: node.position(),
                input_text: node.input_text().map(str::to_string),
            })
            .collect();
        self.status = Some("Copied items to clipboard".to_string());
        self.clipboard.len()
    }

    /// Copy the selected nodes, then delete them.
    pub fn cut(&mut self) -> Result<usize> {
        let copied = self.copy();
        if copied > 0 {
            self.delete_selected()?;
            self.status = Some("Cut items to clipboard".to_string());
        }
        Ok(copied)
    }

    /// Re-create the clipboard nodes, shifted by the paste offset, as one
    /// undoable step. The pasted nodes become the selection.
    pub fn paste(&mut self) -> Result<Vec<NodeId>> {
        if self.clipboard.is_empty() {
            return Ok(Vec::new());
        }
        let offset = self.config.paste_offset;
        let commands: Vec<Box<dyn Command>> = self
            .clipboard
            .iter()
            .map(|entry| {
                let text = entry.input_text.as_deref().unwrap_or(self.config.default_input_text.as_str());
                Box::new(AddNode::new(entry.kind, entry.position.offset(offset, offset), text)) as Box<dyn Command>
            })
            .collect();
        let name = format!("Paste {}", plural(commands.len(), "node"));

        let applied = self.run(Box::new(Batch::new(name, commands)))?;
        self.selection = applied.touched.iter().copied().collect();
        self.status = Some("Pasted items from clipboard".to_string());
        Ok(applied.touched.to_vec())
    }

    /// Delete every selected node as one undoable step.
    pub fn delete_selected(&mut self) -> Result<usize> {
        if self.selection.is_empty() {
            return Ok(0);
        }
        let commands: Vec<Box<dyn Command>> = self
            .selection
            .iter()
            .map(|id| Box::new(DeleteNode::new(*id)) as Box<dyn Command>)
            .collect();
        let count = commands.len();
        self.run(Box::new(Batch::new(format!("Delete {}", plural(count, "node")), commands)))?;
        Ok(count)
    }

    pub fn clipboard(&self) -> &[ClipboardEntry] {
        &self.clipboard
    }

    // views

    pub fn node_views(&self) -> Vec<NodeView> {
        self.graph
            .nodes()
            .map(|node| NodeView::of(node, self.selection.contains(&node.id())))
            .collect()
    }

    pub fn connection_views(&self) -> Vec<ConnectionView> {
        ConnectionView::all(&self.graph)
    }

    // output

    /// Write a Write Output node's displayed value to `writer`.
    ///
    /// Returns false, writing nothing, while the node has not received a
    /// value yet.
    pub fn write_output(&self, node: NodeId, writer: &mut impl Write) -> Result<bool> {
        let Some(text) = self.output_text(node)? else {
            return Ok(false);
        };
        writer.write_all(text.as_bytes())?;
        info!(node = %node, value = text, "output written");
        Ok(true)
    }

    /// Write a Write Output node's displayed value to a file, replacing its
    /// contents. The file is not created while there is nothing to write.
    pub fn write_output_to_path(&self, node: NodeId, path: impl AsRef<Path>) -> Result<bool> {
        if self.output_text(node)?.is_none() {
            return Ok(false);
        }
        let mut file = File::create(path.as_ref())?;
        let written = self.write_output(node, &mut file)?;
        file.flush()?;
        Ok(written)
    }

    fn output_text(&self, id: NodeId) -> Result<Option<&'static str>> {
        let node = self.graph.node(id).ok_or(EditorError::NodeNotFound(id))?;
        if node.kind() != NodeKind::WriteOutput {
            return Err(EditorError::WrongKind { node: id, kind: node.kind(), expected: NodeKind::WriteOutput });
        }
        Ok(match node.display() {
            None | Some(DisplayValue::Pending) => None,
            Some(value) => Some(value.as_str()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::Resolved;

    fn display(session: &EditorSession, node: NodeId) -> Option<DisplayValue> {
        session.graph().node(node).and_then(|n| n.display())
    }

    /// Input -> NOT -> Output, all wired.
    fn inverter(session: &mut EditorSession) -> (NodeId, NodeId, NodeId) {
        let input = session.add_node(NodeKind::Input, 0.0, 0.0).unwrap();
        let not = session.add_node(NodeKind::Not, 150.0, 0.0).unwrap();
        let out = session.add_node(NodeKind::Output, 300.0, 0.0).unwrap();
        session.connect(SocketId::output(input), SocketId::input(not, 0)).unwrap();
        session.connect(SocketId::output(not), SocketId::input(out, 0)).unwrap();
        (input, not, out)
    }

    #[test]
    fn edits_propagate_to_sinks() {
        let mut session = EditorSession::default();
        let (input, _, out) = inverter(&mut session);
        assert_eq!(display(&session, out), Some(DisplayValue::Bit(false)));

        session.set_input_value(input, "0").unwrap();
        assert_eq!(display(&session, out), Some(DisplayValue::Bit(true)));

        session.set_input_value(input, "x").unwrap();
        assert_eq!(display(&session, out), Some(DisplayValue::Error));
    }

    #[test]
    fn single_hop_stops_after_one_wire() {
        let config = EditorConfig { propagation: Propagation::SingleHop, ..EditorConfig::default() };
        let mut session = EditorSession::new(config);
        let (input, _, out) = inverter(&mut session);
        assert_eq!(display(&session, out), Some(DisplayValue::Bit(false)));

        // the Output sits two wires away from the edited Input
        session.set_input_value(input, "0").unwrap();
        assert_eq!(display(&session, out), Some(DisplayValue::Bit(false)));
        assert_eq!(session.evaluate(out).unwrap(), NodeValue::Display(DisplayValue::Bit(true)));
    }

    #[test]
    fn undo_and_redo_update_status() {
        let mut session = EditorSession::default();
        session.add_node(NodeKind::And, 0.0, 0.0).unwrap();
        assert_eq!(session.status(), Some("Add AND node"));

        assert_eq!(session.undo().unwrap().as_deref(), Some("Add AND node"));
        assert_eq!(session.status(), Some("Undo: Add AND node"));
        assert_eq!(session.graph().node_count(), 0);

        session.redo().unwrap();
        assert_eq!(session.status(), Some("Redo: Add AND node"));
        assert!(session.undo().unwrap().is_some());
        assert!(session.undo().unwrap().is_none());
    }

    #[test]
    fn undoing_a_wire_resets_the_display() {
        let mut session = EditorSession::default();
        let input = session.add_node(NodeKind::Input, 0.0, 0.0).unwrap();
        let out = session.add_node(NodeKind::Output, 200.0, 0.0).unwrap();
        session.connect(SocketId::output(input), SocketId::input(out, 0)).unwrap();
        assert_eq!(display(&session, out), Some(DisplayValue::Bit(true)));

        session.undo().unwrap();
        assert_eq!(display(&session, out), Some(DisplayValue::NoInput));
    }

    #[test]
    fn released_wire_connects() {
        let mut session = EditorSession::default();
        let input = session.add_node(NodeKind::Input, 0.0, 0.0).unwrap();
        let out = session.add_node(NodeKind::Output, 200.0, 0.0).unwrap();

        session.begin_wire(SocketId::output(input)).unwrap();
        assert_eq!(session.pending_wire().map(|w| w.pointer), Some(Position::new(126.0, 15.0)));
        session.drag_wire(Position::new(180.0, 20.0));
        assert_eq!(session.pending_wire().map(|w| w.pointer), Some(Position::new(180.0, 20.0)));

        let wire = session.release_wire(Some(SocketId::input(out, 0))).unwrap();
        assert!(wire.is_some());
        assert!(session.pending_wire().is_none());
        assert_eq!(session.evaluate(out).unwrap(), NodeValue::Display(DisplayValue::Bit(true)));
    }

    #[test]
    fn wire_dropped_on_nothing_leaves_history_alone() {
        let mut session = EditorSession::default();
        let input = session.add_node(NodeKind::Input, 0.0, 0.0).unwrap();

        session.begin_wire(SocketId::output(input)).unwrap();
        assert_eq!(session.release_wire(None).unwrap(), None);
        assert_eq!(session.history().undo_len(), 1);
        assert_eq!(session.graph().connection_count(), 0);
    }

    #[test]
    fn wires_start_only_at_outputs() {
        let mut session = EditorSession::default();
        let gate = session.add_node(NodeKind::Or, 0.0, 0.0).unwrap();

        let err = session.begin_wire(SocketId::input(gate, 0)).unwrap_err();
        assert!(matches!(err, EditorError::InvalidConnection(ConnectionRule::SourceNotOutput)));
        let err = session.begin_wire(SocketId::input(gate, 5)).unwrap_err();
        assert!(matches!(err, EditorError::InvalidConnection(ConnectionRule::UnknownSocket)));
        assert!(session.pending_wire().is_none());
    }

    #[test]
    fn invalid_release_discards_the_wire() {
        let mut session = EditorSession::default();
        let a = session.add_node(NodeKind::Input, 0.0, 0.0).unwrap();
        let b = session.add_node(NodeKind::Input, 0.0, 100.0).unwrap();

        session.begin_wire(SocketId::output(a)).unwrap();
        let err = session.release_wire(Some(SocketId::output(b))).unwrap_err();
        assert!(matches!(err, EditorError::InvalidConnection(ConnectionRule::TargetNotInput)));
        assert!(session.pending_wire().is_none());
        assert_eq!(session.history().undo_len(), 2);
    }

    #[test]
    fn copy_paste_offsets_and_selects() {
        let mut session = EditorSession::default();
        let input = session.add_node(NodeKind::Input, 10.0, 10.0).unwrap();
        session.set_input_value(input, "0").unwrap();
        let gate = session.add_node(NodeKind::Nor, 50.0, 60.0).unwrap();
        session.select(input);
        session.select(gate);

        assert_eq!(session.copy(), 2);
        let pasted = session.paste().unwrap();
        assert_eq!(pasted.len(), 2);
        assert_eq!(session.selection().iter().copied().collect::<Vec<_>>(), pasted);
        assert_eq!(session.status(), Some("Pasted items from clipboard"));

        let copy = session.graph().node(pasted[0]).unwrap();
        assert_eq!(copy.position(), Position::new(30.0, 30.0));
        assert_eq!(copy.input_text(), Some("0"));
        assert_eq!(session.graph().node(pasted[1]).unwrap().kind(), NodeKind::Nor);

        // one history entry for the whole paste
        assert_eq!(session.undo().unwrap().as_deref(), Some("Paste 2 nodes"));
        assert_eq!(session.graph().node_count(), 2);
        assert!(session.selection().is_empty());
    }

    #[test]
    fn cut_removes_and_fills_clipboard() {
        let mut session = EditorSession::default();
        let (input, not, out) = inverter(&mut session);
        session.select(not);

        assert_eq!(session.cut().unwrap(), 1);
        assert!(!session.graph().contains_node(not));
        assert_eq!(session.clipboard()[0].kind, NodeKind::Not);
        assert_eq!(display(&session, out), Some(DisplayValue::NoInput));
        assert_eq!(session.status(), Some("Cut items to clipboard"));

        session.undo().unwrap();
        assert_eq!(session.graph().source_node(not, 0), Some(input));
        assert_eq!(display(&session, out), Some(DisplayValue::Bit(false)));
    }

    #[test]
    fn copy_with_empty_selection_keeps_clipboard() {
        let mut session = EditorSession::default();
        let node = session.add_node(NodeKind::Xor, 0.0, 0.0).unwrap();
        session.select(node);
        session.copy();
        session.clear_selection();

        assert_eq!(session.copy(), 0);
        assert_eq!(session.clipboard().len(), 1);
    }

    #[test]
    fn selection_follows_deletes() {
        let mut session = EditorSession::default();
        let a = session.add_node(NodeKind::And, 0.0, 0.0).unwrap();
        let b = session.add_node(NodeKind::Or, 0.0, 80.0).unwrap();
        assert!(session.select(a));
        session.toggle_selection(b);
        assert!(!session.select(NodeId::from(99)));

        session.delete_node(a).unwrap();
        assert!(!session.is_selected(a));
        assert!(session.is_selected(b));

        session.toggle_selection(b);
        assert!(session.selection().is_empty());
    }

    #[test]
    fn views_describe_the_canvas() {
        let mut session = EditorSession::default();
        let (input, not, _) = inverter(&mut session);
        session.select(not);

        let views = session.node_views();
        assert_eq!(views.len(), 3);
        assert_eq!(views[0].input_text.as_deref(), Some("1"));
        assert_eq!(views[1].label, "NOT");
        assert!(views[1].selected);
        assert_eq!(views[1].sockets.len(), 2);
        assert_eq!(views[2].display, Some(DisplayValue::Bit(false)));

        let wires = session.connection_views();
        assert_eq!(wires.len(), 2);
        assert_eq!(wires[0].from, Position::new(126.0, 15.0));
        assert_eq!(wires[0].to, Position::new(144.0, 15.0));
        assert_eq!(session.evaluate(input).unwrap(), NodeValue::Resolved(Resolved::Bit(true)));
    }

    #[test]
    fn write_output_writes_display_text() {
        let mut session = EditorSession::default();
        let input = session.add_node(NodeKind::Input, 0.0, 0.0).unwrap();
        let sink = session.add_node(NodeKind::WriteOutput, 200.0, 0.0).unwrap();

        let mut buffer = Vec::new();
        assert!(!session.write_output(sink, &mut buffer).unwrap());
        assert!(buffer.is_empty());

        session.connect(SocketId::output(input), SocketId::input(sink, 0)).unwrap();
        assert!(session.write_output(sink, &mut buffer).unwrap());
        assert_eq!(buffer, b"1");

        let err = session.write_output(input, &mut buffer).unwrap_err();
        assert!(matches!(err, EditorError::WrongKind { expected: NodeKind::WriteOutput, .. }));
    }
}
