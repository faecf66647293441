//! Graph Nodes
//!
//! This module defines the node types that live in the circuit graph.
//!
//! A node's kind fixes its socket layout at creation: the number of input
//! sockets and whether it has an output socket never change afterwards.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use super::socket::{Socket, SocketDirection, SocketId};

/// Unique identifier for a node in the circuit graph.
///
/// Ids are allocated by the owning graph and never reused, so a node that
/// is removed and later restored keeps the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of a node, as offered by the editor palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A user-edited text field. No inputs, one output.
    Input,
    /// Displays the value arriving on its single input.
    Output,
    /// Like `Output`, and can additionally write its value to a file.
    WriteOutput,
    And,
    Or,
    Not,
    Nand,
    Nor,
    Xor,
    Xnor,
}

impl NodeKind {
    /// Every kind, in palette order.
    pub const ALL: [NodeKind; 10] = [
        NodeKind::Input,
        NodeKind::Output,
        NodeKind::And,
        NodeKind::Or,
        NodeKind::Not,
        NodeKind::Nand,
        NodeKind::Nor,
        NodeKind::Xor,
        NodeKind::Xnor,
        NodeKind::WriteOutput,
    ];

    /// The palette label of this kind.
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Input => "Input",
            NodeKind::Output => "Output",
            NodeKind::WriteOutput => "Write Output",
            NodeKind::And => "AND",
            NodeKind::Or => "OR",
            NodeKind::Not => "NOT",
            NodeKind::Nand => "NAND",
            NodeKind::Nor => "NOR",
            NodeKind::Xor => "XOR",
            NodeKind::Xnor => "XNOR",
        }
    }

    /// Number of input sockets a node of this kind is created with.
    pub fn input_arity(self) -> usize {
        match self {
            NodeKind::Input => 0,
            NodeKind::Output | NodeKind::WriteOutput | NodeKind::Not => 1,
            NodeKind::And | NodeKind::Or | NodeKind::Nand | NodeKind::Nor | NodeKind::Xor | NodeKind::Xnor => 2,
        }
    }

    /// Whether a node of this kind has an output socket.
    pub fn has_output(self) -> bool {
        !self.is_sink()
    }

    /// Sinks display the value they receive instead of producing one.
    pub fn is_sink(self) -> bool {
        matches!(self, NodeKind::Output | NodeKind::WriteOutput)
    }

    /// Logic gates, i.e. everything that is neither an input nor a sink.
    pub fn is_gate(self) -> bool {
        !matches!(self, NodeKind::Input | NodeKind::Output | NodeKind::WriteOutput)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a palette label names no node kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown node kind '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for NodeKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.label() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Canvas position of a node's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// This position shifted by `dx`, `dy`.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

/// The value shown by a sink node.
///
/// Each failure path keeps its own state so the editor can tell the user
/// why no bit arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayValue {
    /// Nothing has been evaluated yet.
    #[default]
    Pending,
    /// A propagated 0 or 1.
    Bit(bool),
    /// The source is an Input node whose text is not 0 or 1.
    UseBinary,
    /// The sink's input socket is not connected.
    NoInput,
    /// Any other chain that failed to produce a bit.
    Error,
    /// The chain feeding the sink loops back on itself.
    Cycle,
}

impl DisplayValue {
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayValue::Pending => "--",
            DisplayValue::Bit(false) => "0",
            DisplayValue::Bit(true) => "1",
            DisplayValue::UseBinary => "Use 0/1",
            DisplayValue::NoInput => "No input",
            DisplayValue::Error => "Error",
            DisplayValue::Cycle => "Cycle",
        }
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific state carried by a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeState {
    /// Gates carry nothing besides their wiring.
    Gate,
    /// Raw text typed into an Input node. Validated only on evaluation.
    Text(String),
    /// Cached display value of an Output or WriteOutput node.
    Display(DisplayValue),
}

/// A node in the circuit graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    position: Position,
    inputs: SmallVec<[Socket; 2]>,
    output: Option<Socket>,
    state: NodeState,
}

impl Node {
    /// Create a node with the socket layout its kind prescribes.
    ///
    /// `input_text` seeds the text of Input nodes and is ignored otherwise.
    pub(crate) fn new(id: NodeId, kind: NodeKind, position: Position, input_text: &str) -> Self {
        let inputs = (0..kind.input_arity())
            .map(|index| Socket::new(SocketId::input(id, index)))
            .collect();
        let output = kind.has_output().then(|| Socket::new(SocketId::output(id)));
        let state = match kind {
            NodeKind::Input => NodeState::Text(input_text.to_string()),
            NodeKind::Output | NodeKind::WriteOutput => NodeState::Display(DisplayValue::Pending),
            _ => NodeState::Gate,
        };

        Self { id, kind, position, inputs, output, state }
    }

    /// Get the node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get the node's kind.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Input sockets in index order.
    pub fn inputs(&self) -> &[Socket] {
        &self.inputs
    }

    pub fn output(&self) -> Option<&Socket> {
        self.output.as_ref()
    }

    /// Look up one of this node's sockets.
    pub fn socket(&self, id: SocketId) -> Option<&Socket> {
        if id.node != self.id {
            return None;
        }
        match id.direction {
            SocketDirection::Input => self.inputs.get(id.index),
            SocketDirection::Output => self.output.as_ref().filter(|_| id.index == 0),
        }
    }

    pub(crate) fn socket_mut(&mut self, id: SocketId) -> Option<&mut Socket> {
        if id.node != self.id {
            return None;
        }
        match id.direction {
            SocketDirection::Input => self.inputs.get_mut(id.index),
            SocketDirection::Output => self.output.as_mut().filter(|_| id.index == 0),
        }
    }

    /// Every socket of this node, inputs first.
    pub fn sockets(&self) -> impl Iterator<Item = &Socket> {
        self.inputs.iter().chain(self.output.iter())
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    /// The raw text of an Input node.
    pub fn input_text(&self) -> Option<&str> {
        match &self.state {
            NodeState::Text(text) => Some(text),
            _ => None,
        }
    }

    pub(crate) fn set_input_text(&mut self, text: String) -> Option<String> {
        match &mut self.state {
            NodeState::Text(current) => Some(std::mem::replace(current, text)),
            _ => None,
        }
    }

    /// The cached display value of a sink node.
    pub fn display(&self) -> Option<DisplayValue> {
        match self.state {
            NodeState::Display(value) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn set_display(&mut self, value: DisplayValue) {
        if let NodeState::Display(current) = &mut self.state {
            *current = value;
        }
    }
}
