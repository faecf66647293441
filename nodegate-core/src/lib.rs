//! Nodegate Core
//!
//! This crate provides the evaluation core of the Nodegate boolean circuit
//! editor. It implements:
//!
//! - The circuit graph of typed nodes, sockets and wires
//! - On-demand evaluation of logic gates with distinct failure displays
//! - An undo/redo command log for every graph mutation
//! - An editing session that ties them together for a presentation layer
//!
//! # Architecture
//!
//! - `graph`: nodes, sockets, connections and the wiring rules
//! - `eval`: the gate truth table and the recursive resolver
//! - `history`: reversible commands and the command log
//! - `session`: user intents, selection, clipboard and canvas views
//! - `config`: editor settings loaded from JSON
//!
//! # Example
//!
//! ```rust
//! use nodegate_core::{DisplayValue, EditorSession, NodeKind, SocketId};
//!
//! let mut session = EditorSession::default();
//! let input = session.add_node(NodeKind::Input, 0.0, 0.0)?;
//! let output = session.add_node(NodeKind::Output, 200.0, 0.0)?;
//! session.connect(SocketId::output(input), SocketId::input(output, 0))?;
//!
//! session.set_input_value(input, "0")?;
//! let shown = session.graph().node(output).and_then(|n| n.display());
//! assert_eq!(shown, Some(DisplayValue::Bit(false)));
//!
//! session.undo()?;
//! let shown = session.graph().node(output).and_then(|n| n.display());
//! assert_eq!(shown, Some(DisplayValue::Bit(true)));
//! # Ok::<(), nodegate_core::EditorError>(())
//! ```

pub mod config;
pub mod error;
pub mod eval;
pub mod graph;
pub mod history;
pub mod session;

pub use config::{EditorConfig, Propagation};
pub use error::{ConnectionRule, EditorError, Result};
pub use eval::{Evaluator, NodeValue, Resolved};
pub use graph::{CircuitGraph, ConnectionId, DisplayValue, NodeId, NodeKind, Position, SocketId};
pub use history::{Command, CommandLog};
pub use session::EditorSession;
