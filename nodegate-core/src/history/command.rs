use smallvec::SmallVec;

use crate::error::Result;
use crate::graph::{CircuitGraph, NodeId};

/// Nodes whose value may have changed because of a command.
pub type Touched = SmallVec<[NodeId; 4]>;

/// Trait for an executable and reversible graph mutation.
pub trait Command: std::fmt::Debug {
    /// Applies the command to the graph.
    ///
    /// On error the graph must be left as it was.
    fn execute(&mut self, graph: &mut CircuitGraph) -> Result<()>;

    /// Reverts what `execute` did.
    fn undo(&mut self, graph: &mut CircuitGraph) -> Result<()>;

    /// Reapplies the command after an undo.
    fn redo(&mut self, graph: &mut CircuitGraph) -> Result<()> {
        self.execute(graph)
    }

    /// Returns a human-readable name for the command, e.g. for a status line.
    fn name(&self) -> String {
        format!("{:?}", self)
    }

    /// The nodes from which re-evaluation should start after this command
    /// was executed, undone or redone.
    fn touched(&self) -> Touched;
}
