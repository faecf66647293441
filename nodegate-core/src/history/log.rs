use std::collections::VecDeque;

use tracing::debug;

use super::command::{Command, Touched};
use crate::error::Result;
use crate::graph::CircuitGraph;

/// What a command did, reported after it was executed, undone or redone.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    /// The command's name, for the status line.
    pub name: String,
    /// Where re-evaluation should start.
    pub touched: Touched,
}

impl Applied {
    fn of(command: &dyn Command) -> Self {
        Self { name: command.name(), touched: command.touched() }
    }
}

/// Undo and redo stacks of executed commands.
///
/// The log does not own the graph; it is handed the graph on every call so
/// the editing session decides where mutations originate.
#[derive(Debug, Default)]
pub struct CommandLog {
    undo_stack: VecDeque<Box<dyn Command>>,
    redo_stack: Vec<Box<dyn Command>>,
    limit: Option<usize>,
}

impl CommandLog {
    /// Create an unbounded log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log that keeps at most `limit` undoable commands, dropping
    /// the oldest first.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self { limit, ..Self::default() }
    }

    /// Executes a command and records it. Clears the redo stack.
    ///
    /// A command that fails is not recorded and the redo stack is kept.
    pub fn execute(&mut self, mut command: Box<dyn Command>, graph: &mut CircuitGraph) -> Result<Applied> {
        command.execute(graph)?;
        let applied = Applied::of(command.as_ref());
        debug!(command = %applied.name, "executed");

        self.redo_stack.clear();
        self.undo_stack.push_back(command);
        if let Some(limit) = self.limit {
            while self.undo_stack.len() > limit {
                self.undo_stack.pop_front();
            }
        }
        Ok(applied)
    }

    /// Undoes the last command.
    ///
    /// Returns `None` if there was nothing to undo.
    pub fn undo(&mut self, graph: &mut CircuitGraph) -> Result<Option<Applied>> {
        let Some(mut command) = self.undo_stack.pop_back() else {
            debug!("nothing to undo");
            return Ok(None);
        };
        if let Err(err) = command.undo(graph) {
            self.undo_stack.push_back(command);
            return Err(err);
        }
        let applied = Applied::of(command.as_ref());
        debug!(command = %applied.name, "undone");
        self.redo_stack.push(command);
        Ok(Some(applied))
    }

    /// Redoes the last undone command.
    ///
    /// Returns `None` if there was nothing to redo.
    pub fn redo(&mut self, graph: &mut CircuitGraph) -> Result<Option<Applied>> {
        let Some(mut command) = self.redo_stack.pop() else {
            debug!("nothing to redo");
            return Ok(None);
        };
        if let Err(err) = command.redo(graph) {
            self.redo_stack.push(command);
            return Err(err);
        }
        let applied = Applied::of(command.as_ref());
        debug!(command = %applied.name, "redone");
        self.undo_stack.push_back(command);
        Ok(Some(applied))
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Names of the undoable commands, most recent last.
    pub fn undo_names(&self) -> Vec<String> {
        self.undo_stack.iter().map(|c| c.name()).collect()
    }

    /// Forget all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
