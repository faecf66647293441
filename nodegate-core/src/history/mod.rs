//! Command Log
//!
//! Every graph mutation is expressed as a reversible [`Command`] and run
//! through a [`CommandLog`], which keeps an undo stack and a redo stack.
//!
//! # Rules
//!
//! 1. `execute` applies a command, pushes it onto the undo stack and
//!    clears the redo stack
//! 2. `undo` pops the last command, reverses it and pushes it onto the
//!    redo stack
//! 3. `redo` pops the last undone command, reapplies it and pushes it
//!    back onto the undo stack
//!
//! Undo and redo on an empty stack do nothing. A command that fails to
//! execute leaves both the graph and the history untouched.

mod command;
mod commands;
mod log;

pub use command::{Command, Touched};
pub use commands::{AddNode, Batch, Connect, DeleteNode, Disconnect, EditInputValue, MoveNode};
pub use log::{Applied, CommandLog};
