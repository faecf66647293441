//! Evaluator
//!
//! This module computes the value at any node by recursive, pull-based
//! resolution over the circuit graph.
//!
//! # Algorithm
//!
//! Resolve(node) dispatches on the node's kind:
//!
//! 1. Input: its text if that is exactly "0" or "1", otherwise `Invalid`
//! 2. NOT: the complement of its source, `NoValue` if that is not a bit
//! 3. Two-input gates: the truth table applied to both sources, `NoValue`
//!    unless both are bits
//! 4. Output / Write Output: the value of its source
//!
//! Nothing is memoized; every query walks the graph from scratch. The
//! graph is only read, except for the cached display value that
//! [`Evaluator::refresh`] writes onto sink nodes.
//!
//! A sink turns the outcome into a [`DisplayValue`](crate::graph::DisplayValue):
//! the bit itself, `Use 0/1` when fed directly by a non-binary Input,
//! `No input` when unconnected, `Cycle` for a wire loop, and `Error` for
//! everything else.

mod gate;
mod resolver;
mod value;

pub use gate::apply as apply_gate;
pub use resolver::Evaluator;
pub use value::{NodeValue, Resolved};
