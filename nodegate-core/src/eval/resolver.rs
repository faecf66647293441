//! Pull-based resolution of node values.

use std::collections::HashSet;

use tracing::{trace, warn};

use super::gate;
use super::value::{NodeValue, Resolved};
use crate::error::{EditorError, Result};
use crate::graph::{CircuitGraph, DisplayValue, Node, NodeId, NodeKind};

/// Resolves node values by walking input connections backwards.
///
/// Nothing is cached between queries. The evaluator keeps the set of nodes
/// on the current resolution path so that a wire loop is reported as
/// [`EditorError::CycleDetected`] instead of recursing forever. A node
/// reached twice through different branches (a diamond) is not a cycle.
pub struct Evaluator<'g> {
    graph: &'g CircuitGraph,
    path: HashSet<NodeId>,
}

impl<'g> Evaluator<'g> {
    pub fn new(graph: &'g CircuitGraph) -> Self {
        Self { graph, path: HashSet::new() }
    }

    /// The effective value at `id`.
    ///
    /// Sinks mirror the value of their source, or `NoValue` when their
    /// input is not connected.
    pub fn resolve(&mut self, id: NodeId) -> Result<Resolved> {
        let graph = self.graph;
        let node = graph.node(id).ok_or(EditorError::NodeNotFound(id))?;

        if !self.path.insert(id) {
            warn!(node = %id, "cycle detected during resolution");
            return Err(EditorError::CycleDetected(id));
        }
        let resolved = self.resolve_node(node);
        self.path.remove(&id);

        let resolved = resolved?;
        trace!(node = %id, kind = %node.kind(), value = %resolved, "resolved");
        Ok(resolved)
    }

    fn resolve_node(&mut self, node: &Node) -> Result<Resolved> {
        let id = node.id();
        match node.kind() {
            NodeKind::Input => Ok(node.input_text().map(Resolved::from_text).unwrap_or(Resolved::Invalid)),
            NodeKind::Output | NodeKind::WriteOutput => Ok(self.resolve_input(id, 0)?.unwrap_or(Resolved::NoValue)),
            NodeKind::Not => match self.resolve_input(id, 0)?.and_then(Resolved::bit) {
                Some(bit) => Ok(Resolved::Bit(!bit)),
                None => Ok(Resolved::NoValue),
            },
            kind => {
                let a = self.resolve_input(id, 0)?.and_then(Resolved::bit);
                let b = self.resolve_input(id, 1)?.and_then(Resolved::bit);
                let out = match (a, b) {
                    (Some(a), Some(b)) => gate::apply(kind, a, b),
                    _ => None,
                };
                Ok(out.map(Resolved::Bit).unwrap_or(Resolved::NoValue))
            }
        }
    }

    /// Resolve whatever feeds input `index` of `node`; `None` if unconnected.
    fn resolve_input(&mut self, node: NodeId, index: usize) -> Result<Option<Resolved>> {
        match self.graph.source_node(node, index) {
            Some(source) => self.resolve(source).map(Some),
            None => Ok(None),
        }
    }

    /// The display value a sink node should show.
    pub fn display(&mut self, id: NodeId) -> Result<DisplayValue> {
        let graph = self.graph;
        let node = graph.node(id).ok_or(EditorError::NodeNotFound(id))?;
        if !node.kind().is_sink() {
            return Err(EditorError::WrongKind { node: id, kind: node.kind(), expected: NodeKind::Output });
        }

        let Some(source) = graph.source_node(id, 0) else {
            return Ok(DisplayValue::NoInput);
        };
        let source_is_input = graph.node(source).map(|n| n.kind() == NodeKind::Input).unwrap_or(false);

        match self.resolve(source) {
            Ok(Resolved::Bit(bit)) => Ok(DisplayValue::Bit(bit)),
            Ok(Resolved::Invalid) if source_is_input => Ok(DisplayValue::UseBinary),
            Ok(_) => Ok(DisplayValue::Error),
            Err(EditorError::CycleDetected(_)) => Ok(DisplayValue::Cycle),
            Err(err) => Err(err),
        }
    }

    /// Evaluate any node: sinks yield their display value, everything else
    /// its resolved value.
    pub fn evaluate(&mut self, id: NodeId) -> Result<NodeValue> {
        let node = self.graph.node(id).ok_or(EditorError::NodeNotFound(id))?;
        if node.kind().is_sink() {
            self.display(id).map(NodeValue::Display)
        } else {
            self.resolve(id).map(NodeValue::Resolved)
        }
    }

    /// Recompute a sink's display value and cache it on the node.
    ///
    /// Returns `None` for nodes that are not sinks or no longer exist.
    pub fn refresh(graph: &mut CircuitGraph, id: NodeId) -> Result<Option<DisplayValue>> {
        match graph.node(id) {
            Some(node) if node.kind().is_sink() => {}
            _ => return Ok(None),
        }
        let value = Evaluator::new(graph).display(id)?;
        graph.set_display(id, value);
        trace!(node = %id, display = %value, "display refreshed");
        Ok(Some(value))
    }

    /// Refresh every sink among `ids`, returning the new display values.
    pub fn refresh_all(graph: &mut CircuitGraph, ids: &[NodeId]) -> Result<Vec<(NodeId, DisplayValue)>> {
        let mut refreshed = Vec::new();
        for &id in ids {
            if let Some(value) = Evaluator::refresh(graph, id)? {
                refreshed.push((id, value));
            }
        }
        Ok(refreshed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ConnectionRules, SocketId};

    fn wire(graph: &mut CircuitGraph, from: NodeId, to: NodeId, index: usize) {
        graph.connect(SocketId::output(from), SocketId::input(to, index)).unwrap();
    }

    fn input(graph: &mut CircuitGraph, text: &str) -> NodeId {
        let id = graph.add_node(NodeKind::Input, 0.0, 0.0);
        graph.set_input_value(id, text).unwrap();
        id
    }

    fn gate_with(kind: NodeKind, a: &str, b: &str) -> (CircuitGraph, NodeId) {
        let mut graph = CircuitGraph::new();
        let ia = input(&mut graph, a);
        let ib = input(&mut graph, b);
        let gate = graph.add_node(kind, 100.0, 0.0);
        wire(&mut graph, ia, gate, 0);
        wire(&mut graph, ib, gate, 1);
        (graph, gate)
    }

    #[test]
    fn gates_follow_truth_tables() {
        let kinds = [NodeKind::And, NodeKind::Or, NodeKind::Nand, NodeKind::Nor, NodeKind::Xor, NodeKind::Xnor];
        for kind in kinds {
            for (a, b) in [("0", "0"), ("0", "1"), ("1", "0"), ("1", "1")] {
                let (graph, gate) = gate_with(kind, a, b);
                let expected = gate::apply(kind, a == "1", b == "1").unwrap();
                let got = Evaluator::new(&graph).resolve(gate).unwrap();
                assert_eq!(got, Resolved::Bit(expected), "{kind} {a} {b}");
            }
        }
    }

    #[test]
    fn not_complements_its_input() {
        for (text, expected) in [("0", true), ("1", false)] {
            let mut graph = CircuitGraph::new();
            let i = input(&mut graph, text);
            let not = graph.add_node(NodeKind::Not, 0.0, 0.0);
            wire(&mut graph, i, not, 0);
            assert_eq!(Evaluator::new(&graph).resolve(not).unwrap(), Resolved::Bit(expected));
        }
    }

    #[test]
    fn missing_or_invalid_inputs_yield_no_value() {
        let mut graph = CircuitGraph::new();
        let not = graph.add_node(NodeKind::Not, 0.0, 0.0);
        assert_eq!(Evaluator::new(&graph).resolve(not).unwrap(), Resolved::NoValue);

        let (graph, gate) = gate_with(NodeKind::And, "1", "x");
        assert_eq!(Evaluator::new(&graph).resolve(gate).unwrap(), Resolved::NoValue);

        let mut graph = CircuitGraph::new();
        let a = input(&mut graph, "1");
        let gate = graph.add_node(NodeKind::Or, 0.0, 0.0);
        wire(&mut graph, a, gate, 0);
        assert_eq!(Evaluator::new(&graph).resolve(gate).unwrap(), Resolved::NoValue);
    }

    #[test]
    fn input_text_must_be_exact() {
        let mut graph = CircuitGraph::new();
        let i = input(&mut graph, "yes");
        assert_eq!(Evaluator::new(&graph).resolve(i).unwrap(), Resolved::Invalid);
    }

    #[test]
    fn sink_display_states_stay_distinct() {
        let mut graph = CircuitGraph::new();
        let out = graph.add_node(NodeKind::Output, 0.0, 0.0);
        assert_eq!(Evaluator::new(&graph).display(out).unwrap(), DisplayValue::NoInput);

        let bad = input(&mut graph, "2");
        wire(&mut graph, bad, out, 0);
        assert_eq!(Evaluator::new(&graph).display(out).unwrap(), DisplayValue::UseBinary);

        // the same bad text behind a gate is a generic error
        let mut graph = CircuitGraph::new();
        let bad = input(&mut graph, "2");
        let not = graph.add_node(NodeKind::Not, 0.0, 0.0);
        let out = graph.add_node(NodeKind::WriteOutput, 0.0, 0.0);
        wire(&mut graph, bad, not, 0);
        wire(&mut graph, not, out, 0);
        assert_eq!(Evaluator::new(&graph).display(out).unwrap(), DisplayValue::Error);

        graph.set_input_value(bad, "1").unwrap();
        assert_eq!(Evaluator::new(&graph).display(out).unwrap(), DisplayValue::Bit(false));
    }

    #[test]
    fn display_rejects_non_sinks() {
        let mut graph = CircuitGraph::new();
        let gate = graph.add_node(NodeKind::Xor, 0.0, 0.0);
        assert!(matches!(
            Evaluator::new(&graph).display(gate),
            Err(EditorError::WrongKind { kind: NodeKind::Xor, .. })
        ));
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let mut graph = CircuitGraph::new();
        let i = input(&mut graph, "1");
        let gate = graph.add_node(NodeKind::Xnor, 0.0, 0.0);
        wire(&mut graph, i, gate, 0);
        wire(&mut graph, i, gate, 1);
        assert_eq!(Evaluator::new(&graph).resolve(gate).unwrap(), Resolved::Bit(true));
    }

    #[test]
    fn cycles_are_detected() {
        let mut graph = CircuitGraph::with_rules(ConnectionRules { allow_fanout: true, allow_cycles: true });
        let n1 = graph.add_node(NodeKind::Not, 0.0, 0.0);
        let n2 = graph.add_node(NodeKind::Not, 0.0, 0.0);
        let out = graph.add_node(NodeKind::Output, 0.0, 0.0);
        wire(&mut graph, n1, n2, 0);
        wire(&mut graph, n2, n1, 0);
        wire(&mut graph, n2, out, 0);

        assert!(matches!(Evaluator::new(&graph).resolve(n1), Err(EditorError::CycleDetected(_))));
        assert_eq!(Evaluator::new(&graph).display(out).unwrap(), DisplayValue::Cycle);
    }

    #[test]
    fn refresh_caches_display_on_sinks_only() {
        let mut graph = CircuitGraph::new();
        let i = input(&mut graph, "0");
        let out = graph.add_node(NodeKind::Output, 0.0, 0.0);
        wire(&mut graph, i, out, 0);

        assert_eq!(graph.node(out).unwrap().display(), Some(DisplayValue::Pending));
        assert_eq!(Evaluator::refresh(&mut graph, out).unwrap(), Some(DisplayValue::Bit(false)));
        assert_eq!(graph.node(out).unwrap().display(), Some(DisplayValue::Bit(false)));

        assert_eq!(Evaluator::refresh(&mut graph, i).unwrap(), None);
        let refreshed = Evaluator::refresh_all(&mut graph, &[i, out]).unwrap();
        assert_eq!(refreshed, vec![(out, DisplayValue::Bit(false))]);
    }
}
