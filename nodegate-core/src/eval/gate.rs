//! Truth tables for the two-input gates.

use crate::graph::NodeKind;

/// Apply a two-input gate. Returns `None` for kinds that are not binary gates.
pub fn apply(kind: NodeKind, a: bool, b: bool) -> Option<bool> {
    let out = match kind {
        NodeKind::And => a && b,
        NodeKind::Or => a || b,
        NodeKind::Nand => !(a && b),
        NodeKind::Nor => !(a || b),
        NodeKind::Xor => a ^ b,
        NodeKind::Xnor => !(a ^ b),
        NodeKind::Input | NodeKind::Output | NodeKind::WriteOutput | NodeKind::Not => return None,
    };
    Some(out)
}
