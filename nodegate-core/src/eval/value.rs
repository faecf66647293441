//! Values produced by resolution.

use std::fmt;

use crate::graph::DisplayValue;

/// The effective value at a value-producing node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    Bit(bool),
    /// An Input node whose text is neither "0" nor "1".
    Invalid,
    /// A missing connection or a non-binary value somewhere upstream.
    NoValue,
}

impl Resolved {
    /// Interpret Input text. Only the exact strings "0" and "1" are bits.
    pub fn from_text(text: &str) -> Self {
        match text {
            "0" => Resolved::Bit(false),
            "1" => Resolved::Bit(true),
            _ => Resolved::Invalid,
        }
    }

    pub fn bit(self) -> Option<bool> {
        match self {
            Resolved::Bit(bit) => Some(bit),
            Resolved::Invalid | Resolved::NoValue => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Resolved::Bit(false) => "0",
            Resolved::Bit(true) => "1",
            Resolved::Invalid => "invalid",
            Resolved::NoValue => "no value",
        }
    }
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What evaluating an arbitrary node yields: a resolved value for inputs
/// and gates, a display value for sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeValue {
    Resolved(Resolved),
    Display(DisplayValue),
}

impl NodeValue {
    pub fn bit(self) -> Option<bool> {
        match self {
            NodeValue::Resolved(value) => value.bit(),
            NodeValue::Display(DisplayValue::Bit(bit)) => Some(bit),
            NodeValue::Display(_) => None,
        }
    }
}

impl fmt::Display for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeValue::Resolved(value) => fmt::Display::fmt(value, f),
            NodeValue::Display(value) => fmt::Display::fmt(value, f),
        }
    }
}
