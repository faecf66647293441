//! Editor configuration.
//!
//! Every field has a default, so a configuration document only needs to
//! name what it changes:
//!
//! ```json
//! { "propagation": "single_hop", "history_limit": 100 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::{ConnectionRules, DEFAULT_INPUT_TEXT};

/// How far re-evaluation reaches after an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Propagation {
    /// Refresh every sink transitively downstream of the change.
    #[default]
    Transitive,
    /// Refresh only the changed nodes and the nodes wired directly to them.
    SingleHop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Text a new Input node starts with.
    pub default_input_text: String,
    pub propagation: Propagation,
    /// Let one output socket feed several inputs.
    pub allow_fanout: bool,
    /// Accept wires that close a loop; evaluation then shows `Cycle`.
    pub allow_cycles: bool,
    /// Maximum number of undoable commands, unbounded when absent.
    pub history_limit: Option<usize>,
    /// Offset applied to both coordinates of pasted nodes.
    pub paste_offset: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_input_text: DEFAULT_INPUT_TEXT.to_string(),
            propagation: Propagation::Transitive,
            allow_fanout: true,
            allow_cycles: false,
            history_limit: None,
            paste_offset: 20.0,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The wiring rules this configuration asks for.
    pub fn connection_rules(&self) -> ConnectionRules {
        ConnectionRules { allow_fanout: self.allow_fanout, allow_cycles: self.allow_cycles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditorError;

    #[test]
    fn partial_documents_fill_in_defaults() {
        let config = EditorConfig::from_json(r#"{ "propagation": "single_hop", "history_limit": 3 }"#).unwrap();
        assert_eq!(config.propagation, Propagation::SingleHop);
        assert_eq!(config.history_limit, Some(3));
        assert_eq!(config.default_input_text, "1");
        assert!(config.allow_fanout);
        assert_eq!(config.paste_offset, 20.0);
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(EditorConfig::from_json("{}").unwrap(), EditorConfig::default());
    }

    #[test]
    fn malformed_documents_are_config_errors() {
        let err = EditorConfig::from_json(r#"{ "propagation": "sideways" }"#).unwrap_err();
        assert!(matches!(err, EditorError::Config(_)));
    }

    #[test]
    fn json_round_trip() {
        let config = EditorConfig { allow_cycles: true, ..EditorConfig::default() };
        let back = EditorConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
        assert!(back.connection_rules().allow_cycles);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = EditorConfig::load("/definitely/not/here/nodegate.json").unwrap_err();
        assert!(matches!(err, EditorError::Io(_)));
    }
}
