//! Document root: the complete animation description.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::schema::element::ElementDefinition;
use crate::schema::timeline::Timeline;

/// The fixed format version accepted by this implementation.
pub const FORMAT_VERSION: &str = "1.0";

/// Root aggregate. Constructed once per generation cycle, validated, then
/// handed immutably to the resolver and either execution path.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub variables: HashMap<String, VariableValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioConfig>,
    #[serde(default)]
    pub elements: HashMap<String, ElementDefinition>,
    #[serde(default)]
    pub timeline: Timeline,
    /// Host-integration substructure, preserved but not interpreted.
    #[serde(
        default,
        rename = "stateMachine",
        skip_serializing_if = "Option::is_none"
    )]
    pub state_machine: Option<JsonValue>,
    /// Host-integration substructure, preserved but not interpreted.
    #[serde(
        default,
        rename = "dataBindings",
        skip_serializing_if = "Option::is_none"
    )]
    pub data_bindings: Option<JsonValue>,
    /// Unknown root fields, preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Target duration, milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Variable table entry. Nested maps support dotted lookup (`$theme.accent`).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum VariableValue {
    Number(f64),
    Numbers(Vec<f64>),
    Nested(HashMap<String, VariableValue>),
    Text(String),
}

impl VariableValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            VariableValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Audio-analysis configuration; band outputs feed `audio` triggers.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AudioConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub bands: HashMap<String, AudioBand>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AudioBand {
    /// [low, high] in Hz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freq_range: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoothing: Option<f64>,
}

impl Document {
    /// Empty document at the supported version; mostly useful in tests.
    pub fn empty() -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            metadata: None,
            variables: HashMap::new(),
            audio: None,
            elements: HashMap::new(),
            timeline: Timeline::default(),
            state_machine: None,
            data_bindings: None,
            extra: Map::new(),
        }
    }

    /// Element ids in sorted order (stable traversal for codegen and tests).
    pub fn sorted_element_ids(&self) -> Vec<&String> {
        let mut ids: Vec<&String> = self.elements.keys().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_root_fields_are_preserved() {
        let json = r#"{"version": "1.0", "futureField": {"a": 1}}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert!(doc.extra.contains_key("futureField"));
        let out = serde_json::to_value(&doc).unwrap();
        assert_eq!(out["futureField"]["a"], 1);
    }

    #[test]
    fn dotted_variable_shapes() {
        let json = r##"{"version": "1.0", "variables": {"speed": 2, "theme": {"accent": "#f00", "pad": 8}}}"##;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.variables["speed"].as_number(), Some(2.0));
        match &doc.variables["theme"] {
            VariableValue::Nested(m) => assert_eq!(m["pad"].as_number(), Some(8.0)),
            _ => panic!("expected nested variable"),
        }
    }
}
