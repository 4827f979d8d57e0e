//! Compiler backends: pure document-to-text generation.
//!
//! Both backends perform the same element/sequence traversal as the
//! interpreter but emit source text instead of driving handles. Each call
//! resolves the document internally; resolution errors surface through the
//! resolver API, not here.

pub mod component;
pub mod stylesheet;

pub use component::{compile_component, ComponentArtifact};
pub use stylesheet::{compile_stylesheet, StylesheetArtifact};

use hashbrown::HashMap;

use crate::schema::{ResolvedState, ResolvedValue};

#[derive(Clone, Debug)]
pub struct CompileOptions {
    /// Exported component name (code-generation backend).
    pub component_name: String,
    /// Indent width in spaces.
    pub indent: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            component_name: "AnimatedScene".to_string(),
            indent: 2,
        }
    }
}

impl CompileOptions {
    pub(crate) fn pad(&self, depth: usize) -> String {
        " ".repeat(self.indent * depth)
    }
}

/// A document feature the target format cannot express statically. Never
/// silently dropped; the caller decides how to tell the user.
#[derive(Clone, Debug, PartialEq)]
pub struct CapabilityWarning {
    /// Short feature tag (`"trigger:scroll"`, `"block:morph"`).
    pub feature: String,
    /// Dotted path to the offending node.
    pub path: String,
    pub message: String,
}

/// Format a number the way stylesheets and JS literals expect: no
/// scientific notation for ordinary magnitudes, no trailing `.0`.
pub(crate) fn fmt_num(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Flatten nested sub-states (shadow, path-motion) into one property map.
pub(crate) fn flatten_state(state: &ResolvedState) -> HashMap<String, ResolvedValue> {
    let mut out = HashMap::new();
    collect(state, &mut out);
    out
}

fn collect(state: &ResolvedState, out: &mut HashMap<String, ResolvedValue>) {
    for (key, value) in state.iter() {
        match value {
            ResolvedValue::Nested(inner) => collect(inner, out),
            other => {
                out.insert(key.clone(), other.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_formatting() {
        assert_eq!(fmt_num(30.0), "30");
        assert_eq!(fmt_num(-4.0), "-4");
        assert_eq!(fmt_num(2.5), "2.5");
        assert_eq!(fmt_num(0.125), "0.125");
    }

    #[test]
    fn nested_states_flatten() {
        let json = r#"{"x": 10, "shadow": {"shadowX": 2, "shadowBlur": 8}}"#;
        let state: ResolvedState = serde_json::from_str(json).unwrap();
        let flat = flatten_state(&state);
        assert_eq!(flat["x"].as_number(), Some(10.0));
        assert_eq!(flat["shadowBlur"].as_number(), Some(8.0));
        assert!(!flat.contains_key("shadow"));
    }
}
