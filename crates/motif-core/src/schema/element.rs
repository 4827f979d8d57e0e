//! Element definitions: the typed visual objects of a document.
//!
//! Elements reference each other only by id (group children, mesh bones);
//! the element map is an arena keyed by string id with no structural cycles.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::schema::state::PropertyState;

/// Fields shared by every element kind.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementCommon {
    #[serde(default)]
    pub initial: PropertyState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blend_mode: Option<String>,
    /// Id of a masking element, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,
    /// Unknown element fields, preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Ordered visual effect; parameters are host-interpreted and preserved.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Effect {
    pub kind: String,
    #[serde(default, skip_serializing_if = "JsonValue::is_null")]
    pub params: JsonValue,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    #[serde(flatten)]
    pub common: ElementCommon,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SvgElement {
    #[serde(flatten)]
    pub common: ElementCommon,
    /// Inline SVG markup.
    pub svg: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PathElement {
    #[serde(flatten)]
    pub common: ElementCommon,
    /// SVG path data.
    pub d: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GroupElement {
    #[serde(flatten)]
    pub common: ElementCommon,
    /// Child element ids; dangling ids are skipped at use sites.
    #[serde(default)]
    pub children: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MeshElement {
    #[serde(flatten)]
    pub common: ElementCommon,
    #[serde(default)]
    pub vertices: Vec<f64>,
    #[serde(default)]
    pub triangles: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bones: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CustomElement {
    #[serde(flatten)]
    pub common: ElementCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<String>,
}

/// A named, typed visual object with an initial property state.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ElementDefinition {
    Box(ElementCommon),
    Circle(ElementCommon),
    Text(TextElement),
    Svg(SvgElement),
    Path(PathElement),
    Group(GroupElement),
    Mesh(MeshElement),
    Custom(CustomElement),
}

impl ElementDefinition {
    pub fn kind(&self) -> &'static str {
        match self {
            ElementDefinition::Box(_) => "box",
            ElementDefinition::Circle(_) => "circle",
            ElementDefinition::Text(_) => "text",
            ElementDefinition::Svg(_) => "svg",
            ElementDefinition::Path(_) => "path",
            ElementDefinition::Group(_) => "group",
            ElementDefinition::Mesh(_) => "mesh",
            ElementDefinition::Custom(_) => "custom",
        }
    }

    pub fn common(&self) -> &ElementCommon {
        match self {
            ElementDefinition::Box(c) | ElementDefinition::Circle(c) => c,
            ElementDefinition::Text(e) => &e.common,
            ElementDefinition::Svg(e) => &e.common,
            ElementDefinition::Path(e) => &e.common,
            ElementDefinition::Group(e) => &e.common,
            ElementDefinition::Mesh(e) => &e.common,
            ElementDefinition::Custom(e) => &e.common,
        }
    }

    pub fn initial(&self) -> &PropertyState {
        &self.common().initial
    }

    pub fn children(&self) -> &[String] {
        match self {
            ElementDefinition::Group(g) => &g.children,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_element_parses_with_common_fields() {
        let json = r#"{
            "type": "text",
            "content": "hello",
            "fontSize": 24,
            "initial": {"opacity": 0, "y": "$offset"}
        }"#;
        let el: ElementDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(el.kind(), "text");
        assert!(el.initial().get("opacity").is_some());
        match el {
            ElementDefinition::Text(t) => {
                assert_eq!(t.content, "hello");
                assert_eq!(t.font_size, Some(24.0));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn group_children_are_ids_not_structures() {
        let json = r#"{"type": "group", "children": ["a", "b"], "initial": {}}"#;
        let el: ElementDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(el.children(), ["a".to_string(), "b".to_string()]);
    }
}
