//! Property states and the recognized-property table.
//!
//! A `PropertyState` is an open record over the animatable properties: any
//! recognized property may be present or absent, and unknown keys are kept
//! verbatim for forward compatibility. Numeric slots accept either a literal
//! number or an expression string (`$var` / `${a + b}`); the resolver reduces
//! these to `ResolvedState`, which holds literals only.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// One value slot inside an unresolved `PropertyState`.
///
/// Untagged: more specific shapes first so arrays and nested objects don't
/// get swallowed by the scalar arms.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Literal number.
    Number(f64),
    /// Keyframe value array (numeric).
    Numbers(Vec<f64>),
    /// Keyframe value array (strings, e.g. colors).
    Texts(Vec<String>),
    /// Nested sub-state (shadow, path-motion).
    Nested(PropertyState),
    /// Expression (`$x`, `${x * 2}`) or pass-through text (color string).
    Text(String),
}

/// One value slot inside a `ResolvedState`: expressions are gone.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ResolvedValue {
    Number(f64),
    Numbers(Vec<f64>),
    Texts(Vec<String>),
    Nested(ResolvedState),
    Text(String),
}

impl ResolvedValue {
    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ResolvedValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Partially-populated record of animatable properties, pre-resolution.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PropertyState(pub HashMap<String, PropertyValue>);

impl PropertyState {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.0.insert(name.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.0.iter()
    }

    /// Property names in sorted order (stable iteration for codegen/tests).
    pub fn sorted_keys(&self) -> Vec<&String> {
        let mut keys: Vec<&String> = self.0.keys().collect();
        keys.sort();
        keys
    }
}

/// Fully-resolved property record: numeric slots are literal numbers.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ResolvedState(pub HashMap<String, ResolvedValue>);

impl ResolvedState {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedValue> {
        self.0.get(name)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ResolvedValue::as_number)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ResolvedValue) {
        self.0.insert(name.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ResolvedValue)> {
        self.0.iter()
    }

    pub fn sorted_keys(&self) -> Vec<&String> {
        let mut keys: Vec<&String> = self.0.keys().collect();
        keys.sort();
        keys
    }
}

/// Broad grouping of a recognized property; drives how the stylesheet
/// backend assembles composite CSS declarations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PropertyClass {
    Transform,
    Opacity,
    Color,
    Border,
    Layout,
    Svg,
    Filter,
    Shadow,
    ThreeD,
    PathMotion,
}

/// Unit suffix applied when formatting a numeric value for CSS.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Unit {
    Px,
    Deg,
    /// Bare number (opacity, scale, pathLength).
    Scalar,
}

impl Unit {
    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::Deg => "deg",
            Unit::Scalar => "",
        }
    }
}

/// Static description of one recognized animatable property.
pub struct PropertySpec {
    /// Canonical DSL name.
    pub name: &'static str,
    pub class: PropertyClass,
    /// Plain CSS declaration this property maps to, when it has one.
    /// Transform/filter/shadow components map through their class instead.
    pub css: Option<&'static str>,
    /// CSS transform/filter function name for Transform/Filter properties.
    pub function: Option<&'static str>,
    pub unit: Unit,
    /// Whether the value slot is numeric (number-or-expression) rather than
    /// free text such as a color string.
    pub numeric: bool,
}

const fn numeric(
    name: &'static str,
    class: PropertyClass,
    css: Option<&'static str>,
    function: Option<&'static str>,
    unit: Unit,
) -> PropertySpec {
    PropertySpec {
        name,
        class,
        css,
        function,
        unit,
        numeric: true,
    }
}

const fn textual(name: &'static str, class: PropertyClass, css: Option<&'static str>) -> PropertySpec {
    PropertySpec {
        name,
        class,
        css,
        function: None,
        unit: Unit::Scalar,
        numeric: false,
    }
}

/// The recognized animatable properties, one table shared by the validator,
/// resolver, interpreter and both compiler backends.
pub static PROPERTIES: &[PropertySpec] = &[
    // Geometric transform
    numeric("x", PropertyClass::Transform, None, Some("translateX"), Unit::Px),
    numeric("y", PropertyClass::Transform, None, Some("translateY"), Unit::Px),
    numeric("z", PropertyClass::Transform, None, Some("translateZ"), Unit::Px),
    numeric("rotate", PropertyClass::Transform, None, Some("rotate"), Unit::Deg),
    numeric("rotateX", PropertyClass::ThreeD, None, Some("rotateX"), Unit::Deg),
    numeric("rotateY", PropertyClass::ThreeD, None, Some("rotateY"), Unit::Deg),
    numeric("rotateZ", PropertyClass::ThreeD, None, Some("rotateZ"), Unit::Deg),
    numeric("scale", PropertyClass::Transform, None, Some("scale"), Unit::Scalar),
    numeric("scaleX", PropertyClass::Transform, None, Some("scaleX"), Unit::Scalar),
    numeric("scaleY", PropertyClass::Transform, None, Some("scaleY"), Unit::Scalar),
    numeric("skewX", PropertyClass::Transform, None, Some("skewX"), Unit::Deg),
    numeric("skewY", PropertyClass::Transform, None, Some("skewY"), Unit::Deg),
    numeric("perspective", PropertyClass::ThreeD, Some("perspective"), None, Unit::Px),
    numeric("originX", PropertyClass::Transform, None, None, Unit::Scalar),
    numeric("originY", PropertyClass::Transform, None, None, Unit::Scalar),
    // Opacity
    numeric("opacity", PropertyClass::Opacity, Some("opacity"), None, Unit::Scalar),
    // Color
    textual("backgroundColor", PropertyClass::Color, Some("background-color")),
    textual("color", PropertyClass::Color, Some("color")),
    textual("fill", PropertyClass::Color, Some("fill")),
    textual("stroke", PropertyClass::Color, Some("stroke")),
    // Border
    numeric("borderRadius", PropertyClass::Border, Some("border-radius"), None, Unit::Px),
    numeric("borderWidth", PropertyClass::Border, Some("border-width"), None, Unit::Px),
    textual("borderColor", PropertyClass::Border, Some("border-color")),
    // Layout
    numeric("width", PropertyClass::Layout, Some("width"), None, Unit::Px),
    numeric("height", PropertyClass::Layout, Some("height"), None, Unit::Px),
    // SVG
    numeric("strokeWidth", PropertyClass::Svg, Some("stroke-width"), None, Unit::Px),
    numeric("strokeDasharray", PropertyClass::Svg, Some("stroke-dasharray"), None, Unit::Px),
    numeric("strokeDashoffset", PropertyClass::Svg, Some("stroke-dashoffset"), None, Unit::Px),
    numeric("pathLength", PropertyClass::Svg, None, None, Unit::Scalar),
    // Filter
    numeric("blur", PropertyClass::Filter, None, Some("blur"), Unit::Px),
    numeric("brightness", PropertyClass::Filter, None, Some("brightness"), Unit::Scalar),
    numeric("contrast", PropertyClass::Filter, None, Some("contrast"), Unit::Scalar),
    numeric("saturate", PropertyClass::Filter, None, Some("saturate"), Unit::Scalar),
    numeric("hueRotate", PropertyClass::Filter, None, Some("hue-rotate"), Unit::Deg),
    numeric("grayscale", PropertyClass::Filter, None, Some("grayscale"), Unit::Scalar),
    // Shadow
    numeric("shadowX", PropertyClass::Shadow, None, None, Unit::Px),
    numeric("shadowY", PropertyClass::Shadow, None, None, Unit::Px),
    numeric("shadowBlur", PropertyClass::Shadow, None, None, Unit::Px),
    numeric("shadowSpread", PropertyClass::Shadow, None, None, Unit::Px),
    textual("shadowColor", PropertyClass::Shadow, None),
    // Path motion
    numeric("pathOffset", PropertyClass::PathMotion, None, None, Unit::Scalar),
    numeric("pathRotate", PropertyClass::PathMotion, None, None, Unit::Deg),
];

/// Look up the spec for a recognized property name.
pub fn property_spec(name: &str) -> Option<&'static PropertySpec> {
    PROPERTIES.iter().find(|p| p.name == name)
}

/// Keys that hold a nested sub-state rather than a scalar slot.
pub fn is_nested_key(name: &str) -> bool {
    matches!(name, "shadow" | "pathMotion")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_table_is_unique() {
        for (i, a) in PROPERTIES.iter().enumerate() {
            for b in &PROPERTIES[i + 1..] {
                assert_ne!(a.name, b.name, "duplicate property entry");
            }
        }
    }

    #[test]
    fn untagged_value_shapes() {
        let v: PropertyValue = serde_json::from_str("12.5").unwrap();
        assert_eq!(v, PropertyValue::Number(12.5));
        let v: PropertyValue = serde_json::from_str("\"${a + b}\"").unwrap();
        assert_eq!(v, PropertyValue::Text("${a + b}".into()));
        let v: PropertyValue = serde_json::from_str("[0, 50, 0]").unwrap();
        assert_eq!(v, PropertyValue::Numbers(vec![0.0, 50.0, 0.0]));
        let v: PropertyValue = serde_json::from_str(r#"{"shadowX": 2}"#).unwrap();
        assert!(matches!(v, PropertyValue::Nested(_)));
    }
}
