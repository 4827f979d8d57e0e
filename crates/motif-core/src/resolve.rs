//! Expression/variable resolution.
//!
//! Walks every property state in the document and reduces `$var` /
//! `${expr}` slots to literal numbers against the variable table. Failures
//! are per-field: an error entry is recorded, a zero is substituted, and the
//! walk continues, so callers see every problem in one pass. The same pass
//! expands spring presets and flattens the timeline into the derived
//! [`ResolvedBlock`] tree consumed by the interpreter and the backends.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::expr::{self, ExprError};
use crate::schema::state::property_spec;
use crate::schema::{
    AnimationBlock, Document, EasingDef, GroupMode, PropertyState, PropertyValue, Repeat,
    ResolvedSpring, ResolvedState, ResolvedValue, Sequence, SpringConfig, StaggerDefinition,
    Trigger, VariableValue,
};

pub mod codes {
    pub const UNDEFINED_VARIABLE: &str = "undefined_variable";
    pub const NON_NUMERIC_VARIABLE: &str = "non_numeric_variable";
    pub const INVALID_EXPRESSION: &str = "invalid_expression";
    pub const NON_FINITE: &str = "non_finite";
}

/// One field that failed to resolve. The field keeps a zero substitute so
/// downstream passes still see a complete document.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolutionError {
    pub path: String,
    /// Variable name involved, when the failure is about one.
    pub name: Option<String>,
    pub code: &'static str,
    pub message: String,
}

/// Resolver output: the derived document plus every per-field error.
#[derive(Debug)]
pub struct Resolution {
    pub data: ResolvedDocument,
    pub errors: Vec<ResolutionError>,
}

impl Resolution {
    pub fn into_result(self) -> Result<ResolvedDocument, Vec<ResolutionError>> {
        if self.errors.is_empty() {
            Ok(self.data)
        } else {
            Err(self.errors)
        }
    }
}

/// Derived, fully-numeric view of a document. Times are seconds, keyframe
/// stamps are 0–1 fractions, springs are concrete physics.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResolvedDocument {
    pub elements: HashMap<String, ResolvedElement>,
    pub sequences: Vec<ResolvedSequence>,
    /// Flattened numeric snapshot of the variable table (dotted keys).
    pub variables: HashMap<String, f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResolvedElement {
    pub initial: ResolvedState,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResolvedSequence {
    pub id: String,
    pub trigger: Trigger,
    pub blocks: Vec<ResolvedBlock>,
    pub repeat: Option<Repeat>,
    pub yoyo: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum ResolvedBlock {
    Keyframes(ResolvedKeyframes),
    Spring(ResolvedSpringBlock),
    Transition(ResolvedTransition),
    Group(ResolvedGroup),
    /// Block kind with no interpreter-executable behavior; occupies its
    /// declared span so sequence timing stays correct.
    Hold(ResolvedHold),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResolvedKeyframes {
    pub targets: Vec<String>,
    pub offset_s: f64,
    pub delay_s: f64,
    pub duration_s: f64,
    /// Sorted by `time` ascending.
    pub frames: Vec<ResolvedKeyframe>,
    pub easing: Option<EasingDef>,
    pub stagger: Option<StaggerDefinition>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResolvedKeyframe {
    /// Fraction of the block duration, 0–1.
    pub time: f64,
    pub state: ResolvedState,
    pub easing: Option<EasingDef>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResolvedSpringBlock {
    pub targets: Vec<String>,
    pub offset_s: f64,
    pub delay_s: f64,
    pub from: Option<ResolvedState>,
    pub to: ResolvedState,
    pub spring: ResolvedSpring,
    pub stagger: Option<StaggerDefinition>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResolvedTransition {
    pub targets: Vec<String>,
    pub offset_s: f64,
    pub delay_s: f64,
    pub from: Option<ResolvedState>,
    pub to: ResolvedState,
    pub duration_s: f64,
    pub easing: Option<EasingDef>,
    pub stagger: Option<StaggerDefinition>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResolvedGroup {
    pub mode: GroupMode,
    pub offset_s: f64,
    pub delay_s: f64,
    pub children: Vec<ResolvedBlock>,
    pub stagger: Option<StaggerDefinition>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResolvedHold {
    pub kind: String,
    pub targets: Vec<String>,
    pub offset_s: f64,
    pub delay_s: f64,
    pub duration_s: f64,
}

const MS: f64 = 1000.0;

/// Expand a spring config into concrete physics. Preset physics first, the
/// duration+bounce shorthand next, explicit fields always win.
pub fn expand_spring(cfg: &SpringConfig) -> ResolvedSpring {
    let mut spring = ResolvedSpring::default();
    if let Some(preset) = cfg.preset {
        let (stiffness, damping, mass) = preset.physics();
        spring.stiffness = stiffness;
        spring.damping = damping;
        spring.mass = mass;
    }
    let mass = cfg.mass.unwrap_or(spring.mass);
    if cfg.preset.is_none() && cfg.stiffness.is_none() {
        if let Some(duration_ms) = cfg.duration {
            let duration_s = (duration_ms / MS).max(1e-3);
            let omega = 2.0 * std::f64::consts::PI / duration_s;
            let stiffness = mass * omega * omega;
            let bounce = cfg.bounce.unwrap_or(0.0).clamp(0.0, 1.0);
            spring.stiffness = stiffness;
            spring.damping = (1.0 - bounce) * 2.0 * (stiffness * mass).sqrt();
        }
    }
    if let Some(stiffness) = cfg.stiffness {
        spring.stiffness = stiffness;
    }
    if let Some(damping) = cfg.damping {
        spring.damping = damping;
    }
    spring.mass = mass;
    spring.velocity = cfg.velocity.unwrap_or(0.0);
    spring
}

/// Resolve a whole document. Never fails outright; inspect `errors`.
pub fn resolve(doc: &Document) -> Resolution {
    let mut cx = Cx {
        vars: &doc.variables,
        errors: Vec::new(),
    };

    let mut elements = HashMap::new();
    for (id, el) in &doc.elements {
        let initial = cx.resolve_state(el.initial(), &format!("elements.{id}.initial"));
        elements.insert(id.clone(), ResolvedElement { initial });
    }

    let mut sequences = Vec::with_capacity(doc.timeline.sequences.len());
    for (i, seq) in doc.timeline.sequences.iter().enumerate() {
        sequences.push(cx.resolve_sequence(seq, i));
    }

    let mut variables = HashMap::new();
    flatten_numeric(&doc.variables, "", &mut variables);

    Resolution {
        data: ResolvedDocument {
            elements,
            sequences,
            variables,
        },
        errors: cx.errors,
    }
}

fn flatten_numeric(
    vars: &HashMap<String, VariableValue>,
    prefix: &str,
    out: &mut HashMap<String, f64>,
) {
    for (name, value) in vars {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        match value {
            VariableValue::Number(n) => {
                out.insert(key, *n);
            }
            VariableValue::Nested(inner) => flatten_numeric(inner, &key, out),
            _ => {}
        }
    }
}

fn lookup<'v>(vars: &'v HashMap<String, VariableValue>, name: &str) -> Option<&'v VariableValue> {
    let mut parts = name.split('.');
    let mut current = vars.get(parts.next()?)?;
    for part in parts {
        match current {
            VariableValue::Nested(inner) => current = inner.get(part)?,
            _ => return None,
        }
    }
    Some(current)
}

struct Cx<'d> {
    vars: &'d HashMap<String, VariableValue>,
    errors: Vec<ResolutionError>,
}

impl<'d> Cx<'d> {
    fn error(&mut self, path: &str, name: Option<&str>, code: &'static str, message: String) {
        self.errors.push(ResolutionError {
            path: path.to_string(),
            name: name.map(str::to_string),
            code,
            message,
        });
    }

    fn resolve_state(&mut self, state: &PropertyState, path: &str) -> ResolvedState {
        let mut out = ResolvedState::default();
        // Sorted for deterministic error ordering.
        for key in state.sorted_keys() {
            let value = state.get(key).expect("key from the same map");
            let vpath = format!("{path}.{key}");
            let resolved = match value {
                PropertyValue::Number(n) => ResolvedValue::Number(*n),
                PropertyValue::Numbers(ns) => ResolvedValue::Numbers(ns.clone()),
                PropertyValue::Texts(ts) => self.resolve_texts(ts, &vpath),
                PropertyValue::Nested(inner) => {
                    ResolvedValue::Nested(self.resolve_state(inner, &vpath))
                }
                PropertyValue::Text(s) => self.resolve_text(key, s, &vpath),
            };
            out.insert(key.clone(), resolved);
        }
        out
    }

    /// A keyframe array of strings: all-expressions resolves to numbers,
    /// anything else (color stops) passes through.
    fn resolve_texts(&mut self, texts: &[String], path: &str) -> ResolvedValue {
        if !texts.is_empty() && texts.iter().all(|t| t.starts_with('$')) {
            let numbers = texts
                .iter()
                .enumerate()
                .map(|(i, t)| self.resolve_numeric_text(t, &format!("{path}[{i}]")))
                .collect();
            ResolvedValue::Numbers(numbers)
        } else {
            ResolvedValue::Texts(texts.to_vec())
        }
    }

    fn resolve_text(&mut self, key: &str, text: &str, path: &str) -> ResolvedValue {
        if !text.starts_with('$') {
            return ResolvedValue::Text(text.to_string());
        }
        // Direct reference to a non-numeric variable is pass-through for
        // textual slots (colors), an error for numeric ones.
        if !text.starts_with("${") {
            let name = &text[1..];
            match lookup(self.vars, name) {
                Some(VariableValue::Number(n)) => return ResolvedValue::Number(*n),
                Some(VariableValue::Numbers(ns)) => return ResolvedValue::Numbers(ns.clone()),
                Some(VariableValue::Text(s)) => {
                    let numeric_slot = property_spec(key).map(|p| p.numeric).unwrap_or(false);
                    if numeric_slot {
                        self.error(
                            path,
                            Some(name),
                            codes::NON_NUMERIC_VARIABLE,
                            format!("variable '{name}' is not numeric"),
                        );
                        return ResolvedValue::Number(0.0);
                    }
                    return ResolvedValue::Text(s.clone());
                }
                Some(VariableValue::Nested(_)) => {
                    self.error(
                        path,
                        Some(name),
                        codes::NON_NUMERIC_VARIABLE,
                        format!("variable '{name}' is an object, not a number"),
                    );
                    return ResolvedValue::Number(0.0);
                }
                None => {
                    self.error(
                        path,
                        Some(name),
                        codes::UNDEFINED_VARIABLE,
                        format!("undefined variable '{name}'"),
                    );
                    return ResolvedValue::Number(0.0);
                }
            }
        }
        ResolvedValue::Number(self.resolve_numeric_text(text, path))
    }

    /// Resolve `$name` or `${...}` to a number, substituting 0.0 on error.
    fn resolve_numeric_text(&mut self, text: &str, path: &str) -> f64 {
        if let Some(body) = text.strip_prefix("${").and_then(|b| b.strip_suffix('}')) {
            return self.eval_body(body, path);
        }
        let name = text.trim_start_matches('$');
        match lookup(self.vars, name) {
            Some(VariableValue::Number(n)) => *n,
            Some(_) => {
                self.error(
                    path,
                    Some(name),
                    codes::NON_NUMERIC_VARIABLE,
                    format!("variable '{name}' is not numeric"),
                );
                0.0
            }
            None => {
                self.error(
                    path,
                    Some(name),
                    codes::UNDEFINED_VARIABLE,
                    format!("undefined variable '{name}'"),
                );
                0.0
            }
        }
    }

    /// Substitute every variable reference in an expression body with its
    /// numeric value, then run the restricted arithmetic evaluator.
    fn eval_body(&mut self, body: &str, path: &str) -> f64 {
        let mut substituted = String::with_capacity(body.len());
        let chars: Vec<char> = body.chars().collect();
        let mut i = 0;
        let mut failed = false;
        while i < chars.len() {
            let c = chars[i];
            if c == '$' || c.is_alphabetic() || c == '_' {
                let start = if c == '$' { i + 1 } else { i };
                let mut end = start;
                while end < chars.len()
                    && (chars[end].is_alphanumeric() || chars[end] == '_' || chars[end] == '.')
                {
                    end += 1;
                }
                if end == start {
                    // A lone '$'; let the evaluator report it.
                    substituted.push(c);
                    i += 1;
                    continue;
                }
                let name: String = chars[start..end].iter().collect();
                match lookup(self.vars, &name) {
                    Some(VariableValue::Number(n)) => {
                        // Parenthesized so negatives survive adjacency.
                        substituted.push_str(&format!("({n})"));
                    }
                    Some(_) => {
                        self.error(
                            path,
                            Some(&name),
                            codes::NON_NUMERIC_VARIABLE,
                            format!("variable '{name}' is not numeric"),
                        );
                        failed = true;
                    }
                    None => {
                        self.error(
                            path,
                            Some(&name),
                            codes::UNDEFINED_VARIABLE,
                            format!("undefined variable '{name}'"),
                        );
                        failed = true;
                    }
                }
                i = end;
            } else {
                substituted.push(c);
                i += 1;
            }
        }
        if failed {
            return 0.0;
        }
        match expr::eval(&substituted) {
            Ok(v) => v,
            Err(ExprError::NonFinite) => {
                self.error(
                    path,
                    None,
                    codes::NON_FINITE,
                    "expression evaluated to a non-finite number".to_string(),
                );
                0.0
            }
            Err(e) => {
                self.error(path, None, codes::INVALID_EXPRESSION, e.to_string());
                0.0
            }
        }
    }

    fn resolve_sequence(&mut self, seq: &Sequence, index: usize) -> ResolvedSequence {
        let id = seq
            .id
            .clone()
            .unwrap_or_else(|| format!("sequence-{index}"));
        let path = format!("timeline.sequences[{index}]");
        let blocks = seq
            .animations
            .iter()
            .enumerate()
            .map(|(i, b)| self.resolve_block(b, &format!("{path}.animations[{i}]")))
            .collect();
        ResolvedSequence {
            id,
            trigger: seq.trigger.clone(),
            blocks,
            repeat: seq.repeat.clone(),
            yoyo: seq.yoyo,
        }
    }

    fn resolve_block(&mut self, block: &AnimationBlock, path: &str) -> ResolvedBlock {
        let targets = |t: &Option<crate::schema::TargetRef>| -> Vec<String> {
            t.as_ref()
                .map(|t| t.ids().into_iter().map(str::to_string).collect())
                .unwrap_or_default()
        };
        match block {
            AnimationBlock::Keyframes(b) => {
                let mut frames: Vec<ResolvedKeyframe> = b
                    .frames
                    .iter()
                    .enumerate()
                    .map(|(i, f)| ResolvedKeyframe {
                        time: (f.at / 100.0).clamp(0.0, 1.0),
                        state: self.resolve_state(&f.state, &format!("{path}.frames[{i}].state")),
                        easing: f.easing.clone(),
                    })
                    .collect();
                frames.sort_by(|a, b| a.time.total_cmp(&b.time));
                ResolvedBlock::Keyframes(ResolvedKeyframes {
                    targets: targets(&b.target),
                    offset_s: b.offset / MS,
                    delay_s: b.delay / MS,
                    duration_s: b.duration / MS,
                    frames,
                    easing: b.easing.clone(),
                    stagger: b.stagger.clone(),
                })
            }
            AnimationBlock::Spring(b) => ResolvedBlock::Spring(ResolvedSpringBlock {
                targets: targets(&b.target),
                offset_s: b.offset / MS,
                delay_s: b.delay / MS,
                from: b
                    .from
                    .as_ref()
                    .map(|s| self.resolve_state(s, &format!("{path}.from"))),
                to: self.resolve_state(&b.to, &format!("{path}.to")),
                spring: expand_spring(&b.spring),
                stagger: b.stagger.clone(),
            }),
            AnimationBlock::Transition(b) => ResolvedBlock::Transition(ResolvedTransition {
                targets: targets(&b.target),
                offset_s: b.offset / MS,
                delay_s: b.delay / MS,
                from: b
                    .from
                    .as_ref()
                    .map(|s| self.resolve_state(s, &format!("{path}.from"))),
                to: self.resolve_state(&b.to, &format!("{path}.to")),
                duration_s: b.duration / MS,
                easing: b.easing.clone(),
                stagger: b.stagger.clone(),
            }),
            AnimationBlock::Group(b) => ResolvedBlock::Group(ResolvedGroup {
                mode: b.mode,
                offset_s: b.offset / MS,
                delay_s: b.delay / MS,
                children: b
                    .children
                    .iter()
                    .enumerate()
                    .map(|(i, c)| self.resolve_block(c, &format!("{path}.children[{i}]")))
                    .collect(),
                stagger: b.stagger.clone(),
            }),
            AnimationBlock::Morph(b) => ResolvedBlock::Hold(ResolvedHold {
                kind: "morph".to_string(),
                targets: targets(&b.target),
                offset_s: b.offset / MS,
                delay_s: b.delay / MS,
                duration_s: b.duration / MS,
            }),
            AnimationBlock::MatchCut(b) => ResolvedBlock::Hold(ResolvedHold {
                kind: "matchCut".to_string(),
                targets: Vec::new(),
                offset_s: b.offset / MS,
                delay_s: b.delay / MS,
                duration_s: b.duration / MS,
            }),
            AnimationBlock::Drag(b) => ResolvedBlock::Hold(ResolvedHold {
                kind: "drag".to_string(),
                targets: targets(&b.target),
                offset_s: b.offset / MS,
                delay_s: b.delay / MS,
                duration_s: b.duration / MS,
            }),
            AnimationBlock::Particles(b) => ResolvedBlock::Hold(ResolvedHold {
                kind: "particles".to_string(),
                targets: targets(&b.target),
                offset_s: b.offset / MS,
                delay_s: b.delay / MS,
                duration_s: b.duration / MS,
            }),
            AnimationBlock::Text(b) => ResolvedBlock::Hold(ResolvedHold {
                kind: "text".to_string(),
                targets: targets(&b.target),
                offset_s: b.offset / MS,
                delay_s: b.delay / MS,
                duration_s: b.duration / MS,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SpringPreset;

    fn doc_with_vars(json: &str) -> Document {
        serde_json::from_str(json).unwrap()
    }

    /// it should resolve ${a + b} to the arithmetic sum
    #[test]
    fn braced_expression_sum() {
        let doc = doc_with_vars(
            r#"{
                "version": "1.0",
                "variables": {"a": 30, "b": 12},
                "elements": {"card": {"type": "box", "initial": {"x": "${a + b}"}}}
            }"#,
        );
        let res = resolve(&doc);
        assert!(res.errors.is_empty());
        assert_eq!(res.data.elements["card"].initial.number("x"), Some(42.0));
    }

    /// it should emit exactly one error naming an undefined variable
    #[test]
    fn undefined_variable_is_one_error() {
        let doc = doc_with_vars(
            r#"{
                "version": "1.0",
                "variables": {"a": 1},
                "elements": {"card": {"type": "box", "initial": {"x": "${a + missing}"}}}
            }"#,
        );
        let res = resolve(&doc);
        assert_eq!(res.errors.len(), 1);
        let err = &res.errors[0];
        assert_eq!(err.code, codes::UNDEFINED_VARIABLE);
        assert_eq!(err.name.as_deref(), Some("missing"));
        assert_eq!(err.path, "elements.card.initial.x");
        // Zero substituted, resolution continued.
        assert_eq!(res.data.elements["card"].initial.number("x"), Some(0.0));
    }

    #[test]
    fn dotted_lookup_descends_nested_variables() {
        let doc = doc_with_vars(
            r#"{
                "version": "1.0",
                "variables": {"pad": {"top": 16}},
                "elements": {"card": {"type": "box", "initial": {"y": "$pad.top", "x": "$pad.missing.deep"}}}
            }"#,
        );
        let res = resolve(&doc);
        assert_eq!(res.data.elements["card"].initial.number("y"), Some(16.0));
        assert_eq!(res.errors.len(), 1);
        assert_eq!(res.errors[0].code, codes::UNDEFINED_VARIABLE);
    }

    #[test]
    fn disallowed_characters_are_errors() {
        let doc = doc_with_vars(
            r#"{
                "version": "1.0",
                "elements": {"card": {"type": "box", "initial": {"x": "${1 | 2}"}}}
            }"#,
        );
        let res = resolve(&doc);
        assert_eq!(res.errors.len(), 1);
        assert_eq!(res.errors[0].code, codes::INVALID_EXPRESSION);
    }

    #[test]
    fn preset_expansion_with_overrides() {
        let cfg = SpringConfig {
            preset: Some(SpringPreset::Wobbly),
            damping: Some(20.0),
            ..Default::default()
        };
        let spring = expand_spring(&cfg);
        assert_eq!(spring.stiffness, 180.0);
        assert_eq!(spring.damping, 20.0);
        assert_eq!(spring.mass, 1.0);
    }

    #[test]
    fn duration_bounce_shorthand() {
        let cfg = SpringConfig {
            duration: Some(500.0),
            bounce: Some(0.25),
            ..Default::default()
        };
        let spring = expand_spring(&cfg);
        assert!(spring.stiffness > 0.0);
        // ζ = 1 - bounce by construction.
        assert!((spring.damping_ratio() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn color_variable_passes_through() {
        let doc = doc_with_vars(
            r##"{
                "version": "1.0",
                "variables": {"brand": "#ff0044"},
                "elements": {"card": {"type": "box", "initial": {"backgroundColor": "$brand"}}}
            }"##,
        );
        let res = resolve(&doc);
        assert!(res.errors.is_empty());
        assert_eq!(
            res.data.elements["card"].initial.get("backgroundColor"),
            Some(&ResolvedValue::Text("#ff0044".to_string()))
        );
    }
}
