//! Stylesheet backend: document to plain CSS.
//!
//! Per element: a base rule from `initial`, pseudo-state rules for
//! hover/focus/tap sequences, one merged `transition` covering every CSS
//! property those sequences touch, and `@keyframes` rules for keyframe
//! blocks. Springs are approximated by a damping-ratio-derived bezier and
//! the settle-time duration heuristic. Anything CSS cannot express
//! statically becomes a [`CapabilityWarning`], never a silent drop.

use hashbrown::{HashMap, HashSet};

use crate::compile::{flatten_state, fmt_num, CapabilityWarning, CompileOptions};
use crate::resolve::{self, expand_spring, ResolvedBlock, ResolvedSequence};
use crate::schema::{
    Document, EasingDef, PropertyClass, ResolvedSpring, ResolvedState, PROPERTIES,
};

#[derive(Debug)]
pub struct StylesheetArtifact {
    pub code: String,
    pub warnings: Vec<CapabilityWarning>,
}

/// Where a sequence's declarations land.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Context {
    /// Mount: a one-shot animation on the base rule.
    Mount,
    /// hoverEnd/blur: the "return" side, merged into the base rule.
    Base,
    Hover,
    Focus,
    Active,
}

impl Context {
    fn pseudo(self) -> Option<&'static str> {
        match self {
            Context::Hover => Some(":hover"),
            Context::Focus => Some(":focus"),
            Context::Active => Some(":active"),
            Context::Mount | Context::Base => None,
        }
    }
}

#[derive(Default)]
struct ElementRules {
    base: Vec<(String, String)>,
    pseudo: Vec<(&'static str, Vec<(String, String)>)>,
    /// css property -> (duration_s, timing, delay_s); first wins.
    transitions: Vec<(String, f64, String, f64)>,
    base_animations: Vec<String>,
    pseudo_animations: Vec<(&'static str, String)>,
    /// Complete `@keyframes` rule texts, emitted after the element's rules.
    keyframes: Vec<String>,
}

impl ElementRules {
    fn pseudo_decls(&mut self, selector: &'static str) -> &mut Vec<(String, String)> {
        if !self.pseudo.iter().any(|(s, _)| *s == selector) {
            self.pseudo.push((selector, Vec::new()));
        }
        &mut self
            .pseudo
            .iter_mut()
            .find(|(s, _)| *s == selector)
            .expect("just inserted")
            .1
    }

    fn add_transition(&mut self, prop: &str, duration_s: f64, timing: &str, delay_s: f64) {
        if !self.transitions.iter().any(|(p, ..)| p == prop) {
            self.transitions
                .push((prop.to_string(), duration_s, timing.to_string(), delay_s));
        }
    }
}

pub fn compile_stylesheet(doc: &Document, options: &CompileOptions) -> StylesheetArtifact {
    let resolved = resolve::resolve(doc).data;
    let mut warnings = Vec::new();
    let mut rules: HashMap<String, ElementRules> = HashMap::new();
    for id in doc.elements.keys() {
        rules.insert(id.clone(), ElementRules::default());
    }

    // Base declarations from each element's initial state.
    for (id, element) in &resolved.elements {
        if let Some(r) = rules.get_mut(id) {
            r.base = declarations(&element.initial);
        }
    }

    if doc.state_machine.is_some() {
        warnings.push(CapabilityWarning {
            feature: "stateMachine".to_string(),
            path: "stateMachine".to_string(),
            message: "state machines need a script-driven runtime".to_string(),
        });
    }
    if doc.data_bindings.is_some() {
        warnings.push(CapabilityWarning {
            feature: "dataBindings".to_string(),
            path: "dataBindings".to_string(),
            message: "data bindings need a script-driven runtime".to_string(),
        });
    }

    let mut names: HashSet<String> = HashSet::new();
    for (si, seq) in resolved.sequences.iter().enumerate() {
        let path = format!("timeline.sequences[{si}]");
        let context = match seq.trigger.kind() {
            "mount" => Context::Mount,
            "hover" => Context::Hover,
            "focus" => Context::Focus,
            "tap" => Context::Active,
            "hoverEnd" | "blur" => Context::Base,
            other => {
                warnings.push(CapabilityWarning {
                    feature: format!("trigger:{other}"),
                    path: format!("{path}.trigger"),
                    message: format!("'{other}' triggers need a script-driven runtime"),
                });
                continue;
            }
        };
        for (bi, block) in seq.blocks.iter().enumerate() {
            walk_block(
                block,
                context,
                seq,
                &format!("{path}.animations[{bi}]"),
                &mut rules,
                &mut warnings,
                &mut names,
            );
        }
    }

    let code = emit(doc, &rules, options);
    StylesheetArtifact { code, warnings }
}

#[allow(clippy::too_many_arguments)]
fn walk_block(
    block: &ResolvedBlock,
    context: Context,
    seq: &ResolvedSequence,
    path: &str,
    rules: &mut HashMap<String, ElementRules>,
    warnings: &mut Vec<CapabilityWarning>,
    names: &mut HashSet<String>,
) {
    match block {
        ResolvedBlock::Transition(b) => {
            let timing = css_timing(b.easing.as_ref());
            apply_state_change(
                &b.targets,
                b.from.as_ref(),
                &b.to,
                b.duration_s,
                &timing,
                b.delay_s,
                context,
                seq,
                rules,
                names,
            );
        }
        ResolvedBlock::Spring(b) => {
            let (timing, duration_s) = spring_timing(&b.spring);
            apply_state_change(
                &b.targets,
                b.from.as_ref(),
                &b.to,
                duration_s,
                &timing,
                b.delay_s,
                context,
                seq,
                rules,
                names,
            );
        }
        ResolvedBlock::Keyframes(b) => {
            let timing = css_timing(b.easing.as_ref());
            for target in &b.targets {
                let Some(r) = rules.get_mut(target) else {
                    continue;
                };
                let name = unique_name(names, &format!("{target}-{}", css_ident(&seq.id)));
                let mut rule = format!("@keyframes {name} {{\n");
                for frame in &b.frames {
                    let stops = declarations(&frame.state)
                        .into_iter()
                        .map(|(p, v)| format!("{p}: {v};"))
                        .collect::<Vec<_>>()
                        .join(" ");
                    rule.push_str(&format!("  {}% {{ {stops} }}\n", fmt_num(frame.time * 100.0)));
                }
                rule.push('}');
                r.keyframes.push(rule);
                let animation = animation_shorthand(&name, b.duration_s, &timing, b.delay_s, seq);
                match context.pseudo() {
                    Some(selector) => r.pseudo_animations.push((selector, animation)),
                    None => r.base_animations.push(animation),
                }
            }
        }
        ResolvedBlock::Group(g) => {
            for (i, child) in g.children.iter().enumerate() {
                walk_block(
                    child,
                    context,
                    seq,
                    &format!("{path}.children[{i}]"),
                    rules,
                    warnings,
                    names,
                );
            }
        }
        ResolvedBlock::Hold(h) => {
            warnings.push(CapabilityWarning {
                feature: format!("block:{}", h.kind),
                path: path.to_string(),
                message: format!("'{}' blocks need a script-driven runtime", h.kind),
            });
        }
    }
}

/// Apply a simple from/to change: pseudo contexts get declarations plus a
/// merged-transition entry; mount becomes a synthesized two-stop animation.
#[allow(clippy::too_many_arguments)]
fn apply_state_change(
    targets: &[String],
    from: Option<&ResolvedState>,
    to: &ResolvedState,
    duration_s: f64,
    timing: &str,
    delay_s: f64,
    context: Context,
    seq: &ResolvedSequence,
    rules: &mut HashMap<String, ElementRules>,
    names: &mut HashSet<String>,
) {
    for target in targets {
        let Some(r) = rules.get_mut(target) else {
            continue;
        };
        let decls = declarations(to);
        match context {
            Context::Mount => {
                let name = unique_name(names, &format!("{target}-{}", css_ident(&seq.id)));
                let mut rule = format!("@keyframes {name} {{\n");
                if let Some(from) = from {
                    let stops = join_decls(&declarations(from));
                    rule.push_str(&format!("  0% {{ {stops} }}\n"));
                }
                rule.push_str(&format!("  100% {{ {} }}\n", join_decls(&decls)));
                rule.push('}');
                r.keyframes.push(rule);
                let mut animation = animation_shorthand(&name, duration_s, timing, delay_s, seq);
                animation.push_str(" forwards");
                r.base_animations.push(animation);
            }
            Context::Base => {
                for (prop, _) in &decls {
                    r.add_transition(prop, duration_s, timing, delay_s);
                }
                r.base.extend(decls);
            }
            Context::Hover | Context::Focus | Context::Active => {
                for (prop, _) in &decls {
                    r.add_transition(prop, duration_s, timing, delay_s);
                }
                let selector = context.pseudo().expect("pseudo context");
                r.pseudo_decls(selector).extend(decls);
            }
        }
    }
}

fn join_decls(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(p, v)| format!("{p}: {v};"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn animation_shorthand(
    name: &str,
    duration_s: f64,
    timing: &str,
    delay_s: f64,
    seq: &ResolvedSequence,
) -> String {
    let mut out = format!("{name} {}s {timing}", fmt_num(duration_s));
    if delay_s > 0.0 {
        out.push_str(&format!(" {}s", fmt_num(delay_s)));
    }
    if let Some(repeat) = &seq.repeat {
        if repeat.count.is_infinite() {
            out.push_str(" infinite");
        } else if let Some(n) = repeat.count.count() {
            out.push_str(&format!(" {n}"));
        }
    }
    if seq.yoyo {
        out.push_str(" alternate");
    }
    out
}

fn unique_name(names: &mut HashSet<String>, base: &str) -> String {
    if names.insert(base.to_string()) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if names.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

fn css_ident(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect()
}

/// CSS declarations for a resolved state, in property-table order.
/// Transform and filter components merge into composite declarations.
fn declarations(state: &ResolvedState) -> Vec<(String, String)> {
    let flat = flatten_state(state);
    let mut decls: Vec<(String, String)> = Vec::new();
    let mut transform = Vec::new();
    let mut filter = Vec::new();
    for spec in PROPERTIES {
        let Some(value) = flat.get(spec.name) else {
            continue;
        };
        let text = match (value.as_number(), value) {
            (Some(n), _) => format!("{}{}", fmt_num(n), spec.unit.suffix()),
            (None, crate::schema::ResolvedValue::Text(s)) => s.clone(),
            _ => continue,
        };
        match spec.class {
            PropertyClass::Transform | PropertyClass::ThreeD if spec.function.is_some() => {
                transform.push(format!("{}({text})", spec.function.expect("guarded")));
            }
            PropertyClass::Filter => {
                filter.push(format!("{}({text})", spec.function.expect("filter fn")));
            }
            PropertyClass::Shadow | PropertyClass::PathMotion => {}
            _ => {
                if let Some(css) = spec.css {
                    decls.push((css.to_string(), text));
                }
            }
        }
    }
    if !transform.is_empty() {
        decls.push(("transform".to_string(), transform.join(" ")));
    }
    if flat.contains_key("originX") || flat.contains_key("originY") {
        let x = flat.get("originX").and_then(|v| v.as_number()).unwrap_or(0.5);
        let y = flat.get("originY").and_then(|v| v.as_number()).unwrap_or(0.5);
        decls.push((
            "transform-origin".to_string(),
            format!("{}% {}%", fmt_num(x * 100.0), fmt_num(y * 100.0)),
        ));
    }
    if !filter.is_empty() {
        decls.push(("filter".to_string(), filter.join(" ")));
    }
    if let Some(shadow) = box_shadow(&flat) {
        decls.push(("box-shadow".to_string(), shadow));
    }
    decls
}

fn box_shadow(flat: &HashMap<String, crate::schema::ResolvedValue>) -> Option<String> {
    let num = |k: &str| flat.get(k).and_then(|v| v.as_number());
    let present = ["shadowX", "shadowY", "shadowBlur", "shadowSpread", "shadowColor"]
        .iter()
        .any(|k| flat.contains_key(*k));
    if !present {
        return None;
    }
    let mut parts = vec![
        format!("{}px", fmt_num(num("shadowX").unwrap_or(0.0))),
        format!("{}px", fmt_num(num("shadowY").unwrap_or(0.0))),
        format!("{}px", fmt_num(num("shadowBlur").unwrap_or(0.0))),
        format!("{}px", fmt_num(num("shadowSpread").unwrap_or(0.0))),
    ];
    if let Some(crate::schema::ResolvedValue::Text(color)) = flat.get("shadowColor") {
        parts.push(color.clone());
    }
    Some(parts.join(" "))
}

fn css_timing(easing: Option<&EasingDef>) -> String {
    match easing {
        None => "ease".to_string(),
        Some(EasingDef::Named(name)) => match name.as_str() {
            "linear" => "linear".to_string(),
            "easeIn" => "ease-in".to_string(),
            "easeOut" => "ease-out".to_string(),
            "easeInOut" => "ease-in-out".to_string(),
            _ => "ease".to_string(),
        },
        Some(EasingDef::Bezier([a, b, c, d])) => format!(
            "cubic-bezier({}, {}, {}, {})",
            fmt_num(*a),
            fmt_num(*b),
            fmt_num(*c),
            fmt_num(*d)
        ),
        Some(EasingDef::Steps { steps, jump }) => match jump {
            Some(jump) => format!("steps({steps}, {jump})"),
            None => format!("steps({steps})"),
        },
        Some(EasingDef::Spring { spring }) => spring_timing(&expand_spring(spring)).0,
    }
}

/// Damping-ratio bezier approximation plus the settle-time duration.
fn spring_timing(spring: &ResolvedSpring) -> (String, f64) {
    let ratio = spring.damping_ratio();
    let timing = if ratio < 0.5 {
        "cubic-bezier(0.175, 0.885, 0.32, 1.275)"
    } else if ratio < 1.0 {
        "cubic-bezier(0.34, 1.56, 0.64, 1)"
    } else {
        "ease"
    };
    (timing.to_string(), spring.settle_seconds())
}

fn emit(doc: &Document, rules: &HashMap<String, ElementRules>, options: &CompileOptions) -> String {
    let pad = options.pad(1);
    let mut out = String::new();
    for id in doc.sorted_element_ids() {
        let Some(r) = rules.get(id.as_str()) else {
            continue;
        };
        out.push_str(&format!(".{id} {{\n"));
        for (prop, value) in &r.base {
            out.push_str(&format!("{pad}{prop}: {value};\n"));
        }
        if !r.transitions.is_empty() {
            let entries = r
                .transitions
                .iter()
                .map(|(prop, dur, timing, delay)| {
                    let mut entry = format!("{prop} {}s {timing}", fmt_num(*dur));
                    if *delay > 0.0 {
                        entry.push_str(&format!(" {}s", fmt_num(*delay)));
                    }
                    entry
                })
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!("{pad}transition: {entries};\n"));
        }
        if !r.base_animations.is_empty() {
            out.push_str(&format!("{pad}animation: {};\n", r.base_animations.join(", ")));
        }
        out.push_str("}\n");
        for (selector, decls) in &r.pseudo {
            let animations: Vec<&String> = r
                .pseudo_animations
                .iter()
                .filter(|(s, _)| s == selector)
                .map(|(_, a)| a)
                .collect();
            if decls.is_empty() && animations.is_empty() {
                continue;
            }
            out.push_str(&format!(".{id}{selector} {{\n"));
            for (prop, value) in decls {
                out.push_str(&format!("{pad}{prop}: {value};\n"));
            }
            if !animations.is_empty() {
                let joined = animations
                    .iter()
                    .map(|a| a.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                out.push_str(&format!("{pad}animation: {joined};\n"));
            }
            out.push_str("}\n");
        }
        // Pseudo animation rules with no matching decl entry.
        for (selector, animation) in &r.pseudo_animations {
            if r.pseudo.iter().any(|(s, _)| s == selector) {
                continue;
            }
            out.push_str(&format!(
                ".{id}{selector} {{\n{pad}animation: {animation};\n}}\n"
            ));
        }
        for rule in &r.keyframes {
            out.push_str(rule);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::property_spec;

    fn compile(json: &str) -> StylesheetArtifact {
        let doc: Document = serde_json::from_str(json).unwrap();
        compile_stylesheet(&doc, &CompileOptions::default())
    }

    /// it should select the strong-overshoot bezier for a low damping ratio
    #[test]
    fn underdamped_spring_gets_overshoot_curve() {
        let art = compile(
            r#"{
                "version": "1.0",
                "elements": {"card": {"type": "box", "initial": {"scale": 1}}},
                "timeline": {"sequences": [{
                    "trigger": {"type": "hover"},
                    "animations": [{
                        "type": "spring", "target": "card", "to": {"scale": 1.1},
                        "spring": {"stiffness": 400, "damping": 10, "mass": 1}
                    }]
                }]}
            }"#,
        );
        assert!(art.code.contains("cubic-bezier(0.175, 0.885, 0.32, 1.275)"));
        assert!(art.code.contains(".card:hover"));
        assert!(art.warnings.is_empty());
    }

    /// it should record a capability warning for a scroll trigger
    #[test]
    fn scroll_trigger_warns() {
        let art = compile(
            r#"{
                "version": "1.0",
                "elements": {"card": {"type": "box", "initial": {}}},
                "timeline": {"sequences": [{
                    "trigger": {"type": "scroll", "range": [0, 1]},
                    "animations": [{"type": "transition", "target": "card", "to": {"opacity": 1}}]
                }]}
            }"#,
        );
        assert_eq!(art.warnings.len(), 1);
        assert_eq!(art.warnings[0].feature, "trigger:scroll");
        assert_eq!(art.warnings[0].path, "timeline.sequences[0].trigger");
    }

    #[test]
    fn base_rule_merges_transform_components() {
        let art = compile(
            r##"{
                "version": "1.0",
                "elements": {"card": {"type": "box",
                    "initial": {"x": 10, "rotate": 45, "opacity": 0.5, "backgroundColor": "#222"}}}
            }"##,
        );
        assert!(art.code.contains("transform: translateX(10px) rotate(45deg);"));
        assert!(art.code.contains("opacity: 0.5;"));
        assert!(art.code.contains("background-color: #222;"));
    }

    #[test]
    fn keyframes_block_becomes_at_rule() {
        let art = compile(
            r#"{
                "version": "1.0",
                "elements": {"dot": {"type": "circle", "initial": {"opacity": 0}}},
                "timeline": {"sequences": [{
                    "id": "pulse",
                    "trigger": {"type": "mount"},
                    "repeat": {"count": "infinite"},
                    "yoyo": true,
                    "animations": [{
                        "type": "keyframes", "target": "dot", "duration": 800,
                        "frames": [
                            {"at": 0, "state": {"opacity": 0}},
                            {"at": 100, "state": {"opacity": 1}}
                        ]
                    }]
                }]}
            }"#,
        );
        assert!(art.code.contains("@keyframes dot-pulse"));
        assert!(art.code.contains("0% { opacity: 0; }"));
        assert!(art.code.contains("100% { opacity: 1; }"));
        assert!(art.code.contains("animation: dot-pulse 0.8s ease infinite alternate;"));
    }

    /// it should flag morph blocks instead of dropping them
    #[test]
    fn hold_blocks_warn() {
        let art = compile(
            r#"{
                "version": "1.0",
                "elements": {"icon": {"type": "path", "d": "M0 0", "initial": {}}},
                "timeline": {"sequences": [{
                    "trigger": {"type": "mount"},
                    "animations": [{"type": "morph", "target": "icon", "toPath": "M1 1"}]
                }]}
            }"#,
        );
        assert_eq!(art.warnings.len(), 1);
        assert_eq!(art.warnings[0].feature, "block:morph");
    }

    #[test]
    fn hover_transition_lands_on_base_rule() {
        let art = compile(
            r#"{
                "version": "1.0",
                "elements": {"card": {"type": "box", "initial": {"x": 0}}},
                "timeline": {"sequences": [{
                    "trigger": {"type": "hover"},
                    "animations": [{
                        "type": "transition", "target": "card",
                        "to": {"x": 20, "opacity": 0.8}, "duration": 250, "easing": "easeOut"
                    }]
                }]}
            }"#,
        );
        assert!(art.code.contains("transition: opacity 0.25s ease-out, transform 0.25s ease-out;"));
        assert!(property_spec("x").is_some());
    }
}
