//! Component backend: document to a self-contained TSX component over
//! framer-motion.
//!
//! Each sequence is classified by trigger: mount becomes an initialization
//! effect (or per-element `animate` props when no orchestration is needed),
//! hover/tap/focus become `while*` interaction props, inView becomes
//! `whileInView` + `viewport`. A per-element animation-control handle is
//! declared whenever any group block or repeat is present, since plain
//! props cannot express multi-step orchestration. Triggers with no static
//! strategy are listed in a comment instead of being dropped.

use hashbrown::{HashMap, HashSet};

use crate::compile::{flatten_state, fmt_num, CompileOptions};
use crate::resolve::{self, ResolvedBlock, ResolvedDocument};
use crate::schema::{
    Document, EasingDef, ElementDefinition, PropertyClass, ResolvedSpring, ResolvedState, Trigger,
    PROPERTIES,
};

#[derive(Debug)]
pub struct ComponentArtifact {
    pub code: String,
    pub language: &'static str,
    /// Package name to version-range manifest.
    pub dependencies: Vec<(String, String)>,
}

#[derive(Default)]
struct ElementPlan {
    animate: Option<String>,
    transition: Option<String>,
    controls: Option<String>,
    while_hover: Option<String>,
    while_tap: Option<String>,
    while_focus: Option<String>,
    while_in_view: Option<String>,
    viewport: Option<String>,
}

/// A transition/spring/keyframes leaf flattened out of the block tree.
struct SimpleChange {
    targets: Vec<String>,
    /// Full `start()` argument: target values plus embedded transition.
    object: String,
    /// Target values only (interaction props).
    values: String,
    /// Transition object only.
    transition: String,
}

pub fn compile_component(doc: &Document, options: &CompileOptions) -> ComponentArtifact {
    let resolved = resolve::resolve(doc).data;
    let needs_controls = resolved
        .sequences
        .iter()
        .any(|s| s.repeat.is_some() || s.blocks.iter().any(has_group));

    let mut plans: HashMap<String, ElementPlan> = HashMap::new();
    for id in doc.elements.keys() {
        plans.insert(id.clone(), ElementPlan::default());
    }

    let mut effect_lines: Vec<String> = Vec::new();
    let mut unsupported: Vec<String> = Vec::new();
    let mut uses_scroll = false;

    for seq in &resolved.sequences {
        match &seq.trigger {
            Trigger::Mount => {
                if needs_controls {
                    plan_controlled_mount(seq, &mut plans, &mut effect_lines);
                } else {
                    for change in collect_simple(&seq.blocks) {
                        for target in &change.targets {
                            if let Some(plan) = plans.get_mut(target) {
                                if plan.animate.is_none() {
                                    plan.animate = Some(change.values.clone());
                                    plan.transition = Some(change.transition.clone());
                                }
                            }
                        }
                    }
                }
            }
            Trigger::Hover { .. } => {
                assign_interaction(&seq.blocks, &mut plans, |p| &mut p.while_hover);
            }
            Trigger::Tap { .. } => {
                assign_interaction(&seq.blocks, &mut plans, |p| &mut p.while_tap);
            }
            Trigger::Focus { .. } => {
                assign_interaction(&seq.blocks, &mut plans, |p| &mut p.while_focus);
            }
            Trigger::InView { threshold, once } => {
                let viewport = viewport_object(*threshold, *once);
                for change in collect_simple(&seq.blocks) {
                    for target in &change.targets {
                        if let Some(plan) = plans.get_mut(target) {
                            if plan.while_in_view.is_none() {
                                plan.while_in_view = Some(change.object.clone());
                                plan.viewport = Some(viewport.clone());
                            }
                        }
                    }
                }
            }
            Trigger::Scroll { .. } => uses_scroll = true,
            other => unsupported.push(other.kind().to_string()),
        }
    }

    let code = emit(doc, &resolved, &plans, &EmitContext {
        options,
        needs_controls,
        uses_scroll,
        effect_lines: &effect_lines,
        unsupported: &unsupported,
    });

    ComponentArtifact {
        code,
        language: "tsx",
        dependencies: vec![
            ("react".to_string(), "^18.2.0".to_string()),
            ("framer-motion".to_string(), "^11.0.0".to_string()),
        ],
    }
}

struct EmitContext<'a> {
    options: &'a CompileOptions,
    needs_controls: bool,
    uses_scroll: bool,
    effect_lines: &'a [String],
    unsupported: &'a [String],
}

fn has_group(block: &ResolvedBlock) -> bool {
    matches!(block, ResolvedBlock::Group(_))
}

fn assign_interaction(
    blocks: &[ResolvedBlock],
    plans: &mut HashMap<String, ElementPlan>,
    slot: impl Fn(&mut ElementPlan) -> &mut Option<String>,
) {
    for change in collect_simple(blocks) {
        for target in &change.targets {
            if let Some(plan) = plans.get_mut(target) {
                let slot = slot(plan);
                if slot.is_none() {
                    *slot = Some(change.object.clone());
                }
            }
        }
    }
}

/// Depth-first flatten of the block tree into start-able leaves. Group
/// structure is preserved separately by the effect generator; interaction
/// props only need the leaves.
fn collect_simple(blocks: &[ResolvedBlock]) -> Vec<SimpleChange> {
    let mut out = Vec::new();
    for block in blocks {
        collect_simple_into(block, &mut out);
    }
    out
}

fn collect_simple_into(block: &ResolvedBlock, out: &mut Vec<SimpleChange>) {
    match block {
        ResolvedBlock::Transition(b) => {
            let values = motion_object(&b.to);
            let transition = tween_transition(b.duration_s, b.delay_s, b.easing.as_ref());
            out.push(SimpleChange {
                targets: b.targets.clone(),
                object: with_transition(&values, &transition),
                values,
                transition,
            });
        }
        ResolvedBlock::Spring(b) => {
            let values = motion_object(&b.to);
            let transition = spring_transition(&b.spring, b.delay_s);
            out.push(SimpleChange {
                targets: b.targets.clone(),
                object: with_transition(&values, &transition),
                values,
                transition,
            });
        }
        ResolvedBlock::Keyframes(b) => {
            let (values, times) = keyframe_arrays(b);
            let mut transition = format!("{{ duration: {}", fmt_num(b.duration_s));
            if b.delay_s > 0.0 {
                transition.push_str(&format!(", delay: {}", fmt_num(b.delay_s)));
            }
            transition.push_str(&format!(", times: {times} }}"));
            out.push(SimpleChange {
                targets: b.targets.clone(),
                object: with_transition(&values, &transition),
                values,
                transition,
            });
        }
        ResolvedBlock::Group(g) => {
            for child in &g.children {
                collect_simple_into(child, out);
            }
        }
        ResolvedBlock::Hold(_) => {}
    }
}

/// Mount plan when orchestration is required: mark every targeted element
/// as controls-driven and build the effect body.
fn plan_controlled_mount(
    seq: &crate::resolve::ResolvedSequence,
    plans: &mut HashMap<String, ElementPlan>,
    effect_lines: &mut Vec<String>,
) {
    for change in collect_simple(&seq.blocks) {
        for target in &change.targets {
            if let Some(plan) = plans.get_mut(target) {
                if plan.controls.is_none() {
                    plan.controls = Some(format!("{}Controls", ident(target)));
                }
            }
        }
    }
    let body: Vec<String> = seq
        .blocks
        .iter()
        .flat_map(|b| effect_statements(b, plans))
        .collect();
    match &seq.repeat {
        Some(repeat) if repeat.count.is_infinite() => {
            effect_lines.push("for (;;) {".to_string());
            for line in &body {
                effect_lines.push(format!("  {line}"));
            }
            effect_lines.push("}".to_string());
        }
        Some(repeat) => {
            let n = repeat.count.count().unwrap_or(1);
            effect_lines.push(format!("for (let i = 0; i < {n}; i++) {{"));
            for line in &body {
                effect_lines.push(format!("  {line}"));
            }
            effect_lines.push("}".to_string());
        }
        None => effect_lines.extend(body),
    }
}

fn effect_statements(block: &ResolvedBlock, plans: &HashMap<String, ElementPlan>) -> Vec<String> {
    match block {
        ResolvedBlock::Group(g) if g.mode == crate::schema::GroupMode::Parallel => {
            let exprs = start_expressions(&g.children, plans);
            if exprs.is_empty() {
                Vec::new()
            } else {
                vec![format!("await Promise.all([{}]);", exprs.join(", "))]
            }
        }
        ResolvedBlock::Group(g) => g
            .children
            .iter()
            .flat_map(|c| effect_statements(c, plans))
            .collect(),
        ResolvedBlock::Hold(h) => {
            vec![format!("// '{}' block requires runtime support", h.kind)]
        }
        leaf => {
            let exprs = start_expressions(std::slice::from_ref(leaf), plans);
            match exprs.len() {
                0 => Vec::new(),
                1 => vec![format!("await {};", exprs[0])],
                _ => vec![format!("await Promise.all([{}]);", exprs.join(", "))],
            }
        }
    }
}

fn start_expressions(blocks: &[ResolvedBlock], plans: &HashMap<String, ElementPlan>) -> Vec<String> {
    collect_simple(blocks)
        .into_iter()
        .flat_map(|change| {
            change
                .targets
                .iter()
                .filter_map(|t| {
                    plans
                        .get(t)
                        .and_then(|p| p.controls.as_ref())
                        .map(|c| format!("{c}.start({})", change.object))
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// framer-motion value object from a resolved state (`{ x: 120, opacity: 1 }`).
/// Filter and shadow components fold into `filter` / `boxShadow` strings.
fn motion_object(state: &ResolvedState) -> String {
    let flat = flatten_state(state);
    let mut entries: Vec<String> = Vec::new();
    let mut filter = Vec::new();
    for spec in PROPERTIES {
        let Some(value) = flat.get(spec.name) else {
            continue;
        };
        match spec.class {
            PropertyClass::Filter => {
                if let Some(n) = value.as_number() {
                    filter.push(format!(
                        "{}({}{})",
                        spec.function.expect("filter fn"),
                        fmt_num(n),
                        spec.unit.suffix()
                    ));
                }
            }
            PropertyClass::Shadow => {}
            _ => {
                if let Some(entry) = js_entry(spec.name, value) {
                    entries.push(entry);
                }
            }
        }
    }
    if !filter.is_empty() {
        entries.push(format!("filter: {}", quote(&filter.join(" "))));
    }
    if let Some(shadow) = box_shadow_value(&flat) {
        entries.push(format!("boxShadow: {}", quote(&shadow)));
    }
    format!("{{ {} }}", entries.join(", "))
}

fn js_entry(name: &str, value: &crate::schema::ResolvedValue) -> Option<String> {
    use crate::schema::ResolvedValue;
    let text = match value {
        ResolvedValue::Number(n) => fmt_num(*n),
        ResolvedValue::Text(s) => quote(s),
        ResolvedValue::Numbers(ns) => format!(
            "[{}]",
            ns.iter().map(|n| fmt_num(*n)).collect::<Vec<_>>().join(", ")
        ),
        ResolvedValue::Texts(ts) => format!(
            "[{}]",
            ts.iter().map(|t| quote(t)).collect::<Vec<_>>().join(", ")
        ),
        ResolvedValue::Nested(_) => return None,
    };
    Some(format!("{name}: {text}"))
}

fn box_shadow_value(flat: &HashMap<String, crate::schema::ResolvedValue>) -> Option<String> {
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

/// Per-property keyframe arrays plus the shared `times` array.
fn keyframe_arrays(b: &crate::resolve::ResolvedKeyframes) -> (String, String) {
    let mut keys: Vec<String> = Vec::new();
    for frame in &b.frames {
        for key in frame.state.sorted_keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
    }
    keys.sort();
    let entries: Vec<String> = keys
        .iter()
        .map(|key| {
            let values: Vec<String> = b
                .frames
                .iter()
                .map(|f| match f.state.get(key) {
                    Some(crate::schema::ResolvedValue::Number(n)) => fmt_num(*n),
                    Some(crate::schema::ResolvedValue::Text(s)) => quote(s),
                    _ => "null".to_string(),
                })
                .collect();
            format!("{key}: [{}]", values.join(", "))
        })
        .collect();
    let times: Vec<String> = b.frames.iter().map(|f| fmt_num(f.time)).collect();
    (
        format!("{{ {} }}", entries.join(", ")),
        format!("[{}]", times.join(", ")),
    )
}

fn with_transition(values: &str, transition: &str) -> String {
    if values == "{  }" || values == "{ }" {
        return format!("{{ transition: {transition} }}");
    }
    let inner = values
        .strip_prefix("{ ")
        .and_then(|v| v.strip_suffix(" }"))
        .unwrap_or(values);
    format!("{{ {inner}, transition: {transition} }}")
}

fn tween_transition(duration_s: f64, delay_s: f64, easing: Option<&EasingDef>) -> String {
    let mut parts = vec![format!("duration: {}", fmt_num(duration_s))];
    if delay_s > 0.0 {
        parts.push(format!("delay: {}", fmt_num(delay_s)));
    }
    match easing {
        None => {}
        Some(EasingDef::Named(name)) => parts.push(format!("ease: {}", quote(name))),
        Some(EasingDef::Bezier([a, b, c, d])) => parts.push(format!(
            "ease: [{}, {}, {}, {}]",
            fmt_num(*a),
            fmt_num(*b),
            fmt_num(*c),
            fmt_num(*d)
        )),
        // framer has no step easing; linear is the closest stable choice.
        Some(EasingDef::Steps { .. }) => parts.push("ease: \"linear\"".to_string()),
        Some(EasingDef::Spring { spring }) => {
            return spring_transition(&resolve::expand_spring(spring), delay_s)
        }
    }
    format!("{{ {} }}", parts.join(", "))
}

fn spring_transition(spring: &ResolvedSpring, delay_s: f64) -> String {
    let mut parts = vec![
        "type: \"spring\"".to_string(),
        format!("stiffness: {}", fmt_num(spring.stiffness)),
        format!("damping: {}", fmt_num(spring.damping)),
        format!("mass: {}", fmt_num(spring.mass)),
    ];
    if spring.velocity != 0.0 {
        parts.push(format!("velocity: {}", fmt_num(spring.velocity)));
    }
    if delay_s > 0.0 {
        parts.push(format!("delay: {}", fmt_num(delay_s)));
    }
    format!("{{ {} }}", parts.join(", "))
}

fn viewport_object(threshold: Option<f64>, once: bool) -> String {
    let mut parts = Vec::new();
    if once {
        parts.push("once: true".to_string());
    }
    if let Some(t) = threshold {
        parts.push(format!("amount: {}", fmt_num(t)));
    }
    format!("{{ {} }}", parts.join(", "))
}

/// Camel-case a document id into a JS identifier.
fn ident(id: &str) -> String {
    let mut out = String::new();
    let mut upper = false;
    for c in id.chars() {
        if c.is_alphanumeric() {
            if out.is_empty() {
                if c.is_ascii_digit() {
                    out.push_str("el");
                }
                out.push(c.to_ascii_lowercase());
            } else if upper {
                out.push(c.to_ascii_uppercase());
                upper = false;
            } else {
                out.push(c);
            }
        } else {
            upper = !out.is_empty();
        }
    }
    if out.is_empty() {
        out.push_str("el");
    }
    out
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).expect("string serialization is infallible")
}

fn emit(
    doc: &Document,
    resolved: &ResolvedDocument,
    plans: &HashMap<String, ElementPlan>,
    cx: &EmitContext<'_>,
) -> String {
    let mut out = String::new();
    let pad = cx.options.pad(1);

    let mut motion_imports = vec!["motion"];
    if cx.needs_controls {
        motion_imports.push("useAnimationControls");
    }
    if cx.uses_scroll {
        motion_imports.push("useScroll");
    }
    out.push_str(&format!(
        "import {{ {} }} from \"framer-motion\";\n",
        motion_imports.join(", ")
    ));
    if cx.needs_controls || !cx.effect_lines.is_empty() {
        out.push_str("import { useEffect } from \"react\";\n");
    }
    out.push('\n');

    out.push_str(&format!(
        "export function {}() {{\n",
        cx.options.component_name
    ));

    let mut controlled: Vec<(&String, &String)> = plans
        .iter()
        .filter_map(|(id, p)| p.controls.as_ref().map(|c| (id, c)))
        .collect();
    controlled.sort();
    for (_, controls) in &controlled {
        out.push_str(&format!("{pad}const {controls} = useAnimationControls();\n"));
    }
    if cx.uses_scroll {
        out.push_str(&format!("{pad}const {{ scrollYProgress }} = useScroll();\n"));
        out.push_str(&format!(
            "{pad}// scroll sequences: bind scrollYProgress to the targeted values\n"
        ));
    }
    if !cx.unsupported.is_empty() {
        out.push_str(&format!(
            "{pad}// triggers requiring runtime wiring: {}\n",
            cx.unsupported.join(", ")
        ));
    }

    if !cx.effect_lines.is_empty() {
        out.push_str(&format!("{pad}useEffect(() => {{\n"));
        out.push_str(&format!("{pad}{pad}const run = async () => {{\n"));
        for line in cx.effect_lines {
            out.push_str(&format!("{pad}{pad}{pad}{line}\n"));
        }
        out.push_str(&format!("{pad}{pad}}};\n"));
        out.push_str(&format!("{pad}{pad}void run();\n"));
        let deps = controlled
            .iter()
            .map(|(_, c)| c.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("{pad}}}, [{deps}]);\n"));
    }

    out.push_str(&format!("{pad}return (\n{pad}{pad}<div>\n"));
    let child_ids = group_child_ids(doc);
    for id in doc.sorted_element_ids() {
        if child_ids.contains(id.as_str()) {
            continue;
        }
        render_element(doc, resolved, plans, id, 3, cx, &mut out);
    }
    out.push_str(&format!("{pad}{pad}</div>\n{pad});\n}}\n"));
    out
}

fn group_child_ids(doc: &Document) -> HashSet<&str> {
    let mut ids = HashSet::new();
    for element in doc.elements.values() {
        for child in element.children() {
            ids.insert(child.as_str());
        }
    }
    ids
}

fn render_element(
    doc: &Document,
    resolved: &ResolvedDocument,
    plans: &HashMap<String, ElementPlan>,
    id: &str,
    depth: usize,
    cx: &EmitContext<'_>,
    out: &mut String,
) {
    let Some(element) = doc.elements.get(id) else {
        return;
    };
    let pad = cx.options.pad(depth);
    let plan = plans.get(id);
    let initial = resolved
        .elements
        .get(id)
        .map(|e| motion_object(&e.initial))
        .unwrap_or_else(|| "{ }".to_string());

    let mut props = vec![format!("className={}", quote(id))];
    if initial != "{  }" {
        props.push(format!("initial={{{initial}}}"));
    }
    if let Some(plan) = plan {
        if let Some(controls) = &plan.controls {
            props.push(format!("animate={{{controls}}}"));
        } else if let Some(animate) = &plan.animate {
            props.push(format!("animate={{{animate}}}"));
            if let Some(transition) = &plan.transition {
                props.push(format!("transition={{{transition}}}"));
            }
        }
        if let Some(v) = &plan.while_hover {
            props.push(format!("whileHover={{{v}}}"));
        }
        if let Some(v) = &plan.while_tap {
            props.push(format!("whileTap={{{v}}}"));
        }
        if let Some(v) = &plan.while_focus {
            props.push(format!("whileFocus={{{v}}}"));
        }
        if let Some(v) = &plan.while_in_view {
            props.push(format!("whileInView={{{v}}}"));
            if let Some(vp) = &plan.viewport {
                props.push(format!("viewport={{{vp}}}"));
            }
        }
    }

    match element {
        ElementDefinition::Box(_) | ElementDefinition::Mesh(_) | ElementDefinition::Custom(_) => {
            out.push_str(&format!("{pad}<motion.div {} />\n", props.join(" ")));
        }
        ElementDefinition::Circle(_) => {
            props.push("style={{ borderRadius: \"50%\" }}".to_string());
            out.push_str(&format!("{pad}<motion.div {} />\n", props.join(" ")));
        }
        ElementDefinition::Text(t) => {
            let mut style = Vec::new();
            if let Some(f) = &t.font_family {
                style.push(format!("fontFamily: {}", quote(f)));
            }
            if let Some(s) = t.font_size {
                style.push(format!("fontSize: {}", fmt_num(s)));
            }
            if let Some(w) = &t.font_weight {
                style.push(format!("fontWeight: {}", quote(w)));
            }
            if !style.is_empty() {
                props.push(format!("style={{{{ {} }}}}", style.join(", ")));
            }
            out.push_str(&format!(
                "{pad}<motion.span {}>{}</motion.span>\n",
                props.join(" "),
                t.content
            ));
        }
        ElementDefinition::Svg(s) => {
            props.push(format!(
                "dangerouslySetInnerHTML={{{{ __html: {} }}}}",
                quote(&s.svg)
            ));
            out.push_str(&format!("{pad}<motion.div {} />\n", props.join(" ")));
        }
        ElementDefinition::Path(p) => {
            props.push(format!("d={}", quote(&p.d)));
            out.push_str(&format!(
                "{pad}<svg>\n{pad2}<motion.path {} />\n{pad}</svg>\n",
                props.join(" "),
                pad2 = cx.options.pad(depth + 1),
            ));
        }
        ElementDefinition::Group(g) => {
            out.push_str(&format!("{pad}<motion.div {}>\n", props.join(" ")));
            for child in &g.children {
                render_element(doc, resolved, plans, child, depth + 1, cx, out);
            }
            out.push_str(&format!("{pad}</motion.div>\n"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(json: &str) -> ComponentArtifact {
        let doc: Document = serde_json::from_str(json).unwrap();
        compile_component(&doc, &CompileOptions::default())
    }

    /// it should declare controls when a repeat is present
    #[test]
    fn repeat_requires_controls() {
        let art = compile(
            r#"{
                "version": "1.0",
                "elements": {"card": {"type": "box", "initial": {"x": 0}}},
                "timeline": {"sequences": [{
                    "trigger": {"type": "mount"},
                    "repeat": {"count": 2},
                    "animations": [
                        {"type": "transition", "target": "card", "to": {"x": 100}, "duration": 500}
                    ]
                }]}
            }"#,
        );
        assert!(art.code.contains("useAnimationControls"));
        assert!(art.code.contains("const cardControls = useAnimationControls();"));
        assert!(art.code.contains("for (let i = 0; i < 2; i++) {"));
        assert!(art.code.contains("await cardControls.start("));
        assert_eq!(art.language, "tsx");
    }

    /// it should keep plain prop-driven output when no orchestration exists
    #[test]
    fn simple_mount_uses_props() {
        let art = compile(
            r#"{
                "version": "1.0",
                "elements": {"card": {"type": "box", "initial": {"opacity": 0}}},
                "timeline": {"sequences": [{
                    "trigger": {"type": "mount"},
                    "animations": [
                        {"type": "transition", "target": "card", "to": {"opacity": 1}, "duration": 400}
                    ]
                }]}
            }"#,
        );
        assert!(!art.code.contains("useAnimationControls"));
        assert!(art.code.contains("animate={{ opacity: 1 }}"));
        assert!(art.code.contains("transition={{ duration: 0.4 }}"));
        assert!(art.code.contains("initial={{ opacity: 0 }}"));
    }

    #[test]
    fn hover_spring_becomes_while_hover() {
        let art = compile(
            r#"{
                "version": "1.0",
                "elements": {"card": {"type": "box", "initial": {"scale": 1}}},
                "timeline": {"sequences": [{
                    "trigger": {"type": "hover"},
                    "animations": [{
                        "type": "spring", "target": "card", "to": {"scale": 1.05},
                        "spring": {"preset": "snappy"}
                    }]
                }]}
            }"#,
        );
        assert!(art.code.contains("whileHover={{ scale: 1.05, transition: { type: \"spring\", stiffness: 600, damping: 40, mass: 1 } }}"));
    }

    #[test]
    fn declared_dependencies() {
        let art = compile(r#"{"version": "1.0"}"#);
        let names: Vec<&str> = art.dependencies.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["react", "framer-motion"]);
    }

    #[test]
    fn group_elements_nest_their_children() {
        let art = compile(
            r#"{
                "version": "1.0",
                "elements": {
                    "wrap": {"type": "group", "children": ["a", "b"], "initial": {}},
                    "a": {"type": "box", "initial": {}},
                    "b": {"type": "box", "initial": {}}
                }
            }"#,
        );
        let wrap_pos = art.code.find("className=\"wrap\"").unwrap();
        let a_pos = art.code.find("className=\"a\"").unwrap();
        assert!(a_pos > wrap_pos);
        // Children render once, inside the group.
        assert_eq!(art.code.matches("className=\"a\"").count(), 1);
    }

    #[test]
    fn identifier_mangling() {
        assert_eq!(ident("card"), "card");
        assert_eq!(ident("hero-image"), "heroImage");
        assert_eq!(ident("2nd"), "el2nd");
    }
}
