//! Document validation: one pass over the raw JSON that accumulates every
//! violation with a dotted/bracketed path and a machine-readable code, so a
//! caller (human or generative) can fix everything in a single round-trip.
//!
//! Unknown fields are preserved, never rejected; unknown `type` tags on
//! elements, triggers and animation blocks are errors.

use serde_json::Value as JsonValue;

use crate::schema::state::{is_nested_key, property_spec};
use crate::schema::{Document, FORMAT_VERSION};

/// Machine-readable error codes carried on [`ValidationError`].
pub mod codes {
    pub const PARSE: &str = "parse";
    pub const DESERIALIZE: &str = "deserialize";
    pub const INVALID_TYPE: &str = "invalid_type";
    pub const MISSING_FIELD: &str = "missing_field";
    pub const UNKNOWN_VARIANT: &str = "unknown_variant";
    pub const INVALID_VALUE: &str = "invalid_value";
    pub const INVALID_VERSION: &str = "invalid_version";
    pub const INVALID_EXPRESSION: &str = "invalid_expression";
    pub const INVALID_SPRING: &str = "invalid_spring";
}

/// One structural violation, tagged with the path to the offending value.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationError {
    pub path: String,
    pub code: &'static str,
    pub message: String,
}

/// Validator output: either a typed document or every violation found.
#[derive(Debug)]
pub struct Validation {
    pub valid: bool,
    pub data: Option<Document>,
    pub errors: Vec<ValidationError>,
}

impl Validation {
    fn failure(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: false,
            data: None,
            errors,
        }
    }
}

/// True when `value` is a well-formed expression literal: a direct variable
/// reference (`$name`, `$a.b`) or a bounded arithmetic body (`${a + b}`).
pub fn is_expression(value: &str) -> bool {
    if let Some(body) = value.strip_prefix("${") {
        return body.len() > 1 && body.ends_with('}');
    }
    if let Some(name) = value.strip_prefix('$') {
        return !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '.');
    }
    false
}

/// Bare variable names referenced inside an expression body, first
/// occurrence order, deduplicated. `${a + b * a}` → `["a", "b"]`.
pub fn expression_variables(value: &str) -> Vec<String> {
    let body = match value.strip_prefix("${").and_then(|b| b.strip_suffix('}')) {
        Some(body) => body,
        None => match value.strip_prefix('$') {
            Some(name) if is_expression(value) => return vec![name.to_string()],
            _ => return Vec::new(),
        },
    };
    // Variables inside the body may be written `$name` or bare (`${a + b}`).
    let mut names: Vec<String> = Vec::new();
    let chars: Vec<char> = body.chars().collect();
    let mut i = 0;
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
            if end > start {
                let name: String = chars[start..end].iter().collect();
                if !names.contains(&name) {
                    names.push(name);
                }
            }
            i = end.max(i + 1);
        } else {
            i += 1;
        }
    }
    names
}

/// Validate a raw string: parse as JSON, then validate the value. A parse
/// failure becomes a single root-path error with the `parse` code.
pub fn validate_str(input: &str) -> Validation {
    match serde_json::from_str::<JsonValue>(input) {
        Ok(value) => validate(&value),
        Err(e) => Validation::failure(vec![ValidationError {
            path: String::new(),
            code: codes::PARSE,
            message: format!("document is not valid JSON: {e}"),
        }]),
    }
}

/// Validate an already-parsed JSON value against the document grammar.
pub fn validate(value: &JsonValue) -> Validation {
    let mut cx = Ctx::default();
    check_document(value, &mut cx);
    if !cx.errors.is_empty() {
        return Validation::failure(cx.errors);
    }
    match serde_json::from_value::<Document>(value.clone()) {
        Ok(doc) => Validation {
            valid: true,
            data: Some(doc),
            errors: Vec::new(),
        },
        Err(e) => Validation::failure(vec![ValidationError {
            path: String::new(),
            code: codes::DESERIALIZE,
            message: format!("document failed to deserialize: {e}"),
        }]),
    }
}

#[derive(Default)]
struct Ctx {
    errors: Vec<ValidationError>,
}

impl Ctx {
    fn push(&mut self, path: &str, code: &'static str, message: impl Into<String>) {
        self.errors.push(ValidationError {
            path: path.to_string(),
            code,
            message: message.into(),
        });
    }

    fn expect_string<'v>(&mut self, v: &'v JsonValue, path: &str) -> Option<&'v str> {
        match v.as_str() {
            Some(s) => Some(s),
            None => {
                self.push(path, codes::INVALID_TYPE, "expected a string");
                None
            }
        }
    }

    fn expect_number(&mut self, v: &JsonValue, path: &str) -> Option<f64> {
        match v.as_f64() {
            Some(n) => Some(n),
            None => {
                self.push(path, codes::INVALID_TYPE, "expected a number");
                None
            }
        }
    }

    fn expect_non_negative(&mut self, v: &JsonValue, path: &str) {
        if let Some(n) = self.expect_number(v, path) {
            if n < 0.0 {
                self.push(path, codes::INVALID_VALUE, "expected a non-negative number");
            }
        }
    }
}

fn check_document(value: &JsonValue, cx: &mut Ctx) {
    let obj = match value.as_object() {
        Some(o) => o,
        None => {
            cx.push("", codes::INVALID_TYPE, "document root must be an object");
            return;
        }
    };

    match obj.get("version") {
        None => cx.push("version", codes::MISSING_FIELD, "missing format version"),
        Some(v) => {
            if let Some(s) = cx.expect_string(v, "version") {
                if s != FORMAT_VERSION {
                    cx.push(
                        "version",
                        codes::INVALID_VERSION,
                        format!("unsupported version '{s}', expected '{FORMAT_VERSION}'"),
                    );
                }
            }
        }
    }

    if let Some(meta) = obj.get("metadata") {
        check_metadata(meta, cx);
    }
    if let Some(vars) = obj.get("variables") {
        match vars.as_object() {
            Some(map) => {
                for (name, v) in map {
                    check_variable(v, &format!("variables.{name}"), cx);
                }
            }
            None => cx.push("variables", codes::INVALID_TYPE, "expected an object"),
        }
    }
    if let Some(audio) = obj.get("audio") {
        check_audio(audio, cx);
    }
    if let Some(elements) = obj.get("elements") {
        match elements.as_object() {
            Some(map) => {
                for (id, v) in map {
                    check_element(v, &format!("elements.{id}"), cx);
                }
            }
            None => cx.push("elements", codes::INVALID_TYPE, "expected an object"),
        }
    }
    if let Some(timeline) = obj.get("timeline") {
        check_timeline(timeline, cx);
    }
}

fn check_metadata(value: &JsonValue, cx: &mut Ctx) {
    let obj = match value.as_object() {
        Some(o) => o,
        None => {
            cx.push("metadata", codes::INVALID_TYPE, "expected an object");
            return;
        }
    };
    for key in ["name", "description"] {
        if let Some(v) = obj.get(key) {
            cx.expect_string(v, &format!("metadata.{key}"));
        }
    }
    for key in ["duration", "fps"] {
        if let Some(v) = obj.get(key) {
            cx.expect_non_negative(v, &format!("metadata.{key}"));
        }
    }
    if let Some(viewport) = obj.get("viewport") {
        match viewport.as_object() {
            Some(vp) => {
                for key in ["width", "height"] {
                    match vp.get(key) {
                        Some(v) => cx.expect_non_negative(v, &format!("metadata.viewport.{key}")),
                        None => cx.push(
                            &format!("metadata.viewport.{key}"),
                            codes::MISSING_FIELD,
                            "viewport requires width and height",
                        ),
                    }
                }
            }
            None => cx.push("metadata.viewport", codes::INVALID_TYPE, "expected an object"),
        }
    }
}

fn check_variable(value: &JsonValue, path: &str, cx: &mut Ctx) {
    match value {
        JsonValue::Number(_) | JsonValue::String(_) => {}
        JsonValue::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if !item.is_number() {
                    cx.push(
                        &format!("{path}[{i}]"),
                        codes::INVALID_TYPE,
                        "variable arrays must be numeric",
                    );
                }
            }
        }
        JsonValue::Object(map) => {
            for (name, v) in map {
                check_variable(v, &format!("{path}.{name}"), cx);
            }
        }
        _ => cx.push(
            path,
            codes::INVALID_TYPE,
            "expected a number, string, numeric array or nested object",
        ),
    }
}

fn check_audio(value: &JsonValue, cx: &mut Ctx) {
    let obj = match value.as_object() {
        Some(o) => o,
        None => {
            cx.push("audio", codes::INVALID_TYPE, "expected an object");
            return;
        }
    };
    if let Some(source) = obj.get("source") {
        cx.expect_string(source, "audio.source");
    }
    if let Some(bands) = obj.get("bands") {
        match bands.as_object() {
            Some(map) => {
                for (name, band) in map {
                    let path = format!("audio.bands.{name}");
                    let band_obj = match band.as_object() {
                        Some(o) => o,
                        None => {
                            cx.push(&path, codes::INVALID_TYPE, "expected an object");
                            continue;
                        }
                    };
                    if let Some(range) = band_obj.get("freqRange") {
                        check_pair(range, &format!("{path}.freqRange"), cx);
                    }
                    if let Some(s) = band_obj.get("smoothing") {
                        cx.expect_number(s, &format!("{path}.smoothing"));
                    }
                }
            }
            None => cx.push("audio.bands", codes::INVALID_TYPE, "expected an object"),
        }
    }
}

fn check_pair(value: &JsonValue, path: &str, cx: &mut Ctx) {
    match value.as_array() {
        Some(arr) if arr.len() == 2 && arr.iter().all(JsonValue::is_number) => {}
        _ => cx.push(path, codes::INVALID_TYPE, "expected a [number, number] pair"),
    }
}

const ELEMENT_KINDS: &[&str] = &[
    "box", "circle", "text", "svg", "path", "mesh", "group", "custom",
];

fn check_element(value: &JsonValue, path: &str, cx: &mut Ctx) {
    let obj = match value.as_object() {
        Some(o) => o,
        None => {
            cx.push(path, codes::INVALID_TYPE, "expected an object");
            return;
        }
    };
    let kind = match obj.get("type") {
        None => {
            cx.push(
                &format!("{path}.type"),
                codes::MISSING_FIELD,
                "element requires a type tag",
            );
            return;
        }
        Some(v) => match cx.expect_string(v, &format!("{path}.type")) {
            Some(s) => s.to_string(),
            None => return,
        },
    };
    if !ELEMENT_KINDS.contains(&kind.as_str()) {
        cx.push(
            &format!("{path}.type"),
            codes::UNKNOWN_VARIANT,
            format!("unknown element type '{kind}'"),
        );
        return;
    }

    let require_string = |cx: &mut Ctx, field: &str| match obj.get(field) {
        Some(v) => {
            cx.expect_string(v, &format!("{path}.{field}"));
        }
        None => cx.push(
            &format!("{path}.{field}"),
            codes::MISSING_FIELD,
            format!("'{kind}' elements require '{field}'"),
        ),
    };
    match kind.as_str() {
        "text" => require_string(cx, "content"),
        "svg" => require_string(cx, "svg"),
        "path" => require_string(cx, "d"),
        "group" => match obj.get("children") {
            Some(JsonValue::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        cx.push(
                            &format!("{path}.children[{i}]"),
                            codes::INVALID_TYPE,
                            "group children are element ids",
                        );
                    }
                }
            }
            Some(_) => cx.push(
                &format!("{path}.children"),
                codes::INVALID_TYPE,
                "expected an array of element ids",
            ),
            None => {}
        },
        "mesh" => {
            for field in ["vertices", "triangles"] {
                if let Some(v) = obj.get(field) {
                    match v.as_array() {
                        Some(items) if items.iter().all(JsonValue::is_number) => {}
                        _ => cx.push(
                            &format!("{path}.{field}"),
                            codes::INVALID_TYPE,
                            "expected a numeric array",
                        ),
                    }
                }
            }
        }
        _ => {}
    }

    if let Some(initial) = obj.get("initial") {
        check_state(initial, &format!("{path}.initial"), cx);
    }
    if let Some(effects) = obj.get("effects") {
        match effects.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    let epath = format!("{path}.effects[{i}]");
                    match item.as_object() {
                        Some(effect) => match effect.get("kind") {
                            Some(k) => {
                                cx.expect_string(k, &format!("{epath}.kind"));
                            }
                            None => cx.push(
                                &format!("{epath}.kind"),
                                codes::MISSING_FIELD,
                                "effect requires a kind",
                            ),
                        },
                        None => cx.push(&epath, codes::INVALID_TYPE, "expected an object"),
                    }
                }
            }
            None => cx.push(
                &format!("{path}.effects"),
                codes::INVALID_TYPE,
                "expected an array",
            ),
        }
    }
}

fn check_state(value: &JsonValue, path: &str, cx: &mut Ctx) {
    let obj = match value.as_object() {
        Some(o) => o,
        None => {
            cx.push(path, codes::INVALID_TYPE, "expected a property-state object");
            return;
        }
    };
    for (key, v) in obj {
        let vpath = format!("{path}.{key}");
        if is_nested_key(key) {
            check_state(v, &vpath, cx);
            continue;
        }
        let spec = match property_spec(key) {
            Some(spec) => spec,
            // Unrecognized properties are preserved, not rejected.
            None => continue,
        };
        match v {
            JsonValue::Number(_) => {}
            JsonValue::String(s) => {
                if s.starts_with('$') && !is_expression(s) {
                    cx.push(
                        &vpath,
                        codes::INVALID_EXPRESSION,
                        format!("malformed expression '{s}'"),
                    );
                } else if spec.numeric && !s.starts_with('$') {
                    cx.push(
                        &vpath,
                        codes::INVALID_TYPE,
                        format!("'{key}' expects a number or expression"),
                    );
                }
            }
            JsonValue::Array(items) => {
                // A value track is stored as all numbers or all strings;
                // mixing the two has no representation in the model.
                let mixed = spec.numeric
                    && items.iter().any(JsonValue::is_number)
                    && items.iter().any(JsonValue::is_string);
                for (i, item) in items.iter().enumerate() {
                    let ok = if spec.numeric {
                        item.is_number()
                            || item
                                .as_str()
                                .map(|s| s.starts_with('$') && is_expression(s))
                                .unwrap_or(false)
                    } else {
                        item.is_string()
                    };
                    if !ok {
                        cx.push(
                            &format!("{vpath}[{i}]"),
                            codes::INVALID_TYPE,
                            "keyframe value array entry has the wrong type",
                        );
                    } else if mixed && item.is_string() {
                        cx.push(
                            &format!("{vpath}[{i}]"),
                            codes::INVALID_TYPE,
                            "keyframe value array mixes numbers and strings",
                        );
                    }
                }
            }
            _ => cx.push(&vpath, codes::INVALID_TYPE, "unsupported property value"),
        }
    }
}

fn check_timeline(value: &JsonValue, cx: &mut Ctx) {
    let obj = match value.as_object() {
        Some(o) => o,
        None => {
            cx.push("timeline", codes::INVALID_TYPE, "expected an object");
            return;
        }
    };
    if let Some(sequences) = obj.get("sequences") {
        match sequences.as_array() {
            Some(items) => {
                for (i, seq) in items.iter().enumerate() {
                    check_sequence(seq, &format!("timeline.sequences[{i}]"), cx);
                }
            }
            None => cx.push(
                "timeline.sequences",
                codes::INVALID_TYPE,
                "expected an array",
            ),
        }
    }
}

fn check_sequence(value: &JsonValue, path: &str, cx: &mut Ctx) {
    let obj = match value.as_object() {
        Some(o) => o,
        None => {
            cx.push(path, codes::INVALID_TYPE, "expected an object");
            return;
        }
    };
    if let Some(id) = obj.get("id") {
        cx.expect_string(id, &format!("{path}.id"));
    }
    match obj.get("trigger") {
        Some(trigger) => check_trigger(trigger, &format!("{path}.trigger"), cx),
        None => cx.push(
            &format!("{path}.trigger"),
            codes::MISSING_FIELD,
            "sequence requires a trigger",
        ),
    }
    if let Some(animations) = obj.get("animations") {
        match animations.as_array() {
            Some(items) => {
                for (i, block) in items.iter().enumerate() {
                    check_block(block, &format!("{path}.animations[{i}]"), cx);
                }
            }
            None => cx.push(
                &format!("{path}.animations"),
                codes::INVALID_TYPE,
                "expected an array",
            ),
        }
    }
    if let Some(repeat) = obj.get("repeat") {
        check_repeat(repeat, &format!("{path}.repeat"), cx);
    }
    if let Some(yoyo) = obj.get("yoyo") {
        if !yoyo.is_boolean() {
            cx.push(&format!("{path}.yoyo"), codes::INVALID_TYPE, "expected a bool");
        }
    }
}

const TRIGGER_KINDS: &[&str] = &[
    "mount", "unmount", "hover", "hoverEnd", "tap", "focus", "blur", "scroll", "inView", "swipe",
    "drag", "custom", "state", "audio",
];

fn check_trigger(value: &JsonValue, path: &str, cx: &mut Ctx) {
    let obj = match value.as_object() {
        Some(o) => o,
        None => {
            cx.push(path, codes::INVALID_TYPE, "expected an object");
            return;
        }
    };
    let kind = match obj.get("type") {
        None => {
            cx.push(
                &format!("{path}.type"),
                codes::MISSING_FIELD,
                "trigger requires a type tag",
            );
            return;
        }
        Some(v) => match cx.expect_string(v, &format!("{path}.type")) {
            Some(s) => s.to_string(),
            None => return,
        },
    };
    if !TRIGGER_KINDS.contains(&kind.as_str()) {
        cx.push(
            &format!("{path}.type"),
            codes::UNKNOWN_VARIANT,
            format!("unknown trigger type '{kind}'"),
        );
        return;
    }
    let require_string = |cx: &mut Ctx, field: &str| match obj.get(field) {
        Some(v) => {
            cx.expect_string(v, &format!("{path}.{field}"));
        }
        None => cx.push(
            &format!("{path}.{field}"),
            codes::MISSING_FIELD,
            format!("'{kind}' triggers require '{field}'"),
        ),
    };
    match kind.as_str() {
        "custom" => require_string(cx, "event"),
        "state" => require_string(cx, "name"),
        "audio" => require_string(cx, "band"),
        "scroll" => {
            if let Some(range) = obj.get("range") {
                check_pair(range, &format!("{path}.range"), cx);
            }
        }
        "inView" => {
            if let Some(t) = obj.get("threshold") {
                cx.expect_number(t, &format!("{path}.threshold"));
            }
        }
        _ => {}
    }
}

const BLOCK_KINDS: &[&str] = &[
    "keyframes",
    "spring",
    "transition",
    "group",
    "morph",
    "matchCut",
    "drag",
    "particles",
    "text",
];

fn check_block(value: &JsonValue, path: &str, cx: &mut Ctx) {
    let obj = match value.as_object() {
        Some(o) => o,
        None => {
            cx.push(path, codes::INVALID_TYPE, "expected an object");
            return;
        }
    };
    let kind = match obj.get("type") {
        None => {
            cx.push(
                &format!("{path}.type"),
                codes::MISSING_FIELD,
                "animation block requires a type tag",
            );
            return;
        }
        Some(v) => match cx.expect_string(v, &format!("{path}.type")) {
            Some(s) => s.to_string(),
            None => return,
        },
    };
    if !BLOCK_KINDS.contains(&kind.as_str()) {
        cx.push(
            &format!("{path}.type"),
            codes::UNKNOWN_VARIANT,
            format!("unknown animation block type '{kind}'"),
        );
        return;
    }

    if let Some(target) = obj.get("target") {
        match target {
            JsonValue::String(_) => {}
            JsonValue::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        cx.push(
                            &format!("{path}.target[{i}]"),
                            codes::INVALID_TYPE,
                            "targets are element ids",
                        );
                    }
                }
            }
            _ => cx.push(
                &format!("{path}.target"),
                codes::INVALID_TYPE,
                "expected an element id or array of ids",
            ),
        }
    }
    for field in ["offset", "delay", "duration"] {
        if let Some(v) = obj.get(field) {
            cx.expect_non_negative(v, &format!("{path}.{field}"));
        }
    }
    if let Some(stagger) = obj.get("stagger") {
        check_stagger(stagger, &format!("{path}.stagger"), cx);
    }
    if let Some(easing) = obj.get("easing") {
        check_easing(easing, &format!("{path}.easing"), cx);
    }

    let require_field = |cx: &mut Ctx, field: &str| {
        if !obj.contains_key(field) {
            cx.push(
                &format!("{path}.{field}"),
                codes::MISSING_FIELD,
                format!("'{kind}' blocks require '{field}'"),
            );
        }
    };
    match kind.as_str() {
        "keyframes" => {
            require_field(cx, "duration");
            match obj.get("frames") {
                Some(JsonValue::Array(frames)) => {
                    for (i, frame) in frames.iter().enumerate() {
                        let fpath = format!("{path}.frames[{i}]");
                        let frame_obj = match frame.as_object() {
                            Some(o) => o,
                            None => {
                                cx.push(&fpath, codes::INVALID_TYPE, "expected an object");
                                continue;
                            }
                        };
                        match frame_obj.get("at") {
                            Some(at) => {
                                if let Some(n) = cx.expect_number(at, &format!("{fpath}.at")) {
                                    if !(0.0..=100.0).contains(&n) {
                                        cx.push(
                                            &format!("{fpath}.at"),
                                            codes::INVALID_VALUE,
                                            "keyframe time must be within 0-100",
                                        );
                                    }
                                }
                            }
                            None => cx.push(
                                &format!("{fpath}.at"),
                                codes::MISSING_FIELD,
                                "keyframe requires 'at'",
                            ),
                        }
                        if let Some(state) = frame_obj.get("state") {
                            check_state(state, &format!("{fpath}.state"), cx);
                        }
                        if let Some(easing) = frame_obj.get("easing") {
                            check_easing(easing, &format!("{fpath}.easing"), cx);
                        }
                    }
                }
                Some(_) => cx.push(
                    &format!("{path}.frames"),
                    codes::INVALID_TYPE,
                    "expected an array of keyframes",
                ),
                None => cx.push(
                    &format!("{path}.frames"),
                    codes::MISSING_FIELD,
                    "'keyframes' blocks require 'frames'",
                ),
            }
        }
        "spring" | "transition" => {
            match obj.get("to") {
                Some(to) => check_state(to, &format!("{path}.to"), cx),
                None => cx.push(
                    &format!("{path}.to"),
                    codes::MISSING_FIELD,
                    format!("'{kind}' blocks require 'to'"),
                ),
            }
            if let Some(from) = obj.get("from") {
                check_state(from, &format!("{path}.from"), cx);
            }
            if kind == "spring" {
                if let Some(spring) = obj.get("spring") {
                    check_spring(spring, &format!("{path}.spring"), cx);
                }
            }
        }
        "group" => {
            if let Some(mode) = obj.get("mode") {
                if let Some(m) = cx.expect_string(mode, &format!("{path}.mode")) {
                    if m != "parallel" && m != "sequence" {
                        cx.push(
                            &format!("{path}.mode"),
                            codes::UNKNOWN_VARIANT,
                            format!("unknown group mode '{m}'"),
                        );
                    }
                }
            }
            match obj.get("children") {
                Some(JsonValue::Array(children)) => {
                    for (i, child) in children.iter().enumerate() {
                        check_block(child, &format!("{path}.children[{i}]"), cx);
                    }
                }
                Some(_) => cx.push(
                    &format!("{path}.children"),
                    codes::INVALID_TYPE,
                    "expected an array of blocks",
                ),
                None => cx.push(
                    &format!("{path}.children"),
                    codes::MISSING_FIELD,
                    "'group' blocks require 'children'",
                ),
            }
        }
        "morph" => require_field(cx, "toPath"),
        "matchCut" => require_field(cx, "with"),
        "particles" => {
            if let Some(count) = obj.get("count") {
                cx.expect_non_negative(count, &format!("{path}.count"));
            }
        }
        _ => {}
    }
}

const SPRING_PRESETS: &[&str] = &["gentle", "wobbly", "stiff", "snappy", "molasses", "bouncy"];

fn check_spring(value: &JsonValue, path: &str, cx: &mut Ctx) {
    let obj = match value.as_object() {
        Some(o) => o,
        None => {
            cx.push(path, codes::INVALID_TYPE, "expected an object");
            return;
        }
    };
    if !obj.contains_key("preset") && !obj.contains_key("stiffness") && !obj.contains_key("duration")
    {
        cx.push(
            path,
            codes::INVALID_SPRING,
            "spring config requires one of preset, stiffness or duration",
        );
    }
    if let Some(preset) = obj.get("preset") {
        if let Some(name) = cx.expect_string(preset, &format!("{path}.preset")) {
            if !SPRING_PRESETS.contains(&name) {
                cx.push(
                    &format!("{path}.preset"),
                    codes::UNKNOWN_VARIANT,
                    format!("unknown spring preset '{name}'"),
                );
            }
        }
    }
    for field in ["stiffness", "damping", "mass", "velocity", "duration", "bounce"] {
        if let Some(v) = obj.get(field) {
            cx.expect_number(v, &format!("{path}.{field}"));
        }
    }
}

fn check_easing(value: &JsonValue, path: &str, cx: &mut Ctx) {
    match value {
        JsonValue::String(_) => {}
        JsonValue::Array(items) => {
            if items.len() != 4 || !items.iter().all(JsonValue::is_number) {
                cx.push(
                    path,
                    codes::INVALID_VALUE,
                    "cubic-bezier easing requires 4 numbers",
                );
            }
        }
        JsonValue::Object(obj) => {
            if let Some(spring) = obj.get("spring") {
                check_spring(spring, &format!("{path}.spring"), cx);
            } else if let Some(steps) = obj.get("steps") {
                cx.expect_non_negative(steps, &format!("{path}.steps"));
            } else {
                cx.push(
                    path,
                    codes::INVALID_VALUE,
                    "easing object requires 'steps' or 'spring'",
                );
            }
        }
        _ => cx.push(path, codes::INVALID_TYPE, "unsupported easing definition"),
    }
}

fn check_stagger(value: &JsonValue, path: &str, cx: &mut Ctx) {
    let obj = match value.as_object() {
        Some(o) => o,
        None => {
            cx.push(path, codes::INVALID_TYPE, "expected an object");
            return;
        }
    };
    match obj.get("each") {
        Some(each) => cx.expect_non_negative(each, &format!("{path}.each")),
        None => cx.push(
            &format!("{path}.each"),
            codes::MISSING_FIELD,
            "stagger requires 'each'",
        ),
    }
    if let Some(from) = obj.get("from") {
        match from {
            JsonValue::Number(n) if n.as_u64().is_some() => {}
            JsonValue::String(s)
                if matches!(s.as_str(), "first" | "last" | "center" | "edges") => {}
            _ => cx.push(
                &format!("{path}.from"),
                codes::UNKNOWN_VARIANT,
                "stagger origin must be first, last, center, edges or an index",
            ),
        }
    }
    if let Some(grid) = obj.get("grid") {
        check_pair(grid, &format!("{path}.grid"), cx);
    }
}

fn check_repeat(value: &JsonValue, path: &str, cx: &mut Ctx) {
    let obj = match value.as_object() {
        Some(o) => o,
        None => {
            cx.push(path, codes::INVALID_TYPE, "expected an object");
            return;
        }
    };
    match obj.get("count") {
        Some(JsonValue::Number(n)) if n.as_u64().is_some() => {}
        Some(JsonValue::String(s)) if s == "infinite" => {}
        Some(_) => cx.push(
            &format!("{path}.count"),
            codes::INVALID_VALUE,
            "repeat count must be a non-negative integer or \"infinite\"",
        ),
        None => cx.push(
            &format!("{path}.count"),
            codes::MISSING_FIELD,
            "repeat requires 'count'",
        ),
    }
    if let Some(delay) = obj.get("delay") {
        cx.expect_non_negative(delay, &format!("{path}.delay"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expression_predicate() {
        assert!(is_expression("$speed"));
        assert!(is_expression("$theme.accent"));
        assert!(is_expression("${a + b}"));
        assert!(!is_expression("$"));
        assert!(!is_expression("${}"));
        assert!(!is_expression("plain"));
        assert!(!is_expression("$bad name"));
    }

    #[test]
    fn expression_variable_extraction() {
        assert_eq!(expression_variables("${a + b * a}"), vec!["a", "b"]);
        assert_eq!(expression_variables("$size.x"), vec!["size.x"]);
        assert_eq!(
            expression_variables("${$x * 2 + $pad.top}"),
            vec!["x", "pad.top"]
        );
        assert_eq!(expression_variables("${a + b}"), vec!["a", "b"]);
        assert!(expression_variables("42").is_empty());
    }
}
