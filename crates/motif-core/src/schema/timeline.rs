//! Timeline grammar: sequences, triggers, animation blocks, springs,
//! easing and stagger definitions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::schema::state::PropertyState;

/// Ordered sequences. Order matters for display only; each sequence is
/// activated independently by its trigger.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Timeline {
    #[serde(default)]
    pub sequences: Vec<Sequence>,
}

/// One trigger paired with an ordered animation program.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Sequence {
    /// Stable id used for run idempotence; defaulted from the sequence index
    /// when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub trigger: Trigger,
    #[serde(default)]
    pub animations: Vec<AnimationBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<Repeat>,
    /// Reverse from/to on odd iterations.
    #[serde(default)]
    pub yoyo: bool,
    /// Unknown sequence fields, preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Repeat {
    pub count: RepeatCount,
    /// Delay between iterations, milliseconds.
    #[serde(default)]
    pub delay: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RepeatCount {
    Count(u32),
    /// Only `"infinite"` is accepted; enforced by the validator.
    Word(String),
}

impl RepeatCount {
    pub fn is_infinite(&self) -> bool {
        matches!(self, RepeatCount::Word(w) if w == "infinite")
    }

    pub fn count(&self) -> Option<u32> {
        match self {
            RepeatCount::Count(n) => Some(*n),
            RepeatCount::Word(_) => None,
        }
    }
}

/// Event class that activates a sequence.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Trigger {
    Mount,
    Unmount,
    #[serde(rename_all = "camelCase")]
    Hover {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    HoverEnd {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Tap {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Focus {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Blur {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },
    Scroll {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<[f64; 2]>,
    },
    #[serde(rename_all = "camelCase")]
    InView {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        threshold: Option<f64>,
        #[serde(default)]
        once: bool,
    },
    Swipe {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        direction: Option<String>,
    },
    Drag {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },
    Custom {
        event: String,
    },
    State {
        name: String,
    },
    Audio {
        band: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        threshold: Option<f64>,
    },
}

impl Trigger {
    /// Tag string as it appears in the serialized document.
    pub fn kind(&self) -> &'static str {
        match self {
            Trigger::Mount => "mount",
            Trigger::Unmount => "unmount",
            Trigger::Hover { .. } => "hover",
            Trigger::HoverEnd { .. } => "hoverEnd",
            Trigger::Tap { .. } => "tap",
            Trigger::Focus { .. } => "focus",
            Trigger::Blur { .. } => "blur",
            Trigger::Scroll { .. } => "scroll",
            Trigger::InView { .. } => "inView",
            Trigger::Swipe { .. } => "swipe",
            Trigger::Drag { .. } => "drag",
            Trigger::Custom { .. } => "custom",
            Trigger::State { .. } => "state",
            Trigger::Audio { .. } => "audio",
        }
    }
}

/// One or many element ids addressed by a block.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TargetRef {
    One(String),
    Many(Vec<String>),
}

impl TargetRef {
    pub fn ids(&self) -> Vec<&str> {
        match self {
            TargetRef::One(id) => vec![id.as_str()],
            TargetRef::Many(ids) => ids.iter().map(String::as_str).collect(),
        }
    }
}

/// One unit of the animation program. Recursive via `Group`; children are
/// structurally owned, so the tree cannot contain cycles.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AnimationBlock {
    Keyframes(KeyframesBlock),
    Spring(SpringBlock),
    Transition(TransitionBlock),
    Group(GroupBlock),
    Morph(MorphBlock),
    MatchCut(MatchCutBlock),
    Drag(DragBlock),
    Particles(ParticlesBlock),
    Text(TextBlock),
}

impl AnimationBlock {
    pub fn kind(&self) -> &'static str {
        match self {
            AnimationBlock::Keyframes(_) => "keyframes",
            AnimationBlock::Spring(_) => "spring",
            AnimationBlock::Transition(_) => "transition",
            AnimationBlock::Group(_) => "group",
            AnimationBlock::Morph(_) => "morph",
            AnimationBlock::MatchCut(_) => "matchCut",
            AnimationBlock::Drag(_) => "drag",
            AnimationBlock::Particles(_) => "particles",
            AnimationBlock::Text(_) => "text",
        }
    }

    pub fn target(&self) -> Option<&TargetRef> {
        match self {
            AnimationBlock::Keyframes(b) => b.target.as_ref(),
            AnimationBlock::Spring(b) => b.target.as_ref(),
            AnimationBlock::Transition(b) => b.target.as_ref(),
            AnimationBlock::Group(_) => None,
            AnimationBlock::Morph(b) => b.target.as_ref(),
            AnimationBlock::MatchCut(_) => None,
            AnimationBlock::Drag(b) => b.target.as_ref(),
            AnimationBlock::Particles(b) => b.target.as_ref(),
            AnimationBlock::Text(b) => b.target.as_ref(),
        }
    }
}

pub(crate) fn default_transition_duration() -> f64 {
    300.0
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct KeyframesBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetRef>,
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub delay: f64,
    /// Total block duration, milliseconds.
    pub duration: f64,
    pub frames: Vec<Keyframe>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<EasingDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stagger: Option<StaggerDefinition>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// One keyframe; `at` is DSL-relative time in 0–100.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Keyframe {
    pub at: f64,
    #[serde(default)]
    pub state: PropertyState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<EasingDef>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SpringBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetRef>,
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub delay: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<PropertyState>,
    pub to: PropertyState,
    #[serde(default)]
    pub spring: SpringConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stagger: Option<StaggerDefinition>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TransitionBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetRef>,
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub delay: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<PropertyState>,
    pub to: PropertyState,
    #[serde(default = "default_transition_duration")]
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<EasingDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stagger: Option<StaggerDefinition>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GroupMode {
    #[default]
    Parallel,
    Sequence,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GroupBlock {
    #[serde(default)]
    pub mode: GroupMode,
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub delay: f64,
    pub children: Vec<AnimationBlock>,
    /// In `sequence` mode, `stagger.each` is the fixed inter-child delay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stagger: Option<StaggerDefinition>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MorphBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetRef>,
    pub to_path: String,
    #[serde(default = "default_transition_duration")]
    pub duration: f64,
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub delay: f64,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MatchCutBlock {
    pub with: String,
    #[serde(default = "default_transition_duration")]
    pub duration: f64,
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub delay: f64,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DragBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis: Option<String>,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub delay: f64,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ParticlesBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetRef>,
    #[serde(default)]
    pub count: u32,
    #[serde(default = "default_transition_duration")]
    pub duration: f64,
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub delay: f64,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TextBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetRef>,
    /// Split granularity ("chars", "words", "lines").
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default = "default_transition_duration")]
    pub duration: f64,
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub delay: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stagger: Option<StaggerDefinition>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Named spring presets with fixed (stiffness, damping, mass) physics.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpringPreset {
    Gentle,
    Wobbly,
    Stiff,
    Snappy,
    Molasses,
    Bouncy,
}

impl SpringPreset {
    /// (stiffness, damping, mass)
    pub fn physics(self) -> (f64, f64, f64) {
        match self {
            SpringPreset::Gentle => (120.0, 14.0, 1.0),
            SpringPreset::Wobbly => (180.0, 12.0, 1.0),
            SpringPreset::Stiff => (400.0, 30.0, 1.0),
            SpringPreset::Snappy => (600.0, 40.0, 1.0),
            SpringPreset::Molasses => (100.0, 20.0, 1.0),
            SpringPreset::Bouncy => (300.0, 10.0, 1.0),
        }
    }
}

/// Union-by-presence: at least one of {preset, stiffness, duration} must be
/// set (validator-enforced). Explicit physics fields override the preset.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SpringConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<SpringPreset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stiffness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damping: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
    /// Duration+bounce shorthand, milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounce: Option<f64>,
}

impl SpringConfig {
    pub fn is_empty(&self) -> bool {
        self.preset.is_none() && self.stiffness.is_none() && self.duration.is_none()
    }
}

/// Concrete spring physics after preset/shorthand expansion.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResolvedSpring {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
    pub velocity: f64,
}

impl Default for ResolvedSpring {
    fn default() -> Self {
        Self {
            stiffness: 100.0,
            damping: 10.0,
            mass: 1.0,
            velocity: 0.0,
        }
    }
}

impl ResolvedSpring {
    /// damping ratio ζ = damping / (2·sqrt(stiffness·mass))
    pub fn damping_ratio(&self) -> f64 {
        let critical = 2.0 * (self.stiffness * self.mass).sqrt();
        if critical <= 0.0 {
            return 1.0;
        }
        self.damping / critical
    }

    /// Settle-time estimate in seconds: clamp(4π·sqrt(mass/stiffness), 0.2, 2.0).
    pub fn settle_seconds(&self) -> f64 {
        if self.stiffness <= 0.0 {
            return 0.2;
        }
        let t = 4.0 * std::f64::consts::PI * (self.mass / self.stiffness).sqrt();
        t.clamp(0.2, 2.0)
    }
}

/// Easing: named preset, cubic-bezier 4-tuple, step function or spring.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum EasingDef {
    Bezier([f64; 4]),
    Steps {
        steps: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        jump: Option<String>,
    },
    Spring {
        spring: SpringConfig,
    },
    Named(String),
}

/// Origin policy for stagger delays.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StaggerOrigin {
    Index(usize),
    Named(StaggerFrom),
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StaggerFrom {
    First,
    Last,
    Center,
    Edges,
}

impl Default for StaggerOrigin {
    fn default() -> Self {
        StaggerOrigin::Named(StaggerFrom::First)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StaggerDefinition {
    /// Per-element delay increment, milliseconds.
    pub each: f64,
    #[serde(default)]
    pub from: StaggerOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<[u32; 2]>,
}

impl StaggerDefinition {
    /// Delay in milliseconds for ordinal `index` among `count` targets.
    pub fn delay_for(&self, index: usize, count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }
        let i = index as f64;
        let n = count as f64;
        let steps = match &self.from {
            StaggerOrigin::Named(StaggerFrom::First) => i,
            StaggerOrigin::Named(StaggerFrom::Last) => n - 1.0 - i,
            StaggerOrigin::Named(StaggerFrom::Center) => (i - (n - 1.0) / 2.0).abs(),
            StaggerOrigin::Named(StaggerFrom::Edges) => {
                let mid = (n - 1.0) / 2.0;
                mid - (i - mid).abs()
            }
            StaggerOrigin::Index(origin) => (i - *origin as f64).abs(),
        };
        steps * self.each
    }

    /// Largest delay across `count` targets, used to compute block spans.
    pub fn max_delay(&self, count: usize) -> f64 {
        (0..count)
            .map(|i| self.delay_for(i, count))
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stagger(each: f64, from: StaggerOrigin) -> StaggerDefinition {
        StaggerDefinition {
            each,
            from,
            grid: None,
        }
    }

    /// it should produce [200,100,0,100,200] for center origin over 5 targets
    #[test]
    fn center_origin_delays() {
        let s = stagger(100.0, StaggerOrigin::Named(StaggerFrom::Center));
        let delays: Vec<f64> = (0..5).map(|i| s.delay_for(i, 5)).collect();
        assert_eq!(delays, vec![200.0, 100.0, 0.0, 100.0, 200.0]);
    }

    /// it should mirror center for the edges origin
    #[test]
    fn edges_origin_delays() {
        let s = stagger(100.0, StaggerOrigin::Named(StaggerFrom::Edges));
        let delays: Vec<f64> = (0..5).map(|i| s.delay_for(i, 5)).collect();
        assert_eq!(delays, vec![0.0, 100.0, 200.0, 100.0, 0.0]);
    }

    #[test]
    fn first_last_and_index_origins() {
        let first = stagger(50.0, StaggerOrigin::Named(StaggerFrom::First));
        assert_eq!(first.delay_for(3, 4), 150.0);
        let last = stagger(50.0, StaggerOrigin::Named(StaggerFrom::Last));
        assert_eq!(last.delay_for(0, 4), 150.0);
        let explicit = stagger(50.0, StaggerOrigin::Index(2));
        assert_eq!(explicit.delay_for(0, 4), 100.0);
        assert_eq!(explicit.delay_for(2, 4), 0.0);
    }

    #[test]
    fn spring_ratio_and_settle() {
        let s = ResolvedSpring {
            stiffness: 400.0,
            damping: 10.0,
            mass: 1.0,
            velocity: 0.0,
        };
        assert!((s.damping_ratio() - 0.25).abs() < 1e-9);
        let settle = s.settle_seconds();
        assert!(settle > 0.2 && settle < 2.0);
    }

    #[test]
    fn block_round_trips_through_json() {
        let json = r#"{
            "type": "group",
            "mode": "sequence",
            "children": [
                {"type": "transition", "target": "card", "to": {"x": 10}},
                {"type": "spring", "target": ["a", "b"], "to": {"scale": 1.2},
                 "spring": {"preset": "wobbly"}}
            ]
        }"#;
        let block: AnimationBlock = serde_json::from_str(json).unwrap();
        match &block {
            AnimationBlock::Group(g) => {
                assert_eq!(g.mode, GroupMode::Sequence);
                assert_eq!(g.children.len(), 2);
            }
            other => panic!("expected group, got {}", other.kind()),
        }
        let text = serde_json::to_string(&block).unwrap();
        let again: AnimationBlock = serde_json::from_str(&text).unwrap();
        assert_eq!(block, again);
    }
}
