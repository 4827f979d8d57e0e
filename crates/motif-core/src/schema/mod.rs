//! Typed document model for the motif animation description language.

pub mod document;
pub mod element;
pub mod state;
pub mod timeline;

pub use document::{AudioBand, AudioConfig, Document, Metadata, VariableValue, Viewport, FORMAT_VERSION};
pub use element::{ElementCommon, ElementDefinition, Effect};
pub use state::{
    property_spec, PropertyClass, PropertySpec, PropertyState, PropertyValue, ResolvedState,
    ResolvedValue, Unit, PROPERTIES,
};
pub use timeline::{
    AnimationBlock, EasingDef, GroupBlock, GroupMode, Keyframe, KeyframesBlock, MatchCutBlock,
    MorphBlock, Repeat, RepeatCount, ResolvedSpring, Sequence, SpringBlock, SpringConfig,
    SpringPreset, StaggerDefinition, StaggerFrom, StaggerOrigin, TargetRef, Timeline,
    TransitionBlock, Trigger,
};
