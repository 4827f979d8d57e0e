//! Engine-agnostic core for the motif animation description language.
//!
//! A motif document is a declarative JSON description of elements, a
//! variable table, and a trigger-driven timeline. This crate owns the full
//! document pipeline:
//!
//! - [`schema`]: the typed document model (serde-based grammar).
//! - [`validate`]: accumulating validation with path-qualified errors.
//! - [`resolve`]: expression/variable resolution into numeric state.
//! - [`interpreter`]: virtual-clock playback against registered handles.
//! - [`compile`]: component (TSX) and stylesheet (CSS) code generation.
//!
//! Rendering stays outside: hosts implement [`TargetHandle`] and register
//! one per element id.

pub mod compile;
pub mod expr;
pub mod handle;
pub mod interpreter;
pub mod resolve;
pub mod schedule;
pub mod schema;
pub mod validate;

pub use compile::{
    compile_component, compile_stylesheet, CapabilityWarning, CompileOptions, ComponentArtifact,
    StylesheetArtifact,
};
pub use expr::ExprError;
pub use handle::{HandleRegistry, RecordedCall, RecordingHandle, RecordingLog, TargetHandle, TargetUpdate};
pub use interpreter::{Interpreter, PlaybackState, RuntimeEvent};
pub use resolve::{resolve, Resolution, ResolutionError, ResolvedBlock, ResolvedDocument};
pub use schema::{Document, ElementDefinition, PropertyState, ResolvedState, FORMAT_VERSION};
pub use validate::{expression_variables, is_expression, validate, validate_str, Validation, ValidationError};
