//! Edit animation: per-op transitions and frame synthesis.

pub mod ease;
pub mod synth;
pub mod transition;

pub use ease::Ease;
pub use synth::{FrameTiming, SynthStats, plan_frames, synthesize, synthesize_with_stats};
pub use transition::{FramePlan, GlyphOverlay, Transition, TransitionKind};
