use crate::animation::ease::{Ease, ramp};
use crate::edit::align::EditOp;
use crate::edit::replay::ReplayStep;
use crate::render::frame::FrameKind;

/// Visual effect of one edit operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    /// Insert: new glyph fades in over the pre-insertion string.
    FadeIn,
    /// Delete: removed glyph fades out over the post-deletion string.
    FadeOut,
    /// Replace: old glyph fades out over the post-replacement string, uncovering the new one.
    CrossFade,
}

impl TransitionKind {
    pub fn opacity(self, eased_progress: f32) -> f32 {
        let t = eased_progress.clamp(0.0, 1.0);
        match self {
            Self::FadeIn => t,
            Self::FadeOut | Self::CrossFade => 1.0 - t,
        }
    }
}

/// A single glyph drawn over a base string at a character index of that base's layout.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphOverlay {
    pub index: usize,
    pub glyph: char,
    pub opacity: f32,
}

/// Everything needed to rasterize one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    pub kind: FrameKind,
    pub base_text: String,
    pub overlay: Option<GlyphOverlay>,
}

impl FramePlan {
    pub fn stable(kind: FrameKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            base_text: text.into(),
            overlay: None,
        }
    }

    /// Two plans that rasterize to the same pixels.
    pub fn same_pixels(&self, other: &Self) -> bool {
        self.base_text == other.base_text && self.overlay == other.overlay
    }
}

/// Transition for one replayed op: which string sits underneath and which glyph moves.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub op_index: usize,
    pub kind: TransitionKind,
    pub base_text: String,
    pub settled_text: String,
    pub index: usize,
    pub glyph: char,
}

impl Transition {
    pub fn from_step(step: &ReplayStep<'_, char>) -> Self {
        let before: String = step.before.iter().collect();
        let after: String = step.after.iter().collect();
        let (kind, base_text, glyph) = match step.op {
            EditOp::Insert { character, .. } => (TransitionKind::FadeIn, before, *character),
            EditOp::Delete { character, .. } => {
                (TransitionKind::FadeOut, after.clone(), *character)
            }
            EditOp::Replace { old_character, .. } => {
                (TransitionKind::CrossFade, after.clone(), *old_character)
            }
        };
        Self {
            op_index: step.op_index,
            kind,
            base_text,
            settled_text: after,
            index: step.live_position,
            glyph,
        }
    }

    /// `transition_frames` interpolated plans followed by one settled plan.
    pub fn plans(&self, transition_frames: u32, ease: Ease) -> Vec<FramePlan> {
        let mut out = Vec::with_capacity(transition_frames as usize + 1);
        for i in 0..transition_frames {
            let progress = ramp(i, transition_frames);
            let opacity = self.kind.opacity(ease.apply(progress));
            let overlay = (opacity > 0.0).then(|| GlyphOverlay {
                index: self.index,
                glyph: self.glyph,
                opacity,
            });
            out.push(FramePlan {
                kind: FrameKind::Transition {
                    op_index: self.op_index,
                    progress,
                },
                base_text: self.base_text.clone(),
                overlay,
            });
        }
        out.push(FramePlan::stable(
            FrameKind::Settled {
                op_index: self.op_index,
            },
            self.settled_text.clone(),
        ));
        out
    }
}
