use rayon::prelude::*;

use crate::animation::ease::Ease;
use crate::animation::transition::{FramePlan, Transition};
use crate::edit::align::EditOp;
use crate::edit::replay::Replay;
use crate::foundation::error::{EditMotionError, EditMotionResult};
use crate::render::composite::composite_layer;
use crate::render::frame::{AnimationFrame, FrameKind, FrameRGBA};
use crate::render::raster::Rasterizer;

/// Frame counts and interpolation settings for an edit animation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameTiming {
    /// Copies of the source (and of the target) shown before (and after) the edits.
    pub hold_frames: u32,
    /// Interpolated frames per op; each op also gets one settled frame.
    pub transition_frames: u32,
    pub ease: Ease,
    /// Rasterize frames on the rayon pool. Output order is unaffected.
    pub parallel: bool,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self {
            hold_frames: 1,
            transition_frames: 6,
            ease: Ease::Linear,
            parallel: false,
        }
    }
}

impl FrameTiming {
    /// `2 * hold_frames + op_count * (transition_frames + 1)`.
    pub fn frame_count(&self, op_count: usize) -> usize {
        2 * self.hold_frames as usize + op_count * (self.transition_frames as usize + 1)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SynthStats {
    pub frames_total: u64,
    pub frames_rendered: u64,
    /// Frames reusing the previous frame's pixels (hold runs, repeated stable frames).
    pub frames_elided: u64,
}

/// Lay out every frame of the animation without rasterizing anything.
///
/// Fails with [`EditMotionError::Invariant`] if `ops` do not replay from `source` onto `target`.
pub fn plan_frames(
    source: &str,
    target: &str,
    ops: &[EditOp],
    timing: &FrameTiming,
) -> EditMotionResult<Vec<FramePlan>> {
    let source_chars: Vec<char> = source.chars().collect();
    let mut plans = Vec::with_capacity(timing.frame_count(ops.len()));

    for _ in 0..timing.hold_frames {
        plans.push(FramePlan::stable(FrameKind::Hold, source));
    }

    let mut replay = Replay::new(&source_chars, ops);
    for step in replay.by_ref() {
        let step = step?;
        plans.extend(
            Transition::from_step(&step).plans(timing.transition_frames, timing.ease),
        );
    }

    if !replay.live().iter().copied().eq(target.chars()) {
        let got: String = replay.live().iter().collect();
        return Err(EditMotionError::invariant(format!(
            "edit ops turn '{source}' into '{got}', not '{target}'"
        )));
    }

    for _ in 0..timing.hold_frames {
        plans.push(FramePlan::stable(FrameKind::Hold, target));
    }

    debug_assert_eq!(plans.len(), timing.frame_count(ops.len()));
    Ok(plans)
}

/// Render the edit animation from `source` to `target`.
pub fn synthesize(
    source: &str,
    target: &str,
    ops: &[EditOp],
    timing: &FrameTiming,
    rasterizer: &dyn Rasterizer,
) -> EditMotionResult<Vec<AnimationFrame>> {
    synthesize_with_stats(source, target, ops, timing, rasterizer).map(|(frames, _)| frames)
}

#[tracing::instrument(skip(ops, timing, rasterizer), fields(ops = ops.len()))]
pub fn synthesize_with_stats(
    source: &str,
    target: &str,
    ops: &[EditOp],
    timing: &FrameTiming,
    rasterizer: &dyn Rasterizer,
) -> EditMotionResult<(Vec<AnimationFrame>, SynthStats)> {
    let plans = plan_frames(source, target, ops, timing)?;
    if plans.is_empty() {
        return Ok((Vec::new(), SynthStats::default()));
    }

    let distinct: Vec<usize> = (0..plans.len())
        .filter(|&i| i == 0 || !plans[i].same_pixels(&plans[i - 1]))
        .collect();

    let rendered: Vec<FrameRGBA> = if timing.parallel {
        distinct
            .par_iter()
            .map(|&i| render_plan(rasterizer, &plans[i]))
            .collect::<EditMotionResult<Vec<_>>>()?
    } else {
        distinct
            .iter()
            .map(|&i| render_plan(rasterizer, &plans[i]))
            .collect::<EditMotionResult<Vec<_>>>()?
    };

    let mut frames = Vec::with_capacity(plans.len());
    let mut next = 0usize;
    for (i, plan) in plans.iter().enumerate() {
        if next < distinct.len() && distinct[next] == i {
            next += 1;
        }
        frames.push(AnimationFrame {
            kind: plan.kind,
            image: rendered[next - 1].clone(),
        });
    }

    let stats = SynthStats {
        frames_total: frames.len() as u64,
        frames_rendered: rendered.len() as u64,
        frames_elided: (frames.len() - rendered.len()) as u64,
    };
    tracing::debug!(
        total = stats.frames_total,
        rendered = stats.frames_rendered,
        elided = stats.frames_elided,
        "edit animation synthesized"
    );
    Ok((frames, stats))
}

fn render_plan(rasterizer: &dyn Rasterizer, plan: &FramePlan) -> EditMotionResult<FrameRGBA> {
    let mut frame = rasterizer.render_text(&plan.base_text)?;
    if frame.canvas() != rasterizer.canvas() {
        return Err(EditMotionError::render(format!(
            "rasterizer returned {}x{}, expected {}x{}",
            frame.width,
            frame.height,
            rasterizer.canvas().width,
            rasterizer.canvas().height
        )));
    }
    frame.check_len()?;

    if let Some(overlay) = &plan.overlay {
        let layer = rasterizer.render_glyph_overlay(
            &plan.base_text,
            overlay.index,
            overlay.glyph,
            overlay.opacity,
        )?;
        composite_layer(&mut frame, &layer)?;
    }
    Ok(frame)
}
