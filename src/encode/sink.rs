use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{EditMotionError, EditMotionResult};
use crate::render::frame::{AnimationFrame, FrameRGBA};

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
}

/// Consumer of rendered frames in timeline order.
///
/// Ordering contract: `push_frame` is called with strictly increasing `FrameIndex` values.
pub trait FrameSink: Send {
    fn begin(&mut self, cfg: SinkConfig) -> EditMotionResult<()>;
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> EditMotionResult<()>;
    fn end(&mut self) -> EditMotionResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> EditMotionResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> EditMotionResult<()> {
        if self.cfg.is_none() {
            return Err(EditMotionError::encode("in-memory sink not started"));
        }
        if let Some((last, _)) = self.frames.last()
            && idx.0 <= last.0
        {
            return Err(EditMotionError::encode(
                "in-memory sink received out-of-order frame index",
            ));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> EditMotionResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Stream an ordered animation into `sink`.
///
/// An empty frame list is an error; there is nothing meaningful to encode.
pub fn encode_frames(
    frames: &[AnimationFrame],
    sink: &mut dyn FrameSink,
    fps: Fps,
) -> EditMotionResult<()> {
    let first = frames
        .first()
        .ok_or_else(|| EditMotionError::encode("no frames to encode"))?;

    sink.begin(SinkConfig {
        width: first.image.width,
        height: first.image.height,
        fps,
    })?;
    for (i, frame) in frames.iter().enumerate() {
        sink.push_frame(FrameIndex(i as u64), &frame.image)?;
    }
    sink.end()
}
