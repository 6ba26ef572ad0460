use crate::foundation::core::Canvas;
use crate::foundation::error::{EditMotionError, EditMotionResult};

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**; the flag makes this explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Fully transparent frame.
    pub fn transparent(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0u8; canvas.rgba_len()],
            premultiplied: true,
        }
    }

    /// Frame filled with one opaque color.
    pub fn solid(canvas: Canvas, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(canvas.rgba_len());
        for _ in 0..(canvas.width as usize * canvas.height as usize) {
            data.extend_from_slice(&rgba);
        }
        Self {
            width: canvas.width,
            height: canvas.height,
            data,
            premultiplied: true,
        }
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn check_len(&self) -> EditMotionResult<()> {
        if self.data.len() != self.canvas().rgba_len() {
            return Err(EditMotionError::render(format!(
                "frame data length {} does not match {}x{}x4",
                self.data.len(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }
}

/// Where a frame sits in an edit animation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameKind {
    /// Stable source/target frame repeated before the first / after the last op.
    Hold,
    /// Interpolated frame for op `op_index`, `progress` in `[0, 1]`.
    Transition { op_index: usize, progress: f32 },
    /// Stable frame showing the string right after op `op_index`.
    Settled { op_index: usize },
}

impl FrameKind {
    pub fn op_index(self) -> Option<usize> {
        match self {
            Self::Hold => None,
            Self::Transition { op_index, .. } | Self::Settled { op_index } => Some(op_index),
        }
    }

    /// Interpolation progress; stable frames report 1.0.
    pub fn progress(self) -> f32 {
        match self {
            Self::Transition { progress, .. } => progress,
            Self::Hold | Self::Settled { .. } => 1.0,
        }
    }
}

/// One frame of an edit animation, in temporal order.
#[derive(Clone, Debug)]
pub struct AnimationFrame {
    pub kind: FrameKind,
    pub image: FrameRGBA,
}
