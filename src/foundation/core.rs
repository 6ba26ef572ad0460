use crate::foundation::error::{EditMotionError, EditMotionResult};

/// Absolute 0-based frame index in an animation's timeline.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> EditMotionResult<Self> {
        if den == 0 {
            return Err(EditMotionError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(EditMotionError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Whole-number frame rate, e.g. `Fps::whole(10)` is `10/1`.
    pub fn whole(num: u32) -> EditMotionResult<Self> {
        Self::new(num, 1)
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> EditMotionResult<Self> {
        if width == 0 || height == 0 {
            return Err(EditMotionError::validation("canvas width/height must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// Byte length of a tightly packed RGBA8 buffer for this canvas.
    pub fn rgba_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Opaque 8-bit RGB color, serialized as `[r, g, b]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8(pub u8, pub u8, pub u8);

impl Rgb8 {
    pub const BLACK: Self = Self(0, 0, 0);
    pub const WHITE: Self = Self(255, 255, 255);

    /// `#rrggbb` form used in SVG paint attributes.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.0, self.1, self.2, 255]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_rejects_zero_parts() {
        assert!(Fps::new(0, 1).is_err());
        assert!(Fps::new(30, 0).is_err());
        assert_eq!(Fps::whole(10).unwrap().as_f64(), 10.0);
        assert_eq!(Fps::whole(10).unwrap().frames_to_secs(25), 2.5);
    }

    #[test]
    fn canvas_validates_and_sizes_buffers() {
        assert!(Canvas::new(0, 4).is_err());
        assert_eq!(Canvas::new(4, 2).unwrap().rgba_len(), 32);
    }

    #[test]
    fn rgb_hex_is_lowercase_and_padded() {
        assert_eq!(Rgb8(0, 10, 255).to_hex(), "#000aff");
        assert_eq!(Rgb8::WHITE.to_rgba(), [255, 255, 255, 255]);
    }

    #[test]
    fn rgb_serializes_as_triple() {
        let s = serde_json::to_string(&Rgb8(1, 2, 3)).unwrap();
        assert_eq!(s, "[1,2,3]");
    }
}
