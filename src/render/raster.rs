use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::EditMotionResult;
use crate::render::frame::FrameRGBA;

/// Font and color settings shared by every frame of an animation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextStyle {
    /// CSS-style family list, e.g. `"DejaVu Sans Mono, monospace"`.
    pub font_family: String,
    pub font_size: f32,
    pub text_rgb: Rgb8,
    pub background_rgb: Rgb8,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Courier New, Liberation Mono, DejaVu Sans Mono, monospace".to_string(),
            font_size: 48.0,
            text_rgb: Rgb8::BLACK,
            background_rgb: Rgb8::WHITE,
        }
    }
}

/// Text-to-bitmap collaborator used to build animation frames.
///
/// Implementations must be deterministic for identical inputs; the synthesizer may call them
/// from several threads at once.
pub trait Rasterizer: Send + Sync {
    fn canvas(&self) -> Canvas;

    /// Opaque frame with `text` centered on the canvas.
    fn render_text(&self, text: &str) -> EditMotionResult<FrameRGBA>;

    /// Transparent premultiplied layer holding only `glyph`, drawn where character `index` of
    /// the centered `layout_text` starts, at `opacity`.
    ///
    /// `index == layout_text.chars().count()` places the glyph just past the last character.
    fn render_glyph_overlay(
        &self,
        layout_text: &str,
        index: usize,
        glyph: char,
        opacity: f32,
    ) -> EditMotionResult<FrameRGBA>;
}
