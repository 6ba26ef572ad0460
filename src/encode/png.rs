use std::path::Path;

use anyhow::Context as _;

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::foundation::error::{EditMotionError, EditMotionResult};
use crate::render::frame::FrameRGBA;

/// Write an opaque frame as an RGBA PNG.
///
/// Premultiplied pixels are un-premultiplied first; fully opaque frames pass through unchanged.
pub fn write_png(frame: &FrameRGBA, path: &Path) -> EditMotionResult<()> {
    frame.check_len()?;
    ensure_parent_dir(path)?;

    let straight;
    let data = if frame.premultiplied && frame.data.chunks_exact(4).any(|px| px[3] != 255) {
        straight = unpremultiply(&frame.data);
        straight.as_slice()
    } else {
        frame.data.as_slice()
    };

    image::save_buffer_with_format(
        path,
        data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
    .map_err(EditMotionError::from)
}

fn unpremultiply(src: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len());
    for px in src.chunks_exact(4) {
        let a = u32::from(px[3]);
        if a == 0 {
            out.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        for &c in &px[..3] {
            out.push(((u32::from(c) * 255 + a / 2) / a).min(255) as u8);
        }
        out.push(px[3]);
    }
    out
}
