use crate::foundation::error::{EditMotionError, EditMotionResult};
use crate::foundation::math::mul_div255_u8;
use crate::render::frame::FrameRGBA;

pub type PremulRgba8 = [u8; 4];

/// Premultiplied source-over with an extra layer opacity.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> EditMotionResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(EditMotionError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Composite a premultiplied `layer` onto `base` in place.
pub fn composite_layer(base: &mut FrameRGBA, layer: &FrameRGBA) -> EditMotionResult<()> {
    if base.width != layer.width || base.height != layer.height {
        return Err(EditMotionError::render(format!(
            "layer size mismatch: got {}x{}, expected {}x{}",
            layer.width, layer.height, base.width, base.height
        )));
    }
    if !base.premultiplied || !layer.premultiplied {
        return Err(EditMotionError::render(
            "composite_layer expects premultiplied frames",
        ));
    }
    over_in_place(&mut base.data, &layer.data, 1.0)
}
