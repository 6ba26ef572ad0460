//! Text rasterization through small generated SVG documents (`usvg` layout, `resvg` raster).

use std::path::Path;
use std::sync::Arc;

use crate::foundation::core::Canvas;
use crate::foundation::error::{EditMotionError, EditMotionResult};
use crate::render::frame::FrameRGBA;
use crate::render::raster::{Rasterizer, TextStyle};

/// Baseline offset below the vertical center, as a fraction of the font size. Puts the middle of
/// capital letters on the canvas midline.
const BASELINE_SHIFT_EM: f32 = 0.35;

const MAX_DIM: u32 = 16_384;

pub struct SvgTextRasterizer {
    canvas: Canvas,
    style: TextStyle,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl SvgTextRasterizer {
    /// Rasterizer backed by the system font database.
    pub fn new(canvas: Canvas, style: TextStyle) -> EditMotionResult<Self> {
        Self::with_font_dir(canvas, style, None)
    }

    /// Like [`SvgTextRasterizer::new`], additionally loading `.ttf`/`.otf`/`.ttc` files from
    /// `font_dir`.
    pub fn with_font_dir(
        canvas: Canvas,
        style: TextStyle,
        font_dir: Option<&Path>,
    ) -> EditMotionResult<Self> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(EditMotionError::validation(
                "rasterizer canvas width/height must be > 0",
            ));
        }
        if canvas.width > MAX_DIM || canvas.height > MAX_DIM {
            return Err(EditMotionError::validation(format!(
                "rasterizer canvas too large: {}x{} (max {MAX_DIM}x{MAX_DIM})",
                canvas.width, canvas.height
            )));
        }
        if !style.font_size.is_finite() || style.font_size <= 0.0 {
            return Err(EditMotionError::validation("font_size must be > 0"));
        }

        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        if let Some(dir) = font_dir {
            load_fonts_from_dir(&mut db, dir);
        }
        point_generic_monospace_at_installed_face(&mut db);
        tracing::debug!(faces = db.faces().count(), "font database loaded");

        Ok(Self {
            canvas,
            style,
            fontdb: Arc::new(db),
        })
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    /// Number of font faces available for layout. Zero means text renders as nothing.
    pub fn font_face_count(&self) -> usize {
        self.fontdb.faces().count()
    }

    /// Horizontal extent of `text` laid out from x = 0, in pixels.
    pub fn measure(&self, text: &str) -> EditMotionResult<f32> {
        if text.is_empty() {
            return Ok(0.0);
        }
        let doc = self.document(None, &self.text_element(0.0, &xml_escape(text)));
        let tree = self.parse(&doc)?;
        let root = tree.root();
        if !root.has_children() {
            return Ok(0.0);
        }
        let right = root.abs_bounding_box().right();
        Ok(if right.is_finite() { right.max(0.0) } else { 0.0 })
    }

    fn left_edge(&self, text: &str) -> EditMotionResult<f32> {
        let width = self.measure(text)?;
        Ok(((self.canvas.width as f32 - width) / 2.0).floor())
    }

    fn baseline(&self) -> f32 {
        (self.canvas.height as f32 / 2.0 + self.style.font_size * BASELINE_SHIFT_EM).round()
    }

    fn text_element(&self, x: f32, content: &str) -> String {
        format!(
            r#"<text x="{x}" y="{y}" font-family="{family}" font-size="{size}" fill="{fill}" xml:space="preserve">{content}</text>"#,
            y = self.baseline(),
            family = xml_escape(&self.style.font_family),
            size = self.style.font_size,
            fill = self.style.text_rgb.to_hex(),
        )
    }

    fn document(&self, background: Option<&str>, body: &str) -> String {
        let Canvas { width, height } = self.canvas;
        let bg = background
            .map(|fill| format!(r#"<rect x="0" y="0" width="{width}" height="{height}" fill="{fill}"/>"#))
            .unwrap_or_default();
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">{bg}{body}</svg>"#
        )
    }

    fn parse(&self, doc: &str) -> EditMotionResult<usvg::Tree> {
        let opts = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..Default::default()
        };
        usvg::Tree::from_str(doc, &opts)
            .map_err(|e| EditMotionError::render(format!("parse generated svg: {e}")))
    }

    fn rasterize(&self, doc: &str) -> EditMotionResult<FrameRGBA> {
        let tree = self.parse(doc)?;
        let mut pixmap = resvg::tiny_skia::Pixmap::new(self.canvas.width, self.canvas.height)
            .ok_or_else(|| EditMotionError::render("failed to allocate text pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::default(),
            &mut pixmap.as_mut(),
        );
        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: pixmap.data().to_vec(),
            premultiplied: true,
        })
    }
}

impl Rasterizer for SvgTextRasterizer {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn render_text(&self, text: &str) -> EditMotionResult<FrameRGBA> {
        let body = if text.is_empty() {
            String::new()
        } else {
            self.text_element(self.left_edge(text)?, &xml_escape(text))
        };
        let bg = self.style.background_rgb.to_hex();
        self.rasterize(&self.document(Some(&bg), &body))
    }

    fn render_glyph_overlay(
        &self,
        layout_text: &str,
        index: usize,
        glyph: char,
        opacity: f32,
    ) -> EditMotionResult<FrameRGBA> {
        let len = layout_text.chars().count();
        if index > len {
            return Err(EditMotionError::render(format!(
                "overlay index {index} is past the end of a {len}-character layout"
            )));
        }

        // The hidden prefix makes text layout advance the pen to exactly where the glyph goes.
        let prefix: String = layout_text.chars().take(index).collect();
        let mut content = String::new();
        if !prefix.is_empty() {
            content.push_str(&format!(
                r#"<tspan fill-opacity="0">{}</tspan>"#,
                xml_escape(&prefix)
            ));
        }
        content.push_str(&format!(
            r#"<tspan fill-opacity="{}">{}</tspan>"#,
            opacity.clamp(0.0, 1.0),
            xml_escape(&glyph.to_string())
        ));

        let body = self.text_element(self.left_edge(layout_text)?, &content);
        self.rasterize(&self.document(None, &body))
    }
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory is not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font");
        }
    }
}

/// The generic `monospace` family defaults to "Courier New"; retarget it at an installed face,
/// preferring monospaced ones, so the fallback in the family list always resolves.
fn point_generic_monospace_at_installed_face(db: &mut usvg::fontdb::Database) {
    let family = db
        .faces()
        .find(|f| f.monospaced)
        .or_else(|| db.faces().next())
        .and_then(|f| f.families.first())
        .map(|(name, _)| name.clone());
    if let Some(family) = family {
        db.set_monospace_family(family);
    }
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
