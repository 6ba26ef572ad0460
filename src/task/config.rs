use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::animation::{Ease, FrameTiming};
use crate::foundation::core::{Canvas, Fps, Rgb8};
use crate::foundation::error::{EditMotionError, EditMotionResult};
use crate::render::raster::TextStyle;

/// Dataset generation settings. Every field has a default, so `{}` is a valid config file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaskConfig {
    pub domain: String,
    pub num_samples: usize,
    pub random_seed: Option<u64>,
    pub output_dir: PathBuf,
    /// `[width, height]` of every still and video frame.
    pub image_size: (u32, u32),

    pub generate_videos: bool,
    pub video_fps: u32,
    pub video_hold_frames: u32,
    pub video_operation_frames: u32,
    pub ease: Ease,
    pub parallel_render: bool,

    pub min_string_length: usize,
    pub max_string_length: usize,
    pub min_edit_distance: usize,
    pub max_edit_distance: usize,
    /// Sampling attempts before the last candidate is accepted regardless of distance.
    pub max_attempts: usize,

    pub use_uppercase: bool,
    pub use_lowercase: bool,
    pub use_numbers: bool,
    /// Upper and lower case letters; overrides `use_uppercase` / `use_lowercase`.
    pub use_mixed_case: bool,

    pub font_family: String,
    pub font_size: f32,
    pub font_dir: Option<PathBuf>,
    pub text_color: Rgb8,
    pub background_color: Rgb8,
}

impl Default for TaskConfig {
    fn default() -> Self {
        let style = TextStyle::default();
        Self {
            domain: "edit_distance".to_string(),
            num_samples: 10,
            random_seed: None,
            output_dir: PathBuf::from("data/questions"),
            image_size: (512, 512),

            generate_videos: true,
            video_fps: 10,
            video_hold_frames: 1,
            video_operation_frames: 6,
            ease: Ease::Linear,
            parallel_render: false,

            min_string_length: 3,
            max_string_length: 10,
            min_edit_distance: 1,
            max_edit_distance: 5,
            max_attempts: 50,

            use_uppercase: true,
            use_lowercase: false,
            use_numbers: false,
            use_mixed_case: false,

            font_family: style.font_family,
            font_size: style.font_size,
            font_dir: None,
            text_color: style.text_rgb,
            background_color: style.background_rgb,
        }
    }
}

impl TaskConfig {
    pub fn from_json_file(path: &Path) -> EditMotionResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> EditMotionResult<()> {
        if self.domain.trim().is_empty() {
            return Err(EditMotionError::validation("domain must be non-empty"));
        }
        let (w, h) = self.image_size;
        if w == 0 || h == 0 {
            return Err(EditMotionError::validation("image_size must be > 0"));
        }
        if self.generate_videos && (!w.is_multiple_of(2) || !h.is_multiple_of(2)) {
            return Err(EditMotionError::validation(
                "image_size must be even when generate_videos is set",
            ));
        }
        if self.video_fps == 0 {
            return Err(EditMotionError::validation("video_fps must be > 0"));
        }
        if self.min_string_length == 0 {
            return Err(EditMotionError::validation("min_string_length must be > 0"));
        }
        if self.min_string_length > self.max_string_length {
            return Err(EditMotionError::validation(
                "min_string_length must be <= max_string_length",
            ));
        }
        if self.min_edit_distance > self.max_edit_distance {
            return Err(EditMotionError::validation(
                "min_edit_distance must be <= max_edit_distance",
            ));
        }
        if self.max_attempts == 0 {
            return Err(EditMotionError::validation("max_attempts must be > 0"));
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(EditMotionError::validation("font_size must be > 0"));
        }
        Ok(())
    }

    pub fn canvas(&self) -> EditMotionResult<Canvas> {
        Canvas::new(self.image_size.0, self.image_size.1)
    }

    pub fn fps(&self) -> EditMotionResult<Fps> {
        Fps::whole(self.video_fps)
    }

    pub fn timing(&self) -> FrameTiming {
        FrameTiming {
            hold_frames: self.video_hold_frames,
            transition_frames: self.video_operation_frames,
            ease: self.ease,
            parallel: self.parallel_render,
        }
    }

    pub fn text_style(&self) -> TextStyle {
        TextStyle {
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            text_rgb: self.text_color,
            background_rgb: self.background_color,
        }
    }
}
