use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::animation::synth::synthesize_with_stats;
use crate::edit::align::{Alignment, EditOp};
use crate::edit::classify::{OpMix, classify};
use crate::edit::replay::verify_alignment;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
use crate::encode::png::write_png;
use crate::encode::sink::encode_frames;
use crate::foundation::error::{EditMotionError, EditMotionResult};
use crate::render::frame::{AnimationFrame, FrameRGBA};
use crate::render::raster::Rasterizer;
use crate::render::svg_text::SvgTextRasterizer;
use crate::task::config::TaskConfig;
use crate::task::prompts::pick_prompt;
use crate::task::sample::PairSampler;

pub const FIRST_FRAME_FILE: &str = "first_frame.png";
pub const FINAL_FRAME_FILE: &str = "final_frame.png";
pub const PROMPT_FILE: &str = "prompt.txt";
pub const EDITS_FILE: &str = "edits.json";
pub const VIDEO_FILE: &str = "ground_truth.mp4";

/// One generated source/target task with everything needed to write it out.
#[derive(Clone, Debug)]
pub struct TaskPair {
    pub task_id: String,
    pub domain: String,
    pub prompt: String,
    pub source: String,
    pub target: String,
    pub alignment: Alignment,
    pub mix: OpMix,
    pub first_image: FrameRGBA,
    pub final_image: FrameRGBA,
    /// Full edit animation; `None` when videos are disabled or ffmpeg is unavailable.
    pub video: Option<Vec<AnimationFrame>>,
}

/// Contents of `edits.json`.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct EditsRecord {
    pub task_id: String,
    pub domain: String,
    pub source: String,
    pub target: String,
    pub edit_distance: usize,
    pub mix: OpMix,
    pub ops: Vec<EditOp>,
    pub frame_count: Option<usize>,
    pub fps: Option<u32>,
}

impl EditsRecord {
    fn from_task(task: &TaskPair, fps: u32) -> Self {
        let frame_count = task.video.as_ref().map(Vec::len);
        Self {
            task_id: task.task_id.clone(),
            domain: task.domain.clone(),
            source: task.source.clone(),
            target: task.target.clone(),
            edit_distance: task.alignment.distance,
            mix: task.mix,
            ops: task.alignment.ops.clone(),
            frame_count,
            fps: frame_count.map(|_| fps),
        }
    }
}

/// Samples string pairs and turns them into written-out tasks.
pub struct TaskAssembler {
    cfg: TaskConfig,
    rasterizer: Box<dyn Rasterizer>,
    sampler: PairSampler,
    rng: StdRng,
    videos: bool,
}

impl TaskAssembler {
    /// Assembler rendering through [`SvgTextRasterizer`] with the configured font settings.
    pub fn new(cfg: TaskConfig) -> EditMotionResult<Self> {
        cfg.validate()?;
        let rasterizer = SvgTextRasterizer::with_font_dir(
            cfg.canvas()?,
            cfg.text_style(),
            cfg.font_dir.as_deref(),
        )?;
        if rasterizer.font_face_count() == 0 {
            tracing::warn!("no fonts found; frames will contain no text");
        }
        Self::with_rasterizer(cfg, Box::new(rasterizer))
    }

    pub fn with_rasterizer(
        cfg: TaskConfig,
        rasterizer: Box<dyn Rasterizer>,
    ) -> EditMotionResult<Self> {
        cfg.validate()?;
        let canvas = cfg.canvas()?;
        if rasterizer.canvas() != canvas {
            return Err(EditMotionError::validation(format!(
                "rasterizer canvas {}x{} does not match image_size {}x{}",
                rasterizer.canvas().width,
                rasterizer.canvas().height,
                canvas.width,
                canvas.height
            )));
        }

        let rng = match cfg.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let videos = cfg.generate_videos && is_ffmpeg_on_path();
        if cfg.generate_videos && !videos {
            tracing::warn!("ffmpeg not found on PATH; skipping video generation");
        }

        Ok(Self {
            sampler: PairSampler::from_config(&cfg)?,
            cfg,
            rasterizer,
            rng,
            videos,
        })
    }

    pub fn config(&self) -> &TaskConfig {
        &self.cfg
    }

    /// Whether generated tasks carry a video.
    pub fn videos_enabled(&self) -> bool {
        self.videos
    }

    /// `<output_dir>/<domain>_task`
    pub fn domain_dir(&self) -> PathBuf {
        self.cfg
            .output_dir
            .join(format!("{}_task", self.cfg.domain))
    }

    pub fn task_id(&self, index: usize) -> String {
        format!("{}_{index:04}", self.cfg.domain)
    }

    #[tracing::instrument(skip(self))]
    pub fn generate_task(&mut self, task_id: &str) -> EditMotionResult<TaskPair> {
        let pair = self.sampler.sample(&mut self.rng);
        verify_alignment(
            &pair.source.chars().collect::<Vec<_>>(),
            &pair.target.chars().collect::<Vec<_>>(),
            &pair.alignment.ops,
        )?;

        let mix = classify(&pair.alignment.ops);
        let prompt = pick_prompt(mix, &mut self.rng).to_string();

        let first_image = self.rasterizer.render_text(&pair.source)?;
        let final_image = self.rasterizer.render_text(&pair.target)?;

        let video = if self.videos {
            let (frames, stats) = synthesize_with_stats(
                &pair.source,
                &pair.target,
                &pair.alignment.ops,
                &self.cfg.timing(),
                self.rasterizer.as_ref(),
            )?;
            tracing::debug!(
                frames = stats.frames_total,
                rendered = stats.frames_rendered,
                "task video synthesized"
            );
            Some(frames)
        } else {
            None
        };

        tracing::debug!(
            source = %pair.source,
            target = %pair.target,
            distance = pair.alignment.distance,
            mix = %mix,
            attempts = pair.attempts,
            "task generated"
        );

        Ok(TaskPair {
            task_id: task_id.to_string(),
            domain: self.cfg.domain.clone(),
            prompt,
            source: pair.source,
            target: pair.target,
            alignment: pair.alignment,
            mix,
            first_image,
            final_image,
            video,
        })
    }

    /// Write `task` under [`TaskAssembler::domain_dir`]; returns the task directory.
    pub fn write_task(&self, task: &TaskPair) -> EditMotionResult<PathBuf> {
        let dir = self.domain_dir().join(&task.task_id);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create task directory '{}'", dir.display()))?;

        write_png(&task.first_image, &dir.join(FIRST_FRAME_FILE))?;
        write_png(&task.final_image, &dir.join(FINAL_FRAME_FILE))?;
        write_text(&dir.join(PROMPT_FILE), &task.prompt)?;

        let record = EditsRecord::from_task(task, self.cfg.video_fps);
        write_text(&dir.join(EDITS_FILE), &serde_json::to_string_pretty(&record)?)?;

        if let Some(frames) = &task.video {
            let bg = self.cfg.background_color.to_rgba();
            let mut sink = FfmpegSink::new(FfmpegSinkOpts {
                bg_rgba: bg,
                ..FfmpegSinkOpts::new(dir.join(VIDEO_FILE))
            });
            let fps = self.cfg.fps()?;
            encode_frames(frames, &mut sink, fps)?;
            tracing::debug!(
                task = %task.task_id,
                frames = frames.len(),
                secs = fps.frames_to_secs(frames.len() as u64),
                "task video encoded"
            );
        }
        Ok(dir)
    }

    /// Generate and write `num_samples` tasks; returns their directories in order.
    pub fn generate_dataset(&mut self) -> EditMotionResult<Vec<PathBuf>> {
        let count = self.cfg.num_samples;
        tracing::info!(
            count,
            domain = %self.cfg.domain,
            out = %self.domain_dir().display(),
            "generating dataset"
        );

        let mut dirs = Vec::with_capacity(count);
        for index in 0..count {
            let task_id = self.task_id(index);
            let task = self.generate_task(&task_id)?;
            dirs.push(self.write_task(&task)?);
        }

        tracing::info!(written = dirs.len(), "dataset complete");
        Ok(dirs)
    }
}

fn write_text(path: &Path, text: &str) -> EditMotionResult<()> {
    std::fs::write(path, text).with_context(|| format!("write '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::Canvas;

    struct Blank(Canvas);

    impl Rasterizer for Blank {
        fn canvas(&self) -> Canvas {
            self.0
        }

        fn render_text(&self, text: &str) -> EditMotionResult<FrameRGBA> {
            let v = (text.chars().count() * 10).min(255) as u8;
            Ok(FrameRGBA::solid(self.0, [v, v, v, 255]))
        }

        fn render_glyph_overlay(
            &self,
            _layout_text: &str,
            _index: usize,
            _glyph: char,
            _opacity: f32,
        ) -> EditMotionResult<FrameRGBA> {
            Ok(FrameRGBA::transparent(self.0))
        }
    }

    fn cfg() -> TaskConfig {
        TaskConfig {
            image_size: (8, 8),
            generate_videos: false,
            random_seed: Some(11),
            ..TaskConfig::default()
        }
    }

    fn assembler(cfg: TaskConfig) -> TaskAssembler {
        let canvas = cfg.canvas().unwrap();
        TaskAssembler::with_rasterizer(cfg, Box::new(Blank(canvas))).unwrap()
    }

    #[test]
    fn task_ids_are_zero_padded() {
        let a = assembler(cfg());
        assert_eq!(a.task_id(7), "edit_distance_0007");
        assert!(a.domain_dir().ends_with("edit_distance_task"));
    }

    #[test]
    fn generated_task_is_consistent() {
        let mut a = assembler(cfg());
        let task = a.generate_task("t").unwrap();
        assert_eq!(task.mix, classify(&task.alignment.ops));
        assert_eq!(task.alignment.ops.len(), task.alignment.distance);
        assert!(task.video.is_none());
        assert!(!task.prompt.is_empty());
        assert_eq!(task.first_image.width, 8);
    }

    #[test]
    fn seeded_assemblers_agree() {
        let mut a = assembler(cfg());
        let mut b = assembler(cfg());
        for _ in 0..3 {
            let ta = a.generate_task("x").unwrap();
            let tb = b.generate_task("x").unwrap();
            assert_eq!(ta.source, tb.source);
            assert_eq!(ta.target, tb.target);
            assert_eq!(ta.prompt, tb.prompt);
        }
    }

    #[test]
    fn mismatched_canvas_is_rejected() {
        let err = TaskAssembler::with_rasterizer(cfg(), Box::new(Blank(Canvas::new(4, 4).unwrap())))
            .err()
            .unwrap();
        assert!(matches!(err, EditMotionError::Validation(_)));
    }
}
