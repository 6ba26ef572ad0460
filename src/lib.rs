#![forbid(unsafe_code)]

pub mod animation;
pub mod edit;
pub mod encode;
pub mod foundation;
pub mod render;
pub mod task;

pub use animation::{
    Ease, FramePlan, FrameTiming, SynthStats, Transition, TransitionKind, plan_frames, synthesize,
    synthesize_with_stats,
};
pub use edit::{
    Alignment, EditOp, OpKind, OpMix, Replay, ReplayStep, align, align_str, apply_ops, classify,
    verify_alignment,
};
pub use encode::{
    FfmpegSink, FfmpegSinkOpts, FrameSink, InMemorySink, SinkConfig, encode_frames,
    is_ffmpeg_on_path, write_png,
};
pub use foundation::core::{Canvas, Fps, FrameIndex, Rgb8};
pub use foundation::error::{EditMotionError, EditMotionResult};
pub use render::{AnimationFrame, FrameKind, FrameRGBA, Rasterizer, SvgTextRasterizer, TextStyle};
pub use task::{
    EditsRecord, PairSampler, StringPair, TaskAssembler, TaskConfig, TaskPair, pick_prompt,
};
