//! Encoding: frame sinks (ffmpeg MP4, in-memory) and PNG stills.

pub mod ffmpeg;
pub mod png;
pub mod sink;

pub use ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use png::write_png;
pub use sink::{FrameSink, InMemorySink, SinkConfig, encode_frames};
