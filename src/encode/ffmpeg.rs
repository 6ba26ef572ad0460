use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use anyhow::Context as _;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{EditMotionError, EditMotionResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::FrameRGBA;

#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    pub out_path: PathBuf,
    pub overwrite: bool,
    /// Straight-alpha RGBA that translucent pixels are flattened onto.
    pub bg_rgba: [u8; 4],
    /// libx264 constant rate factor; lower is higher quality.
    pub crf: u8,
}

impl FfmpegSinkOpts {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [255, 255, 255, 255],
            crf: 18,
        }
    }
}

/// An `ffmpeg` child process between `begin` and `end`.
struct Encoder {
    child: Child,
    stdin: Option<ChildStdin>,
    stderr: JoinHandle<std::io::Result<Vec<u8>>>,
    cfg: SinkConfig,
    opaque: Vec<u8>,
    last_idx: Option<FrameIndex>,
}

impl Encoder {
    /// Stop a run that will never reach `end`, reaping the child and its stderr reader.
    fn abort(mut self) {
        drop(self.stdin.take());
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = self.stderr.join();
    }
}

/// H.264 MP4 sink that pipes opaque RGBA frames into the system `ffmpeg`.
///
/// Dropping the sink between `begin` and `end` kills the encoder; the output file is then
/// incomplete.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    encoder: Option<Encoder>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            encoder: None,
        }
    }

    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }

    fn spawn(&self, cfg: SinkConfig) -> EditMotionResult<Encoder> {
        let mut child = Command::new("ffmpeg")
            .args(ffmpeg_args(&cfg, &self.opts))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EditMotionError::encode(format!("spawn ffmpeg: {e}")))?;

        let stdin = child.stdin.take();
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| EditMotionError::encode("ffmpeg stderr was not captured"))?;
        // A full stderr pipe stalls ffmpeg; drain it concurrently.
        let stderr = std::thread::spawn(move || -> std::io::Result<Vec<u8>> {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf)?;
            Ok(buf)
        });

        Ok(Encoder {
            child,
            stdin,
            stderr,
            cfg,
            opaque: vec![0u8; cfg.width as usize * cfg.height as usize * 4],
            last_idx: None,
        })
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> EditMotionResult<()> {
        check_config(&cfg)?;
        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(EditMotionError::validation(format!(
                "'{}' exists and overwrite is off",
                self.opts.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(EditMotionError::encode("ffmpeg not found on PATH"));
        }

        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps.as_f64(),
            "starting ffmpeg"
        );
        self.encoder = Some(self.spawn(cfg)?);
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> EditMotionResult<()> {
        let enc = self
            .encoder
            .as_mut()
            .ok_or_else(|| EditMotionError::encode("push_frame before begin"))?;

        if enc.last_idx.is_some_and(|last| idx <= last) {
            return Err(EditMotionError::encode(format!(
                "frame {} arrived out of order",
                idx.0
            )));
        }
        if (frame.width, frame.height) != (enc.cfg.width, enc.cfg.height) {
            return Err(EditMotionError::validation(format!(
                "frame is {}x{}, video is {}x{}",
                frame.width, frame.height, enc.cfg.width, enc.cfg.height
            )));
        }
        frame.check_len()?;

        flatten_onto(&mut enc.opaque, &frame.data, self.opts.bg_rgba);
        let stdin = enc
            .stdin
            .as_mut()
            .ok_or_else(|| EditMotionError::encode("ffmpeg stdin already closed"))?;
        stdin
            .write_all(&enc.opaque)
            .map_err(|e| EditMotionError::encode(format!("write frame {} to ffmpeg: {e}", idx.0)))?;
        enc.last_idx = Some(idx);
        Ok(())
    }

    fn end(&mut self) -> EditMotionResult<()> {
        let mut enc = self
            .encoder
            .take()
            .ok_or_else(|| EditMotionError::encode("end before begin"))?;
        drop(enc.stdin.take());

        let status = enc
            .child
            .wait()
            .map_err(|e| EditMotionError::encode(format!("wait for ffmpeg: {e}")))?;
        let stderr = enc
            .stderr
            .join()
            .map_err(|_| EditMotionError::encode("ffmpeg stderr reader panicked"))?
            .unwrap_or_default();

        if !status.success() {
            return Err(EditMotionError::encode(format!(
                "ffmpeg failed ({status}): {}",
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        tracing::debug!(out = %self.opts.out_path.display(), "ffmpeg finished");
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if let Some(enc) = self.encoder.take() {
            tracing::debug!(
                out = %self.opts.out_path.display(),
                frames_written = enc.last_idx.map_or(0, |i| i.0 + 1),
                "ffmpeg sink dropped before end"
            );
            enc.abort();
        }
    }
}

fn check_config(cfg: &SinkConfig) -> EditMotionResult<()> {
    if cfg.fps.num == 0 || cfg.fps.den == 0 {
        return Err(EditMotionError::validation("fps must be non-zero"));
    }
    if cfg.width == 0 || cfg.height == 0 {
        return Err(EditMotionError::validation("video size must be non-zero"));
    }
    if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
        return Err(EditMotionError::validation(format!(
            "yuv420p needs even dimensions, got {}x{}",
            cfg.width, cfg.height
        )));
    }
    Ok(())
}

/// Command line for a rawvideo RGBA stdin stream encoded to H.264 MP4.
fn ffmpeg_args(cfg: &SinkConfig, opts: &FfmpegSinkOpts) -> Vec<String> {
    let mut args: Vec<String> = vec![
        (if opts.overwrite { "-y" } else { "-n" }).into(),
        "-loglevel".into(),
        "error".into(),
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        "rgba".into(),
        "-s".into(),
        format!("{}x{}", cfg.width, cfg.height),
        // input rate; must precede -i
        "-r".into(),
        format!("{}/{}", cfg.fps.num, cfg.fps.den),
        "-i".into(),
        "pipe:0".into(),
        "-an".into(),
        "-c:v".into(),
        "libx264".into(),
        "-crf".into(),
        opts.crf.to_string(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-movflags".into(),
        "+faststart".into(),
    ];
    args.push(opts.out_path.to_string_lossy().into_owned());
    args
}

/// Composite premultiplied `src` over an opaque `bg`, writing opaque RGBA to `dst`.
fn flatten_onto(dst: &mut [u8], src: &[u8], bg: [u8; 4]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let inv = 255 - u16::from(s[3]);
        for c in 0..3 {
            let v = u16::from(s[c]) + mul_div255_u16(u16::from(bg[c]), inv);
            d[c] = v.min(255) as u8;
        }
        d[3] = 255;
    }
}

pub fn ensure_parent_dir(path: &Path) -> EditMotionResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory '{}'", parent.display()))?;
    }
    Ok(())
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::{Canvas, Fps};

    fn cfg(width: u32, height: u32) -> SinkConfig {
        SinkConfig {
            width,
            height,
            fps: Fps::whole(10).unwrap(),
        }
    }

    #[test]
    fn odd_or_empty_sizes_are_rejected() {
        assert!(check_config(&cfg(0, 10)).is_err());
        assert!(check_config(&cfg(11, 10)).is_err());
        assert!(check_config(&cfg(512, 512)).is_ok());
    }

    #[test]
    fn transparent_pixels_become_background() {
        let mut dst = [0u8; 8];
        flatten_onto(&mut dst, &[0, 0, 0, 0, 1, 2, 3, 255], [10, 20, 30, 255]);
        assert_eq!(dst, [10, 20, 30, 255, 1, 2, 3, 255]);
    }

    #[test]
    fn half_covered_pixels_blend() {
        let mut dst = [0u8; 4];
        // premultiplied black at ~50% over white
        flatten_onto(&mut dst, &[0, 0, 0, 128], [255, 255, 255, 255]);
        assert_eq!(dst, [127, 127, 127, 255]);
    }

    #[test]
    fn args_carry_size_rate_and_output() {
        let mut opts = FfmpegSinkOpts::new("out/video.mp4");
        opts.crf = 23;
        let args = ffmpeg_args(
            &SinkConfig {
                width: 64,
                height: 32,
                fps: Fps::new(30000, 1001).unwrap(),
            },
            &opts,
        );
        assert_eq!(args[0], "-y");
        let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
        assert_eq!(args[pos("-s") + 1], "64x32");
        assert_eq!(args[pos("-r") + 1], "30000/1001");
        assert!(pos("-r") < pos("-i"));
        assert_eq!(args[pos("-crf") + 1], "23");
        assert_eq!(args.last().unwrap(), "out/video.mp4");
    }

    #[test]
    fn push_before_begin_is_an_error() {
        let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("target/never.mp4"));
        let frame = FrameRGBA::transparent(Canvas::new(2, 2).unwrap());
        assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
        assert!(sink.end().is_err());
    }

    #[test]
    fn dropping_after_a_failed_push_reaps_ffmpeg() {
        if !is_ffmpeg_on_path() {
            return;
        }
        let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("target/ffmpeg_sink/abandoned.mp4"));
        sink.begin(cfg(16, 16)).unwrap();
        let wrong = FrameRGBA::transparent(Canvas::new(8, 8).unwrap());
        assert!(sink.push_frame(FrameIndex(0), &wrong).is_err());

        let pid = sink.encoder.as_ref().unwrap().child.id();
        drop(sink);
        if cfg!(target_os = "linux") {
            // a waited-on child leaves no zombie entry behind
            assert!(!Path::new(&format!("/proc/{pid}")).exists());
        }
    }
}
