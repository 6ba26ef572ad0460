use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "editmotion", version)]
struct Cli {
    /// Log at DEBUG instead of INFO.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the minimum edit sequence between two strings as JSON.
    Align(AlignArgs),
    /// Render the edit animation between two strings to MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Generate a dataset of edit-distance tasks.
    Generate(GenerateArgs),
}

#[derive(Parser, Debug)]
struct AlignArgs {
    #[arg(long)]
    from: String,

    #[arg(long)]
    to: String,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[arg(long)]
    from: String,

    #[arg(long)]
    to: String,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 10)]
    fps: u32,

    /// Hold frames before the first and after the last edit.
    #[arg(long, default_value_t = 1)]
    hold: u32,

    /// Interpolated frames per edit.
    #[arg(long, default_value_t = 6)]
    transition: u32,

    /// Canvas size as `WIDTHxHEIGHT`.
    #[arg(long, value_parser = parse_size, default_value = "512x512")]
    size: (u32, u32),

    /// Extra directory of .ttf/.otf fonts.
    #[arg(long)]
    font_dir: Option<PathBuf>,

    /// Also write the last frame as a PNG.
    #[arg(long)]
    final_png: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Task config JSON; defaults apply to missing fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides `output_dir`.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Overrides `num_samples`.
    #[arg(long)]
    count: Option<usize>,

    /// Overrides `random_seed`.
    #[arg(long)]
    seed: Option<u64>,

    /// Skip MP4 generation.
    #[arg(long)]
    no_video: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Align(args) => cmd_align(args),
        Command::Render(args) => cmd_render(args),
        Command::Generate(args) => cmd_generate(args),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("bad width '{w}': {e}"))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("bad height '{h}': {e}"))?;
    if w == 0 || h == 0 {
        return Err("width and height must be > 0".to_string());
    }
    Ok((w, h))
}

#[derive(serde::Serialize)]
struct AlignOutput<'a> {
    source: &'a str,
    target: &'a str,
    distance: usize,
    mix: editmotion::OpMix,
    ops: &'a [editmotion::EditOp],
}

fn cmd_align(args: AlignArgs) -> anyhow::Result<()> {
    let alignment = editmotion::align_str(&args.from, &args.to);
    let out = AlignOutput {
        source: &args.from,
        target: &args.to,
        distance: alignment.distance,
        mix: editmotion::classify(&alignment.ops),
        ops: &alignment.ops,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&out).context("serialize alignment")?
    );
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let canvas = editmotion::Canvas::new(args.size.0, args.size.1)?;
    let style = editmotion::TextStyle::default();
    let bg = style.background_rgb.to_rgba();
    let rasterizer =
        editmotion::SvgTextRasterizer::with_font_dir(canvas, style, args.font_dir.as_deref())?;
    if rasterizer.font_face_count() == 0 {
        tracing::warn!("no fonts found; frames will contain no text");
    }

    let alignment = editmotion::align_str(&args.from, &args.to);
    let timing = editmotion::FrameTiming {
        hold_frames: args.hold,
        transition_frames: args.transition,
        ..editmotion::FrameTiming::default()
    };
    let (frames, stats) = editmotion::synthesize_with_stats(
        &args.from,
        &args.to,
        &alignment.ops,
        &timing,
        &rasterizer,
    )?;
    tracing::info!(
        distance = alignment.distance,
        frames = stats.frames_total,
        rendered = stats.frames_rendered,
        "animation synthesized"
    );

    if let Some(png) = &args.final_png {
        let last = frames.last().context("animation has no frames")?;
        editmotion::write_png(&last.image, png)?;
        eprintln!("wrote {}", png.display());
    }

    let mut sink = editmotion::FfmpegSink::new(editmotion::FfmpegSinkOpts {
        bg_rgba: bg,
        ..editmotion::FfmpegSinkOpts::new(args.out.clone())
    });
    editmotion::encode_frames(&frames, &mut sink, editmotion::Fps::whole(args.fps)?)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<editmotion::TaskConfig> {
    match path {
        Some(p) => Ok(editmotion::TaskConfig::from_json_file(p)?),
        None => Ok(editmotion::TaskConfig::default()),
    }
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(out) = args.out {
        cfg.output_dir = out;
    }
    if let Some(count) = args.count {
        cfg.num_samples = count;
    }
    if let Some(seed) = args.seed {
        cfg.random_seed = Some(seed);
    }
    if args.no_video {
        cfg.generate_videos = false;
    }

    let mut assembler = editmotion::TaskAssembler::new(cfg)?;
    let dirs = assembler.generate_dataset()?;

    eprintln!(
        "wrote {} tasks to {}",
        dirs.len(),
        assembler.domain_dir().display()
    );
    Ok(())
}
