use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "simreel", version)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite every frame and assemble the MP4 (requires `ffmpeg` on PATH).
    Render(RunArgs),
    /// Composite every frame into the frames directory; no video.
    Frames(RunArgs),
    /// Composite a single frame index.
    Frame(FrameArgs),
    /// Write the default configuration as JSON.
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Configuration JSON. Defaults apply to every field it omits.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input/output root; overrides the configured `root`.
    #[arg(long)]
    root: Option<PathBuf>,

    /// Composite frames on a worker pool.
    #[arg(long)]
    parallel: bool,

    /// Worker count for `--parallel`.
    #[arg(long)]
    threads: Option<usize>,

    /// Draw text as solid glyph blocks instead of loading the font (layout preview).
    #[arg(long)]
    block_text: bool,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    run: RunArgs,

    /// Frame index (0-based).
    #[arg(long)]
    index: u64,

    /// Output image path (`.jpg` or `.png`).
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct InitConfigArgs {
    /// Where to write the configuration.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frames(args) => cmd_frames(args),
        Command::Frame(args) => cmd_frame(args),
        Command::InitConfig(args) => cmd_init_config(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &RunArgs) -> anyhow::Result<simreel::ReelConfig> {
    let mut cfg = match &args.config {
        Some(path) => {
            let mut cfg = simreel::ReelConfig::load(path)?;
            // A relative root in a config file is relative to that file.
            if cfg.root.is_relative() {
                let base = path.parent().unwrap_or_else(|| Path::new("."));
                cfg.root = base.join(&cfg.root);
            }
            cfg
        }
        None => simreel::ReelConfig::default(),
    };
    if let Some(root) = &args.root {
        cfg.root = root.clone();
    }
    if args.parallel {
        cfg.threading.parallel = true;
    }
    if args.threads.is_some() {
        cfg.threading.threads = args.threads;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn with_renderer<T>(
    cfg: &simreel::ReelConfig,
    block_text: bool,
    f: impl FnOnce(&simreel::RendererFactory<'_>) -> simreel::ReelResult<T>,
) -> anyhow::Result<T> {
    if block_text {
        Ok(f(&simreel::block_renderer_factory())?)
    } else {
        Ok(f(&simreel::font_renderer_factory(cfg)?)?)
    }
}

fn report_skipped(report: &simreel::RunReport) {
    if !report.skipped.is_empty() {
        eprintln!(
            "skipped {} frame index(es) missing from at least one category",
            report.skipped.len()
        );
    }
}

fn cmd_render(args: RunArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args)?;
    let report = with_renderer(&cfg, args.block_text, |make| {
        simreel::run_with_renderer(&cfg, make)
    })?;
    report_skipped(&report);
    if let Some(video) = &report.video {
        eprintln!("wrote {} ({} frames)", video.display(), report.video_frames);
    }
    Ok(())
}

fn cmd_frames(args: RunArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args)?;
    let report = with_renderer(&cfg, args.block_text, |make| {
        simreel::composite_frames(&cfg, make)
    })?;
    report_skipped(&report);
    eprintln!(
        "wrote {} frames to {}",
        report.frames.len(),
        cfg.frames_dir().display()
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.run)?;
    let out = with_renderer(&cfg, args.run.block_text, |make| {
        simreel::composite_single_frame(&cfg, simreel::FrameIndex(args.index), &args.out, make)
    })?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_init_config(args: InitConfigArgs) -> anyhow::Result<()> {
    let json = simreel::ReelConfig::default().to_json_pretty()?;
    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, json)
        .with_context(|| format!("write config '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
