use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pixel_loader::assets::decode::{describe_file, load_icon_image};
use pixel_loader::config::output_edge;
use pixel_loader::encode::gif::is_ffmpeg_on_path;
use pixel_loader::render::pipeline::write_frame_png;
use pixel_loader::{
    BuildQueue, FrameIndex, FrameSynth, LoaderConfig, LoopKind, OutputOpts, RenderThreading, SourceIcon,
    StrategyKind, StyleVariant, build_variants,
};

#[derive(Parser, Debug)]
#[command(name = "pixel-loader", version)]
struct Cli {
    /// Debug-level logging (`RUST_LOG` overrides).
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build every style variant: GIFs (needs `ffmpeg`) and PNG frame directories.
    Build(BuildArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Print the phase plan as JSON.
    Plan(PlanArgs),
    /// Print size and dimensions of asset files.
    Stats(StatsArgs),
}

/// Config file plus per-field overrides.
#[derive(Args, Debug, Default)]
struct ConfigArgs {
    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid size in cells.
    #[arg(long)]
    grid: Option<u32>,

    /// Pixels per cell.
    #[arg(long)]
    cell: Option<u32>,

    /// Idle loop length in frames.
    #[arg(long)]
    frames: Option<u32>,

    /// Frame duration in milliseconds.
    #[arg(long)]
    ms: Option<u32>,

    /// GIF palette size (0 disables palette reduction).
    #[arg(long)]
    palette: Option<u32>,

    /// Break transition steps.
    #[arg(long)]
    transition: Option<u32>,

    /// Angular clear frames.
    #[arg(long)]
    clear: Option<u32>,

    /// Angular rebuild frames.
    #[arg(long)]
    rebuild: Option<u32>,

    /// Fraction of the rebuild before the bar starts filling.
    #[arg(long)]
    bar_delay: Option<f64>,

    /// Slow-motion multiplier.
    #[arg(long)]
    speed: Option<u32>,

    /// `sweep` or `custom-build`.
    #[arg(long, value_parser = parse_strategy)]
    strategy: Option<StrategyKind>,
}

impl ConfigArgs {
    fn resolve(&self) -> anyhow::Result<LoaderConfig> {
        let mut cfg = match &self.config {
            Some(path) => LoaderConfig::from_path(path)?,
            None => LoaderConfig::default(),
        };
        if let Some(v) = self.grid {
            cfg.grid_size = v;
        }
        if let Some(v) = self.cell {
            cfg.cell_size = v;
        }
        if let Some(v) = self.frames {
            cfg.frame_count = v;
        }
        if let Some(v) = self.ms {
            cfg.frame_ms = v;
        }
        if let Some(v) = self.palette {
            cfg.palette = (v > 0).then_some(v);
        }
        if let Some(v) = self.transition {
            cfg.transition_frames = v;
        }
        if let Some(v) = self.clear {
            cfg.clear_frames = v;
        }
        if let Some(v) = self.rebuild {
            cfg.rebuild_frames = v;
        }
        if let Some(v) = self.bar_delay {
            cfg.bar_reveal_delay = v;
        }
        if let Some(v) = self.speed {
            cfg.speed = v;
        }
        if let Some(v) = self.strategy {
            cfg.strategy = v;
        }
        Ok(cfg.normalized())
    }
}

fn parse_strategy(s: &str) -> Result<StrategyKind, String> {
    StrategyKind::parse(s).map_err(|e| e.to_string())
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Input icon (PNG or SVG).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,

    /// Additional cell sizes to build.
    #[arg(long = "also-cell", value_delimiter = ',')]
    also_cell: Vec<u32>,

    /// Fail instead of skipping GIFs when `ffmpeg` is missing.
    #[arg(long, default_value_t = false)]
    require_ffmpeg: bool,

    /// Skip GIF output entirely.
    #[arg(long, default_value_t = false)]
    no_gif: bool,

    /// Skip the PNG frame directories.
    #[arg(long, default_value_t = false)]
    no_frames: bool,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Render chunk size (parallel mode only).
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args, Debug)]
struct FrameArgs {
    /// Input icon (PNG or SVG).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Style variant, e.g. `solid-light` or `border-dark`.
    #[arg(long, default_value = "solid-light")]
    variant: String,

    /// Render from the idle loop instead of the transition.
    #[arg(long, default_value_t = false)]
    idle: bool,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Plan the idle loop instead of the transition.
    #[arg(long, default_value_t = false)]
    idle: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// Files to describe.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Build(args) => cmd_build(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Stats(args) => cmd_stats(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_build(args: BuildArgs) -> anyhow::Result<()> {
    let mut cfg = args.config.resolve()?;
    cfg.cell_sizes.extend(args.also_cell.iter().copied());
    let cfg = cfg.normalized();

    let max_px = cfg
        .all_cell_sizes()
        .into_iter()
        .map(|c| output_edge(cfg.grid_size, c))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .max()
        .unwrap_or(1);
    let image = load_icon_image(&args.in_path, max_px)?;

    let ffmpeg = !args.no_gif && is_ffmpeg_on_path();
    if !args.no_gif && !ffmpeg && !args.require_ffmpeg {
        tracing::warn!("ffmpeg not found on PATH; skipping GIF output");
    }
    let opts = OutputOpts {
        out_dir: args.out_dir.clone(),
        write_gif: !args.no_gif && (ffmpeg || args.require_ffmpeg),
        write_frames: !args.no_frames,
        threading: RenderThreading {
            parallel: args.parallel,
            chunk_size: args.chunk_size,
            threads: args.threads,
        },
    };

    // One queued job per cell size; every job writes into the same output tree.
    let queue = BuildQueue::new()?;
    let mut handles = Vec::new();
    for cell_size in cfg.all_cell_sizes() {
        let sized = LoaderConfig {
            cell_sizes: Vec::new(),
            ..cfg.with_cell_size(cell_size)
        };
        let image = image.clone();
        let opts = opts.clone();
        let handle = queue.submit(move || build_variants(&sized, &image, &opts))?;
        handles.push((cell_size, handle));
    }

    let mut reports = Vec::new();
    let mut first_err = None;
    for (cell_size, handle) in handles {
        match handle.wait() {
            Ok(built) => reports.extend(built),
            Err(e) => {
                tracing::error!(cell_size, error = %e, "cell size build failed");
                first_err.get_or_insert(e);
            }
        }
    }
    queue.shutdown()?;
    if let Some(e) = first_err {
        return Err(anyhow::Error::new(e))
            .with_context(|| format!("build variants into '{}'", args.out_dir.display()));
    }
    for report in &reports {
        if let Some(gif) = &report.gif {
            println!("{}", describe_file(gif));
        }
    }
    eprintln!(
        "built {} variants into {}",
        reports.len(),
        args.out_dir.display()
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = args.config.resolve()?;
    let variant = StyleVariant::parse(&args.variant)?;
    let icon = SourceIcon::load(&args.in_path, cfg.grid_size, cfg.cell_size)?;
    let kind = if args.idle {
        LoopKind::Idle
    } else {
        LoopKind::Transition
    };
    let synth = FrameSynth::new(&cfg, &icon, variant, kind)?;
    write_frame_png(&synth, FrameIndex(args.frame), &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let cfg = args.config.resolve()?;
    // Plans depend only on the config, so a blank icon is enough.
    let out_size = cfg.output_size()?;
    let icon = SourceIcon {
        grid: pixel_loader::RasterBuffer::transparent_square(cfg.grid_size),
        original: pixel_loader::RasterBuffer::transparent_square(out_size),
    };
    let kind = if args.idle {
        LoopKind::Idle
    } else {
        LoopKind::Transition
    };
    let synth = FrameSynth::new(&cfg, &icon, StyleVariant::SOLID_LIGHT, kind)?;
    let json =
        serde_json::to_string_pretty(synth.plan()).context("serialize phase plan to json")?;
    println!("{json}");
    Ok(())
}

fn cmd_stats(args: StatsArgs) -> anyhow::Result<()> {
    for path in &args.files {
        println!("{}", describe_file(path));
    }
    Ok(())
}
