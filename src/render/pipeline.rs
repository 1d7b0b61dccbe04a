use std::path::{Path, PathBuf};

use image::RgbaImage;
use rayon::prelude::*;

use crate::assets::decode::SourceIcon;
use crate::config::LoaderConfig;
use crate::encode::frames::{FrameDirSink, Manifest};
use crate::encode::gif::{FfmpegGifSink, GifSinkOpts};
use crate::encode::sink::{FrameSink, SinkConfig, TeeSink};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{LoaderError, LoaderResult};
use crate::raster::buffer::RasterBuffer;
use crate::render::orchestrator::{FrameSynth, LoopKind};
use crate::style::render::StyleVariant;

#[derive(Clone, Debug)]
pub struct RenderThreading {
    pub parallel: bool,
    pub chunk_size: usize,
    pub threads: Option<usize>,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RenderStats {
    pub frames_total: u64,
    pub chunks: u64,
}

/// Sink configuration matching everything `synth` will push.
pub fn sink_config(synth: &FrameSynth) -> SinkConfig {
    let cfg = synth.config();
    SinkConfig {
        width: synth.output_size(),
        height: synth.output_size(),
        frame_count: synth.total_frames(),
        frame_ms: cfg.frame_ms,
        palette: cfg.palette,
    }
}

/// Manifest for a finished build of `synth`, derived from its phase plan.
pub fn manifest(synth: &FrameSynth) -> Manifest {
    Manifest::from_sink_config(&sink_config(synth))
}

/// Render `range` into memory.
pub fn render_frames(
    synth: &FrameSynth,
    range: FrameRange,
    threading: &RenderThreading,
) -> LoaderResult<Vec<RasterBuffer>> {
    let mut out = Vec::with_capacity(range.len_frames().min(4096) as usize);
    for_each_chunk(synth, range, threading, |_, frames| {
        out.extend(frames);
        Ok(())
    })?;
    Ok(out)
}

/// Render every frame of `synth` into `sink`, strictly in index order.
#[tracing::instrument(skip_all, fields(variant = synth.variant().name()))]
pub fn render_to_sink(
    synth: &FrameSynth,
    sink: &mut dyn FrameSink,
    threading: &RenderThreading,
) -> LoaderResult<RenderStats> {
    sink.begin(sink_config(synth))?;
    let range = FrameRange::with_len(0, synth.total_frames());
    let stats = for_each_chunk(synth, range, threading, |chunk, frames| {
        for (f, frame) in (chunk.start.0..chunk.end.0).zip(frames.iter()) {
            sink.push_frame(FrameIndex(f), frame)?;
        }
        Ok(())
    })?;
    sink.end()?;
    tracing::debug!(frames = stats.frames_total, chunks = stats.chunks, "render finished");
    Ok(stats)
}

fn for_each_chunk(
    synth: &FrameSynth,
    range: FrameRange,
    threading: &RenderThreading,
    mut consume: impl FnMut(FrameRange, Vec<RasterBuffer>) -> LoaderResult<()>,
) -> LoaderResult<RenderStats> {
    if range.end.0 > synth.total_frames() {
        return Err(LoaderError::validation(format!(
            "render range end {} exceeds total frames {}",
            range.end.0,
            synth.total_frames()
        )));
    }

    let pool = if threading.parallel {
        Some(build_thread_pool(threading.threads)?)
    } else {
        None
    };
    let chunk_size = normalized_chunk_size(threading.chunk_size);
    let mut stats = RenderStats::default();

    let mut chunk_start = range.start.0;
    while chunk_start < range.end.0 {
        let chunk_end = (chunk_start + chunk_size).min(range.end.0);
        let chunk = FrameRange::new(FrameIndex(chunk_start), FrameIndex(chunk_end))?;

        let frames = match pool.as_ref() {
            Some(pool) => pool.install(|| {
                (chunk.start.0..chunk.end.0)
                    .into_par_iter()
                    .map(|f| synth.render_frame(FrameIndex(f)))
                    .collect::<LoaderResult<Vec<_>>>()
            })?,
            None => (chunk.start.0..chunk.end.0)
                .map(|f| synth.render_frame(FrameIndex(f)))
                .collect::<LoaderResult<Vec<_>>>()?,
        };

        stats.frames_total += chunk.len_frames();
        stats.chunks += 1;
        consume(chunk, frames)?;
        chunk_start = chunk_end;
    }
    Ok(stats)
}

fn build_thread_pool(threads: Option<usize>) -> LoaderResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(LoaderError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| LoaderError::render(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

/// One output of the variant pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct VariantBuild {
    pub variant: StyleVariant,
    pub cell_size: u32,
    pub kind: LoopKind,
}

impl VariantBuild {
    /// File stem, e.g. `transition-border-dark-256`.
    pub fn stem(&self, grid_size: u32) -> String {
        let kind = match self.kind {
            LoopKind::Idle => "loader",
            LoopKind::Transition => "transition",
        };
        format!(
            "{kind}-{}-{}",
            self.variant.name(),
            u64::from(grid_size) * u64::from(self.cell_size)
        )
    }
}

/// Every (cell size × loop kind × style variant) combination for `cfg`, in build order.
pub fn variant_builds(cfg: &LoaderConfig) -> Vec<VariantBuild> {
    let mut out = Vec::new();
    for cell_size in cfg.all_cell_sizes() {
        for kind in [LoopKind::Idle, LoopKind::Transition] {
            for variant in StyleVariant::ALL {
                out.push(VariantBuild {
                    variant,
                    cell_size,
                    kind,
                });
            }
        }
    }
    out
}

/// Where and what the variant pipeline writes.
#[derive(Clone, Debug)]
pub struct OutputOpts {
    pub out_dir: PathBuf,
    pub write_gif: bool,
    pub write_frames: bool,
    pub threading: RenderThreading,
}

impl OutputOpts {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            write_gif: true,
            write_frames: true,
            threading: RenderThreading::default(),
        }
    }
}

/// Result of one variant build.
#[derive(Clone, Debug, serde::Serialize)]
pub struct VariantReport {
    pub build: VariantBuild,
    pub manifest: Manifest,
    pub gif: Option<PathBuf>,
    pub frames_dir: Option<PathBuf>,
    pub stats: RenderStats,
}

/// Build every variant of `image` into `opts.out_dir`.
///
/// Variants run one after another; frames within a variant may render in parallel.
#[tracing::instrument(skip_all, fields(out_dir = %opts.out_dir.display()))]
pub fn build_variants(
    cfg: &LoaderConfig,
    image: &RgbaImage,
    opts: &OutputOpts,
) -> LoaderResult<Vec<VariantReport>> {
    let cfg = cfg.normalized();
    let mut reports = Vec::new();
    for cell_size in cfg.all_cell_sizes() {
        let sized = cfg.with_cell_size(cell_size);
        let icon = SourceIcon::from_image(image, sized.grid_size, sized.cell_size)?;
        for build in variant_builds(&cfg)
            .into_iter()
            .filter(|b| b.cell_size == cell_size)
        {
            reports.push(build_one(&sized, &icon, build, opts)?);
        }
    }
    Ok(reports)
}

fn build_one(
    cfg: &LoaderConfig,
    icon: &SourceIcon,
    build: VariantBuild,
    opts: &OutputOpts,
) -> LoaderResult<VariantReport> {
    let synth = FrameSynth::new(cfg, icon, build.variant, build.kind)?;
    let stem = build.stem(cfg.grid_size);

    let mut tee = TeeSink::new();
    let gif = opts.write_gif.then(|| opts.out_dir.join(format!("{stem}.gif")));
    let frames_dir = opts
        .write_frames
        .then(|| opts.out_dir.join(format!("{stem}-frames")));
    if let Some(path) = gif.as_ref() {
        tee.push(Box::new(FfmpegGifSink::new(GifSinkOpts::new(path))));
    }
    if let Some(dir) = frames_dir.as_ref() {
        tee.push(Box::new(FrameDirSink::new(dir)));
    }

    let stats = if tee.is_empty() {
        // Nothing to write; still synthesize so failures surface.
        render_frames(
            &synth,
            FrameRange::with_len(0, synth.total_frames()),
            &opts.threading,
        )
        .map(|frames| RenderStats {
            frames_total: frames.len() as u64,
            chunks: 0,
        })?
    } else {
        render_to_sink(&synth, &mut tee, &opts.threading)?
    };

    let manifest = manifest(&synth);
    tracing::info!(
        build = %stem,
        frames = manifest.frames,
        gif = gif.is_some(),
        frames_dir = frames_dir.is_some(),
        "variant built"
    );
    Ok(VariantReport {
        build,
        manifest,
        gif,
        frames_dir,
        stats,
    })
}

/// Write one frame of `synth` as a PNG.
pub fn write_frame_png(synth: &FrameSynth, idx: FrameIndex, out: &Path) -> LoaderResult<()> {
    use anyhow::Context as _;

    if idx.0 >= synth.total_frames() {
        return Err(LoaderError::validation(format!(
            "frame {} is out of range (total {})",
            idx.0,
            synth.total_frames()
        )));
    }
    crate::encode::sink::ensure_parent_dir(out)?;
    let frame = synth.render_frame(idx)?;
    image::save_buffer_with_format(
        out,
        &frame.data,
        frame.width,
        frame.height,
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
