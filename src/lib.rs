//! Pixel-loader synthesizes looping "loading icon" animations from a single static icon.
//!
//! The source icon is pixelated onto a square cell grid and animated through a fixed phase
//! vocabulary: a hold on the original, a hash-jittered break into cells, then either an angular
//! clear/rebuild sweep or a stroke-grown custom build, and finally an idle loop. Everything is
//! deterministic, so the same config and icon always produce byte-identical frames.
//!
//! - Decode an icon into a [`SourceIcon`]
//! - Create a [`FrameSynth`] per style variant
//! - Render single frames or stream the whole loop into a [`FrameSink`]
#![forbid(unsafe_code)]

/// Icon decoding and contain-resizing.
pub mod assets;
pub mod config;
/// Per-cell animation effects.
pub mod effects;
/// Frame sinks: GIF via `ffmpeg`, PNG frame directories, in-memory.
pub mod encode;
pub mod foundation;
pub mod plan;
pub mod queue;
/// Pixel buffers and cell masks.
pub mod raster;
/// Frame synthesis and the variant pipeline.
pub mod render;
pub mod style;

pub use crate::assets::decode::SourceIcon;
pub use crate::config::{LoaderConfig, StrategyKind};
pub use crate::encode::frames::{FrameDirSink, Manifest};
pub use crate::encode::gif::{FfmpegGifSink, GifSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::foundation::core::{FrameIndex, FrameRange};
pub use crate::foundation::error::{LoaderError, LoaderResult};
pub use crate::plan::phases::{Phase, PhaseKind, PhasePlan};
pub use crate::queue::BuildQueue;
pub use crate::raster::buffer::RasterBuffer;
pub use crate::raster::mask::GridMask;
pub use crate::render::orchestrator::{FrameSynth, LoopKind};
pub use crate::render::pipeline::{
    OutputOpts, RenderStats, RenderThreading, VariantReport, build_variants, render_to_sink,
};
pub use crate::style::render::StyleVariant;
