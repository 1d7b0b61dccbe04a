use std::path::Path;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{LoaderError, LoaderResult};
use crate::raster::buffer::RasterBuffer;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Exact number of frames that will be pushed.
    pub frame_count: u64,
    /// Per-frame duration in milliseconds.
    pub frame_ms: u32,
    /// Palette size limit; `None` leaves colour handling to the encoder.
    pub palette: Option<u32>,
}

impl SinkConfig {
    pub fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    pub(crate) fn validate(&self) -> LoaderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(LoaderError::validation("sink width/height must be non-zero"));
        }
        if self.frame_ms == 0 {
            return Err(LoaderError::validation("frame duration must be non-zero"));
        }
        Ok(())
    }

    /// Check one pushed frame against this config.
    pub(crate) fn check_frame(&self, frame: &RasterBuffer) -> LoaderResult<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(LoaderError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        if frame.data.len() != self.frame_bytes() {
            return Err(LoaderError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }
        Ok(())
    }
}

/// Sink contract for consuming synthesized frames.
///
/// Ordering contract: `push_frame` is called with strictly increasing, contiguous indices
/// starting at 0.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> LoaderResult<()>;
    /// Push one frame in strictly increasing index order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &RasterBuffer) -> LoaderResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> LoaderResult<()>;
}

/// Tracks the ordering contract for sink implementations.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct OrderGuard {
    next: u64,
}

impl OrderGuard {
    pub(crate) fn reset(&mut self) {
        self.next = 0;
    }

    pub(crate) fn accept(&mut self, idx: FrameIndex) -> LoaderResult<()> {
        if idx.0 != self.next {
            return Err(LoaderError::encode(format!(
                "sink received frame {} but expected frame {}",
                idx.0, self.next
            )));
        }
        self.next += 1;
        Ok(())
    }

    pub(crate) fn pushed(&self) -> u64 {
        self.next
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    order: OrderGuard,
    ended: bool,
    /// Frames in index order.
    frames: Vec<(FrameIndex, RasterBuffer)>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, RasterBuffer)] {
        &self.frames
    }

    /// Whether `end` has been called since the last `begin`.
    pub fn is_finished(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> LoaderResult<()> {
        cfg.validate()?;
        self.cfg = Some(cfg);
        self.order.reset();
        self.ended = false;
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &RasterBuffer) -> LoaderResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| LoaderError::encode("in-memory sink not started"))?;
        cfg.check_frame(frame)?;
        self.order.accept(idx)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> LoaderResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Forwards every call to each inner sink, in order. Stops at the first error.
#[derive(Default)]
pub struct TeeSink {
    sinks: Vec<Box<dyn FrameSink>>,
}

impl TeeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Box<dyn FrameSink>) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl FrameSink for TeeSink {
    fn begin(&mut self, cfg: SinkConfig) -> LoaderResult<()> {
        for sink in &mut self.sinks {
            sink.begin(cfg.clone())?;
        }
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &RasterBuffer) -> LoaderResult<()> {
        for sink in &mut self.sinks {
            sink.push_frame(idx, frame)?;
        }
        Ok(())
    }

    fn end(&mut self) -> LoaderResult<()> {
        for sink in &mut self.sinks {
            sink.end()?;
        }
        Ok(())
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> LoaderResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
