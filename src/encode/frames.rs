use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::sink::{FrameSink, OrderGuard, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{LoaderError, LoaderResult};
use crate::raster::buffer::RasterBuffer;

pub const MANIFEST_FILE: &str = "manifest.json";

/// Playback description written next to exported frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Manifest {
    pub frames: u64,
    pub ms: u32,
    pub width: u32,
    pub height: u32,
}

impl Manifest {
    pub fn from_sink_config(cfg: &SinkConfig) -> Self {
        Self {
            frames: cfg.frame_count,
            ms: cfg.frame_ms,
            width: cfg.width,
            height: cfg.height,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> LoaderResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read manifest '{}'", path.display()))?;
        serde_json::from_slice(&bytes).map_err(|e| LoaderError::serde(e.to_string()))
    }

    pub fn write(&self, path: impl AsRef<Path>) -> LoaderResult<()> {
        let path = path.as_ref();
        let json =
            serde_json::to_string_pretty(self).map_err(|e| LoaderError::serde(e.to_string()))?;
        std::fs::write(path, json)
            .with_context(|| format!("write manifest '{}'", path.display()))?;
        Ok(())
    }
}

/// `frame-007.png` style name for frame `idx`.
pub fn frame_file_name(idx: FrameIndex) -> String {
    format!("frame-{:03}.png", idx.0)
}

/// Sink writing one PNG per frame into a freshly recreated directory, plus `manifest.json`.
pub struct FrameDirSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    order: OrderGuard,
}

impl FrameDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            order: OrderGuard::default(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FrameSink for FrameDirSink {
    fn begin(&mut self, cfg: SinkConfig) -> LoaderResult<()> {
        cfg.validate()?;
        if self.dir.exists() {
            std::fs::remove_dir_all(&self.dir).with_context(|| {
                format!("failed to clear frame directory '{}'", self.dir.display())
            })?;
        }
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create frame directory '{}'", self.dir.display())
        })?;
        self.cfg = Some(cfg);
        self.order.reset();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &RasterBuffer) -> LoaderResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| LoaderError::encode("frame directory sink not started"))?;
        cfg.check_frame(frame)?;
        self.order.accept(idx)?;

        let path = self.dir.join(frame_file_name(idx));
        image::save_buffer_with_format(
            &path,
            &frame.data,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write frame '{}'", path.display()))?;
        Ok(())
    }

    fn end(&mut self) -> LoaderResult<()> {
        let cfg = self
            .cfg
            .take()
            .ok_or_else(|| LoaderError::encode("frame directory sink not started"))?;
        if self.order.pushed() != cfg.frame_count {
            return Err(LoaderError::encode(format!(
                "frame directory received {} frames, expected {}",
                self.order.pushed(),
                cfg.frame_count
            )));
        }
        Manifest::from_sink_config(&cfg).write(self.dir.join(MANIFEST_FILE))?;
        tracing::info!(
            dir = %self.dir.display(),
            frames = cfg.frame_count,
            "wrote frame directory"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/frames.rs"]
mod tests;
