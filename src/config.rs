use std::path::Path;

use anyhow::Context as _;

use crate::effects::custom_build::DEFAULT_TARGET_LEN;
use crate::foundation::error::{LoaderError, LoaderResult};

/// Largest bar delay that still leaves a nonzero bar window.
pub const MAX_BAR_DELAY: f64 = 1.0 - f64::EPSILON;

/// Output edge length in pixels for `grid_size` cells of `cell_size` pixels.
pub fn output_edge(grid_size: u32, cell_size: u32) -> LoaderResult<u32> {
    grid_size.checked_mul(cell_size).ok_or_else(|| {
        LoaderError::validation(format!(
            "output size {grid_size} cells x {cell_size} px overflows"
        ))
    })
}

/// What happens between the break and the idle loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Angular clear followed by angular rebuild.
    #[default]
    Sweep,
    /// Hold on the broken frame, then the stroke-grown clear/build loop.
    CustomBuild,
}

impl StrategyKind {
    pub fn parse(s: &str) -> LoaderResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sweep" | "angular" => Ok(Self::Sweep),
            "custom-build" | "custom" | "build" => Ok(Self::CustomBuild),
            other => Err(LoaderError::validation(format!(
                "unknown strategy '{other}'"
            ))),
        }
    }
}

/// Loader build configuration.
///
/// Deserialized leniently (every field has a default); call [`LoaderConfig::normalized`] before
/// handing it to the synthesis core.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Logical icon resolution (cells per side).
    pub grid_size: u32,
    /// Output pixels per cell side.
    pub cell_size: u32,
    /// Extra cell sizes for the variant pipeline (`cell_size` is always built).
    pub cell_sizes: Vec<u32>,
    /// Idle loop length in frames.
    pub frame_count: u32,
    /// Per-frame duration in milliseconds.
    pub frame_ms: u32,
    /// Palette size limit for GIF encoding; `None` or 0 disables palette reduction.
    pub palette: Option<u32>,
    /// Break (dissolve) steps before the speed multiplier.
    pub transition_frames: u32,
    /// Angular clear phase length.
    pub clear_frames: u32,
    /// Angular rebuild phase length.
    pub rebuild_frames: u32,
    /// Fraction of the rebuild sweep before the bar starts filling, in `[0, 1)`.
    pub bar_reveal_delay: f64,
    /// Slow-motion multiplier for hold, overlap and break.
    pub speed: u32,
    pub strategy: StrategyKind,
    /// Frames the fully-settled break frame is held before the custom build.
    pub transition_hold_frames: u32,
    /// Leading custom-build frames repeated `speed` times.
    pub slow_loading_frames: u32,
    /// Minimum custom-build sequence length (padded with the last frame).
    pub custom_target_len: u32,
    /// Draw custom-build settled variants from the embedded icon mask.
    pub use_icon_mask: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            grid_size: 32,
            cell_size: 8,
            cell_sizes: Vec::new(),
            frame_count: 16,
            frame_ms: 40,
            palette: Some(32),
            transition_frames: 10,
            clear_frames: 8,
            rebuild_frames: 12,
            bar_reveal_delay: 0.55,
            speed: 1,
            strategy: StrategyKind::Sweep,
            transition_hold_frames: 22,
            slow_loading_frames: 0,
            custom_target_len: DEFAULT_TARGET_LEN as u32,
            use_icon_mask: true,
        }
    }
}

impl LoaderConfig {
    /// Load a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> LoaderResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_slice(&bytes)
    }

    pub fn from_json_slice(bytes: &[u8]) -> LoaderResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| LoaderError::serde(e.to_string()))
    }

    /// Clamp every field into its valid range. Never fails: an animation is always producible.
    pub fn normalized(&self) -> Self {
        let delay = if self.bar_reveal_delay.is_finite() {
            self.bar_reveal_delay.clamp(0.0, MAX_BAR_DELAY)
        } else {
            Self::default().bar_reveal_delay
        };
        let cell_size = self.cell_size.max(1);
        let mut cell_sizes: Vec<u32> = self.cell_sizes.iter().map(|&c| c.max(1)).collect();
        cell_sizes.retain(|&c| c != cell_size);
        cell_sizes.sort_unstable();
        cell_sizes.dedup();

        Self {
            grid_size: self.grid_size.max(1),
            cell_size,
            cell_sizes,
            frame_count: self.frame_count.max(1),
            frame_ms: self.frame_ms.max(1),
            palette: self.palette.filter(|&p| p > 0).map(|p| p.clamp(2, 256)),
            transition_frames: self.transition_frames.max(1),
            clear_frames: self.clear_frames.max(1),
            rebuild_frames: self.rebuild_frames.max(1),
            bar_reveal_delay: delay,
            speed: self.speed.max(1),
            strategy: self.strategy,
            transition_hold_frames: self.transition_hold_frames,
            slow_loading_frames: self.slow_loading_frames,
            custom_target_len: self.custom_target_len,
            use_icon_mask: self.use_icon_mask,
        }
    }

    /// Output edge length in pixels for `cell_size`.
    pub fn output_size(&self) -> LoaderResult<u32> {
        output_edge(self.grid_size, self.cell_size)
    }

    /// Every cell size the variant pipeline builds, primary first.
    pub fn all_cell_sizes(&self) -> Vec<u32> {
        let mut out = vec![self.cell_size];
        out.extend(self.cell_sizes.iter().copied().filter(|&c| c != self.cell_size));
        out
    }

    /// Same config at another cell size.
    pub fn with_cell_size(&self, cell_size: u32) -> Self {
        Self {
            cell_size: cell_size.max(1),
            ..self.clone()
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
