use crate::foundation::error::{LoaderError, LoaderResult};

/// Zero-based index of a frame in an animation.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame interval `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    pub start: FrameIndex,
    pub end: FrameIndex, // exclusive
}

impl FrameRange {
    pub fn new(start: FrameIndex, end: FrameIndex) -> LoaderResult<Self> {
        if start.0 > end.0 {
            return Err(LoaderError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Range starting at `start` spanning `len` frames.
    pub fn with_len(start: u64, len: u64) -> Self {
        Self {
            start: FrameIndex(start),
            end: FrameIndex(start.saturating_add(len)),
        }
    }

    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }

    /// Offset of `f` from the start of the range.
    pub fn local(self, f: FrameIndex) -> u64 {
        f.0.saturating_sub(self.start.0)
    }
}

/// Logical icon-pixel coordinate inside an `N x N` grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: usize,
    pub y: usize,
}

impl CellCoord {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}
