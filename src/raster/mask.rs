use smallvec::SmallVec;

use crate::foundation::core::CellCoord;
use crate::foundation::error::{LoaderError, LoaderResult};
use crate::raster::buffer::RasterBuffer;

/// A contiguous run of "on" cells within one mask row (`start..=end`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn contains(self, x: usize) -> bool {
        self.start <= x && x <= self.end
    }
}

/// Runs found in one row. Icon rows rarely have more than a handful.
pub type Segments = SmallVec<[Segment; 4]>;

/// Square boolean matrix of logical icon cells.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GridMask {
    size: usize,
    cells: Vec<bool>,
}

impl GridMask {
    /// An all-off `size x size` mask.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![false; size * size],
        }
    }

    /// Build a mask from rows of bits, most significant of the low `size` bits first.
    pub fn from_bit_rows(rows: &[u32], size: usize) -> Self {
        let mut mask = Self::new(size);
        for (y, row) in rows.iter().enumerate().take(size) {
            for x in 0..size {
                let bit = size - 1 - x;
                if (row >> bit) & 1 == 1 {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    /// Derive a mask from alpha: a cell is on when its pixel has non-zero alpha.
    ///
    /// `raster` must already be resized to exactly one pixel per cell.
    pub fn from_alpha(raster: &RasterBuffer) -> LoaderResult<Self> {
        Self::from_alpha_at_least(raster, 1)
    }

    /// Like [`GridMask::from_alpha`], with cells on only at `alpha >= min_alpha`.
    pub fn from_alpha_at_least(raster: &RasterBuffer, min_alpha: u8) -> LoaderResult<Self> {
        if !raster.is_square() {
            return Err(LoaderError::validation(format!(
                "mask source must be square, got {}x{}",
                raster.width, raster.height
            )));
        }
        let size = raster.width as usize;
        let mut mask = Self::new(size);
        for y in 0..size {
            for x in 0..size {
                if raster.alpha(x as u32, y as u32) >= min_alpha {
                    mask.set(x, y, true);
                }
            }
        }
        Ok(mask)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Cell state; out-of-bounds cells read as off.
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size && self.cells[y * self.size + x]
    }

    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        if x < self.size && y < self.size {
            self.cells[y * self.size + x] = on;
        }
    }

    /// Signed-coordinate write; anything outside the grid is a no-op.
    pub fn set_if_in_bounds(&mut self, x: i64, y: i64, on: bool) {
        if x < 0 || y < 0 {
            return;
        }
        self.set(x as usize, y as usize, on);
    }

    pub fn count_on(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    pub fn iter_on(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .map(|(i, _)| CellCoord::new(i % self.size, i / self.size))
    }

    /// Contiguous on-runs of row `y`, left to right.
    pub fn row_segments(&self, y: usize) -> Segments {
        let mut out = Segments::new();
        let mut start = None;
        for x in 0..self.size {
            match (self.get(x, y), start) {
                (true, None) => start = Some(x),
                (false, Some(s)) => {
                    out.push(Segment { start: s, end: x - 1 });
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            out.push(Segment {
                start: s,
                end: self.size - 1,
            });
        }
        out
    }

    /// Middle run of the first row (top-down) that has at least three runs.
    pub fn center_segment(&self) -> Option<Segment> {
        (0..self.size).find_map(|y| {
            let segments = self.row_segments(y);
            (segments.len() >= 3).then(|| segments[segments.len() / 2])
        })
    }

    /// `true` when `self` and `other` disagree on any cell `visibility` marks on.
    ///
    /// Cells outside `visibility` are ignored.
    pub fn differs_within(&self, other: &GridMask, visibility: &GridMask) -> bool {
        visibility
            .iter_on()
            .any(|c| self.get(c.x, c.y) != other.get(c.x, c.y))
    }

    /// Cell-wise AND.
    pub fn intersect(&self, other: &GridMask) -> GridMask {
        let mut out = GridMask::new(self.size);
        for c in self.iter_on() {
            if other.get(c.x, c.y) {
                out.set(c.x, c.y, true);
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/mask.rs"]
mod tests;
