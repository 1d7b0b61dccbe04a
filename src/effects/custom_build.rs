//! Procedural "draw the icon" animation over a fixed 24x24 icon mask.
//!
//! A three-cell-thick diagonal stroke starts at the top-left corner, runs along the top edge,
//! turns down the right edge, back across the bottom and up the left edge while the centre bar
//! grows bottom-up in lockstep. Steps that change nothing visible inside the icon mask are
//! dropped. The mirrored clear sequence erases the icon in the same order, so
//! `clear ++ build` loops seamlessly.

use crate::raster::buffer::RasterBuffer;
use crate::raster::mask::GridMask;
use crate::style::render::mask_offset;

/// Logical resolution of the build animation.
pub const ICON_MASK_SIZE: usize = 24;

/// Minimum build sequence length; shorter sequences are padded with their last frame.
pub const DEFAULT_TARGET_LEN: usize = 73;

const EDGE_CAP: u32 = 0b0011_1111_1111_1111_1111_1100;
const EDGE_SHOULDER: u32 = 0b0111_1111_1111_1111_1111_1110;
const EDGE_FULL: u32 = 0b1111_1111_1111_1111_1111_1111;
const BODY: u32 = 0b1110_0001_1000_0000_0000_0111;

const ICON_ROWS: [u32; ICON_MASK_SIZE] = [
    EDGE_CAP,
    EDGE_SHOULDER,
    EDGE_FULL,
    BODY,
    BODY,
    BODY,
    BODY,
    BODY,
    BODY,
    BODY,
    BODY,
    BODY,
    BODY,
    BODY,
    BODY,
    BODY,
    BODY,
    BODY,
    BODY,
    BODY,
    BODY,
    EDGE_FULL,
    EDGE_SHOULDER,
    EDGE_CAP,
];

/// The loader icon: rounded square outline with a vertical stroke left of centre.
pub fn icon_mask() -> GridMask {
    GridMask::from_bit_rows(&ICON_ROWS, ICON_MASK_SIZE)
}

struct StrokeBuilder<'a> {
    visibility: &'a GridMask,
    grid: GridMask,
    frames: Vec<GridMask>,
}

impl<'a> StrokeBuilder<'a> {
    fn new(visibility: &'a GridMask) -> Self {
        Self {
            visibility,
            grid: GridMask::new(visibility.size()),
            frames: Vec::new(),
        }
    }

    fn set(&mut self, x: i64, y: i64) {
        self.grid.set_if_in_bounds(x, y, true);
    }

    /// Keep the current grid as a frame unless it looks identical to the previous one.
    fn commit(&mut self) {
        let changed = match self.frames.last() {
            Some(last) => last.differs_within(&self.grid, self.visibility),
            None => true,
        };
        if changed {
            self.frames.push(self.grid.clone());
        }
    }

    fn is_set(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && self.grid.get(x as usize, y as usize)
    }

    fn seed_top_left(&mut self, n: i64) {
        for k in 1..=n - 4 {
            self.set(k + 1, 0);
            self.set(k, 1);
            self.set(k - 1, 2);
            self.commit();
        }
    }

    fn close_top_right(&mut self, n: i64) {
        for x in [n - 2, n - 1] {
            self.set(x, 0);
            self.set(x - 1, 1);
            self.set(x - 2, 2);
            if x == n - 1 {
                self.set(x - 1, 2);
            }
            self.commit();
        }
    }

    fn right_edge_step(&mut self, n: i64, y: i64) {
        self.set(n - 1, y);
        self.set(n - 2, y - 1);
        self.set(n - 3, y - 2);
        self.commit();
    }

    fn descend_right_edge(&mut self, n: i64) {
        for y in 1..=3 {
            self.right_edge_step(n, y);
        }
        for y in 0..n {
            self.right_edge_step(n, y);
        }
    }

    fn cross_bottom_edge(&mut self, n: i64) {
        let mut start_x = n - 1;
        for x in (0..n).rev() {
            if !self.is_set(x, n - 1) {
                break;
            }
            start_x = x - 1;
        }

        for x in (0..=start_x).rev() {
            self.set(x, n - 1);
            self.set(x + 1, n - 2);
            self.set(x + 2, n - 3);
            if x == start_x - 1 {
                // inner bottom-right corner
                self.set(x - 1, n - 1);
                self.set(x, n - 2);
            }
            self.commit();
        }
    }

    fn climb_left_edge(&mut self, n: i64) {
        let bar = CenterBar::find(self.visibility);

        for y in (0..n).rev() {
            self.set(0, y);
            self.set(1, y + 1);
            self.set(2, y + 2);
            if y == n - 3 {
                // inner bottom-left corner
                self.set(0, y - 1);
                self.set(1, y);
            }

            if let Some(bar) = bar.as_ref() {
                if let Some(bottom) = bar.bottom_row
                    && y == bottom + 1
                {
                    self.set(bar.first, bottom);
                }
                for (i, col) in bar.columns().enumerate() {
                    let row = y + i as i64;
                    if row < n && self.visibility.get(col as usize, row as usize) {
                        self.set(col, row);
                    }
                }
            }

            self.commit();
        }
    }

    fn fill_remaining(&mut self) {
        let visibility = self.visibility;
        for c in visibility.iter_on() {
            if self.grid.get(c.x, c.y) {
                continue;
            }
            self.grid.set(c.x, c.y, true);
            self.commit();
        }
    }
}

/// Centre stroke columns plus the lowest row where that stroke is a separate run.
struct CenterBar {
    first: i64,
    last: i64,
    bottom_row: Option<i64>,
}

impl CenterBar {
    fn find(mask: &GridMask) -> Option<Self> {
        let segment = mask.center_segment()?;
        let bottom_row = (0..mask.size()).rev().find(|&y| {
            let segments = mask.row_segments(y);
            segments.len() >= 3 && segments[segments.len() / 2].contains(segment.start)
        });
        Some(Self {
            first: segment.start as i64,
            last: segment.end as i64,
            bottom_row: bottom_row.map(|y| y as i64),
        })
    }

    fn columns(&self) -> impl Iterator<Item = i64> {
        self.first..=self.last
    }
}

/// Deduplicated build frames, before padding.
pub fn distinct_build_frames(visibility: &GridMask) -> Vec<GridMask> {
    let n = visibility.size() as i64;
    let mut b = StrokeBuilder::new(visibility);
    b.seed_top_left(n);
    b.close_top_right(n);
    b.descend_right_edge(n);
    b.cross_bottom_edge(n);
    b.climb_left_edge(n);
    b.fill_remaining();
    b.frames
}

/// Build frames padded with the final frame up to `target_len`.
pub fn build_frames(visibility: &GridMask, target_len: usize) -> Vec<GridMask> {
    let mut frames = distinct_build_frames(visibility);
    if let Some(last) = frames.last().cloned() {
        frames.resize(frames.len().max(target_len), last);
    }
    frames
}

/// Mirror of `build`: a cell is on where the build frame has not drawn it yet.
pub fn clear_frames(build: &[GridMask], visibility: &GridMask) -> Vec<GridMask> {
    build
        .iter()
        .map(|frame| {
            let mut cleared = GridMask::new(visibility.size());
            for c in visibility.iter_on() {
                if !frame.get(c.x, c.y) {
                    cleared.set(c.x, c.y, true);
                }
            }
            cleared
        })
        .collect()
}

/// The full clear-then-build loop.
pub fn loop_frames(visibility: &GridMask, target_len: usize) -> Vec<GridMask> {
    let build = build_frames(visibility, target_len);
    let mut out = clear_frames(&build, visibility);
    out.extend(build);
    out
}

/// Repeat each of the first `slow_count` frames `multiplier` times.
pub fn expand_slow(frames: Vec<GridMask>, slow_count: usize, multiplier: u32) -> Vec<GridMask> {
    if multiplier <= 1 || slow_count == 0 {
        return frames;
    }
    let cutoff = slow_count.min(frames.len());
    let mut out = Vec::with_capacity(frames.len() + cutoff * (multiplier as usize - 1));
    for (i, frame) in frames.into_iter().enumerate() {
        let repeat = if i < cutoff { multiplier as usize } else { 1 };
        out.extend(std::iter::repeat_n(frame, repeat));
    }
    out
}

/// Expand one build frame to pixels: settled cells under "on" mask cells, mask centred in grid.
pub fn render_custom_frame(
    settled: &RasterBuffer,
    frame: &GridMask,
    grid_size: u32,
    cell_size: u32,
) -> RasterBuffer {
    let offset = mask_offset(grid_size, frame.size());
    RasterBuffer::from_masked_cells(settled, frame, cell_size, offset)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/custom_build.rs"]
mod tests;
