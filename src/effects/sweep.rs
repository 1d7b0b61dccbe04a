use std::f64::consts::{FRAC_PI_4, TAU};

use kurbo::Point;
use smallvec::SmallVec;

use crate::config::MAX_BAR_DELAY;
use crate::raster::buffer::RasterBuffer;
use crate::raster::mask::GridMask;

/// Bearing of angular fraction 0: the top-left diagonal (-135 degrees, y pointing down).
pub const SWEEP_START_ANGLE: f64 = -3.0 * FRAC_PI_4;

/// Angular travel per frame is `SWEEP_CELLS_PER_FRAME / grid_size` of a full turn.
const SWEEP_CELLS_PER_FRAME: f64 = 3.0;

// atan2 of the exact start diagonal can land an ulp short of the start bearing.
const START_SNAP: f64 = 1e-9;

/// Per-cell clockwise angular position around the grid centre, normalized to `[0, 1)`.
#[derive(Clone, Debug, PartialEq)]
pub struct AngleField {
    size: usize,
    values: Vec<f64>,
}

impl AngleField {
    pub fn new(grid_size: usize) -> Self {
        let half = grid_size as f64 / 2.0;
        let center = Point::new(half, half);
        let mut values = Vec::with_capacity(grid_size * grid_size);
        for y in 0..grid_size {
            for x in 0..grid_size {
                let cell = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                values.push(angular_fraction(cell, center));
            }
        }
        Self {
            size: grid_size,
            values,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.values[y * self.size + x]
    }
}

fn angular_fraction(cell: Point, center: Point) -> f64 {
    let v = cell - center;
    let angle = v.y.atan2(v.x);
    let fraction = (angle - SWEEP_START_ANGLE + TAU).rem_euclid(TAU) / TAU;
    if fraction >= 1.0 - START_SNAP {
        0.0
    } else {
        fraction
    }
}

/// The icon's central vertical stroke: 1..=3 adjacent columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BarColumns {
    cols: SmallVec<[usize; 3]>,
}

impl BarColumns {
    /// Single-column fallback at the horizontal midpoint.
    pub fn midpoint(grid_size: usize) -> Self {
        let mut cols = SmallVec::new();
        cols.push(grid_size / 2);
        Self { cols }
    }

    /// Pick the column of the central third band with the most on-cells in the middle row third.
    ///
    /// Falls back to [`BarColumns::midpoint`] when no row of the mask has three or more runs or
    /// the band is empty.
    pub fn detect(mask: &GridMask) -> Self {
        let n = mask.size();
        let has_three_runs = (0..n).any(|y| mask.row_segments(y).len() >= 3);
        if !has_three_runs {
            return Self::midpoint(n);
        }

        let band = n / 3..(2 * n).div_ceil(3);
        let counts: Vec<usize> = (0..n)
            .map(|x| band.clone().filter(|&y| mask.get(x, y)).count())
            .collect();
        let center_dist = |x: usize| (2 * x + 1).abs_diff(n);

        let Some(best) = band
            .clone()
            .max_by(|&a, &b| {
                counts[a]
                    .cmp(&counts[b])
                    .then_with(|| center_dist(b).cmp(&center_dist(a)))
            })
            .filter(|&x| counts[x] > 0)
        else {
            return Self::midpoint(n);
        };

        let target = counts[best];
        let mut cols: SmallVec<[usize; 3]> = SmallVec::new();
        cols.push(best);
        let (mut lo, mut hi) = (best, best);
        while cols.len() < 3 {
            if lo > band.start && counts[lo - 1] == target {
                lo -= 1;
                cols.insert(0, lo);
            } else if hi + 1 < band.end && counts[hi + 1] == target {
                hi += 1;
                cols.push(hi);
            } else {
                break;
            }
        }
        Self { cols }
    }

    pub fn contains(&self, x: usize) -> bool {
        self.cols.contains(&x)
    }

    pub fn columns(&self) -> &[usize] {
        &self.cols
    }
}

/// Which way the sweep runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SweepDirection {
    /// Cells disappear clockwise from the start bearing.
    Clear,
    /// Cells reappear clockwise from the start bearing.
    Rebuild,
}

/// Radial wipe over a grid mask, with the bar column(s) animated on their own schedule.
#[derive(Clone, Debug)]
pub struct AngularSweep {
    field: AngleField,
    bar: BarColumns,
    mask: GridMask,
    bar_delay: f64,
}

impl AngularSweep {
    pub fn new(mask: GridMask, bar_delay: f64) -> Self {
        Self {
            field: AngleField::new(mask.size()),
            bar: BarColumns::detect(&mask),
            mask,
            bar_delay: bar_delay.clamp(0.0, MAX_BAR_DELAY),
        }
    }

    pub fn field(&self) -> &AngleField {
        &self.field
    }

    pub fn bar(&self) -> &BarColumns {
        &self.bar
    }

    pub fn mask(&self) -> &GridMask {
        &self.mask
    }

    /// Bar fill fraction while rebuilding: 0 until the delay, then linear to 1.
    pub fn rebuild_bar_progress(&self, progress: f64) -> f64 {
        ((progress - self.bar_delay) / (1.0 - self.bar_delay)).clamp(0.0, 1.0)
    }

    pub fn is_visible(&self, dir: SweepDirection, x: usize, y: usize, progress: f64) -> bool {
        if !self.mask.get(x, y) {
            return false;
        }
        if self.bar.contains(x) {
            // Clear retracts the bar along the reverse of its rebuild schedule.
            let p = match dir {
                SweepDirection::Rebuild => progress,
                SweepDirection::Clear => 1.0 - progress,
            };
            return bar_row_visible(y, self.mask.size(), self.rebuild_bar_progress(p));
        }
        let angle = self.field.get(x, y);
        match dir {
            SweepDirection::Clear => angle >= progress,
            SweepDirection::Rebuild => angle <= progress,
        }
    }

    /// Visible cells at `progress`.
    pub fn frame_mask(&self, dir: SweepDirection, progress: f64) -> GridMask {
        let mut out = GridMask::new(self.mask.size());
        for c in self.mask.iter_on() {
            if self.is_visible(dir, c.x, c.y, progress) {
                out.set(c.x, c.y, true);
            }
        }
        out
    }

    /// Draw the visible cells of `settled`.
    pub fn render(
        &self,
        settled: &RasterBuffer,
        cell_size: u32,
        dir: SweepDirection,
        progress: f64,
    ) -> RasterBuffer {
        RasterBuffer::from_masked_cells(settled, &self.frame_mask(dir, progress), cell_size, 0)
    }
}

/// Bottom-up fill: row `y` is lit once `bar_progress` has climbed to it.
fn bar_row_visible(y: usize, grid_size: usize, bar_progress: f64) -> bool {
    if bar_progress <= 0.0 {
        return false;
    }
    let last = grid_size.saturating_sub(1);
    let lit = (bar_progress * last as f64).floor() as usize;
    y >= last.saturating_sub(lit)
}

/// Sweep progress for the `local`-th frame of a Clear or Rebuild phase.
///
/// Travels a full turn in `grid_size / 3` frames regardless of the phase length, then clamps.
pub fn sweep_progress(local: u64, grid_size: u32) -> f64 {
    ((local + 1) as f64 * (SWEEP_CELLS_PER_FRAME / f64::from(grid_size.max(1)))).min(1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/sweep.rs"]
mod tests;
