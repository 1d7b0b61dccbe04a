use crate::foundation::math::hash01;
use crate::raster::buffer::RasterBuffer;

/// Jitter amplitude in cells at progress 0.
const JITTER_CELLS: f64 = 1.4;

/// Break-apart frame: cells of `settled` fly into place as `progress` goes 0 -> 1.
///
/// A cell is drawn once `progress >= hash01(x, y)`, displaced by hash-driven jitter that
/// shrinks linearly to zero. At progress 1 the output equals `settled`; at progress 0 it is
/// empty.
pub fn build_break_frame(
    settled: &RasterBuffer,
    grid_size: u32,
    cell_size: u32,
    progress: f64,
) -> RasterBuffer {
    let progress = progress.clamp(0.0, 1.0);
    let out_size = grid_size * cell_size;
    let mut out = RasterBuffer::transparent_square(out_size);
    let jitter_scale = (1.0 - progress) * f64::from(cell_size) * JITTER_CELLS;
    let max_dest = i64::from(out_size.saturating_sub(cell_size));

    for y in 0..i64::from(grid_size) {
        for x in 0..i64::from(grid_size) {
            if progress < hash01(x, y) {
                continue;
            }

            let jitter_x = ((hash01(x + 17, y + 29) * 2.0 - 1.0) * jitter_scale).round() as i64;
            let jitter_y = ((hash01(x + 41, y + 11) * 2.0 - 1.0) * jitter_scale).round() as i64;

            let src_x = x * i64::from(cell_size);
            let src_y = y * i64::from(cell_size);
            let dest_x = (src_x + jitter_x).clamp(0, max_dest);
            let dest_y = (src_y + jitter_y).clamp(0, max_dest);

            out.copy_block(
                settled,
                (src_x as u32, src_y as u32),
                (dest_x as u32, dest_y as u32),
                cell_size,
            );
        }
    }
    out
}

/// Dissolve progress for the `local`-th Break frame.
///
/// Each dissolve step is held for `speed` frames; `steps` is the unscaled transition length.
pub fn break_progress(local: u64, speed: u32, steps: u32) -> f64 {
    let base = local / u64::from(speed.max(1));
    let denom = steps.max(1).saturating_sub(1).max(1);
    (base as f64 / f64::from(denom)).min(1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/dissolve.rs"]
mod tests;
