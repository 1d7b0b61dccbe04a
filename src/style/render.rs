use crate::foundation::error::{LoaderError, LoaderResult};
use crate::raster::buffer::RasterBuffer;
use crate::raster::mask::GridMask;

/// Source alpha at or above which an icon pixel becomes a filled cell.
pub const ALPHA_THRESHOLD: u8 = 128;

/// How the outermost ring of each cell block is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CellStyle {
    /// Full-alpha block.
    Solid,
    /// Block ring gets alpha 0, carving a grid line between neighbouring cells.
    Bordered,
}

/// Fill colour theme. `Light` draws black cells (for light backgrounds).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn is_inverted(self) -> bool {
        matches!(self, Theme::Dark)
    }

    fn fill(self) -> u8 {
        if self.is_inverted() { 255 } else { 0 }
    }
}

/// One of the four settled appearances.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StyleVariant {
    pub cell: CellStyle,
    pub theme: Theme,
}

impl StyleVariant {
    pub const SOLID_LIGHT: Self = Self::new(CellStyle::Solid, Theme::Light);
    pub const SOLID_DARK: Self = Self::new(CellStyle::Solid, Theme::Dark);
    pub const BORDER_LIGHT: Self = Self::new(CellStyle::Bordered, Theme::Light);
    pub const BORDER_DARK: Self = Self::new(CellStyle::Bordered, Theme::Dark);

    /// Build order used by the variant pipeline.
    pub const ALL: [Self; 4] = [
        Self::BORDER_LIGHT,
        Self::BORDER_DARK,
        Self::SOLID_LIGHT,
        Self::SOLID_DARK,
    ];

    pub const fn new(cell: CellStyle, theme: Theme) -> Self {
        Self { cell, theme }
    }

    /// Stable directory/file stem, e.g. `border-dark`.
    pub fn name(self) -> &'static str {
        match (self.cell, self.theme) {
            (CellStyle::Solid, Theme::Light) => "solid-light",
            (CellStyle::Solid, Theme::Dark) => "solid-dark",
            (CellStyle::Bordered, Theme::Light) => "border-light",
            (CellStyle::Bordered, Theme::Dark) => "border-dark",
        }
    }

    pub fn parse(name: &str) -> LoaderResult<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|v| v.name() == name)
            .ok_or_else(|| LoaderError::validation(format!("unknown style variant '{name}'")))
    }
}

/// Render `base` (one pixel per cell) into a `grid_size * cell_size` square raster.
///
/// Every source pixel with alpha >= [`ALPHA_THRESHOLD`] becomes a flat black or white
/// `cell_size` block; everything else stays transparent.
pub fn render_style(
    base: &RasterBuffer,
    grid_size: u32,
    cell_size: u32,
    variant: StyleVariant,
) -> LoaderResult<RasterBuffer> {
    if base.width != grid_size || base.height != grid_size {
        return Err(LoaderError::validation(format!(
            "style source must be {grid_size}x{grid_size}, got {}x{}",
            base.width, base.height
        )));
    }

    let mut out = RasterBuffer::transparent_square(grid_size * cell_size);
    for y in 0..grid_size {
        for x in 0..grid_size {
            if base.alpha(x, y) < ALPHA_THRESHOLD {
                continue;
            }
            fill_cell(&mut out, x, y, cell_size, variant);
        }
    }
    Ok(out)
}

/// Render a settled variant straight from a mask, centred in the grid.
pub fn render_mask_style(
    mask: &GridMask,
    grid_size: u32,
    cell_size: u32,
    variant: StyleVariant,
) -> RasterBuffer {
    let mut out = RasterBuffer::transparent_square(grid_size * cell_size);
    let offset = mask_offset(grid_size, mask.size());
    for c in mask.iter_on() {
        let gx = c.x as i64 + offset;
        let gy = c.y as i64 + offset;
        if gx < 0 || gy < 0 || gx >= i64::from(grid_size) || gy >= i64::from(grid_size) {
            continue;
        }
        fill_cell(&mut out, gx as u32, gy as u32, cell_size, variant);
    }
    out
}

/// Offset that centres a `mask_size` mask in a `grid_size` grid (may be negative).
pub fn mask_offset(grid_size: u32, mask_size: usize) -> i64 {
    (i64::from(grid_size) - mask_size as i64).div_euclid(2)
}

fn fill_cell(out: &mut RasterBuffer, gx: u32, gy: u32, cell_size: u32, variant: StyleVariant) {
    let v = variant.theme.fill();
    for cy in 0..cell_size {
        for cx in 0..cell_size {
            let on_ring = cx == 0 || cy == 0 || cx == cell_size - 1 || cy == cell_size - 1;
            // Suppressed ring pixels stay all-zero so alpha-skipping copies reproduce them.
            if on_ring && variant.cell == CellStyle::Bordered {
                continue;
            }
            out.put_pixel(gx * cell_size + cx, gy * cell_size + cy, [v, v, v, 255]);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/render.rs"]
mod tests;
