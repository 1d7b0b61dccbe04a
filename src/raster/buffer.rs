use crate::foundation::error::{LoaderError, LoaderResult};
use crate::foundation::math::mul_div255_u8;
use crate::raster::mask::GridMask;

/// An RGBA8 raster, tightly packed, row-major, straight alpha.
///
/// Effects never mutate a buffer they were handed; every frame is a fresh buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, `width * height * 4` long.
    pub data: Vec<u8>,
}

impl RasterBuffer {
    /// Wrap existing RGBA8 bytes, validating the length.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> LoaderResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| LoaderError::validation("raster size overflow"))?;
        if data.len() != expected {
            return Err(LoaderError::validation(format!(
                "raster data length {} does not match {}x{}x4",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A fully transparent raster.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; (width as usize) * (height as usize) * 4],
        }
    }

    /// A square, fully transparent raster.
    pub fn transparent_square(size: u32) -> Self {
        Self::transparent(size, size)
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, px: [u8; 4]) {
        let i = self.offset(x, y);
        self.data[i..i + 4].copy_from_slice(&px);
    }

    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        self.data[self.offset(x, y) + 3]
    }

    pub fn is_fully_transparent(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Colour-negated copy: RGB inverted, alpha preserved.
    pub fn negated(&self) -> Self {
        let mut out = self.clone();
        for px in out.data.chunks_exact_mut(4) {
            px[0] = 255 - px[0];
            px[1] = 255 - px[1];
            px[2] = 255 - px[2];
        }
        out
    }

    /// Copy a `size x size` block from `src` at `(sx, sy)` to `self` at `(dx, dy)`.
    ///
    /// Pixels with zero source alpha are skipped, so transparent source regions never punch
    /// holes into what is already drawn. Pixels falling outside either raster are ignored.
    pub fn copy_block(
        &mut self,
        src: &RasterBuffer,
        (sx, sy): (u32, u32),
        (dx, dy): (u32, u32),
        size: u32,
    ) {
        for cy in 0..size {
            let (py, qy) = (sy + cy, dy + cy);
            if py >= src.height || qy >= self.height {
                break;
            }
            for cx in 0..size {
                let (px, qx) = (sx + cx, dx + cx);
                if px >= src.width || qx >= self.width {
                    break;
                }
                let s = src.pixel(px, py);
                if s[3] == 0 {
                    continue;
                }
                self.put_pixel(qx, qy, s);
            }
        }
    }

    /// Draw the cells of `settled` selected by `mask`.
    ///
    /// Mask cell `(x, y)` maps to grid cell `(x + offset, y + offset)` of `settled`; cells landing
    /// outside the grid are dropped.
    pub fn from_masked_cells(
        settled: &RasterBuffer,
        mask: &GridMask,
        cell_size: u32,
        offset: i64,
    ) -> Self {
        let mut out = Self::transparent(settled.width, settled.height);
        let grid_w = i64::from(settled.width / cell_size.max(1));
        let grid_h = i64::from(settled.height / cell_size.max(1));
        for c in mask.iter_on() {
            let gx = c.x as i64 + offset;
            let gy = c.y as i64 + offset;
            if gx < 0 || gy < 0 || gx >= grid_w || gy >= grid_h {
                continue;
            }
            let sx = gx as u32 * cell_size;
            let sy = gy as u32 * cell_size;
            out.copy_block(settled, (sx, sy), (sx, sy), cell_size);
        }
        out
    }

    /// Composite `top` over `self` (straight alpha source-over).
    pub fn composite_under(&self, top: &RasterBuffer) -> LoaderResult<RasterBuffer> {
        if self.width != top.width || self.height != top.height {
            return Err(LoaderError::validation(format!(
                "composite size mismatch: {}x{} vs {}x{}",
                self.width, self.height, top.width, top.height
            )));
        }
        let mut out = self.clone();
        for (d, s) in out.data.chunks_exact_mut(4).zip(top.data.chunks_exact(4)) {
            let px = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
            d.copy_from_slice(&px);
        }
        Ok(out)
    }

    /// Convert into an `image` crate buffer (for PNG export).
    pub fn into_rgba_image(self) -> LoaderResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data)
            .ok_or_else(|| LoaderError::validation("raster data does not fit its dimensions"))
    }

    /// Wrap an `image` crate buffer.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

/// Straight-alpha source-over for one pixel.
pub fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let sa = u16::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 || dst[3] == 0 {
        return src;
    }

    let da = mul_div255_u8(u16::from(dst[3]), 255 - sa);
    let out_a = u16::from(src[3]) + u16::from(da);
    let mut out = [0u8; 4];
    for i in 0..3 {
        let num = u32::from(src[i]) * u32::from(sa) + u32::from(dst[i]) * u32::from(da);
        out[i] = ((num + u32::from(out_a) / 2) / u32::from(out_a)).min(255) as u8;
    }
    out[3] = out_a.min(255) as u8;
    out
}

#[cfg(test)]
#[path = "../../tests/unit/raster/buffer.rs"]
mod tests;
