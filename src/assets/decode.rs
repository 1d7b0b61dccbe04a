use std::path::Path;

use anyhow::Context;
use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::config::output_edge;
use crate::foundation::error::{LoaderError, LoaderResult};
use crate::raster::buffer::RasterBuffer;

/// Decoded input icon at the two resolutions the synthesizer needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceIcon {
    /// One pixel per cell (`grid_size` square), nearest-neighbour resized.
    pub grid: RasterBuffer,
    /// Full output resolution (`grid_size * cell_size` square), shown during the hold.
    pub original: RasterBuffer,
}

impl SourceIcon {
    /// Load a raster image or `.svg` file.
    #[tracing::instrument(skip(path))]
    pub fn load(path: impl AsRef<Path>, grid_size: u32, cell_size: u32) -> LoaderResult<Self> {
        let img = load_icon_image(path, output_edge(grid_size.max(1), cell_size.max(1))?)?;
        Self::from_image(&img, grid_size, cell_size)
    }

    /// Resize an already-decoded image, letterboxing onto transparent padding.
    pub fn from_image(img: &RgbaImage, grid_size: u32, cell_size: u32) -> LoaderResult<Self> {
        let grid_size = grid_size.max(1);
        let out_size = output_edge(grid_size, cell_size.max(1))?;
        let grid = contain_resize(img, grid_size, FilterType::Nearest)?;
        let original = contain_resize(img, out_size, FilterType::Lanczos3)?;
        Ok(Self {
            grid: RasterBuffer::from_rgba_image(grid),
            original: RasterBuffer::from_rgba_image(original),
        })
    }
}

/// Read an icon file; `.svg` files are rasterized into an `svg_size` square.
pub fn load_icon_image(path: impl AsRef<Path>, svg_size: u32) -> LoaderResult<RgbaImage> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).with_context(|| format!("read icon '{}'", path.display()))?;
    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if is_svg {
        rasterize_svg(&bytes, svg_size.max(1))
    } else {
        decode_image(&bytes)
    }
}

pub fn decode_image(bytes: &[u8]) -> LoaderResult<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(dyn_img.to_rgba8())
}

/// Rasterize an SVG into a `size` square, aspect-preserving and centred.
pub fn rasterize_svg(bytes: &[u8], size: u32) -> LoaderResult<RgbaImage> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;

    let svg_size = tree.size();
    let (w, h) = (svg_size.width(), svg_size.height());
    if !w.is_finite() || !h.is_finite() || w <= 0.0 || h <= 0.0 {
        return Err(LoaderError::validation("svg has invalid width/height"));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(size, size)
        .ok_or_else(|| LoaderError::validation("failed to allocate svg pixmap"))?;
    let scale = (size as f32 / w).min(size as f32 / h);
    let tx = (size as f32 - w * scale) / 2.0;
    let ty = (size as f32 - h * scale) / 2.0;
    let xform = resvg::tiny_skia::Transform::from_scale(scale, scale).post_translate(tx, ty);
    resvg::render(&tree, xform, &mut pixmap.as_mut());

    // tiny-skia stores premultiplied pixels.
    let mut data = Vec::with_capacity(pixmap.pixels().len() * 4);
    for px in pixmap.pixels() {
        let c = px.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(size, size, data)
        .ok_or_else(|| LoaderError::render("svg pixmap has unexpected size"))
}

/// Fit `img` inside a `size` square, keeping its aspect ratio and centring it on transparency.
pub fn contain_resize(img: &RgbaImage, size: u32, filter: FilterType) -> LoaderResult<RgbaImage> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(LoaderError::validation("icon image is empty"));
    }
    if size == 0 {
        return Err(LoaderError::validation("resize target must be non-zero"));
    }

    let scale = (f64::from(size) / f64::from(w)).min(f64::from(size) / f64::from(h));
    let nw = ((f64::from(w) * scale).round() as u32).clamp(1, size);
    let nh = ((f64::from(h) * scale).round() as u32).clamp(1, size);
    let resized = if (nw, nh) == (w, h) {
        img.clone()
    } else {
        imageops::resize(img, nw, nh, filter)
    };

    let mut canvas = RgbaImage::new(size, size);
    let left = i64::from((size - nw) / 2);
    let top = i64::from((size - nh) / 2);
    imageops::replace(&mut canvas, &resized, left, top);
    Ok(canvas)
}

/// Human-readable size: bytes below 1 KiB, then KB with one decimal, then MB with two.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let kb = bytes as f64 / 1024.0;
    if kb < 1024.0 {
        return format!("{kb:.1} KB");
    }
    format!("{:.2} MB", kb / 1024.0)
}

/// One-line summary of an asset file: `path: WxH, N bytes (size)`, or `path: missing`.
pub fn describe_file(path: &Path) -> String {
    let Ok(meta) = std::fs::metadata(path) else {
        return format!("{}: missing", path.display());
    };
    let dims = match image::image_dimensions(path) {
        Ok((w, h)) if w > 0 && h > 0 => format!("{w}x{h}"),
        _ => "unknown".to_string(),
    };
    format!(
        "{}: {dims}, {} bytes ({})",
        path.display(),
        meta.len(),
        format_bytes(meta.len())
    )
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
