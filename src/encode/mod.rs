//! Encoding sinks.
//!
//! Sinks consume synthesized frames in index order and are driven by
//! [`render_to_sink`](crate::render::pipeline::render_to_sink).

/// PNG frame directories plus `manifest.json`.
pub mod frames;
/// Looping GIF output via system `ffmpeg`.
pub mod gif;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
