/// Stroke-grown build/clear animation over the fixed icon mask.
pub mod custom_build;
/// Hash-jittered break-apart effect.
pub mod dissolve;
/// Radial clear/rebuild wipe.
pub mod sweep;
