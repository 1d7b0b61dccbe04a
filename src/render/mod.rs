/// Per-frame phase dispatch.
pub mod orchestrator;
/// Range rendering, sinks and the variant pipeline.
pub mod pipeline;
