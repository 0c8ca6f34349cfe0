//! Compositing engine: easing/animation math, layout, text measurement,
//! the media pipeline, the abstract drawing surface, the preload planner,
//! and the per-frame compositor that ties them together.
pub mod animation;
pub mod canvas;
pub mod compositor;
pub mod easing;
pub mod geometry;
pub mod media_pipeline;
pub mod preload;
pub mod text;

/// Named spans for the hot paths profiling tools key off of; kept distinct
/// from ad-hoc `#[instrument]` on individual functions so the span names
/// stay stable even as the functions around them get refactored.
pub mod tracing_spans {
    pub const RENDER_FRAME: &str = "engine.composition.render";
    pub const FRAME_CACHE_ACQUIRE: &str = "engine.frame_cache.acquire";
    pub const TIMELINE_GET_VALUE: &str = "engine.timeline.get_value";
    pub const TRANSITION_PROCESS: &str = "engine.transition.process";
}
