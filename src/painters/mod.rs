//! Element painters (spec §4.4): one pure-ish routine per element kind,
//! bound to the abstract `Canvas`. Failure of a single painter is caught by
//! the compositor's element loop and turned into a skip, never a fatal
//! error.
pub mod caption;
pub mod image;
pub mod shape;
pub mod svg;
pub mod text;
pub mod video;
pub mod waveform;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::engine::canvas::Canvas;
use crate::engine::media_pipeline::VideoFrameExtractor;
use crate::error::PainterError;
use crate::painters::waveform::AudioSampleProvider;
use crate::timeline::{Element, ElementKind};

/// Everything a painter needs beyond the element itself: the surface, the
/// canvas size, resolved asset paths, and the per-video extractor/decode
/// caches that must persist across frames.
pub struct PaintContext<'a> {
    pub canvas: &'a mut Canvas,
    pub canvas_w: f64,
    pub canvas_h: f64,
    pub asset_paths: &'a HashMap<String, PathBuf>,
    pub extractors: &'a mut HashMap<String, VideoFrameExtractor>,
    pub image_cache: &'a mut HashMap<String, Arc<image::RgbaImage>>,
    pub svg_cache: &'a mut HashMap<String, Arc<image::RgbaImage>>,
    pub fps: f64,
    pub audio: &'a dyn AudioSampleProvider,
}

/// Offsets/progress resolved by the animation engine before the painter
/// runs: keyframe overrides already substituted for the element's static
/// `offsetX`/`offsetY` where present (spec §4.5 step f).
pub struct ResolvedAttrs {
    pub offset_x: f64,
    pub offset_y: f64,
    /// `Some(progress)` only when the active preset animation is
    /// `typewriter`; drives truncated reveal in the text/caption painters.
    pub typewriter_progress: Option<f64>,
}

pub fn paint_element(
    ctx: &mut PaintContext,
    element: &Element,
    resolved: &ResolvedAttrs,
    t_local: f64,
) -> Result<(), PainterError> {
    match &element.kind {
        ElementKind::Text(attrs) => text::paint_text(ctx, element, attrs, resolved),
        ElementKind::Caption(attrs) => caption::paint_caption(ctx, element, attrs, resolved, t_local),
        ElementKind::Image { .. } => image::paint_image(ctx, element, resolved),
        ElementKind::Video { .. } => video::paint_video(ctx, element, resolved, t_local),
        ElementKind::Shape { .. } => shape::paint_shape(ctx, element, resolved),
        ElementKind::Svg { .. } => svg::paint_svg(ctx, element, resolved),
        ElementKind::Waveform { .. } => waveform::paint_waveform(ctx, element, resolved, t_local),
    }
}
