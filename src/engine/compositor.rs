//! The per-frame orchestrator (spec §4.5): scene lookup, background fill,
//! element visibility gating, transform/opacity stacking, post-effect
//! application, final pixel extraction.
use std::collections::HashMap;

use tracing::instrument;

use crate::engine::animation::{compute_element_animation, compute_keyframe_state, compute_scene_transition};
use crate::engine::canvas::Canvas;
use crate::engine::preload::PreloadedIndex;
use crate::error::CompositorError;
use crate::painters::waveform::{AudioSampleProvider, SilentAudioSampleProvider};
use crate::painters::{paint_element, PaintContext, ResolvedAttrs};
use crate::timeline::{BlendMode, Element, Scene, TimelineConfig, TrackType};

/// The deterministic `(frame_index, timeline_config) -> RGBA` mapping.
/// Owns one reusable `Canvas` for its entire lifetime; `render_frame` is
/// not safe to call concurrently on the same instance (spec §5).
pub struct Compositor {
    timeline: TimelineConfig,
    fps: f64,
    canvas: Canvas,
    preload: PreloadedIndex,
    image_cache: HashMap<String, std::sync::Arc<image::RgbaImage>>,
    svg_cache: HashMap<String, std::sync::Arc<image::RgbaImage>>,
    audio: Box<dyn AudioSampleProvider>,
    /// Per-scene element z-order, precomputed once and reused every frame
    /// (track_idx, scene_idx) -> sorted element indices.
    element_order: HashMap<(usize, usize), Vec<usize>>,
}

impl Compositor {
    pub fn new(timeline: TimelineConfig, fps: f64, preload: PreloadedIndex) -> Self {
        let mut element_order = HashMap::new();
        for (ti, track) in timeline.tracks.iter().enumerate() {
            for (si, scene) in track.scenes.iter().enumerate() {
                element_order.insert((ti, si), scene.z_ordered_element_indices());
            }
        }
        let canvas = Canvas::new(timeline.width, timeline.height);
        Self {
            timeline,
            fps,
            canvas,
            preload,
            image_cache: HashMap::new(),
            svg_cache: HashMap::new(),
            audio: Box::new(SilentAudioSampleProvider),
            element_order,
        }
    }

    pub fn with_audio_provider(mut self, provider: Box<dyn AudioSampleProvider>) -> Self {
        self.audio = provider;
        self
    }

    pub fn frame_count(&self) -> u64 {
        self.timeline.frame_count(self.fps)
    }

    #[instrument(name = "engine.composition.render", skip(self), fields(frame_index = frame_index))]
    pub fn render_frame(&mut self, frame_index: u64) -> Result<Vec<u8>, CompositorError> {
        let t_abs = frame_index as f64 / self.fps;
        let (w, h) = (self.timeline.width as f64, self.timeline.height as f64);

        self.canvas.reset_frame_state();
        self.canvas.fill_surface(crate::color::Rgba::BLACK);

        let mut rendered_any_track = false;

        for &track_idx in &self.preload.track_order {
            let track = &self.timeline.tracks[track_idx];
            if !matches!(track.kind, TrackType::Video) {
                continue;
            }
            let t_track = t_abs - track.start;
            if t_track < 0.0 {
                continue;
            }
            let starts = &self.preload.scene_starts[track_idx];
            let Some(scene_idx) = locate_scene(starts, &track.scenes, t_track) else { continue };
            let scene = &track.scenes[scene_idx];
            let s_scene = t_track - starts[scene_idx];

            render_scene_background(&mut self.canvas, scene, !rendered_any_track, w, h);
            rendered_any_track = true;

            let transition_active = scene
                .transition
                .as_ref()
                .map(|t| s_scene < t.duration && t.duration > 0.0)
                .unwrap_or(false);
            let transition_state = scene
                .transition
                .as_ref()
                .map(|t| compute_scene_transition(t, s_scene, w, h))
                .unwrap_or_default();

            if transition_active {
                self.canvas.save();
                self.canvas.set_global_alpha(transition_state.opacity);
                self.canvas.translate(transition_state.tx, transition_state.ty);
                self.canvas.scale_rotate_about(w / 2.0, h / 2.0, transition_state.scale, 0.0);
            }

            let order = self.element_order.get(&(track_idx, scene_idx)).cloned().unwrap_or_default();
            for &el_idx in &order {
                let element = &scene.elements[el_idx];
                if !element.visible_at(s_scene, scene.duration) {
                    continue;
                }
                self.render_element(element, s_scene, scene.duration, w, h);
            }

            if let Some(vignette) = &scene.vignette {
                render_vignette(&mut self.canvas, vignette, w, h);
            }
            if let Some(overlay) = &scene.color_overlay {
                self.canvas.save();
                self.canvas.set_composite_operation(overlay.blend_mode);
                self.canvas.fill_surface(overlay.color);
                self.canvas.restore();
            }

            if transition_active {
                self.canvas.restore();
            }
        }

        Ok(self.canvas.to_rgba_bytes())
    }

    fn render_element(&mut self, element: &Element, s_scene: f64, scene_duration: f64, w: f64, h: f64) {
        let el_duration = element.duration.unwrap_or(scene_duration - element.start);

        let keyframe_state = if !element.keyframes.is_empty() {
            Some(compute_keyframe_state(&element.keyframes, s_scene, element.start))
        } else {
            None
        };
        let preset_state = if keyframe_state.is_none() {
            element.animation.as_ref().map(|anim| compute_element_animation(anim, s_scene, element.start, el_duration, w, h))
        } else {
            None
        };

        let (anim_opacity, anim_scale, anim_tx, anim_ty) = match (&keyframe_state, &preset_state) {
            (Some(kf), _) => (kf.opacity, kf.scale, 0.0, 0.0),
            (None, Some(p)) => (p.opacity, p.scale, p.tx, p.ty),
            (None, None) => (1.0, 1.0, 0.0, 0.0),
        };

        let resolved_offset_x = keyframe_state.as_ref().and_then(|k| k.offset_x).unwrap_or(element.offset_x);
        let resolved_offset_y = keyframe_state.as_ref().and_then(|k| k.offset_y).unwrap_or(element.offset_y);
        let resolved_rotation = keyframe_state.as_ref().and_then(|k| k.rotation).unwrap_or(element.rotation);
        let is_typewriter = element.animation.as_ref().is_some_and(|a| matches!(a.preset, crate::timeline::AnimationPreset::Typewriter));
        // Typewriter's preset "scale" is a reveal-progress signal for the
        // text painter, not a geometric transform — excluded from el_scale.
        let el_scale = if is_typewriter { element.scale } else { element.scale * anim_scale };

        // Never multiply in the scene transition's opacity here: it is
        // already contributed to the canvas's alpha stack via the
        // transition save, so Canvas::global_alpha() composes it in once.
        let effective_opacity = (element.opacity * anim_opacity).clamp(0.0, 1.0);
        if effective_opacity <= 0.0 {
            return;
        }

        let typewriter_progress = preset_state.as_ref().filter(|_| is_typewriter).map(|p| p.scale);

        // Always push a save level for this element: set_global_alpha
        // writes to `current`, and the transition save (if any) only lives
        // in the stack once something below it saves again — without this,
        // an element with no transform/shadow of its own would overwrite
        // the transition level's local_alpha instead of stacking on it.
        self.canvas.save();

        let needs_transform = anim_tx != 0.0 || anim_ty != 0.0 || el_scale != 1.0 || resolved_rotation != 0.0;
        if needs_transform {
            self.canvas.translate(anim_tx, anim_ty);
            // Keyframe animations pivot in-place around the element's own
            // resolved position; preset animations pivot around the canvas
            // center (matching pre-existing behavior).
            let (pivot_x, pivot_y) = if keyframe_state.is_some() {
                element_pivot(element, resolved_offset_x, resolved_offset_y, w, h)
            } else {
                (w / 2.0, h / 2.0)
            };
            self.canvas.scale_rotate_about(pivot_x, pivot_y, el_scale, resolved_rotation);
        }

        if element.shadow.is_some() {
            self.canvas.set_shadow(element.shadow);
            let (bx, by, bw, bh) = element_bounds(element, resolved_offset_x, resolved_offset_y, w, h);
            self.canvas.paint_shadow_rect(bx, by, bw, bh);
        }
        if element.filters.is_some() {
            self.canvas.set_filters(element.filters);
        }

        self.canvas.set_global_alpha(effective_opacity);
        if let Some(mode) = element.blend_mode {
            if !matches!(mode, BlendMode::Normal) {
                self.canvas.set_composite_operation(mode);
            }
        }

        let resolved = ResolvedAttrs { offset_x: resolved_offset_x, offset_y: resolved_offset_y, typewriter_progress };
        let mut ctx = PaintContext {
            canvas: &mut self.canvas,
            canvas_w: w,
            canvas_h: h,
            asset_paths: &self.preload.asset_paths,
            extractors: &mut self.preload.extractors,
            image_cache: &mut self.image_cache,
            svg_cache: &mut self.svg_cache,
            fps: self.fps,
            audio: self.audio.as_ref(),
        };
        if let Err(e) = paint_element(&mut ctx, element, &resolved, s_scene) {
            tracing::warn!(error = %e, "painter failed, skipping element for this frame");
        }

        if element.filters.is_some() {
            let (bx, by, bw, bh) = element_bounds(element, resolved_offset_x, resolved_offset_y, w, h);
            self.canvas.apply_filters(bx, by, bw, bh);
        }

        self.canvas.restore();
    }
}

fn element_pivot(element: &Element, offset_x: f64, offset_y: f64, w: f64, h: f64) -> (f64, f64) {
    let (bw, bh) = element_size(element);
    let (x, y) = crate::engine::geometry::compute_position(element.position, offset_x, offset_y, bw, bh, w, h);
    (x + bw / 2.0, y + bh / 2.0)
}

fn element_bounds(element: &Element, offset_x: f64, offset_y: f64, w: f64, h: f64) -> (f64, f64, f64, f64) {
    let (bw, bh) = element_size(element);
    let (x, y) = crate::engine::geometry::compute_position(element.position, offset_x, offset_y, bw, bh, w, h);
    (x, y, bw, bh)
}

fn element_size(element: &Element) -> (f64, f64) {
    use crate::timeline::ElementKind::*;
    match &element.kind {
        Text(attrs) | Caption(attrs) => {
            let metrics = crate::engine::text::measure_block(&attrs.text, attrs.font_size, attrs.line_height, attrs.width);
            (attrs.width, metrics.block_height)
        }
        Image { width, height, .. } => (*width, *height),
        Video { width, height, .. } => (*width, *height),
        Shape { width, height, .. } => (*width, *height),
        Svg { width, height, .. } => (*width, *height),
        Waveform { width, height, .. } => (*width, *height),
    }
}

/// Binary search over precomputed cumulative scene starts: greatest index
/// `k` with `starts[k] <= t_track`, verified that `t_track < starts[k] +
/// scenes[k].duration`.
fn locate_scene(starts: &[f64], scenes: &[Scene], t_track: f64) -> Option<usize> {
    if starts.is_empty() {
        return None;
    }
    let k = match starts.binary_search_by(|s| s.total_cmp(&t_track)) {
        Ok(i) => i,
        Err(0) => return None,
        Err(i) => i - 1,
    };
    if t_track < starts[k] + scenes[k].duration {
        Some(k)
    } else {
        None
    }
}

fn render_scene_background(canvas: &mut Canvas, scene: &Scene, is_first_rendered_track: bool, w: f64, h: f64) {
    let should_paint = is_first_rendered_track || scene.bg_color.is_some() || scene.bg_gradient.is_some();
    if !should_paint {
        return;
    }
    if let Some(gradient) = &scene.bg_gradient {
        if gradient.colors.len() >= 2 {
            canvas.fill_gradient(0.0, 0.0, w, h, gradient);
            return;
        }
    }
    let color = scene.bg_color.unwrap_or(crate::color::Rgba::BLACK);
    canvas.fill_surface(color);
}

fn render_vignette(canvas: &mut Canvas, vignette: &crate::timeline::Vignette, w: f64, h: f64) {
    // Approximated as four progressively more transparent inset rects
    // rather than a true radial gradient; tiny-skia's RadialGradient would
    // be the exact match but this keeps the vignette deterministic and
    // cheap without a second gradient shader path per frame.
    let steps = 12;
    let outer_alpha = if vignette.color == crate::color::Rgba::BLACK { (vignette.intensity * 255.0) as u8 } else { vignette.color.a };
    for i in 0..steps {
        let t = i as f64 / steps as f64;
        if t < vignette.size {
            continue;
        }
        let inset = (1.0 - t) * w.min(h) * 0.5;
        let alpha = ((t - vignette.size) / (1.0 - vignette.size).max(1e-6) * outer_alpha as f64) as u8;
        let color = crate::color::Rgba { a: alpha, ..vignette.color };
        canvas.fill_rect(inset, inset, w - 2.0 * inset, h - 2.0 * inset, color);
    }
}
