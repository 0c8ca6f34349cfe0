//! Waveform painter: samples an injected `AudioSampleProvider`, draws
//! bars/line across `width`, and a progress indicator at local time. Audio
//! decoding itself is out of scope; the default provider is silent.
use crate::engine::geometry::compute_position;
use crate::error::PainterError;
use crate::painters::{PaintContext, ResolvedAttrs};
use crate::timeline::{Element, ElementKind, WaveformStyle};

/// Collaborator that supplies amplitude samples for a waveform element,
/// analogous in shape to the teacher's `FrameProvider` trait.
pub trait AudioSampleProvider: Send + Sync {
    /// Amplitude in `[-1, 1]` for `audio_url` at time `t` seconds.
    fn sample_amplitude(&self, audio_url: &str, t: f64) -> f32;
}

/// Non-goal per spec (audio sample synthesis is out of scope); always
/// returns silence so the waveform painter still produces a deterministic,
/// flat line rather than failing.
pub struct SilentAudioSampleProvider;

impl AudioSampleProvider for SilentAudioSampleProvider {
    fn sample_amplitude(&self, _audio_url: &str, _t: f64) -> f32 {
        0.0
    }
}

const BAR_COUNT: usize = 48;

pub fn paint_waveform(ctx: &mut PaintContext, element: &Element, resolved: &ResolvedAttrs, t_local: f64) -> Result<(), PainterError> {
    let ElementKind::Waveform { audio_url, width, height, style } = &element.kind else {
        unreachable!("paint_waveform called with non-waveform element");
    };
    let (x, y) = compute_position(element.position, resolved.offset_x, resolved.offset_y, *width, *height, ctx.canvas_w, ctx.canvas_h);
    let duration = element.duration.unwrap_or(1.0).max(1e-6);
    let color = crate::color::Rgba { r: 80, g: 200, b: 255, a: 255 };

    let samples: Vec<f32> = (0..BAR_COUNT)
        .map(|i| {
            let t = element.start + duration * (i as f64 / BAR_COUNT as f64);
            ctx.audio.sample_amplitude(audio_url, t).abs()
        })
        .collect();

    match style {
        WaveformStyle::Bars => {
            let bar_w = width / BAR_COUNT as f64;
            for (i, amp) in samples.iter().enumerate() {
                let bar_h = (*amp as f64).clamp(0.0, 1.0) * height;
                let bx = x + i as f64 * bar_w;
                let by = y + (height - bar_h) / 2.0;
                if let Some(path) = crate::engine::geometry::rounded_rect_path(bx, by, (bar_w * 0.7).max(1.0), bar_h.max(1.0), 0.0) {
                    ctx.canvas.fill_path(&path, color);
                }
            }
        }
        WaveformStyle::Line => {
            let mut pb = tiny_skia::PathBuilder::new();
            for (i, amp) in samples.iter().enumerate() {
                let px = x + (i as f64 / (BAR_COUNT - 1).max(1) as f64) * width;
                let py = y + height / 2.0 - (*amp as f64).clamp(-1.0, 1.0) * height / 2.0;
                if i == 0 {
                    pb.move_to(px as f32, py as f32);
                } else {
                    pb.line_to(px as f32, py as f32);
                }
            }
            if let Some(path) = pb.finish() {
                ctx.canvas.stroke_path(&path, color, 2.0);
            }
        }
    }

    let tau = (t_local - element.start).clamp(0.0, duration);
    let progress_x = x + (tau / duration) * width;
    if let Some(path) = crate::engine::geometry::rounded_rect_path(progress_x, y, 2.0, *height, 0.0) {
        ctx.canvas.fill_path(&path, crate::color::Rgba { r: 255, g: 255, b: 255, a: 255 });
    }
    Ok(())
}
