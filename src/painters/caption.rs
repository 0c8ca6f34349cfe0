//! Caption painter: same layout as text, but with word-timed highlighting —
//! the word active at the current local time is drawn at full color, the
//! rest dimmed.
use crate::engine::geometry::{compute_position, rounded_rect_path};
use crate::engine::text::{measure_block, measure_context, wrap_text};
use crate::error::PainterError;
use crate::painters::{PaintContext, ResolvedAttrs};
use crate::timeline::{Element, TextAlign, TextAttrs};

pub fn paint_caption(
    ctx: &mut PaintContext,
    element: &Element,
    attrs: &TextAttrs,
    resolved: &ResolvedAttrs,
    t_local: f64,
) -> Result<(), PainterError> {
    let lines = wrap_text(&attrs.text, attrs.font_size, attrs.width);
    let metrics = measure_block(&attrs.text, attrs.font_size, attrs.line_height, attrs.width);
    let (x, y) = compute_position(
        element.position,
        resolved.offset_x,
        resolved.offset_y,
        metrics.block_width,
        metrics.block_height,
        ctx.canvas_w,
        ctx.canvas_h,
    );

    let words: Vec<&str> = attrs.text.split_whitespace().collect();
    let duration = element.duration.unwrap_or(1.0).max(1e-6);
    let tau = (t_local - element.start).clamp(0.0, duration);
    let active_word_idx = if words.is_empty() {
        None
    } else {
        Some(((tau / duration) * words.len() as f64).floor().min((words.len() - 1) as f64) as usize)
    };

    let mctx = measure_context();
    let mut word_counter = 0usize;
    for (i, line) in lines.iter().enumerate() {
        let line_width = mctx.text_width(line, attrs.font_size);
        let line_x = match attrs.text_align {
            TextAlign::Left => x,
            TextAlign::Center => x + (metrics.block_width - line_width) / 2.0,
            TextAlign::Right => x + (metrics.block_width - line_width),
        };
        let baseline_y = y + (i as f64 + 1.0) * attrs.font_size * attrs.line_height;
        let mut cursor = line_x;
        for word in line.split(' ') {
            let is_active = active_word_idx == Some(word_counter);
            let color = if is_active {
                attrs.color
            } else {
                crate::color::Rgba { r: attrs.color.r, g: attrs.color.g, b: attrs.color.b, a: (attrs.color.a as u16 * 140 / 255) as u8 }
            };
            for c in word.chars() {
                let w = mctx.char_width(c, attrs.font_size);
                if let Some(path) = rounded_rect_path(cursor, baseline_y - attrs.font_size * 0.8, w * 0.78, attrs.font_size * 0.8, 0.0) {
                    ctx.canvas.fill_path(&path, color);
                }
                cursor += w;
            }
            cursor += mctx.char_width(' ', attrs.font_size);
            word_counter += 1;
        }
    }
    Ok(())
}
