//! Text painter. Glyph shaping is left unconstrained by the spec; lines are
//! drawn as solid advance-width boxes per visible character, which is
//! deterministic and keeps baseline placement and wrapping exact without
//! pulling in a font rasterizer the rest of the ambient stack never needed.
use crate::engine::geometry::{compute_position, rounded_rect_path};
use crate::engine::text::{measure_block, measure_context, wrap_text};
use crate::error::PainterError;
use crate::painters::{PaintContext, ResolvedAttrs};
use crate::timeline::{Element, TextAlign, TextAttrs};

pub fn paint_text(
    ctx: &mut PaintContext,
    element: &Element,
    attrs: &TextAttrs,
    resolved: &ResolvedAttrs,
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

    let mctx = measure_context();
    let total_chars: usize = lines.iter().map(|l| l.chars().count()).sum();
    let visible_chars = resolved
        .typewriter_progress
        .map(|p| (p.clamp(0.0, 1.0) * total_chars as f64).round() as usize);
    let mut drawn = 0usize;

    'lines: for (i, line) in lines.iter().enumerate() {
        let line_width = mctx.text_width(line, attrs.font_size);
        let line_x = match attrs.text_align {
            TextAlign::Left => x,
            TextAlign::Center => x + (metrics.block_width - line_width) / 2.0,
            TextAlign::Right => x + (metrics.block_width - line_width),
        };
        let baseline_y = y + (i as f64 + 1.0) * attrs.font_size * attrs.line_height;
        let mut cursor = line_x;
        for c in line.chars() {
            if let Some(limit) = visible_chars {
                if drawn >= limit {
                    break 'lines;
                }
            }
            let w = mctx.char_width(c, attrs.font_size);
            if !c.is_whitespace() {
                if let Some(path) = rounded_rect_path(cursor, baseline_y - attrs.font_size * 0.8, w * 0.78, attrs.font_size * 0.8, 0.0) {
                    ctx.canvas.fill_path(&path, attrs.color);
                }
            }
            cursor += w;
            drawn += 1;
        }
    }
    Ok(())
}
