use std::sync::Arc;

use crate::engine::geometry::{calculate_fit_draw, compute_position, rounded_rect_path};
use crate::error::{AssetDecodeError, PainterError};
use crate::painters::{PaintContext, ResolvedAttrs};
use crate::timeline::{Element, ElementKind};

pub fn paint_image(ctx: &mut PaintContext, element: &Element, resolved: &ResolvedAttrs) -> Result<(), PainterError> {
    let ElementKind::Image { url, width, height, fit, border_radius } = &element.kind else {
        unreachable!("paint_image called with non-image element");
    };

    let img = load_cached(ctx, url)?;
    let (sw, sh) = (img.width() as f64, img.height() as f64);
    let fit_draw = calculate_fit_draw(sw, sh, *width, *height, *fit);
    let (x, y) = compute_position(element.position, resolved.offset_x, resolved.offset_y, *width, *height, ctx.canvas_w, ctx.canvas_h);

    if *border_radius > 0.0 {
        if let Some(path) = rounded_rect_path(x, y, *width, *height, *border_radius) {
            ctx.canvas.clip_path(&path);
        }
    }
    ctx.canvas.draw_image_cropped(
        &img,
        fit_draw.src_x,
        fit_draw.src_y,
        fit_draw.src_w,
        fit_draw.src_h,
        x + fit_draw.dst_x,
        y + fit_draw.dst_y,
        fit_draw.dst_w,
        fit_draw.dst_h,
    );
    Ok(())
}

/// Loads and decodes an image exactly once per URL, caching the decoded
/// buffer in `ctx.image_cache` for the compositor's whole lifetime.
pub(crate) fn load_cached(ctx: &mut PaintContext, url: &str) -> Result<Arc<image::RgbaImage>, PainterError> {
    if let Some(img) = ctx.image_cache.get(url) {
        return Ok(img.clone());
    }
    let path = ctx
        .asset_paths
        .get(url)
        .ok_or_else(|| AssetDecodeError::NotFound(url.to_string()))?;
    let bytes = std::fs::read(path).map_err(|e| AssetDecodeError::Image(e.to_string()))?;
    let decoded = image::load_from_memory(&bytes).map_err(|e| AssetDecodeError::Image(e.to_string()))?;
    let rgba = Arc::new(decoded.to_rgba8());
    ctx.image_cache.insert(url.to_string(), rgba.clone());
    Ok(rgba)
}
