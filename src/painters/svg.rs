//! SVG painter: rasterizes once per URL/markup via `usvg` + `resvg` onto a
//! `tiny-skia` pixmap, then caches and draws like an image.
use std::sync::Arc;

use crate::engine::geometry::compute_position;
use crate::error::{AssetDecodeError, PainterError};
use crate::painters::{PaintContext, ResolvedAttrs};
use crate::timeline::{Element, ElementKind};

pub fn paint_svg(ctx: &mut PaintContext, element: &Element, resolved: &ResolvedAttrs) -> Result<(), PainterError> {
    let ElementKind::Svg { url, markup, width, height } = &element.kind else {
        unreachable!("paint_svg called with non-svg element");
    };
    let img = rasterize_cached(ctx, url.as_deref(), markup.as_deref(), *width, *height)?;
    let (x, y) = compute_position(element.position, resolved.offset_x, resolved.offset_y, *width, *height, ctx.canvas_w, ctx.canvas_h);
    let (sw, sh) = (img.width() as f64, img.height() as f64);
    ctx.canvas.draw_image_cropped(&img, 0.0, 0.0, sw, sh, x, y, *width, *height);
    Ok(())
}

fn rasterize_cached(
    ctx: &mut PaintContext,
    url: Option<&str>,
    markup: Option<&str>,
    width: f64,
    height: f64,
) -> Result<Arc<image::RgbaImage>, PainterError> {
    let key = url.or(markup).unwrap_or("").to_string();
    if let Some(img) = ctx.svg_cache.get(&key) {
        return Ok(img.clone());
    }

    let svg_text = if let Some(markup) = markup {
        markup.to_string()
    } else {
        let url = url.ok_or_else(|| AssetDecodeError::Svg("svg element has neither url nor markup".to_string()))?;
        let path = ctx.asset_paths.get(url).ok_or_else(|| AssetDecodeError::NotFound(url.to_string()))?;
        std::fs::read_to_string(path).map_err(|e| AssetDecodeError::Svg(e.to_string()))?
    };

    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(&svg_text, &opt).map_err(|e| AssetDecodeError::Svg(e.to_string()))?;

    let w = width.max(1.0) as u32;
    let h = height.max(1.0) as u32;
    let mut pixmap = tiny_skia::Pixmap::new(w, h).ok_or_else(|| AssetDecodeError::Svg("zero-sized svg target".to_string()))?;
    let size = tree.size();
    let scale_x = w as f32 / size.width().max(1.0);
    let scale_y = h as f32 / size.height().max(1.0);
    resvg::render(&tree, tiny_skia::Transform::from_scale(scale_x, scale_y), &mut pixmap.as_mut());

    let rgba = Arc::new(pixmap_to_rgba_image(&pixmap));
    ctx.svg_cache.insert(key, rgba.clone());
    Ok(rgba)
}

fn pixmap_to_rgba_image(pixmap: &tiny_skia::Pixmap) -> image::RgbaImage {
    let (w, h) = (pixmap.width(), pixmap.height());
    let mut out = image::RgbaImage::new(w, h);
    for (px, dst) in pixmap.data().chunks_exact(4).zip(out.pixels_mut()) {
        let (r, g, b, a) = (px[0], px[1], px[2], px[3]);
        if a == 0 {
            *dst = image::Rgba([0, 0, 0, 0]);
        } else {
            let af = a as f32 / 255.0;
            let unmul = |c: u8| ((c as f32 / af).round().clamp(0.0, 255.0)) as u8;
            *dst = image::Rgba([unmul(r), unmul(g), unmul(b), a]);
        }
    }
    out
}
