use crate::engine::geometry::{calculate_fit_draw, compute_position, rounded_rect_path};
use crate::engine::media_pipeline::{resolve_video_frame_index, video_frame_index_for_element};
use crate::error::PainterError;
use crate::painters::{PaintContext, ResolvedAttrs};
use crate::timeline::{Element, ElementKind};

pub fn paint_video(ctx: &mut PaintContext, element: &Element, resolved: &ResolvedAttrs, t_local: f64) -> Result<(), PainterError> {
    let ElementKind::Video { url, width, height, fit, border_radius, r#loop, trim_start, speed } = &element.kind else {
        unreachable!("paint_video called with non-video element");
    };

    let extractor = ctx.extractors.get_mut(url).ok_or(PainterError::MissingFrame(0))?;
    let Some(total) = extractor.total_frames() else {
        return Err(PainterError::MissingFrame(0));
    };
    let raw_idx = video_frame_index_for_element(t_local, element.start, ctx.fps, *speed, *trim_start);
    let idx = resolve_video_frame_index(raw_idx, total, *r#loop);

    let Some(img) = extractor.get_frame_image(idx) else {
        return Err(PainterError::MissingFrame(idx as u64));
    };

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
