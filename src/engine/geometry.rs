//! Position/fit solvers and path emitters shared by every painter.
use tiny_skia::{PathBuilder, Rect};

use crate::timeline::{Fit, PositionType};

/// Resolves a `PositionType` anchor plus `(offsetX, offsetY)` into a
/// top-left draw origin for a box of size `(w, h)` inside a canvas of size
/// `(canvas_w, canvas_h)`. Offsets are added after anchor resolution.
pub fn compute_position(
    position: PositionType,
    offset_x: f64,
    offset_y: f64,
    w: f64,
    h: f64,
    canvas_w: f64,
    canvas_h: f64,
) -> (f64, f64) {
    use PositionType::*;
    let (x, y) = match position {
        TopLeft => (0.0, 0.0),
        TopCenter => ((canvas_w - w) / 2.0, 0.0),
        TopRight => (canvas_w - w, 0.0),
        CenterLeft => (0.0, (canvas_h - h) / 2.0),
        Center => ((canvas_w - w) / 2.0, (canvas_h - h) / 2.0),
        CenterRight => (canvas_w - w, (canvas_h - h) / 2.0),
        BottomLeft => (0.0, canvas_h - h),
        BottomCenter => ((canvas_w - w) / 2.0, canvas_h - h),
        BottomRight => (canvas_w - w, canvas_h - h),
        Left => (0.0, (canvas_h - h) / 2.0),
        Right => (canvas_w - w, (canvas_h - h) / 2.0),
    };
    (x + offset_x, y + offset_y)
}

/// Result of `calculate_fit_draw`: the source region to sample (crop, in
/// source pixels) and the destination rectangle to draw into, expressed as
/// an offset from the element's resolved `(x, y)` origin plus a size — so
/// `Contain`'s letterboxing margin is just a nonzero `dst_x`/`dst_y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitDraw {
    pub src_x: f64,
    pub src_y: f64,
    pub src_w: f64,
    pub src_h: f64,
    pub dst_x: f64,
    pub dst_y: f64,
    pub dst_w: f64,
    pub dst_h: f64,
}

pub fn calculate_fit_draw(src_w: f64, src_h: f64, dst_w: f64, dst_h: f64, fit: Fit) -> FitDraw {
    match fit {
        Fit::Fill => FitDraw { src_x: 0.0, src_y: 0.0, src_w, src_h, dst_x: 0.0, dst_y: 0.0, dst_w, dst_h },
        Fit::Contain => {
            let src_aspect = src_w / src_h;
            let dst_aspect = dst_w / dst_h;
            let (scaled_w, scaled_h) = if src_aspect > dst_aspect {
                (dst_w, dst_w / src_aspect)
            } else {
                (dst_h * src_aspect, dst_h)
            };
            FitDraw {
                src_x: 0.0,
                src_y: 0.0,
                src_w,
                src_h,
                dst_x: (dst_w - scaled_w) / 2.0,
                dst_y: (dst_h - scaled_h) / 2.0,
                dst_w: scaled_w,
                dst_h: scaled_h,
            }
        }
        Fit::Cover => {
            let src_aspect = src_w / src_h;
            let dst_aspect = dst_w / dst_h;
            if src_aspect > dst_aspect {
                // source wider than destination: crop left/right
                let crop_w = src_h * dst_aspect;
                FitDraw { src_x: (src_w - crop_w) / 2.0, src_y: 0.0, src_w: crop_w, src_h, dst_x: 0.0, dst_y: 0.0, dst_w, dst_h }
            } else {
                let crop_h = src_w / dst_aspect;
                FitDraw { src_x: 0.0, src_y: (src_h - crop_h) / 2.0, src_w, src_h: crop_h, dst_x: 0.0, dst_y: 0.0, dst_w, dst_h }
            }
        }
    }
}

/// Emits a rounded-rect path at `(x, y, w, h)` with corner radius `r`,
/// clamped so the radius never exceeds half the shorter side.
pub fn rounded_rect_path(x: f64, y: f64, w: f64, h: f64, radius: f64) -> Option<tiny_skia::Path> {
    let r = radius.clamp(0.0, (w.min(h)) / 2.0) as f32;
    let (x, y, w, h) = (x as f32, y as f32, w as f32, h as f32);
    if r <= 0.0 {
        let rect = Rect::from_xywh(x, y, w, h)?;
        let mut pb = PathBuilder::new();
        pb.push_rect(rect);
        return pb.finish();
    }
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.quad_to(x + w, y, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.quad_to(x + w, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.quad_to(x, y + h, x, y + h - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contain_letterboxes_a_wider_source() {
        let fit = calculate_fit_draw(200.0, 100.0, 100.0, 100.0, Fit::Contain);
        assert_eq!(fit.dst_w, 100.0);
        assert_eq!(fit.dst_h, 50.0);
        assert_eq!(fit.dst_y, 25.0);
        assert_eq!(fit.dst_x, 0.0);
    }

    #[test]
    fn cover_crops_a_wider_source() {
        let fit = calculate_fit_draw(200.0, 100.0, 100.0, 100.0, Fit::Cover);
        assert_eq!(fit.dst_w, 100.0);
        assert_eq!(fit.dst_h, 100.0);
        assert_eq!(fit.src_w, 100.0);
        assert_eq!(fit.src_x, 50.0);
    }

    #[test]
    fn fill_stretches_without_cropping_or_letterboxing() {
        let fit = calculate_fit_draw(200.0, 100.0, 80.0, 80.0, Fit::Fill);
        assert_eq!((fit.dst_w, fit.dst_h), (80.0, 80.0));
        assert_eq!((fit.dst_x, fit.dst_y), (0.0, 0.0));
    }
}
