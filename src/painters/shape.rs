//! Shape painter: parameterized primitives with no asset dependency.
//! `RoundedRect`/`Polygon`/`Star` have no explicit radius/side-count field
//! in the data model (the spec leaves shape parameterization a named
//! contract, not a schema), so a fixed visually-reasonable default is used:
//! 15% corner radius, a 6-sided polygon, a 5-pointed star.
use std::f64::consts::PI;

use tiny_skia::PathBuilder;

use crate::engine::geometry::{compute_position, rounded_rect_path};
use crate::error::PainterError;
use crate::painters::{PaintContext, ResolvedAttrs};
use crate::timeline::{Element, ElementKind, ShapeKind};

pub fn paint_shape(ctx: &mut PaintContext, element: &Element, resolved: &ResolvedAttrs) -> Result<(), PainterError> {
    let ElementKind::Shape { shape, width, height, fill, stroke, stroke_width } = &element.kind else {
        unreachable!("paint_shape called with non-shape element");
    };
    let (x, y) = compute_position(element.position, resolved.offset_x, resolved.offset_y, *width, *height, ctx.canvas_w, ctx.canvas_h);

    let path = match shape {
        ShapeKind::Rect => rounded_rect_path(x, y, *width, *height, 0.0),
        ShapeKind::RoundedRect => rounded_rect_path(x, y, *width, *height, 0.15 * width.min(*height)),
        ShapeKind::Circle => ellipse_path(x, y, *width, *height),
        ShapeKind::Line => line_path(x, y, *width, *height),
        ShapeKind::Polygon => regular_polygon_path(x, y, *width, *height, 6),
        ShapeKind::Star => star_path(x, y, *width, *height, 5),
    };
    let Some(path) = path else { return Ok(()) };

    if let Some(color) = fill {
        ctx.canvas.fill_path(&path, *color);
    }
    if let Some(color) = stroke {
        ctx.canvas.stroke_path(&path, *color, *stroke_width);
    }
    Ok(())
}

fn ellipse_path(x: f64, y: f64, w: f64, h: f64) -> Option<tiny_skia::Path> {
    let rect = tiny_skia::Rect::from_xywh(x as f32, y as f32, w as f32, h as f32)?;
    tiny_skia::PathBuilder::from_oval(rect)
}

fn line_path(x: f64, y: f64, w: f64, h: f64) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(x as f32, (y + h / 2.0) as f32);
    pb.line_to((x + w) as f32, (y + h / 2.0) as f32);
    pb.finish()
}

fn regular_polygon_path(x: f64, y: f64, w: f64, h: f64, sides: u32) -> Option<tiny_skia::Path> {
    let (cx, cy) = (x + w / 2.0, y + h / 2.0);
    let (rx, ry) = (w / 2.0, h / 2.0);
    let mut pb = PathBuilder::new();
    for i in 0..sides {
        let angle = -PI / 2.0 + i as f64 * 2.0 * PI / sides as f64;
        let px = cx + rx * angle.cos();
        let py = cy + ry * angle.sin();
        if i == 0 {
            pb.move_to(px as f32, py as f32);
        } else {
            pb.line_to(px as f32, py as f32);
        }
    }
    pb.close();
    pb.finish()
}

fn star_path(x: f64, y: f64, w: f64, h: f64, points: u32) -> Option<tiny_skia::Path> {
    let (cx, cy) = (x + w / 2.0, y + h / 2.0);
    let (rx, ry) = (w / 2.0, h / 2.0);
    let (inner_rx, inner_ry) = (rx * 0.45, ry * 0.45);
    let mut pb = PathBuilder::new();
    let total = points * 2;
    for i in 0..total {
        let angle = -PI / 2.0 + i as f64 * PI / points as f64;
        let (ox, oy) = if i % 2 == 0 { (rx, ry) } else { (inner_rx, inner_ry) };
        let px = cx + ox * angle.cos();
        let py = cy + oy * angle.sin();
        if i == 0 {
            pb.move_to(px as f32, py as f32);
        } else {
            pb.line_to(px as f32, py as f32);
        }
    }
    pb.close();
    pb.finish()
}
