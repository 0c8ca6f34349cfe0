//! Abstract 2D drawing surface (spec §9), concretely backed by
//! `tiny_skia::Pixmap`. Implements save/restore, transform composition,
//! `globalAlpha`, `globalCompositeOperation`, shadow attributes, a CSS-like
//! filter chain, gradients, path fill/clip, `drawImage`, and raw-pixel
//! export — the operation set the spec names, version-pinned against the
//! `director-engine` manifest (`tiny-skia = "0.11"`).
use tiny_skia::{
    BlendMode as SkBlendMode, Color, FillRule, GradientStop, LinearGradient, Mask, Paint, Pixmap,
    PixmapPaint, Point, Rect, Shader, SpreadMode, Transform,
};

use crate::color::Rgba;
use crate::timeline::{BlendMode, Filters, Gradient, GradientDirection, Shadow};

#[derive(Clone)]
struct CanvasState {
    transform: Transform,
    /// This level's own opacity contribution. The *effective* alpha used
    /// for painting is the product of `local_alpha` across the whole save
    /// stack (see `Canvas::effective_alpha`) — this is what lets a scene
    /// transition's opacity and an element's own opacity compose without
    /// either side re-multiplying the other (spec §3: "never double
    /// multiplied when the scene transform already applied the scene
    /// opacity via save/restore").
    local_alpha: f64,
    composite: BlendMode,
    filters: Option<Filters>,
    shadow: Option<Shadow>,
    clip: Option<Mask>,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            transform: Transform::identity(),
            local_alpha: 1.0,
            composite: BlendMode::Normal,
            filters: None,
            shadow: None,
            clip: None,
        }
    }
}

/// One reusable drawing surface, sized once to `(width, height)` and kept
/// for the compositor's entire lifetime (spec §3 lifecycle note).
pub struct Canvas {
    pixmap: Pixmap,
    stack: Vec<CanvasState>,
    current: CanvasState,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        let pixmap = Pixmap::new(width, height).expect("canvas dimensions must be non-zero");
        Self { pixmap, stack: Vec::new(), current: CanvasState::default() }
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn save(&mut self) {
        self.stack.push(self.current.clone());
    }

    pub fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.current = state;
        }
    }

    /// Per-frame reset: `globalAlpha=1`, `source-over`, `filter=none`, no
    /// outstanding saves (spec §4.5 step 2).
    pub fn reset_frame_state(&mut self) {
        self.current = CanvasState::default();
        self.stack.clear();
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.current.transform = self.current.transform.pre_translate(dx as f32, dy as f32);
    }

    pub fn scale_uniform(&mut self, s: f64) {
        self.current.transform = self.current.transform.pre_scale(s as f32, s as f32);
    }

    pub fn rotate_degrees(&mut self, deg: f64) {
        self.current.transform = self.current.transform.pre_concat(Transform::from_rotate(deg as f32));
    }

    /// Scale and rotate about `(px, py)`, matching the canvas-style idiom
    /// `translate(px,py) · scale(s) · rotate(r) · translate(-px,-py)`.
    pub fn scale_rotate_about(&mut self, px: f64, py: f64, scale: f64, rotate_deg: f64) {
        self.translate(px, py);
        self.scale_uniform(scale);
        self.rotate_degrees(rotate_deg);
        self.translate(-px, -py);
    }

    pub fn set_global_alpha(&mut self, a: f64) {
        self.current.local_alpha = a.clamp(0.0, 1.0);
    }

    /// Effective alpha is the product of every save level's `local_alpha`
    /// down to the current one, so a parent save's opacity (e.g. a scene
    /// transition) and a child's own opacity compose multiplicatively
    /// exactly once each.
    pub fn global_alpha(&self) -> f64 {
        self.stack.iter().map(|s| s.local_alpha).product::<f64>() * self.current.local_alpha
    }

    pub fn set_composite_operation(&mut self, mode: BlendMode) {
        self.current.composite = mode;
    }

    pub fn set_filters(&mut self, filters: Option<Filters>) {
        self.current.filters = filters;
    }

    pub fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.current.shadow = shadow;
    }

    pub fn clip_path(&mut self, path: &tiny_skia::Path) {
        let mut mask = Mask::new(self.pixmap.width(), self.pixmap.height()).expect("mask alloc");
        mask.fill_path(path, FillRule::Winding, true, self.current.transform);
        self.current.clip = Some(mask);
    }

    fn sk_blend(mode: BlendMode) -> SkBlendMode {
        use BlendMode::*;
        match mode {
            Normal => SkBlendMode::SourceOver,
            Multiply => SkBlendMode::Multiply,
            Screen => SkBlendMode::Screen,
            Overlay => SkBlendMode::Overlay,
            Darken => SkBlendMode::Darken,
            Lighten => SkBlendMode::Lighten,
            ColorDodge => SkBlendMode::ColorDodge,
            ColorBurn => SkBlendMode::ColorBurn,
            HardLight => SkBlendMode::HardLight,
            SoftLight => SkBlendMode::SoftLight,
            Difference => SkBlendMode::Difference,
            Exclusion => SkBlendMode::Exclusion,
            Hue => SkBlendMode::Hue,
            Saturation => SkBlendMode::Saturation,
            Color => SkBlendMode::Color,
            Luminosity => SkBlendMode::Luminosity,
        }
    }

    fn color_with_alpha(&self, color: Rgba) -> Color {
        let a = (color.a as f64 / 255.0) * self.global_alpha();
        Color::from_rgba(
            color.r as f32 / 255.0,
            color.g as f32 / 255.0,
            color.b as f32 / 255.0,
            a.clamp(0.0, 1.0) as f32,
        )
        .unwrap_or(Color::BLACK)
    }

    fn paint_for(&self, color: Rgba) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(self.color_with_alpha(color));
        paint.blend_mode = Self::sk_blend(self.current.composite);
        paint.anti_alias = true;
        paint
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        let Some(rect) = Rect::from_xywh(x as f32, y as f32, w as f32, h as f32) else { return };
        let paint = self.paint_for(color);
        self.pixmap.fill_rect(rect, &paint, self.current.transform, self.current.clip.as_ref());
    }

    pub fn fill_surface(&mut self, color: Rgba) {
        self.fill_rect(0.0, 0.0, self.width() as f64, self.height() as f64, color);
    }

    pub fn fill_path(&mut self, path: &tiny_skia::Path, color: Rgba) {
        let paint = self.paint_for(color);
        self.pixmap
            .fill_path(path, &paint, FillRule::Winding, self.current.transform, self.current.clip.as_ref());
    }

    pub fn stroke_path(&mut self, path: &tiny_skia::Path, color: Rgba, width: f64) {
        let paint = self.paint_for(color);
        let stroke = tiny_skia::Stroke { width: width as f32, ..Default::default() };
        self.pixmap
            .stroke_path(path, &paint, &stroke, self.current.transform, self.current.clip.as_ref());
    }

    /// Fills a rect with a two-or-more-color gradient oriented per
    /// `direction` (vertical top→bottom, horizontal left→right, diagonal
    /// top-left→bottom-right).
    pub fn fill_gradient(&mut self, x: f64, y: f64, w: f64, h: f64, gradient: &Gradient) {
        let Some(rect) = Rect::from_xywh(x as f32, y as f32, w as f32, h as f32) else { return };
        let n = gradient.colors.len().max(2) as f32;
        let stops: Vec<GradientStop> = gradient
            .colors
            .iter()
            .enumerate()
            .map(|(i, c)| GradientStop::new(i as f32 / (n - 1.0), self.color_with_alpha(*c)))
            .collect();
        let (start, end) = match gradient.direction {
            GradientDirection::Vertical => (Point::from_xy(x as f32, y as f32), Point::from_xy(x as f32, (y + h) as f32)),
            GradientDirection::Horizontal => (Point::from_xy(x as f32, y as f32), Point::from_xy((x + w) as f32, y as f32)),
            GradientDirection::Diagonal => {
                (Point::from_xy(x as f32, y as f32), Point::from_xy((x + w) as f32, (y + h) as f32))
            }
        };
        let Some(shader) = LinearGradient::new(start, end, stops, SpreadMode::Pad, Transform::identity()) else {
            return;
        };
        let mut paint = Paint::default();
        paint.shader = shader;
        paint.blend_mode = Self::sk_blend(self.current.composite);
        paint.anti_alias = true;
        self.pixmap.fill_rect(rect, &paint, self.current.transform, self.current.clip.as_ref());
    }

    /// Draws a decoded RGBA image into `(dst_x, dst_y, dst_w, dst_h)`,
    /// sampling only the `(src_x, src_y, src_w, src_h)` crop region — the
    /// crop is realized as a transform rather than a pixel copy.
    pub fn draw_image_cropped(
        &mut self,
        img: &image::RgbaImage,
        src_x: f64,
        src_y: f64,
        src_w: f64,
        src_h: f64,
        dst_x: f64,
        dst_y: f64,
        dst_w: f64,
        dst_h: f64,
    ) {
        let Some(src_pixmap) = rgba_image_to_pixmap(img) else { return };
        let sx = dst_w / src_w.max(1e-6);
        let sy = dst_h / src_h.max(1e-6);
        let crop_transform = Transform::from_translate(-(src_x as f32), -(src_y as f32))
            .post_scale(sx as f32, sy as f32)
            .post_translate(dst_x as f32, dst_y as f32);
        let transform = self.current.transform.pre_concat(crop_transform);
        let paint = PixmapPaint {
            opacity: self.global_alpha() as f32,
            blend_mode: Self::sk_blend(self.current.composite),
            quality: tiny_skia::FilterQuality::Bilinear,
        };
        self.pixmap.draw_pixmap(0, 0, src_pixmap.as_ref(), &paint, transform, self.current.clip.as_ref());
    }

    /// Applies the accumulated filter chain and shadow as a post-process
    /// over `(x, y, w, h)`. Order: blur, brightness, contrast, grayscale,
    /// hue-rotate, invert, saturate, sepia — matching the CSS filter order
    /// the spec names (drop-shadow is realized separately via
    /// `paint_shadow_rect`, before the element itself is drawn).
    pub fn apply_filters(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let Some(filters) = self.current.filters else { return };
        let (px, py, pw, ph) = (x.max(0.0) as u32, y.max(0.0) as u32, w.max(0.0) as u32, h.max(0.0) as u32);
        if pw == 0 || ph == 0 {
            return;
        }
        let width = self.pixmap.width();
        let height = self.pixmap.height();
        if filters.blur > 0.0 {
            box_blur_region(self.pixmap.data_mut(), width, px, py, pw.min(width - px), ph.min(height - py), filters.blur);
        }
        let data = self.pixmap.data_mut();
        for row in py..(py + ph).min(height) {
            for col in px..(px + pw).min(width) {
                let idx = ((row * width + col) * 4) as usize;
                if idx + 4 > data.len() {
                    continue;
                }
                filters.apply_to_premultiplied(&mut data[idx..idx + 4]);
            }
        }
    }

    /// Paints a blurred, offset rectangle before the element itself, as a
    /// cheap stand-in for a real shadow pass.
    pub fn paint_shadow_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let Some(shadow) = self.current.shadow else { return };
        self.fill_rect(x + shadow.offset_x, y + shadow.offset_y, w, h, shadow.color);
        if shadow.blur > 0.0 {
            let width = self.pixmap.width();
            let height = self.pixmap.height();
            let px = (x + shadow.offset_x).max(0.0) as u32;
            let py = (y + shadow.offset_y).max(0.0) as u32;
            let pw = (w as u32).min(width.saturating_sub(px));
            let ph = (h as u32).min(height.saturating_sub(py));
            box_blur_region(self.pixmap.data_mut(), width, px, py, pw, ph, shadow.blur);
        }
    }

    /// Row-major, top-to-bottom, 8-bit non-premultiplied RGBA — the exact
    /// export format spec §4.5 step 4 / §6 require.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixmap.data().len());
        for px in self.pixmap.data().chunks_exact(4) {
            let (r, g, b, a) = (px[0], px[1], px[2], px[3]);
            if a == 0 {
                out.extend_from_slice(&[0, 0, 0, 0]);
            } else {
                let af = a as f32 / 255.0;
                let unmul = |c: u8| -> u8 { ((c as f32 / af).round().clamp(0.0, 255.0)) as u8 };
                out.extend_from_slice(&[unmul(r), unmul(g), unmul(b), a]);
            }
        }
        out
    }
}

fn rgba_image_to_pixmap(img: &image::RgbaImage) -> Option<Pixmap> {
    let (w, h) = img.dimensions();
    let mut pixmap = Pixmap::new(w, h)?;
    let dst = pixmap.data_mut();
    for (i, px) in img.pixels().enumerate() {
        let [r, g, b, a] = px.0;
        let af = a as f32 / 255.0;
        let base = i * 4;
        dst[base] = (r as f32 * af).round() as u8;
        dst[base + 1] = (g as f32 * af).round() as u8;
        dst[base + 2] = (b as f32 * af).round() as u8;
        dst[base + 3] = a;
    }
    Some(pixmap)
}

impl Filters {
    fn apply_to_premultiplied(&self, px: &mut [u8]) {
        let a = px[3] as f32 / 255.0;
        if a <= 0.0 {
            return;
        }
        let mut r = px[0] as f32 / 255.0 / a;
        let mut g = px[1] as f32 / 255.0 / a;
        let mut b = px[2] as f32 / 255.0 / a;

        if let Some(brightness) = self.brightness {
            r *= brightness as f32;
            g *= brightness as f32;
            b *= brightness as f32;
        }
        if let Some(contrast) = self.contrast {
            let c = contrast as f32;
            r = (r - 0.5) * c + 0.5;
            g = (g - 0.5) * c + 0.5;
            b = (b - 0.5) * c + 0.5;
        }
        if let Some(grayscale) = self.grayscale {
            let gray = 0.2126 * r + 0.7152 * g + 0.0722 * b;
            let t = grayscale as f32;
            r = r + (gray - r) * t;
            g = g + (gray - g) * t;
            b = b + (gray - b) * t;
        }
        if let Some(hue_rotate) = self.hue_rotate {
            // CSS `hue-rotate()` matrix (luminance-preserving rotation of
            // the sRGB cube around the gray axis), degrees.
            let theta = (hue_rotate as f32).to_radians();
            let (cos, sin) = (theta.cos(), theta.sin());
            let (nr, ng, nb) = (
                (0.213 + cos * 0.787 - sin * 0.213) * r + (0.715 - cos * 0.715 - sin * 0.715) * g + (0.072 - cos * 0.072 + sin * 0.928) * b,
                (0.213 - cos * 0.213 + sin * 0.143) * r + (0.715 + cos * 0.285 + sin * 0.140) * g + (0.072 - cos * 0.072 - sin * 0.283) * b,
                (0.213 - cos * 0.213 - sin * 0.787) * r + (0.715 - cos * 0.715 + sin * 0.715) * g + (0.072 + cos * 0.928 + sin * 0.072) * b,
            );
            r = nr;
            g = ng;
            b = nb;
        }
        if let Some(invert) = self.invert {
            let t = invert as f32;
            r = r + (1.0 - r - r) * t;
            g = g + (1.0 - g - g) * t;
            b = b + (1.0 - b - b) * t;
        }
        if let Some(saturate) = self.saturate {
            let gray = 0.2126 * r + 0.7152 * g + 0.0722 * b;
            let s = saturate as f32;
            r = gray + (r - gray) * s;
            g = gray + (g - gray) * s;
            b = gray + (b - gray) * s;
        }
        if let Some(sepia) = self.sepia {
            let sr = 0.393 * r + 0.769 * g + 0.189 * b;
            let sg = 0.349 * r + 0.686 * g + 0.168 * b;
            let sb = 0.272 * r + 0.534 * g + 0.131 * b;
            let t = sepia as f32;
            r = r + (sr - r) * t;
            g = g + (sg - g) * t;
            b = b + (sb - b) * t;
        }

        let clamp01 = |v: f32| v.clamp(0.0, 1.0);
        let (r, g, b) = (clamp01(r), clamp01(g), clamp01(b));
        px[0] = (r * a * 255.0).round() as u8;
        px[1] = (g * a * 255.0).round() as u8;
        px[2] = (b * a * 255.0).round() as u8;
    }
}

/// A small separable box blur over a sub-rectangle of a premultiplied RGBA
/// buffer, radius in pixels (fractional radii round to the nearest pixel).
fn box_blur_region(data: &mut [u8], stride: u32, x: u32, y: u32, w: u32, h: u32, radius: f64) {
    let r = radius.round().max(1.0) as i64;
    if w == 0 || h == 0 {
        return;
    }
    let mut src = vec![0u8; (w * h * 4) as usize];
    for row in 0..h {
        for col in 0..w {
            let idx = (((y + row) * stride + (x + col)) * 4) as usize;
            let out_idx = ((row * w + col) * 4) as usize;
            src[out_idx..out_idx + 4].copy_from_slice(&data[idx..idx + 4]);
        }
    }
    for row in 0..h as i64 {
        for col in 0..w as i64 {
            let mut sum = [0u32; 4];
            let mut count = 0u32;
            for dy in -r..=r {
                for dx in -r..=r {
                    let (sx, sy) = (col + dx, row + dy);
                    if sx < 0 || sy < 0 || sx >= w as i64 || sy >= h as i64 {
                        continue;
                    }
                    let idx = ((sy as u32 * w + sx as u32) * 4) as usize;
                    for c in 0..4 {
                        sum[c] += src[idx + c] as u32;
                    }
                    count += 1;
                }
            }
            let idx = (((y + row as u32) * stride + (x + col as u32)) * 4) as usize;
            for c in 0..4 {
                data[idx + c] = (sum[c] / count.max(1)) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_canvas_is_transparent() {
        let canvas = Canvas::new(4, 4);
        assert!(canvas.to_rgba_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn fill_surface_opaque_black_has_no_alpha_leak() {
        let mut canvas = Canvas::new(2, 2);
        canvas.fill_surface(Rgba::BLACK);
        let bytes = canvas.to_rgba_bytes();
        assert_eq!(bytes, vec![0, 0, 0, 255].repeat(4));
    }

    #[test]
    fn global_alpha_never_exceeds_one() {
        let mut canvas = Canvas::new(2, 2);
        canvas.set_global_alpha(5.0);
        assert!(canvas.global_alpha() <= 1.0);
    }

    #[test]
    fn save_restore_round_trips_transform() {
        let mut canvas = Canvas::new(4, 4);
        canvas.save();
        canvas.translate(10.0, 10.0);
        canvas.restore();
        assert_eq!(canvas.current.transform, Transform::identity());
    }

    #[test]
    fn hue_rotate_shifts_a_saturated_color() {
        let filters = Filters { hue_rotate: Some(180.0), ..Default::default() };
        let mut px = [255u8, 0, 0, 255];
        filters.apply_to_premultiplied(&mut px);
        assert!(px[0] < 255, "red channel should drop after a 180deg hue rotation, got {px:?}");
    }
}
