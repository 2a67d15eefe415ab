//! `tiny-skia` canvas.

use tiny_skia::{
    FillRule, FilterQuality, Mask, Paint, Path, PathBuilder, Pattern, Pixmap, PremultipliedColorU8,
    Rect, SpreadMode, Stroke, Transform,
};
use trellis_layout::{BorderWidth, BoundingBox, Color, CornerRadius, Vector2};

use crate::canvas::{Canvas, PositionedGlyph};
use crate::error::RenderError;
use crate::images::tinted;

/// Control point distance for approximating a quarter circle with a cubic.
const KAPPA: f32 = 0.552_284_8;

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

/// Clamp each corner so adjacent radii never exceed the side they share.
fn clamp_radius(width: f32, height: f32, radius: CornerRadius) -> CornerRadius {
    let max = (width.min(height) / 2.0).max(0.0);
    CornerRadius {
        top_left: radius.top_left.clamp(0.0, max),
        top_right: radius.top_right.clamp(0.0, max),
        bottom_left: radius.bottom_left.clamp(0.0, max),
        bottom_right: radius.bottom_right.clamp(0.0, max),
    }
}

fn push_rounded_rect(pb: &mut PathBuilder, x: f32, y: f32, w: f32, h: f32, radius: CornerRadius) {
    let r = clamp_radius(w, h, radius);
    let (right, bottom) = (x + w, y + h);

    pb.move_to(x + r.top_left, y);
    pb.line_to(right - r.top_right, y);
    if r.top_right > 0.0 {
        let k = r.top_right * KAPPA;
        pb.cubic_to(right - r.top_right + k, y, right, y + r.top_right - k, right, y + r.top_right);
    }
    pb.line_to(right, bottom - r.bottom_right);
    if r.bottom_right > 0.0 {
        let k = r.bottom_right * KAPPA;
        pb.cubic_to(
            right,
            bottom - r.bottom_right + k,
            right - r.bottom_right + k,
            bottom,
            right - r.bottom_right,
            bottom,
        );
    }
    pb.line_to(x + r.bottom_left, bottom);
    if r.bottom_left > 0.0 {
        let k = r.bottom_left * KAPPA;
        pb.cubic_to(
            x + r.bottom_left - k,
            bottom,
            x,
            bottom - r.bottom_left + k,
            x,
            bottom - r.bottom_left,
        );
    }
    pb.line_to(x, y + r.top_left);
    if r.top_left > 0.0 {
        let k = r.top_left * KAPPA;
        pb.cubic_to(x, y + r.top_left - k, x + r.top_left - k, y, x + r.top_left, y);
    }
    pb.close();
}

fn scaled_radius(radius: CornerRadius, scale: f32) -> CornerRadius {
    CornerRadius {
        top_left: radius.top_left * scale,
        top_right: radius.top_right * scale,
        bottom_left: radius.bottom_left * scale,
        bottom_right: radius.bottom_right * scale,
    }
}

/// Blend `color` with `coverage` over a premultiplied pixel.
fn blend_coverage(dst: PremultipliedColorU8, color: Color, coverage: u8) -> PremultipliedColorU8 {
    let alpha = coverage as u32 * color.a as u32 / 255;
    if alpha == 0 {
        return dst;
    }
    let inv = 255 - alpha;
    let mix = |src: u8, dst: u8| ((src as u32 * alpha + dst as u32 * inv + 127) / 255) as u8;
    let out_alpha = (alpha * 255 + dst.alpha() as u32 * inv + 127) / 255;
    // src channels are straight; premultiplying by alpha is what `mix` does
    PremultipliedColorU8::from_rgba(
        mix(color.r, dst.red()).min(out_alpha as u8),
        mix(color.g, dst.green()).min(out_alpha as u8),
        mix(color.b, dst.blue()).min(out_alpha as u8),
        out_alpha as u8,
    )
    .unwrap_or(dst)
}

/// Rasterizes into an owned pixmap at a device scale factor.
pub struct PixmapCanvas {
    pixmap: Pixmap,
    scale: f32,
    clips: Vec<Mask>,
}

impl PixmapCanvas {
    pub fn new(width: u32, height: u32, scale: f32) -> Result<Self, RenderError> {
        let pixmap = Pixmap::new(width.max(1), height.max(1))
            .ok_or(RenderError::PixmapSize { width, height })?;
        Ok(Self {
            pixmap,
            scale: if scale > 0.0 { scale } else { 1.0 },
            clips: Vec::new(),
        })
    }

    /// Reallocate for a new device size. Contents are discarded.
    pub fn resize(&mut self, width: u32, height: u32, scale: f32) -> Result<(), RenderError> {
        if width.max(1) != self.pixmap.width() || height.max(1) != self.pixmap.height() {
            self.pixmap = Pixmap::new(width.max(1), height.max(1))
                .ok_or(RenderError::PixmapSize { width, height })?;
        }
        if scale > 0.0 {
            self.scale = scale;
        }
        self.clips.clear();
        Ok(())
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    fn device_rect(&self, rect: BoundingBox) -> BoundingBox {
        BoundingBox::new(
            rect.x * self.scale,
            rect.y * self.scale,
            rect.width * self.scale,
            rect.height * self.scale,
        )
    }

    fn rounded_path(&self, rect: BoundingBox, radius: CornerRadius) -> Option<Path> {
        let d = self.device_rect(rect);
        if d.width <= 0.0 || d.height <= 0.0 {
            return None;
        }
        let radius = scaled_radius(radius, self.scale);
        if radius.is_zero() {
            return Rect::from_xywh(d.x, d.y, d.width, d.height).map(PathBuilder::from_rect);
        }
        let mut pb = PathBuilder::new();
        push_rounded_rect(&mut pb, d.x, d.y, d.width, d.height, radius);
        pb.finish()
    }

    fn fill_path(&mut self, path: &Path, paint: &Paint<'_>, rule: FillRule) {
        let mask = self.clips.last();
        self.pixmap.fill_path(path, paint, rule, Transform::identity(), mask);
    }
}

impl Canvas for PixmapCanvas {
    fn scale_factor(&self) -> f32 {
        self.scale
    }

    fn clear(&mut self, color: Color) {
        self.pixmap.fill(tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a));
    }

    fn fill_rect(&mut self, rect: BoundingBox, color: Color, radius: CornerRadius) {
        if color.is_transparent() {
            return;
        }
        if let Some(path) = self.rounded_path(rect, radius) {
            self.fill_path(&path, &paint(color), FillRule::Winding);
        }
    }

    fn stroke_border(
        &mut self,
        rect: BoundingBox,
        color: Color,
        width: BorderWidth,
        radius: CornerRadius,
    ) {
        if color.is_transparent() {
            return;
        }
        let outer = self.device_rect(rect);
        let s = self.scale;
        let (left, right, top, bottom) =
            (width.left * s, width.right * s, width.top * s, width.bottom * s);
        if left + right + top + bottom <= 0.0 || outer.width <= 0.0 || outer.height <= 0.0 {
            return;
        }
        let outer_radius = scaled_radius(radius, s);
        let inner_radius = CornerRadius {
            top_left: (outer_radius.top_left - left.max(top)).max(0.0),
            top_right: (outer_radius.top_right - right.max(top)).max(0.0),
            bottom_left: (outer_radius.bottom_left - left.max(bottom)).max(0.0),
            bottom_right: (outer_radius.bottom_right - right.max(bottom)).max(0.0),
        };

        let mut pb = PathBuilder::new();
        push_rounded_rect(&mut pb, outer.x, outer.y, outer.width, outer.height, outer_radius);
        let inner_w = outer.width - left - right;
        let inner_h = outer.height - top - bottom;
        if inner_w > 0.0 && inner_h > 0.0 {
            push_rounded_rect(
                &mut pb,
                outer.x + left,
                outer.y + top,
                inner_w,
                inner_h,
                inner_radius,
            );
        }
        if let Some(path) = pb.finish() {
            self.fill_path(&path, &paint(color), FillRule::EvenOdd);
        }
    }

    fn draw_glyphs(&mut self, glyphs: &[PositionedGlyph], color: Color) {
        if color.is_transparent() {
            return;
        }
        let width = self.pixmap.width() as i64;
        let height = self.pixmap.height() as i64;
        let mask = self.clips.last().map(Mask::data);
        let pixels = self.pixmap.pixels_mut();

        for glyph in glyphs {
            let origin_x = (glyph.x * self.scale).round() as i64;
            let origin_y = (glyph.y * self.scale).round() as i64;
            let bitmap = &glyph.bitmap;
            for row in 0..bitmap.height {
                let y = origin_y + row as i64;
                if y < 0 || y >= height {
                    continue;
                }
                for col in 0..bitmap.width {
                    let x = origin_x + col as i64;
                    if x < 0 || x >= width {
                        continue;
                    }
                    let index = (y * width + x) as usize;
                    let mut coverage = bitmap.coverage[row * bitmap.width + col];
                    if let Some(mask) = mask {
                        coverage = ((coverage as u16 * mask[index] as u16) / 255) as u8;
                    }
                    if coverage > 0 {
                        pixels[index] = blend_coverage(pixels[index], color, coverage);
                    }
                }
            }
        }
    }

    fn draw_image(&mut self, rect: BoundingBox, image: &Pixmap, tint: Color, radius: CornerRadius) {
        let Some(path) = self.rounded_path(rect, radius) else {
            return;
        };
        let d = self.device_rect(rect);
        let owned;
        let source = if tint == Color::WHITE {
            image
        } else {
            owned = tinted(image, tint);
            &owned
        };
        let transform = Transform::from_row(
            d.width / source.width() as f32,
            0.0,
            0.0,
            d.height / source.height() as f32,
            d.x,
            d.y,
        );
        let mut paint = Paint::default();
        paint.anti_alias = true;
        paint.shader = Pattern::new(
            source.as_ref(),
            SpreadMode::Pad,
            FilterQuality::Bilinear,
            1.0,
            transform,
        );
        self.fill_path(&path, &paint, FillRule::Winding);
    }

    fn push_scissor(&mut self, rect: BoundingBox) {
        let d = self.device_rect(rect);
        let path = Rect::from_xywh(d.x, d.y, d.width.max(0.0), d.height.max(0.0))
            .map(PathBuilder::from_rect);
        let mask = match (self.clips.last(), path) {
            (Some(parent), Some(path)) => {
                let mut mask = parent.clone();
                mask.intersect_path(&path, FillRule::Winding, false, Transform::identity());
                Some(mask)
            }
            (None, Some(path)) => {
                Mask::new(self.pixmap.width(), self.pixmap.height()).map(|mut mask| {
                    mask.fill_path(&path, FillRule::Winding, false, Transform::identity());
                    mask
                })
            }
            // empty rect: nothing inside is visible
            (_, None) => Mask::new(self.pixmap.width(), self.pixmap.height()),
        };
        match mask {
            Some(mask) => self.clips.push(mask),
            None => log::warn!("failed to allocate scissor mask"),
        }
    }

    fn pop_scissor(&mut self) {
        if self.clips.pop().is_none() {
            log::warn!("pop_scissor without matching push_scissor");
        }
    }

    fn draw_lines(&mut self, segments: &[(Vector2, Vector2)], color: Color, width: f32) {
        if segments.is_empty() || color.is_transparent() {
            return;
        }
        let s = self.scale;
        let mut pb = PathBuilder::new();
        for (a, b) in segments {
            pb.move_to(a.x * s, a.y * s);
            pb.line_to(b.x * s, b.y * s);
        }
        let Some(path) = pb.finish() else {
            return;
        };
        let stroke = Stroke {
            width: width * s,
            ..Stroke::default()
        };
        let mask = self.clips.last();
        self.pixmap.stroke_path(&path, &paint(color), &stroke, Transform::identity(), mask);
    }
}
