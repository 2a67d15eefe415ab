//! Drawing surface abstraction.

use std::rc::Rc;

use trellis_layout::{BorderWidth, BoundingBox, Color, CornerRadius, Vector2};

/// Coverage mask of one rasterized glyph, in device pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphBitmap {
    pub width: usize,
    pub height: usize,
    /// One byte of coverage per pixel, row-major.
    pub coverage: Vec<u8>,
}

/// A glyph placed on the canvas. `x`/`y` are the logical top-left of the
/// bitmap; the bitmap itself is already rasterized at device scale.
#[derive(Debug, Clone)]
pub struct PositionedGlyph {
    pub x: f32,
    pub y: f32,
    pub bitmap: Rc<GlyphBitmap>,
}

/// Primitive drawing calls the renderer issues. Coordinates are logical
/// pixels; implementations apply their own device scale.
pub trait Canvas {
    fn scale_factor(&self) -> f32 {
        1.0
    }

    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, rect: BoundingBox, color: Color, radius: CornerRadius);

    /// Draw the border inside `rect`, each side with its own width.
    fn stroke_border(
        &mut self,
        rect: BoundingBox,
        color: Color,
        width: BorderWidth,
        radius: CornerRadius,
    );

    fn draw_glyphs(&mut self, glyphs: &[PositionedGlyph], color: Color);

    /// Stretch `image` over `rect`, multiplied by `tint`.
    fn draw_image(
        &mut self,
        rect: BoundingBox,
        image: &tiny_skia::Pixmap,
        tint: Color,
        radius: CornerRadius,
    );

    /// Intersect the clip with `rect` until the matching `pop_scissor`.
    fn push_scissor(&mut self, rect: BoundingBox);

    fn pop_scissor(&mut self);

    fn draw_lines(&mut self, segments: &[(Vector2, Vector2)], color: Color, width: f32);
}
