//! Render command dispatch.

use std::rc::Rc;

use trellis_layout::{
    BoundingBox, CustomRenderData, Dimensions, RenderCommandKind, RenderCommands, Vector2,
};

use crate::camera::{screen_to_world, Camera3D};
use crate::canvas::Canvas;
use crate::error::RenderError;
use crate::fonts::{FontTable, GlyphCache};
use crate::images::ImageTable;
use crate::models::{ModelId, ModelTable};

/// Screen size the model scale is tuned for.
const REFERENCE_WIDTH: f32 = 1024.0;
const REFERENCE_HEIGHT: f32 = 768.0;
const MAX_MODEL_SCALE: f32 = 1.5;
/// Models sit slightly below the centre of their box.
const MODEL_Y_OFFSET: f32 = 20.0;
const MODEL_LINE_WIDTH: f32 = 2.0;

pub struct Renderer {
    fonts: Rc<FontTable>,
    images: ImageTable,
    models: ModelTable,
    glyphs: GlyphCache,
    glyph_scale: f32,
    camera: Camera3D,
    model_distance: f32,
}

impl Renderer {
    pub fn new(fonts: Rc<FontTable>, images: ImageTable, models: ModelTable) -> Self {
        Self {
            fonts,
            images,
            models,
            glyphs: GlyphCache::new(),
            glyph_scale: 1.0,
            camera: Camera3D::default(),
            model_distance: 140.0,
        }
    }

    pub fn fonts(&self) -> &FontTable {
        &self.fonts
    }

    pub fn images(&self) -> &ImageTable {
        &self.images
    }

    /// Depth at which custom-element models are placed.
    pub fn set_model_distance(&mut self, distance: f32) {
        self.model_distance = distance;
    }

    /// Draw one frame's commands in order. `screen` is the logical layout size.
    pub fn render(
        &mut self,
        canvas: &mut dyn Canvas,
        commands: &RenderCommands,
        screen: Dimensions,
    ) -> Result<(), RenderError> {
        let scale = canvas.scale_factor();
        if scale != self.glyph_scale {
            log::debug!(
                "scale factor {} -> {scale}, dropping {} glyphs",
                self.glyph_scale,
                self.glyphs.len()
            );
            self.glyphs.clear();
            self.glyph_scale = scale;
        }

        for command in commands {
            let bounds = command.bounding_box;
            match &command.kind {
                RenderCommandKind::Rectangle(rect) => {
                    canvas.fill_rect(bounds, rect.color, rect.corner_radius);
                }
                RenderCommandKind::Border(border) => {
                    canvas.stroke_border(bounds, border.color, border.width, border.corner_radius);
                }
                RenderCommandKind::Text(text) => {
                    let origin = Vector2::new(bounds.x, bounds.y);
                    let glyphs = self.glyphs.layout_line(&self.fonts, text, origin, scale)?;
                    canvas.draw_glyphs(&glyphs, text.color);
                }
                RenderCommandKind::Image(image) => {
                    let pixmap = self
                        .images
                        .get(image.image)
                        .ok_or(RenderError::UnknownImage(image.image))?;
                    canvas.draw_image(bounds, pixmap, image.tint, image.corner_radius);
                }
                RenderCommandKind::ScissorStart => canvas.push_scissor(bounds),
                RenderCommandKind::ScissorEnd => canvas.pop_scissor(),
                RenderCommandKind::Custom(custom) => {
                    if !custom.background_color.is_transparent() {
                        canvas.fill_rect(bounds, custom.background_color, custom.corner_radius);
                    }
                    self.draw_model(canvas, custom, bounds, screen)?;
                }
            }
        }
        log::trace!("rendered {} commands", commands.len());
        Ok(())
    }

    fn draw_model(
        &self,
        canvas: &mut dyn Canvas,
        custom: &CustomRenderData,
        bounds: BoundingBox,
        screen: Dimensions,
    ) -> Result<(), RenderError> {
        let model = ModelId::from_custom_data(custom.data)
            .and_then(|id| self.models.get(id))
            .ok_or(RenderError::UnknownModel(custom.data))?;

        let scale = ((REFERENCE_HEIGHT / screen.height.max(1.0)).min(1.0)
            * (screen.width / REFERENCE_WIDTH).max(1.0))
        .min(MAX_MODEL_SCALE);
        let anchor = Vector2::new(
            bounds.x + bounds.width / 2.0,
            bounds.y + bounds.height / 2.0 + MODEL_Y_OFFSET,
        );
        let ray =
            screen_to_world(anchor, &self.camera, screen.width, screen.height, self.model_distance);

        let projected: Vec<Option<Vector2>> = model
            .world_vertices(ray.position, scale)
            .iter()
            .map(|v| self.camera.project(v, screen.width, screen.height))
            .collect();
        let segments: Vec<(Vector2, Vector2)> = model
            .mesh
            .edges
            .iter()
            .filter_map(|&(a, b)| {
                Some((projected.get(a).copied().flatten()?, projected.get(b).copied().flatten()?))
            })
            .collect();
        canvas.draw_lines(&segments, model.color, MODEL_LINE_WIDTH);
        Ok(())
    }
}
