//! Ordered draw instructions produced by `LayoutEngine::end_layout`.

use crate::elements::{BorderWidth, CustomData, ImageId};
use crate::math::{BoundingBox, Color, CornerRadius};
use crate::text::FontId;

#[derive(Debug, Clone, PartialEq)]
pub struct RectangleRenderData {
    pub color: Color,
    pub corner_radius: CornerRadius,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BorderRenderData {
    pub color: Color,
    pub width: BorderWidth,
    pub corner_radius: CornerRadius,
}

/// One wrapped line of a text element.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRenderData {
    pub text: String,
    pub color: Color,
    pub font_id: FontId,
    pub font_size: f32,
    pub letter_spacing: f32,
    pub line_height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRenderData {
    pub image: ImageId,
    pub tint: Color,
    pub corner_radius: CornerRadius,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomRenderData {
    pub data: CustomData,
    pub background_color: Color,
    pub corner_radius: CornerRadius,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommandKind {
    Rectangle(RectangleRenderData),
    Border(BorderRenderData),
    Text(TextRenderData),
    Image(ImageRenderData),
    /// Restrict drawing to the bounding box until the matching `ScissorEnd`.
    ScissorStart,
    ScissorEnd,
    Custom(CustomRenderData),
}

impl RenderCommandKind {
    pub fn name(&self) -> &'static str {
        match self {
            RenderCommandKind::Rectangle(_) => "rectangle",
            RenderCommandKind::Border(_) => "border",
            RenderCommandKind::Text(_) => "text",
            RenderCommandKind::Image(_) => "image",
            RenderCommandKind::ScissorStart => "scissor-start",
            RenderCommandKind::ScissorEnd => "scissor-end",
            RenderCommandKind::Custom(_) => "custom",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderCommand {
    pub bounding_box: BoundingBox,
    /// Id of the element that produced the command.
    pub id: u32,
    pub z_index: i16,
    pub kind: RenderCommandKind,
}

/// Commands of one frame in draw order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderCommands {
    commands: Vec<RenderCommand>,
}

impl RenderCommands {
    pub(crate) fn new(commands: Vec<RenderCommand>) -> Self {
        Self { commands }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RenderCommand> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn as_slice(&self) -> &[RenderCommand] {
        &self.commands
    }
}

impl<'a> IntoIterator for &'a RenderCommands {
    type Item = &'a RenderCommand;
    type IntoIter = std::slice::Iter<'a, RenderCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
