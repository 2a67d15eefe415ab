//! Element configuration: sizing, padding, alignment and the optional
//! decorations (rectangle, border, image, floating, scroll, custom).

use crate::math::{Color, CornerRadius, Dimensions, Vector2};

/// How an element is sized along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sizing {
    /// Wrap the children, clamped to `[min, max]`.
    Fit { min: f32, max: f32 },
    /// Take a share of the parent's remaining space, clamped to `[min, max]`.
    Grow { min: f32, max: f32 },
    /// Exactly this many pixels.
    Fixed(f32),
    /// Fraction (0..=1) of the parent's inner size.
    Percent(f32),
}

impl Sizing {
    pub const fn fit() -> Self {
        Sizing::Fit { min: 0.0, max: f32::MAX }
    }

    pub const fn grow() -> Self {
        Sizing::Grow { min: 0.0, max: f32::MAX }
    }

    pub const fn fixed(px: f32) -> Self {
        Sizing::Fixed(px)
    }

    pub const fn percent(fraction: f32) -> Self {
        Sizing::Percent(fraction)
    }
}

impl Default for Sizing {
    fn default() -> Self {
        Sizing::fit()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SizingConfig {
    pub width: Sizing,
    pub height: Sizing,
}

impl SizingConfig {
    pub const fn new(width: Sizing, height: Sizing) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Padding {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Padding {
    pub const fn all(value: f32) -> Self {
        Self { left: value, right: value, top: value, bottom: value }
    }

    /// Horizontal padding `x` on both sides, vertical padding `y` on both sides.
    pub const fn axes(x: f32, y: f32) -> Self {
        Self { left: x, right: x, top: y, bottom: y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayoutDirection {
    #[default]
    LeftToRight,
    TopToBottom,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlignX {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlignY {
    #[default]
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChildAlignment {
    pub x: AlignX,
    pub y: AlignY,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutConfig {
    pub sizing: SizingConfig,
    pub padding: Padding,
    /// Space between consecutive children along the layout direction.
    pub child_gap: f32,
    pub child_alignment: ChildAlignment,
    pub direction: LayoutDirection,
}

/// Filled background behind the element and its children.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RectangleConfig {
    pub color: Color,
    pub corner_radius: CornerRadius,
}

impl RectangleConfig {
    pub fn new(color: Color, corner_radius: impl Into<CornerRadius>) -> Self {
        Self { color, corner_radius: corner_radius.into() }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BorderWidth {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    /// Width of the separator drawn between children.
    pub between_children: f32,
}

impl BorderWidth {
    pub const fn outside(width: f32) -> Self {
        Self { left: width, right: width, top: width, bottom: width, between_children: 0.0 }
    }

    pub fn is_zero(&self) -> bool {
        self.left == 0.0
            && self.right == 0.0
            && self.top == 0.0
            && self.bottom == 0.0
            && self.between_children == 0.0
    }
}

/// Border drawn after the children so it stays on top of them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BorderConfig {
    pub color: Color,
    pub width: BorderWidth,
    pub corner_radius: CornerRadius,
}

/// Handle into the renderer's image table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ImageId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageConfig {
    pub image: ImageId,
    /// Natural size of the image, used when the element is `Fit` sized.
    pub source_dimensions: Dimensions,
    /// Multiplied with the image pixels. White leaves the image unchanged.
    pub tint: Color,
    pub corner_radius: CornerRadius,
}

impl ImageConfig {
    pub fn new(image: ImageId, source_dimensions: Dimensions) -> Self {
        Self {
            image,
            source_dimensions,
            tint: Color::WHITE,
            corner_radius: CornerRadius::default(),
        }
    }
}

/// One of nine points on a box used to attach floating elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttachPoint {
    #[default]
    LeftTop,
    LeftCenter,
    LeftBottom,
    CenterTop,
    CenterCenter,
    CenterBottom,
    RightTop,
    RightCenter,
    RightBottom,
}

impl AttachPoint {
    /// Fractions of width and height from the top-left corner.
    pub(crate) fn factors(self) -> (f32, f32) {
        match self {
            AttachPoint::LeftTop => (0.0, 0.0),
            AttachPoint::LeftCenter => (0.0, 0.5),
            AttachPoint::LeftBottom => (0.0, 1.0),
            AttachPoint::CenterTop => (0.5, 0.0),
            AttachPoint::CenterCenter => (0.5, 0.5),
            AttachPoint::CenterBottom => (0.5, 1.0),
            AttachPoint::RightTop => (1.0, 0.0),
            AttachPoint::RightCenter => (1.0, 0.5),
            AttachPoint::RightBottom => (1.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttachPoints {
    /// Point on the floating element.
    pub element: AttachPoint,
    /// Point on the element it attaches to.
    pub parent: AttachPoint,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PointerCaptureMode {
    /// Hovering the floating element hides elements below it from the pointer.
    #[default]
    Capture,
    /// Elements below stay hoverable.
    Passthrough,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FloatingAttachTo {
    /// The element the floating element is declared in.
    #[default]
    Parent,
    /// Any element declared in the same frame.
    Element(u32),
    /// The layout root (screen space).
    Root,
}

/// Takes the element out of its parent's flow and positions it relative to
/// an attach target, drawn above the regular tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloatingConfig {
    pub offset: Vector2,
    /// Added to the size of `Grow` axes, which otherwise match the target.
    pub expand: Dimensions,
    pub z_index: i16,
    pub attach_points: AttachPoints,
    pub pointer_capture_mode: PointerCaptureMode,
    pub attach_to: FloatingAttachTo,
}

/// Clips children to the element and lets them scroll on the enabled axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollConfig {
    pub horizontal: bool,
    pub vertical: bool,
}

/// Opaque handle interpreted by the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CustomData(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CustomConfig {
    pub data: CustomData,
    pub background_color: Color,
    pub corner_radius: CornerRadius,
}

/// Everything attached to one element for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Declaration {
    pub layout: LayoutConfig,
    pub rectangle: Option<RectangleConfig>,
    pub border: Option<BorderConfig>,
    pub image: Option<ImageConfig>,
    pub floating: Option<FloatingConfig>,
    pub scroll: Option<ScrollConfig>,
    pub custom: Option<CustomConfig>,
}
