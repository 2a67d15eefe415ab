//! Translation of element declarations into Taffy styles.

use taffy::prelude::{
    AlignItems, AlignSelf, Dimension, Display, FlexDirection, JustifyContent, LengthPercentage,
    Size, Style,
};
use taffy::style::Overflow;

use crate::elements::{AlignX, AlignY, Declaration, LayoutDirection, Sizing};
use crate::math::Dimensions;

fn length_percentage(value: f32) -> LengthPercentage {
    LengthPercentage::Length(value)
}

fn dimension(value: f32) -> Dimension {
    Dimension::Length(value)
}

fn auto_dimension() -> Dimension {
    Dimension::Auto
}

fn min_dimension(min: f32) -> Dimension {
    if min > 0.0 { dimension(min) } else { auto_dimension() }
}

fn max_dimension(max: f32) -> Dimension {
    if max < f32::MAX { dimension(max) } else { auto_dimension() }
}

fn align_x(align: AlignX) -> (JustifyContent, AlignItems) {
    match align {
        AlignX::Left => (JustifyContent::Start, AlignItems::Start),
        AlignX::Center => (JustifyContent::Center, AlignItems::Center),
        AlignX::Right => (JustifyContent::End, AlignItems::End),
    }
}

fn align_y(align: AlignY) -> (JustifyContent, AlignItems) {
    match align {
        AlignY::Top => (JustifyContent::Start, AlignItems::Start),
        AlignY::Center => (JustifyContent::Center, AlignItems::Center),
        AlignY::Bottom => (JustifyContent::End, AlignItems::End),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Apply one axis of sizing. `main_axis` is true when the axis is the
/// parent's layout direction.
fn apply_sizing(style: &mut Style, axis: Axis, sizing: Sizing, main_axis: bool) {
    let (size, min, max) = match sizing {
        Sizing::Fixed(px) => (dimension(px), dimension(px), dimension(px)),
        Sizing::Percent(p) => (Dimension::Percent(p), auto_dimension(), auto_dimension()),
        Sizing::Fit { min, max } => (auto_dimension(), min_dimension(min), max_dimension(max)),
        // a grow axis may shrink down to `min`, never to its content size
        Sizing::Grow { min, max } => (auto_dimension(), dimension(min), max_dimension(max)),
    };
    match axis {
        Axis::Horizontal => {
            style.size.width = size;
            style.min_size.width = min;
            style.max_size.width = max;
        }
        Axis::Vertical => {
            style.size.height = size;
            style.min_size.height = min;
            style.max_size.height = max;
        }
    }

    match (sizing, main_axis) {
        (Sizing::Grow { .. }, true) => {
            style.flex_grow = 1.0;
            style.flex_basis = dimension(0.0);
        }
        (Sizing::Grow { .. }, false) => {
            style.align_self = Some(AlignSelf::Stretch);
        }
        (Sizing::Fixed(_), true) | (Sizing::Percent(_), true) => {
            style.flex_shrink = 0.0;
        }
        _ => {}
    }
}

/// Style for an element laid out inside a parent with `parent_direction`.
pub(crate) fn element_style(decl: &Declaration, parent_direction: LayoutDirection) -> Style {
    let layout = &decl.layout;
    let (justify_content, align_items) = match layout.direction {
        LayoutDirection::LeftToRight => {
            (align_x(layout.child_alignment.x).0, align_y(layout.child_alignment.y).1)
        }
        LayoutDirection::TopToBottom => {
            (align_y(layout.child_alignment.y).0, align_x(layout.child_alignment.x).1)
        }
    };

    let mut style = Style {
        display: Display::Flex,
        flex_direction: match layout.direction {
            LayoutDirection::LeftToRight => FlexDirection::Row,
            LayoutDirection::TopToBottom => FlexDirection::Column,
        },
        justify_content: Some(justify_content),
        align_items: Some(align_items),
        gap: match layout.direction {
            LayoutDirection::LeftToRight => Size {
                width: length_percentage(layout.child_gap),
                height: length_percentage(0.0),
            },
            LayoutDirection::TopToBottom => Size {
                width: length_percentage(0.0),
                height: length_percentage(layout.child_gap),
            },
        },
        padding: taffy::Rect {
            left: length_percentage(layout.padding.left),
            right: length_percentage(layout.padding.right),
            top: length_percentage(layout.padding.top),
            bottom: length_percentage(layout.padding.bottom),
        },
        flex_shrink: 1.0,
        ..Style::default()
    };

    let horizontal_main = parent_direction == LayoutDirection::LeftToRight;
    apply_sizing(&mut style, Axis::Horizontal, layout.sizing.width, horizontal_main);
    apply_sizing(&mut style, Axis::Vertical, layout.sizing.height, !horizontal_main);

    if let Some(scroll) = decl.scroll {
        style.overflow = taffy::Point {
            x: if scroll.horizontal { Overflow::Scroll } else { Overflow::Visible },
            y: if scroll.vertical { Overflow::Scroll } else { Overflow::Visible },
        };
        style.scrollbar_width = 0.0;
    }

    style
}

/// Style for a floating root. Taffy lays it out on its own, so `Grow` and
/// `Percent` are resolved against the attach target up front.
pub(crate) fn floating_style(decl: &Declaration, target: Dimensions, expand: Dimensions) -> Style {
    let mut style = element_style(decl, LayoutDirection::LeftToRight);
    style.flex_grow = 0.0;
    style.flex_basis = auto_dimension();
    style.align_self = None;
    style.size.width = match decl.layout.sizing.width {
        Sizing::Grow { .. } => dimension(target.width + expand.width),
        Sizing::Percent(p) => dimension(target.width * p),
        _ => style.size.width,
    };
    style.size.height = match decl.layout.sizing.height {
        Sizing::Grow { .. } => dimension(target.height + expand.height),
        Sizing::Percent(p) => dimension(target.height * p),
        _ => style.size.height,
    };
    style
}

/// Style for a measured leaf (text). It never grows and shrinks down to its
/// min-content width.
pub(crate) fn leaf_style() -> Style {
    Style {
        display: Display::Flex,
        flex_shrink: 1.0,
        ..Style::default()
    }
}

/// Style of the implicit root that spans the layout dimensions.
pub(crate) fn root_style(dimensions: Dimensions) -> Style {
    Style {
        display: Display::Flex,
        flex_direction: FlexDirection::Row,
        align_items: Some(AlignItems::Start),
        size: Size {
            width: dimension(dimensions.width),
            height: dimension(dimensions.height),
        },
        ..Style::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{LayoutConfig, SizingConfig};

    #[test]
    fn test_grow_on_main_axis_sets_flex_grow() {
        let decl = Declaration {
            layout: LayoutConfig {
                sizing: SizingConfig::new(Sizing::grow(), Sizing::fixed(60.0)),
                ..Default::default()
            },
            ..Default::default()
        };
        let style = element_style(&decl, LayoutDirection::LeftToRight);
        assert_eq!(style.flex_grow, 1.0);
        assert_eq!(style.size.height, Dimension::Length(60.0));
        assert_eq!(style.align_self, None);

        let style = element_style(&decl, LayoutDirection::TopToBottom);
        assert_eq!(style.flex_grow, 0.0);
        assert_eq!(style.align_self, Some(AlignSelf::Stretch));
        assert_eq!(style.flex_shrink, 0.0);
    }

    #[test]
    fn test_gap_follows_direction() {
        let decl = Declaration {
            layout: LayoutConfig {
                child_gap: 16.0,
                direction: LayoutDirection::TopToBottom,
                ..Default::default()
            },
            ..Default::default()
        };
        let style = element_style(&decl, LayoutDirection::LeftToRight);
        assert_eq!(style.gap.height, LengthPercentage::Length(16.0));
        assert_eq!(style.gap.width, LengthPercentage::Length(0.0));
        assert_eq!(style.flex_direction, FlexDirection::Column);
    }

    #[test]
    fn test_floating_grow_resolves_against_target() {
        let decl = Declaration {
            layout: LayoutConfig {
                sizing: SizingConfig::new(Sizing::grow(), Sizing::fit()),
                ..Default::default()
            },
            ..Default::default()
        };
        let style = floating_style(&decl, Dimensions::new(100.0, 40.0), Dimensions::new(10.0, 0.0));
        assert_eq!(style.size.width, Dimension::Length(110.0));
        assert_eq!(style.size.height, Dimension::Auto);
    }

    #[test]
    fn test_grow_minimum_ignores_content() {
        let decl = Declaration {
            layout: LayoutConfig {
                sizing: SizingConfig::new(
                    Sizing::grow(),
                    Sizing::Grow { min: 40.0, max: f32::MAX },
                ),
                ..Default::default()
            },
            ..Default::default()
        };
        let style = element_style(&decl, LayoutDirection::TopToBottom);
        assert_eq!(style.min_size.width, Dimension::Length(0.0));
        assert_eq!(style.min_size.height, Dimension::Length(40.0));

        let fit = Declaration::default();
        let style = element_style(&fit, LayoutDirection::TopToBottom);
        assert_eq!(style.min_size.height, Dimension::Auto);
    }
}
