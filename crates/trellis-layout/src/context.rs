//! Coordinate accumulation while walking a computed Taffy tree.
//!
//! Taffy reports each node's location relative to its parent. The
//! `LayoutContext` keeps the running absolute origin (including scroll
//! offsets of enclosing scroll containers) so every element can be turned
//! into a screen-space [`BoundingBox`].

use crate::math::{BoundingBox, Vector2};

#[derive(Debug, Clone, Copy)]
struct Frame {
    offset: Vector2,
}

/// Manages the transform from Taffy's parent-relative coordinates to screen space.
///
/// # Usage
///
/// ```ignore
/// let mut ctx = LayoutContext::new(root_origin);
/// let parent_box = ctx.to_bounding_box(&parent_layout);
/// ctx.push(&parent_layout, scroll_position);
/// for child in children {
///     let child_box = ctx.to_bounding_box(&child_layout);
/// }
/// ctx.pop();
/// ```
#[derive(Debug)]
pub struct LayoutContext {
    offset: Vector2,
    stack: Vec<Frame>,
}

impl LayoutContext {
    pub fn new(origin: Vector2) -> Self {
        Self {
            offset: origin,
            stack: Vec::new(),
        }
    }

    /// Enter a container. `child_offset` shifts all children, which is how
    /// scroll positions are applied. Must be paired with `pop()`.
    pub fn push(&mut self, layout: &taffy::Layout, child_offset: Vector2) {
        self.stack.push(Frame { offset: self.offset });
        self.offset.x += layout.location.x + child_offset.x;
        self.offset.y += layout.location.y + child_offset.y;
    }

    /// Restore the origin from before the matching `push()`.
    pub fn pop(&mut self) {
        if let Some(prev) = self.stack.pop() {
            self.offset = prev.offset;
        } else {
            log::warn!("LayoutContext::pop called with empty stack");
        }
    }

    pub fn to_bounding_box(&self, layout: &taffy::Layout) -> BoundingBox {
        BoundingBox {
            x: self.offset.x + layout.location.x,
            y: self.offset.y + layout.location.y,
            width: layout.size.width,
            height: layout.size.height,
        }
    }

    pub fn offset(&self) -> Vector2 {
        self.offset
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_at(x: f32, y: f32, w: f32, h: f32) -> taffy::Layout {
        taffy::Layout {
            location: taffy::Point { x, y },
            size: taffy::Size { width: w, height: h },
            ..Default::default()
        }
    }

    #[test]
    fn test_push_pop() {
        let mut ctx = LayoutContext::new(Vector2::new(10.0, 20.0));
        ctx.push(&layout_at(5.0, 10.0, 100.0, 50.0), Vector2::ZERO);
        assert_eq!(ctx.offset(), Vector2::new(15.0, 30.0));
        assert_eq!(ctx.depth(), 1);

        ctx.pop();
        assert_eq!(ctx.offset(), Vector2::new(10.0, 20.0));
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_child_offset_applies_to_children_only() {
        let mut ctx = LayoutContext::new(Vector2::ZERO);
        let parent = layout_at(10.0, 10.0, 100.0, 100.0);
        assert_eq!(ctx.to_bounding_box(&parent), BoundingBox::new(10.0, 10.0, 100.0, 100.0));

        ctx.push(&parent, Vector2::new(0.0, -40.0));
        let child = ctx.to_bounding_box(&layout_at(0.0, 50.0, 20.0, 20.0));
        assert_eq!(child, BoundingBox::new(10.0, 20.0, 20.0, 20.0));
    }

    #[test]
    fn test_pop_empty_stack() {
        let mut ctx = LayoutContext::new(Vector2::ZERO);
        ctx.pop();
        assert_eq!(ctx.offset(), Vector2::ZERO);
    }
}
