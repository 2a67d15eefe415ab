//! Pointer hover resolution against the previous frame's element boxes.

use crate::elements::PointerCaptureMode;
use crate::id::ElementId;
use crate::math::{BoundingBox, Vector2};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PointerState {
    PressedThisFrame,
    Pressed,
    ReleasedThisFrame,
    #[default]
    Released,
}

impl PointerState {
    /// State for the next frame given whether the button is currently held.
    pub(crate) fn advance(self, is_down: bool) -> Self {
        match (self, is_down) {
            (PointerState::PressedThisFrame | PointerState::Pressed, true) => PointerState::Pressed,
            (_, true) => PointerState::PressedThisFrame,
            (PointerState::ReleasedThisFrame | PointerState::Released, false) => {
                PointerState::Released
            }
            (_, false) => PointerState::ReleasedThisFrame,
        }
    }

    pub fn is_down(self) -> bool {
        matches!(self, PointerState::PressedThisFrame | PointerState::Pressed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerData {
    pub position: Vector2,
    pub state: PointerState,
}

#[derive(Debug, Clone)]
pub(crate) struct HitEntry {
    pub id: ElementId,
    pub bounding_box: BoundingBox,
    /// Visible area of the nearest enclosing scroll container.
    pub clip: Option<BoundingBox>,
    pub is_scroll: bool,
}

/// Elements of one layout root in depth-first order.
#[derive(Debug, Clone, Default)]
pub(crate) struct HitRoot {
    pub entries: Vec<HitEntry>,
    /// `None` for the main tree, which never blocks anything below it.
    pub capture: Option<PointerCaptureMode>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct HoverResult {
    pub ids: Vec<ElementId>,
    /// Deepest scroll container under the pointer in the topmost root that has one.
    pub scroll_target: Option<u32>,
}

/// Resolve hovered elements. `roots` are in draw order, so the last root is
/// on top and is tested first.
pub(crate) fn resolve_hover(roots: &[HitRoot], position: Vector2) -> HoverResult {
    let mut result = HoverResult::default();
    for root in roots.iter().rev() {
        let mut found = false;
        let mut scroll_candidate = None;
        for entry in &root.entries {
            let inside_clip = entry.clip.map_or(true, |clip| clip.contains(position));
            if inside_clip && entry.bounding_box.contains(position) {
                result.ids.push(entry.id.clone());
                found = true;
                if entry.is_scroll {
                    scroll_candidate = Some(entry.id.id);
                }
            }
        }
        if result.scroll_target.is_none() {
            result.scroll_target = scroll_candidate;
        }
        if found && root.capture == Some(PointerCaptureMode::Capture) {
            break;
        }
    }
    result
}
