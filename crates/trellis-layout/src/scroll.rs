//! Scroll container state retained across frames.

use crate::elements::ScrollConfig;
use crate::math::{BoundingBox, Dimensions, Vector2};
use crate::pointer::{PointerData, PointerState};

const MOMENTUM_DECAY_PER_FRAME: f32 = 0.95;
const MOMENTUM_STOP: f32 = 5.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollContainerData {
    /// Offset applied to the children. Zero or negative on each axis.
    pub scroll_position: Vector2,
    pub container_dimensions: Dimensions,
    pub content_dimensions: Dimensions,
    pub config: ScrollConfig,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    pointer_origin: Vector2,
    scroll_origin: Vector2,
}

#[derive(Debug, Clone)]
struct ScrollState {
    element_id: u32,
    bounding_box: BoundingBox,
    content: Dimensions,
    config: ScrollConfig,
    position: Vector2,
    /// Pixels per second.
    momentum: Vector2,
    drag: Option<Drag>,
    open_this_frame: bool,
}

impl ScrollState {
    fn clamp(&mut self) {
        let max_x = (self.content.width - self.bounding_box.width).max(0.0);
        let max_y = (self.content.height - self.bounding_box.height).max(0.0);
        self.position.x =
            if self.config.horizontal { self.position.x.clamp(-max_x, 0.0) } else { 0.0 };
        self.position.y =
            if self.config.vertical { self.position.y.clamp(-max_y, 0.0) } else { 0.0 };
    }

    fn masked(&self, v: Vector2) -> Vector2 {
        Vector2::new(
            if self.config.horizontal { v.x } else { 0.0 },
            if self.config.vertical { v.y } else { 0.0 },
        )
    }
}

#[derive(Debug, Default)]
pub(crate) struct ScrollContainers {
    states: Vec<ScrollState>,
}

impl ScrollContainers {
    /// Called before the tree is walked.
    pub fn begin_frame(&mut self) {
        for state in &mut self.states {
            state.open_this_frame = false;
        }
    }

    /// Record a container seen this frame and return its child offset.
    pub fn touch(
        &mut self,
        element_id: u32,
        bounding_box: BoundingBox,
        content: Dimensions,
        config: ScrollConfig,
    ) -> Vector2 {
        let index = match self.states.iter().position(|s| s.element_id == element_id) {
            Some(index) => index,
            None => {
                self.states.push(ScrollState {
                    element_id,
                    bounding_box,
                    content,
                    config,
                    position: Vector2::ZERO,
                    momentum: Vector2::ZERO,
                    drag: None,
                    open_this_frame: true,
                });
                self.states.len() - 1
            }
        };
        let state = &mut self.states[index];
        state.bounding_box = bounding_box;
        state.content = content;
        state.config = config;
        state.open_this_frame = true;
        state.clamp();
        state.position
    }

    /// Forget containers that were not declared this frame.
    pub fn end_frame(&mut self) {
        self.states.retain(|s| s.open_this_frame);
    }

    #[cfg(test)]
    pub fn position(&self, element_id: u32) -> Option<Vector2> {
        self.states.iter().find(|s| s.element_id == element_id).map(|s| s.position)
    }

    pub fn data(&self, element_id: u32) -> Option<ScrollContainerData> {
        self.states.iter().find(|s| s.element_id == element_id).map(|s| ScrollContainerData {
            scroll_position: s.position,
            container_dimensions: s.bounding_box.dimensions(),
            content_dimensions: s.content,
            config: s.config,
        })
    }

    /// Apply wheel and drag input. `target` is the container under the pointer.
    pub fn update(
        &mut self,
        enable_drag: bool,
        wheel: Vector2,
        delta_time: f32,
        pointer: PointerData,
        target: Option<u32>,
    ) {
        for state in &mut self.states {
            let targeted = target == Some(state.element_id);

            if enable_drag {
                if pointer.state == PointerState::PressedThisFrame && targeted {
                    state.drag = Some(Drag {
                        pointer_origin: pointer.position,
                        scroll_origin: state.position,
                    });
                    state.momentum = Vector2::ZERO;
                }
                match state.drag {
                    Some(drag) if pointer.state.is_down() => {
                        let previous = state.position;
                        let dragged = state.masked(pointer.position - drag.pointer_origin);
                        state.position = drag.scroll_origin + dragged;
                        if delta_time > 0.0 {
                            let moved = state.position - previous;
                            state.momentum =
                                Vector2::new(moved.x / delta_time, moved.y / delta_time);
                        }
                    }
                    Some(_) => state.drag = None,
                    None => {
                        let momentum = state.momentum;
                        if momentum != Vector2::ZERO {
                            state.position = state.position
                                + Vector2::new(momentum.x * delta_time, momentum.y * delta_time);
                            let decay = MOMENTUM_DECAY_PER_FRAME.powf(delta_time * 60.0);
                            state.momentum = Vector2::new(momentum.x * decay, momentum.y * decay);
                            if state.momentum.x.abs() < MOMENTUM_STOP
                                && state.momentum.y.abs() < MOMENTUM_STOP
                            {
                                state.momentum = Vector2::ZERO;
                            }
                        }
                    }
                }
            }

            if targeted && wheel != Vector2::ZERO {
                state.position = state.position + state.masked(wheel);
                state.momentum = Vector2::ZERO;
            }

            state.clamp();
        }
    }
}
