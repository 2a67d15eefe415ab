//! Per-frame input snapshot, accumulated from window events between redraws.

use std::time::{Duration, Instant};

/// Wheel deltas reported in pixels are converted to lines at this rate.
const PIXELS_PER_LINE: f32 = 20.0;
/// Upper bound on the frame time handed to the UI, so a stalled frame does
/// not fling scroll momentum across the whole document.
const MAX_FRAME_TIME: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Pointer position in logical pixels.
    pub pointer: [f32; 2],
    pub left_down: bool,
    /// Wheel movement since the last frame, in lines. Positive `y` is away
    /// from the user.
    pub wheel: [f32; 2],
    /// Seconds since the previous frame.
    pub frame_time: f32,
    /// Window size in logical pixels.
    pub logical_size: [f32; 2],
    /// Physical pixels per logical pixel for the frame's pixmap.
    pub scale_factor: f32,
}

impl FrameInput {
    /// Pixmap size in physical pixels, never zero.
    pub fn physical_size(&self) -> (u32, u32) {
        let w = (self.logical_size[0] * self.scale_factor).round().max(1.0) as u32;
        let h = (self.logical_size[1] * self.scale_factor).round().max(1.0) as u32;
        (w, h)
    }
}

/// Collects events for the next [`FrameInput`].
#[derive(Debug)]
pub struct InputState {
    pointer: [f32; 2],
    left_down: bool,
    wheel: [f32; 2],
    last_frame: Option<Instant>,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            pointer: [0.0, 0.0],
            left_down: false,
            wheel: [0.0, 0.0],
            last_frame: None,
        }
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `position` is in physical pixels.
    pub fn cursor_moved(&mut self, position: [f64; 2], window_scale: f64) {
        let scale = if window_scale > 0.0 { window_scale } else { 1.0 };
        self.pointer = [(position[0] / scale) as f32, (position[1] / scale) as f32];
    }

    pub fn left_button(&mut self, pressed: bool) {
        self.left_down = pressed;
    }

    pub fn wheel_lines(&mut self, x: f32, y: f32) {
        self.wheel[0] += x;
        self.wheel[1] += y;
    }

    pub fn wheel_pixels(&mut self, x: f64, y: f64) {
        self.wheel_lines(x as f32 / PIXELS_PER_LINE, y as f32 / PIXELS_PER_LINE);
    }

    /// Snapshot for the frame starting at `now` and reset the wheel.
    pub fn take_frame(
        &mut self,
        now: Instant,
        logical_size: [f32; 2],
        scale_factor: f32,
    ) -> FrameInput {
        let frame_time = self
            .last_frame
            .map(|last| now.saturating_duration_since(last).min(MAX_FRAME_TIME).as_secs_f32())
            .unwrap_or(0.0);
        self.last_frame = Some(now);
        FrameInput {
            pointer: self.pointer,
            left_down: self.left_down,
            wheel: std::mem::take(&mut self.wheel),
            frame_time,
            logical_size,
            scale_factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_is_logical() {
        let mut input = InputState::new();
        input.cursor_moved([300.0, 200.0], 2.0);
        let frame = input.take_frame(Instant::now(), [512.0, 384.0], 2.0);
        assert_eq!(frame.pointer, [150.0, 100.0]);
        assert_eq!(frame.physical_size(), (1024, 768));
    }

    #[test]
    fn test_wheel_accumulates_and_resets() {
        let mut input = InputState::new();
        input.wheel_lines(0.0, 1.0);
        input.wheel_pixels(0.0, 40.0);
        let now = Instant::now();
        assert_eq!(input.take_frame(now, [100.0, 100.0], 1.0).wheel, [0.0, 3.0]);
        assert_eq!(input.take_frame(now, [100.0, 100.0], 1.0).wheel, [0.0, 0.0]);
    }

    #[test]
    fn test_frame_time() {
        let mut input = InputState::new();
        let start = Instant::now();
        assert_eq!(input.take_frame(start, [1.0, 1.0], 1.0).frame_time, 0.0);
        let next = input.take_frame(start + Duration::from_millis(16), [1.0, 1.0], 1.0);
        assert!((next.frame_time - 0.016).abs() < 1e-6);
        let stalled = input.take_frame(start + Duration::from_secs(5), [1.0, 1.0], 1.0);
        assert!((stalled.frame_time - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_button_state_persists() {
        let mut input = InputState::new();
        input.left_button(true);
        let now = Instant::now();
        assert!(input.take_frame(now, [1.0, 1.0], 1.0).left_down);
        assert!(input.take_frame(now, [1.0, 1.0], 1.0).left_down);
        input.left_button(false);
        assert!(!input.take_frame(now, [1.0, 1.0], 1.0).left_down);
    }
}
