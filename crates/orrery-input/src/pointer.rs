//! Pointer position in normalized device coordinates, plus the click latch.

use glam::Vec2;
use winit::event::{ElementState, MouseButton};

/// Horizontal scale from NDC to camera/parallax offset.
pub const OFFSET_SCALE_X: f32 = 0.2;
/// Vertical scale from NDC to camera/parallax offset.
pub const OFFSET_SCALE_Y: f32 = 0.15;

/// Tracks the last cursor position against the current viewport.
///
/// Before the cursor has ever moved the pointer sits at the centre, which maps
/// to a zero offset.
#[derive(Debug, Clone)]
pub struct PointerState {
    /// Last cursor position in physical pixels, if any.
    position: Option<Vec2>,
    viewport: Vec2,
    activation: bool,
}

impl PointerState {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: None,
            viewport: Vec2::new(width as f32, height as f32),
            activation: false,
        }
    }

    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        self.position = Some(Vec2::new(x as f32, y as f32));
    }

    /// A left press arms the activation latch. Other buttons are ignored.
    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left && state == ElementState::Pressed {
            self.activation = true;
        }
    }

    /// Zero-sized viewports (minimized window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.viewport = Vec2::new(width as f32, height as f32);
        }
    }

    /// Cursor in `[-1, 1]` on both axes, `+y` up.
    ///
    /// Positions outside the window, reported while a button is held, clamp
    /// to the nearest edge. A zero-sized viewport reports the centre.
    #[must_use]
    pub fn ndc(&self) -> Vec2 {
        match self.position {
            Some(p) if self.viewport.x > 0.0 && self.viewport.y > 0.0 => Vec2::new(
                (p.x / self.viewport.x) * 2.0 - 1.0,
                -(p.y / self.viewport.y) * 2.0 + 1.0,
            )
            .clamp(Vec2::NEG_ONE, Vec2::ONE),
            _ => Vec2::ZERO,
        }
    }

    /// Scaled pointer offset fed to parallax and the camera.
    #[must_use]
    pub fn offset(&self) -> Vec2 {
        self.ndc() * Vec2::new(OFFSET_SCALE_X, OFFSET_SCALE_Y)
    }

    /// Returns whether a click happened since the last call, and clears it.
    pub fn take_activation(&mut self) -> bool {
        std::mem::take(&mut self.activation)
    }
}
