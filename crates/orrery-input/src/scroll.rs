//! Virtual scroll track.
//!
//! A window has no document to scroll, so the wheel drives an offset over a
//! content height of `pages` viewports. Progress runs from 0 at the top to 1
//! at the bottom.

use winit::event::MouseScrollDelta;

#[derive(Debug, Clone)]
pub struct ScrollTrack {
    offset: f32,
    viewport_height: f32,
    /// Content height as a multiple of the viewport height.
    pages: f32,
    pixels_per_line: f32,
}

impl ScrollTrack {
    #[must_use]
    pub fn new(viewport_height: u32, pages: f32, pixels_per_line: f32) -> Self {
        Self {
            offset: 0.0,
            viewport_height: viewport_height as f32,
            pages,
            pixels_per_line,
        }
    }

    pub fn content_height(&self) -> f32 {
        self.viewport_height * self.pages
    }

    /// Scrollable distance. Zero when the content fits in the viewport.
    pub fn max_offset(&self) -> f32 {
        (self.content_height() - self.viewport_height).max(0.0)
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Wheel up (positive `y`) moves toward the top, like a page.
    pub fn on_wheel(&mut self, delta: MouseScrollDelta) {
        let pixels = match delta {
            MouseScrollDelta::LineDelta(_, y) => y * self.pixels_per_line,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
        };
        self.scroll_by(-pixels);
    }

    /// Move the offset by `pixels`, clamped to `[0, max_offset]`.
    pub fn scroll_by(&mut self, pixels: f32) {
        self.offset = (self.offset + pixels).clamp(0.0, self.max_offset());
    }

    /// Follow a new viewport height, keeping the scroll progress.
    ///
    /// A zero height (minimized window) is ignored.
    pub fn resize(&mut self, viewport_height: u32) {
        if viewport_height == 0 {
            return;
        }
        let progress = self.progress();
        self.viewport_height = viewport_height as f32;
        self.offset = progress * self.max_offset();
    }

    /// `offset / max_offset`, or 0 when nothing can scroll.
    pub fn progress(&self) -> f32 {
        let max = self.max_offset();
        if max > 0.0 { self.offset / max } else { 0.0 }
    }
}
