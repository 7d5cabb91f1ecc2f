//! Pointer, scroll and click input for the scene.
//!
//! [`InputState`] collects winit window events between frames. Once per frame
//! the app takes an [`InputSnapshot`], which is all the frame updater sees.

pub mod pointer;
pub mod scroll;

pub use pointer::PointerState;
pub use scroll::ScrollTrack;

use glam::Vec2;
use winit::event::WindowEvent;

/// Input values consumed by one frame update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    /// Scaled pointer offset, `x` in `[-0.2, 0.2]`, `y` in `[-0.15, 0.15]`.
    pub pointer_offset: Vec2,
    /// Scroll progress in `[0, 1]`.
    pub scroll_progress: f32,
    /// A click happened since the previous snapshot.
    pub activated: bool,
}

#[derive(Debug, Clone)]
pub struct InputState {
    pub pointer: PointerState,
    pub scroll: ScrollTrack,
}

impl InputState {
    #[must_use]
    pub fn new(width: u32, height: u32, scroll_pages: f32, pixels_per_line: f32) -> Self {
        Self {
            pointer: PointerState::new(width, height),
            scroll: ScrollTrack::new(height, scroll_pages, pixels_per_line),
        }
    }

    /// Feed a window event. Returns `true` if it was an input event this
    /// state tracks. Resizes are not handled here; the app forwards them to
    /// [`resize`](Self::resize) once the surface has settled on a size.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer.on_cursor_moved(position.x, position.y);
                true
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.pointer.on_button(*button, *state);
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll.on_wheel(*delta);
                tracing::trace!(progress = self.scroll.progress(), "scroll");
                true
            }
            _ => false,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.pointer.resize(width, height);
        self.scroll.resize(height);
    }

    /// Read the current values and consume the activation latch.
    pub fn snapshot(&mut self) -> InputSnapshot {
        InputSnapshot {
            pointer_offset: self.pointer.offset(),
            scroll_progress: self.scroll.progress(),
            activated: self.pointer.take_activation(),
        }
    }
}
