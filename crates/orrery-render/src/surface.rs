//! Tracks the drawable size of the window.
//!
//! Wayland reports `0x0` before the compositor assigns a size and minimized
//! windows on Windows do the same. The GPU surface is always kept at least
//! `1x1`, but rendering is skipped until a real size arrives.

pub const MIN_SURFACE_DIMENSION: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct SurfaceWrapper {
    physical_width: u32,
    physical_height: u32,
    scale_factor: f64,
    /// False while the window reports a zero dimension.
    drawable: bool,
}

impl SurfaceWrapper {
    pub fn new(physical_width: u32, physical_height: u32, scale_factor: f64) -> Self {
        Self {
            physical_width: physical_width.max(MIN_SURFACE_DIMENSION),
            physical_height: physical_height.max(MIN_SURFACE_DIMENSION),
            scale_factor,
            drawable: physical_width > 0 && physical_height > 0,
        }
    }

    /// Record a window resize. Returns the clamped size if it changed.
    pub fn handle_resize(&mut self, physical_width: u32, physical_height: u32) -> Option<PhysicalSize> {
        self.drawable = physical_width > 0 && physical_height > 0;
        let width = physical_width.max(MIN_SURFACE_DIMENSION);
        let height = physical_height.max(MIN_SURFACE_DIMENSION);
        if width == self.physical_width && height == self.physical_height {
            return None;
        }
        self.physical_width = width;
        self.physical_height = height;
        Some(self.physical_size())
    }

    /// A DPI change arrives with the new physical size.
    pub fn handle_scale_factor_changed(
        &mut self,
        scale_factor: f64,
        physical_width: u32,
        physical_height: u32,
    ) -> Option<PhysicalSize> {
        self.scale_factor = scale_factor;
        self.handle_resize(physical_width, physical_height)
    }

    pub fn physical_size(&self) -> PhysicalSize {
        PhysicalSize {
            width: self.physical_width,
            height: self.physical_height,
        }
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Width over height of the drawable area.
    pub fn aspect_ratio(&self) -> f32 {
        self.physical_width as f32 / self.physical_height as f32
    }

    pub fn is_drawable(&self) -> bool {
        self.drawable
    }
}
