//! Orrery application: window, event wiring, frame clock and the scene
//! renderer that ties the library crates together.

pub mod app;
pub mod audio_output;
pub mod frame_clock;
pub mod platform;
pub mod renderer;
pub mod scene_setup;

pub use app::{AppError, AppState, run};
pub use platform::{PlatformDirs, PlatformError};
