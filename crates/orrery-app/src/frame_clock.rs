//! Wall-clock frame timing.
//!
//! The scene advances once per rendered frame, so there is no fixed-step
//! accumulator here: the clock measures each frame's duration and hands it to
//! the updater, which decides (through its timing mode) whether to use it.

use std::time::Instant;
use tracing::warn;

/// Longest frame duration passed on. A window that was hidden or dragged
/// would otherwise make delta-scaled motion jump.
pub const MAX_FRAME_TIME: f64 = 0.25;

pub struct FrameClock {
    previous_time: Instant,
    frame_count: u64,
    total_time: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            previous_time: Instant::now(),
            frame_count: 0,
            total_time: 0.0,
        }
    }

    /// Measure the time since the previous tick and return it in seconds,
    /// clamped to [`MAX_FRAME_TIME`].
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.previous_time).as_secs_f64();
        self.previous_time = now;
        self.advance(frame_time) as f32
    }

    fn advance(&mut self, frame_time: f64) -> f64 {
        let frame_time = if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            MAX_FRAME_TIME
        } else {
            frame_time.max(0.0)
        };
        self.total_time += frame_time;
        self.frame_count += 1;
        frame_time
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Sum of all clamped frame durations.
    pub fn total_time(&self) -> f64 {
        self.total_time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
