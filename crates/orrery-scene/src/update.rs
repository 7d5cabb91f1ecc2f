//! The per-frame update: spins, parallax, camera drift and dolly, atmosphere
//! pulse. No I/O and no hidden state; the same inputs give the same output.

use glam::{Vec2, Vec3};
use orrery_input::InputSnapshot;

use crate::state::{CAMERA_REST_Z, PulsePhase, SceneState};

/// Per-frame increments, in radians.
pub const EARTH_SPIN: f64 = 0.0008;
pub const CLOUD_SPIN: f64 = 0.0011;
pub const MOON_ORBIT: f64 = 0.002;
pub const MOON_SPIN: f64 = 0.001;
pub const STAR_DRIFT: f64 = -0.0001;
pub const NEBULA_ROLL: f64 = 0.00005;
pub const CAMERA_ORBIT: f64 = 0.0002;
pub const PULSE_RATE: f64 = 0.012;

/// Fraction of the remaining dolly distance covered per frame.
pub const DOLLY_EASE: f32 = 0.05;
/// How far the camera moves in at full scroll.
pub const DOLLY_RANGE: f32 = 3.0;

const DRIFT_X: f64 = 0.3;
const DRIFT_Y: f64 = 0.2;
/// Vertical drift runs slower than horizontal, giving the Lissajous path.
const DRIFT_Y_RATE: f64 = 0.8;

/// How animation increments relate to wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TimingMode {
    /// One fixed increment per update; `dt` is ignored. Motion speed follows
    /// the display refresh rate.
    #[default]
    PerFrame,
    /// Increments scale with `dt * reference_hz`, so motion matches
    /// [`PerFrame`](Self::PerFrame) at `reference_hz` and keeps the same
    /// speed at any other rate.
    DeltaScaled { reference_hz: f32 },
}

impl TimingMode {
    /// Number of reference frames this update stands for.
    pub fn steps(self, dt: f32) -> f32 {
        match self {
            TimingMode::PerFrame => 1.0,
            TimingMode::DeltaScaled { reference_hz } => {
                let s = dt * reference_hz;
                if s.is_finite() { s.max(0.0) } else { 0.0 }
            }
        }
    }

    /// Easing fraction equivalent to `steps` per-frame eases of `base`.
    /// Stays in `[0, 1]`, so the eased value never passes its target.
    pub fn ease(self, base: f32, steps: f32) -> f32 {
        match self {
            TimingMode::PerFrame => base,
            TimingMode::DeltaScaled { .. } => 1.0 - (1.0 - base).powf(steps),
        }
    }
}

/// Produces the next [`SceneState`] from the previous one.
#[derive(Debug, Clone)]
pub struct FrameUpdater {
    timing: TimingMode,
    /// One factor per star layer, nearest layer first.
    parallax_factors: Vec<f32>,
    look_at: Vec3,
}

impl FrameUpdater {
    pub fn new(timing: TimingMode, parallax_factors: Vec<f32>) -> Self {
        log::debug!(
            "Frame updater: {timing:?}, {} parallax layers",
            parallax_factors.len()
        );
        Self {
            timing,
            parallax_factors,
            look_at: crate::layout::CAMERA_TARGET,
        }
    }

    pub fn timing(&self) -> TimingMode {
        self.timing
    }

    /// Fixed point the camera looks at.
    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    /// Advance one frame.
    pub fn advance(&self, prev: &SceneState, input: InputSnapshot, dt: f32) -> SceneState {
        let steps = self.timing.steps(dt);
        let angle_steps = f64::from(steps);
        let pointer = input.pointer_offset;

        let mut spins = prev.spins;
        spins.earth += EARTH_SPIN * angle_steps;
        spins.clouds += CLOUD_SPIN * angle_steps;
        spins.moon_pivot += MOON_ORBIT * angle_steps;
        spins.moon += MOON_SPIN * angle_steps;
        spins.stars += STAR_DRIFT * angle_steps;
        spins.nebula += NEBULA_ROLL * angle_steps;

        let layer_offsets = self
            .parallax_factors
            .iter()
            .map(|&f| parallax_offset(pointer, f))
            .collect();

        let mut camera = prev.camera;
        camera.angle += CAMERA_ORBIT * angle_steps;
        camera.position.x = (camera.angle.sin() * DRIFT_X) as f32 + pointer.x;
        camera.position.y = ((camera.angle * DRIFT_Y_RATE).cos() * DRIFT_Y) as f32 + pointer.y;
        let target = dolly_target(input.scroll_progress);
        let ease = self.timing.ease(DOLLY_EASE, steps);
        camera.position.z += (target - camera.position.z) * ease;

        let pulse = PulsePhase(prev.pulse.0 + PULSE_RATE * angle_steps);

        SceneState {
            tick: prev.tick + 1,
            spins,
            camera,
            pulse,
            layer_offsets,
            atmosphere_opacity: pulse.opacity(),
        }
    }
}

/// Layer shift against the pointer, scaled by the layer's parallax factor.
pub fn parallax_offset(pointer: Vec2, factor: f32) -> Vec2 {
    -pointer * factor
}

/// Camera distance the dolly eases toward for a scroll progress in `[0, 1]`.
pub fn dolly_target(scroll_progress: f32) -> f32 {
    CAMERA_REST_Z - scroll_progress * DOLLY_RANGE
}
