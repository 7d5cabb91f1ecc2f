//! Per-frame scene state produced by the frame updater.

use std::f64::consts::TAU;

use glam::{Vec2, Vec3};

/// Camera distance from the origin before any scrolling.
pub const CAMERA_REST_Z: f32 = 7.5;

/// An accumulated angle as an `f32` rotation in `[0, TAU)`.
///
/// Accumulators are `f64` so that per-frame increments keep registering
/// after days of uptime; they are reduced here before reaching `f32` math.
pub fn wrap_angle(angle: f64) -> f32 {
    angle.rem_euclid(TAU) as f32
}

/// Accumulated rotation angles in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodySpins {
    /// Earth about its local Y axis.
    pub earth: f64,
    pub clouds: f64,
    /// Moon orbit pivot about Y.
    pub moon_pivot: f64,
    /// Moon self-rotation about Y.
    pub moon: f64,
    /// Whole star group about Y. Decreases over time.
    pub stars: f64,
    /// Nebula sphere about Z.
    pub nebula: f64,
}

/// Drifting camera: a slow orbit angle plus a smoothed dolly distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    /// Monotonically increasing orbit accumulator.
    pub angle: f64,
    pub position: Vec3,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            angle: 0.0,
            position: Vec3::new(0.0, 0.0, CAMERA_REST_Z),
        }
    }
}

/// Phase accumulator behind the atmosphere's breathing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PulsePhase(pub f64);

impl PulsePhase {
    pub const BASE_OPACITY: f32 = 0.1;
    pub const AMPLITUDE: f32 = 0.03;

    /// Atmosphere opacity for this phase, always in `[0.07, 0.13]`.
    pub fn opacity(self) -> f32 {
        Self::BASE_OPACITY + self.0.sin() as f32 * Self::AMPLITUDE
    }
}

/// Everything that changes between frames.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    /// Number of updates applied since start.
    pub tick: u64,
    pub spins: BodySpins,
    pub camera: CameraRig,
    pub pulse: PulsePhase,
    /// Local offset of each star layer, one per layer in generation order.
    pub layer_offsets: Vec<Vec2>,
    pub atmosphere_opacity: f32,
}

impl SceneState {
    /// State before the first frame, with `layer_count` star layers at rest.
    pub fn initial(layer_count: usize) -> Self {
        Self {
            tick: 0,
            spins: BodySpins::default(),
            camera: CameraRig::default(),
            pulse: PulsePhase::default(),
            layer_offsets: vec![Vec2::ZERO; layer_count],
            atmosphere_opacity: PulsePhase::BASE_OPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let s = SceneState::initial(4);
        assert_eq!(s.tick, 0);
        assert_eq!(s.camera.position, Vec3::new(0.0, 0.0, 7.5));
        assert_eq!(s.layer_offsets.len(), 4);
        assert_eq!(s.atmosphere_opacity, 0.1);
    }

    #[test]
    fn test_wrap_angle() {
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!((wrap_angle(TAU + 0.5) - 0.5).abs() < 1e-6);
        assert!((wrap_angle(-0.25) - (TAU - 0.25) as f32).abs() < 1e-6);
        let far = 4100.0 + 0.0002;
        assert!((wrap_angle(far) - wrap_angle(4100.0) - 0.0002).abs() < 1e-5);
    }

    #[test]
    fn test_pulse_opacity_bounds() {
        for i in 0..10_000 {
            let phase = PulsePhase(i as f64 * 0.012);
            let o = phase.opacity();
            assert!((0.07 - 1e-6..=0.13 + 1e-6).contains(&o), "phase {} -> {o}", phase.0);
        }
        // Late in a long run the phase is large but the pulse still moves.
        let late = PulsePhase(1.0e6);
        assert_ne!(late.opacity(), PulsePhase(1.0e6 + 0.012).opacity());
        // Extremes of sin.
        let peak = PulsePhase(std::f64::consts::FRAC_PI_2).opacity();
        assert!((peak - 0.13).abs() < 1e-6);
        let trough = PulsePhase(-std::f64::consts::FRAC_PI_2).opacity();
        assert!((trough - 0.07).abs() < 1e-6);
    }
}
