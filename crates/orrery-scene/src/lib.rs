//! The animated scene: where every body sits, and how it moves from one frame
//! to the next.
//!
//! [`FrameUpdater::advance`] is a pure function of the previous
//! [`SceneState`], an [`InputSnapshot`](orrery_input::InputSnapshot) and the
//! frame duration. [`SceneLayout`] turns a state into world transforms and
//! material parameters for the renderer.

pub mod layout;
pub mod state;
pub mod update;

pub use layout::{BodyTransforms, Lighting, SceneLayout};
pub use state::{BodySpins, CameraRig, PulsePhase, SceneState, wrap_angle};
pub use update::{FrameUpdater, TimingMode};
