//! Space backdrop: procedural star shells, color math, and the nebula backdrop texture.

pub mod color;
pub mod nebula;
pub mod starfield;

pub use color::{Rgb, srgb_to_linear};
pub use nebula::{NebulaConfig, NebulaGenerator, NebulaLayer, equirect_direction};
pub use starfield::{StarLayer, StarLayerParams, Starfield, shell_point};
