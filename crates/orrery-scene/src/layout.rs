//! Fixed placement, sizes, materials and lights of the scene, and the
//! composition of per-body world transforms from a [`SceneState`].
//!
//! Hierarchy:
//!
//! ```text
//! earth group (x = -1.6)
//! ├── earth        spin Y
//! ├── clouds       spin Y
//! ├── atmosphere
//! └── moon pivot   tilt Z, spin Y
//!     └── moon     at x = 3.8, spin Y
//! star group       spin Y
//! └── layer i      offset by parallax
//! nebula           spin Z
//! ```

use glam::{Mat4, Quat, Vec3};
use orrery_space::Rgb;

use crate::state::{SceneState, wrap_angle};

pub const BACKGROUND: u32 = 0x020205;

pub const CAMERA_FOV_DEG: f32 = 45.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 300.0;
pub const CAMERA_TARGET: Vec3 = Vec3::new(-0.5, 0.0, 0.0);
/// Far plane used for the nebula and star shells, which reach past
/// `CAMERA_FAR`. Backdrop draws never write depth.
pub const BACKDROP_FAR: f32 = 1000.0;

pub const EARTH_GROUP_X: f32 = -1.6;
pub const EARTH_RADIUS: f32 = 1.6;
pub const CLOUD_RADIUS: f32 = 1.63;
pub const ATMOSPHERE_RADIUS: f32 = 1.75;
pub const BODY_SEGMENTS: u32 = 64;

pub const MOON_TILT: f32 = 0.2;
pub const MOON_DISTANCE: f32 = 3.8;
pub const MOON_RADIUS: f32 = 0.35;

pub const NEBULA_RADIUS: f32 = 400.0;
pub const NEBULA_SEGMENTS: u32 = 32;

pub const TONE_EXPOSURE: f32 = 1.2;

/// Surface parameters for one body. Maps and blending are chosen by the
/// renderer; these are the scalar knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    pub tint: Rgb,
    pub opacity: f32,
    /// Blinn-Phong exponent. Zero disables the specular term.
    pub shininess: f32,
    /// Strength of the specular term.
    pub specular: f32,
    /// Height scale for bump mapping.
    pub bump_scale: f32,
    /// Skip lighting and output `tint * texture` directly.
    pub unlit: bool,
}

impl MaterialParams {
    const fn lit(shininess: f32, specular: f32) -> Self {
        Self {
            tint: Rgb::WHITE,
            opacity: 1.0,
            shininess,
            specular,
            bump_scale: 0.0,
            unlit: false,
        }
    }
}

/// Earth surface. Roughness 0.5 with a faint metallic sheen, approximated
/// by a broad, weak highlight.
pub const EARTH_MATERIAL: MaterialParams = MaterialParams::lit(24.0, 0.25);

pub const CLOUD_MATERIAL: MaterialParams = MaterialParams {
    opacity: 0.6,
    ..MaterialParams::lit(0.0, 0.0)
};

pub const MOON_MATERIAL: MaterialParams = MaterialParams {
    bump_scale: 0.07,
    ..MaterialParams::lit(8.0, 0.5)
};

pub const NEBULA_MATERIAL: MaterialParams = MaterialParams {
    opacity: 0.13,
    unlit: true,
    ..MaterialParams::lit(0.0, 0.0)
};

/// Atmosphere material; its opacity is replaced every frame by the pulse.
pub fn atmosphere_material(opacity: f32) -> MaterialParams {
    MaterialParams {
        tint: Rgb::from_hex(0x3a7cbd),
        opacity,
        unlit: true,
        ..MaterialParams::lit(0.0, 0.0)
    }
}

/// Scene lights in linear color, intensities folded in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: Vec3,
    /// Unit vector pointing from the surface toward the sun.
    pub sun_direction: Vec3,
    pub sun_color: Vec3,
    pub rim_position: Vec3,
    pub rim_color: Vec3,
    /// Unit vector along the rim light's cone axis.
    pub rim_axis: Vec3,
}

impl Default for Lighting {
    fn default() -> Self {
        let rim_position = Vec3::new(-5.0, 5.0, -5.0);
        Self {
            ambient: Vec3::from(Rgb::from_hex(0x111122)) * 0.2,
            sun_direction: Vec3::new(10.0, 5.0, 5.0).normalize(),
            sun_color: Vec3::from(Rgb::WHITE) * 2.5,
            rim_position,
            rim_color: Vec3::from(Rgb::from_hex(0x4455ff)) * 5.0,
            rim_axis: (Vec3::ZERO - rim_position).normalize(),
        }
    }
}

/// World matrices for every drawable, unit-sphere meshes scaled to size.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyTransforms {
    pub earth: Mat4,
    pub clouds: Mat4,
    pub atmosphere: Mat4,
    pub moon: Mat4,
    pub nebula: Mat4,
    /// One per star layer; star positions are already in world units.
    pub star_layers: Vec<Mat4>,
}

/// Static description of the scene.
#[derive(Debug, Clone, Default)]
pub struct SceneLayout {
    pub lighting: Lighting,
}

impl SceneLayout {
    pub fn background(&self) -> Rgb {
        Rgb::from_hex(BACKGROUND)
    }

    pub fn body_transforms(&self, state: &SceneState) -> BodyTransforms {
        let spins = &state.spins;
        let group = Mat4::from_translation(Vec3::new(EARTH_GROUP_X, 0.0, 0.0));

        let earth = group * spun_sphere(wrap_angle(spins.earth), EARTH_RADIUS);
        let clouds = group * spun_sphere(wrap_angle(spins.clouds), CLOUD_RADIUS);
        let atmosphere = group * Mat4::from_scale(Vec3::splat(ATMOSPHERE_RADIUS));

        // XYZ Euler order: the tilt applies in the pivot's spun frame.
        let pivot_rotation =
            Quat::from_rotation_y(wrap_angle(spins.moon_pivot)) * Quat::from_rotation_z(MOON_TILT);
        let pivot = group * Mat4::from_quat(pivot_rotation);
        let moon = pivot
            * Mat4::from_translation(Vec3::new(MOON_DISTANCE, 0.0, 0.0))
            * spun_sphere(wrap_angle(spins.moon), MOON_RADIUS);

        let nebula =
            Mat4::from_rotation_z(wrap_angle(spins.nebula)) * Mat4::from_scale(Vec3::splat(NEBULA_RADIUS));

        let star_group = Mat4::from_rotation_y(wrap_angle(spins.stars));
        let star_layers = state
            .layer_offsets
            .iter()
            .map(|o| star_group * Mat4::from_translation(o.extend(0.0)))
            .collect();

        BodyTransforms {
            earth,
            clouds,
            atmosphere,
            moon,
            nebula,
            star_layers,
        }
    }
}

fn spun_sphere(angle: f32, radius: f32) -> Mat4 {
    Mat4::from_rotation_y(angle) * Mat4::from_scale(Vec3::splat(radius))
}
