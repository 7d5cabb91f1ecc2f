//! GPU-side uniform blocks. Field order and padding match the WGSL structs
//! in the pipeline shaders.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Lights in world space, linear color with intensity folded in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    pub ambient: Vec3,
    /// Unit vector toward the directional light.
    pub sun_direction: Vec3,
    pub sun_color: Vec3,
    pub rim_position: Vec3,
    pub rim_color: Vec3,
    /// Unit cone axis of the spot light.
    pub rim_axis: Vec3,
    /// Cosine of the spot light's half angle.
    pub rim_cone_cos: f32,
}

/// Per-frame view data shared by all pipelines (group 0).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FrameUniform {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    /// Projection with the far plane pushed out for the backdrop.
    pub backdrop_proj: [[f32; 4]; 4],
    /// xyz: eye position, w: exposure.
    pub camera_position: [f32; 4],
    /// xy: viewport size in pixels.
    pub viewport: [f32; 4],
    pub ambient: [f32; 4],
    pub sun_direction: [f32; 4],
    pub sun_color: [f32; 4],
    /// xyz: position, w: cone cosine.
    pub rim_position: [f32; 4],
    pub rim_color: [f32; 4],
    pub rim_axis: [f32; 4],
}

impl FrameUniform {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        view: Mat4,
        proj: Mat4,
        backdrop_proj: Mat4,
        eye: Vec3,
        exposure: f32,
        viewport: (u32, u32),
        lights: &LightRig,
    ) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            backdrop_proj: backdrop_proj.to_cols_array_2d(),
            camera_position: eye.extend(exposure).to_array(),
            viewport: [viewport.0 as f32, viewport.1 as f32, 0.0, 0.0],
            ambient: lights.ambient.extend(0.0).to_array(),
            sun_direction: lights.sun_direction.extend(0.0).to_array(),
            sun_color: lights.sun_color.extend(0.0).to_array(),
            rim_position: lights.rim_position.extend(lights.rim_cone_cos).to_array(),
            rim_color: lights.rim_color.extend(0.0).to_array(),
            rim_axis: lights.rim_axis.extend(0.0).to_array(),
        }
    }
}

/// Scalar surface settings for one drawable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMaterial {
    /// Linear RGB multiplier on the color map.
    pub tint: Vec3,
    pub opacity: f32,
    pub shininess: f32,
    pub specular: f32,
    pub bump_scale: f32,
    pub unlit: bool,
    pub normal_map: bool,
    pub bump_map: bool,
    pub specular_map: bool,
    /// Project with the backdrop far plane.
    pub backdrop: bool,
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self {
            tint: Vec3::ONE,
            opacity: 1.0,
            shininess: 0.0,
            specular: 0.0,
            bump_scale: 0.0,
            unlit: false,
            normal_map: false,
            bump_map: false,
            specular_map: false,
            backdrop: false,
        }
    }
}

fn flag(on: bool) -> f32 {
    if on { 1.0 } else { 0.0 }
}

/// Per-draw block for the surface pipeline (group 1).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    /// rgb: tint, a: opacity.
    pub tint: [f32; 4],
    /// shininess, specular, bump scale, unlit.
    pub params: [f32; 4],
    /// normal map, bump map, specular map, backdrop; each 0 or 1.
    pub flags: [f32; 4],
}

impl ObjectUniform {
    pub fn new(model: Mat4, material: &SurfaceMaterial) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            tint: material.tint.extend(material.opacity).to_array(),
            params: [
                material.shininess,
                material.specular,
                material.bump_scale,
                flag(material.unlit),
            ],
            flags: [
                flag(material.normal_map),
                flag(material.bump_map),
                flag(material.specular_map),
                flag(material.backdrop),
            ],
        }
    }
}

/// Per-layer block for the star pipeline (group 1).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct StarLayerUniform {
    pub model: [[f32; 4]; 4],
    /// x: world size, y: opacity.
    pub params: [f32; 4],
}

impl StarLayerUniform {
    pub fn new(model: Mat4, size: f32, opacity: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            params: [size, opacity, 0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<FrameUniform>(), 3 * 64 + 8 * 16);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 64 + 3 * 16);
        assert_eq!(std::mem::size_of::<StarLayerUniform>(), 80);
        for size in [
            std::mem::size_of::<FrameUniform>(),
            std::mem::size_of::<ObjectUniform>(),
            std::mem::size_of::<StarLayerUniform>(),
        ] {
            assert_eq!(size % 16, 0);
        }
    }

    #[test]
    fn test_object_uniform_packs_flags() {
        let material = SurfaceMaterial {
            opacity: 0.6,
            bump_scale: 0.07,
            unlit: true,
            bump_map: true,
            backdrop: true,
            ..SurfaceMaterial::default()
        };
        let u = ObjectUniform::new(Mat4::IDENTITY, &material);
        assert_eq!(u.tint, [1.0, 1.0, 1.0, 0.6]);
        assert_eq!(u.params, [0.0, 0.0, 0.07, 1.0]);
        assert_eq!(u.flags, [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_frame_uniform_packs_exposure_and_cone() {
        let lights = LightRig {
            ambient: Vec3::splat(0.01),
            sun_direction: Vec3::Y,
            sun_color: Vec3::ONE,
            rim_position: Vec3::new(-5.0, 5.0, -5.0),
            rim_color: Vec3::Z,
            rim_axis: Vec3::NEG_Y,
            rim_cone_cos: 0.5,
        };
        let u = FrameUniform::new(
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Vec3::new(0.0, 0.0, 7.5),
            1.2,
            (1280, 720),
            &lights,
        );
        assert_eq!(u.camera_position, [0.0, 0.0, 7.5, 1.2]);
        assert_eq!(u.viewport[..2], [1280.0, 720.0]);
        assert_eq!(u.rim_position, [-5.0, 5.0, -5.0, 0.5]);
    }
}
