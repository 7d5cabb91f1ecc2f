//! ACES filmic tone mapping, shared by every shader.
//!
//! Shaders output linear color to an sRGB target; the curve runs in the
//! fragment stage before blending, and the hardware handles the sRGB encode.

use glam::{Mat3, Vec3};

/// WGSL source for `tone_map(color, exposure)`. Prepended to each shader.
pub const TONE_MAP_WGSL: &str = r#"
fn rrt_and_odt_fit(v: vec3<f32>) -> vec3<f32> {
    let a = v * (v + 0.0245786) - 0.000090537;
    let b = v * (0.983729 * v + 0.4329510) + 0.238081;
    return a / b;
}

fn tone_map(color: vec3<f32>, exposure: f32) -> vec3<f32> {
    let aces_in = mat3x3<f32>(
        vec3<f32>(0.59719, 0.07600, 0.02840),
        vec3<f32>(0.35458, 0.90834, 0.13383),
        vec3<f32>(0.04823, 0.01566, 0.83777),
    );
    let aces_out = mat3x3<f32>(
        vec3<f32>(1.60475, -0.10208, -0.00327),
        vec3<f32>(-0.53108, 1.10813, -0.07276),
        vec3<f32>(-0.07367, -0.00605, 1.07602),
    );
    var c = color * (exposure / 0.6);
    c = aces_in * c;
    c = rrt_and_odt_fit(c);
    c = aces_out * c;
    return clamp(c, vec3<f32>(0.0), vec3<f32>(1.0));
}
"#;

const ACES_IN: Mat3 = Mat3::from_cols(
    Vec3::new(0.59719, 0.07600, 0.02840),
    Vec3::new(0.35458, 0.90834, 0.13383),
    Vec3::new(0.04823, 0.01566, 0.83777),
);

const ACES_OUT: Mat3 = Mat3::from_cols(
    Vec3::new(1.60475, -0.10208, -0.00327),
    Vec3::new(-0.53108, 1.10813, -0.07276),
    Vec3::new(-0.07367, -0.00605, 1.07602),
);

/// CPU mirror of the shader curve.
pub fn tone_map(color: Vec3, exposure: f32) -> Vec3 {
    let c = ACES_IN * (color * (exposure / 0.6));
    let a = c * (c + 0.0245786) - 0.000090537;
    let b = c * (0.983729 * c + 0.4329510) + 0.238081;
    (ACES_OUT * (a / b)).clamp(Vec3::ZERO, Vec3::ONE)
}
