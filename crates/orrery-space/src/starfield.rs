//! Procedural star shells: each layer is a thick spherical shell of points
//! around the origin, rendered as additive point sprites.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::color::Rgb;

/// Parameters for one star shell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarLayerParams {
    pub count: u32,
    /// Nominal shell radius. Points land in `[0.6, 1.4) * radius`.
    pub radius: f32,
    /// World-space sprite size.
    pub size: f32,
    pub opacity: f32,
    pub color_a: Rgb,
    pub color_b: Rgb,
    /// Multiplier applied to the pointer offset when shifting this layer.
    pub parallax_factor: f32,
}

impl StarLayerParams {
    /// The four shells of the default scene, nearest first.
    pub fn defaults() -> [StarLayerParams; 4] {
        [
            Self::from_hex(8000, 200.0, 0.05, 0.8, 0xffffff, 0x88bbff, 0.8),
            Self::from_hex(5000, 350.0, 0.08, 0.4, 0xffeedd, 0x99aaff, 0.5),
            Self::from_hex(9000, 450.0, 0.055, 0.35, 0xfff2dd, 0xaaccff, 0.25),
            Self::from_hex(12000, 600.0, 0.035, 0.18, 0x8899ff, 0xffffff, 0.12),
        ]
    }

    /// Build params from sRGB hex endpoint colors.
    #[allow(clippy::too_many_arguments)]
    pub fn from_hex(
        count: u32,
        radius: f32,
        size: f32,
        opacity: f32,
        color_a: u32,
        color_b: u32,
        parallax_factor: f32,
    ) -> Self {
        Self {
            count,
            radius,
            size,
            opacity,
            color_a: Rgb::from_hex(color_a),
            color_b: Rgb::from_hex(color_b),
            parallax_factor,
        }
    }
}

/// Position on a shell from three uniform samples in `[0, 1)`.
///
/// `u` picks the radius, `t` the azimuth and `v` the cosine of the polar angle,
/// which spreads points uniformly over solid angle.
pub fn shell_point(radius: f32, u: f32, t: f32, v: f32) -> glam::Vec3 {
    let r = radius * (0.6 + 0.8 * u);
    let theta = t * std::f32::consts::TAU;
    let phi = (2.0 * v - 1.0).clamp(-1.0, 1.0).acos();
    glam::Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos(),
    )
}

/// A generated star shell: flat position and color buffers plus its params.
#[derive(Clone, Debug)]
pub struct StarLayer {
    params: StarLayerParams,
    /// `x, y, z` per star.
    positions: Vec<f32>,
    /// Linear `r, g, b` per star.
    colors: Vec<f32>,
}

impl StarLayer {
    /// Generate a layer. Four draws per star, in order: radius, azimuth,
    /// polar, color mix. The same RNG state always gives the same layer.
    pub fn generate<R: Rng + ?Sized>(params: StarLayerParams, rng: &mut R) -> Self {
        let n = params.count as usize;
        let mut positions = Vec::with_capacity(n * 3);
        let mut colors = Vec::with_capacity(n * 3);

        for _ in 0..n {
            let u: f32 = rng.random();
            let t: f32 = rng.random();
            let v: f32 = rng.random();
            let p = shell_point(params.radius, u, t, v);
            positions.extend_from_slice(&[p.x, p.y, p.z]);

            let k: f32 = rng.random();
            let c = Rgb::lerp(params.color_a, params.color_b, k);
            colors.extend_from_slice(&[c.r, c.g, c.b]);
        }

        Self {
            params,
            positions,
            colors,
        }
    }

    pub fn params(&self) -> &StarLayerParams {
        &self.params
    }

    pub fn count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn position(&self, i: usize) -> glam::Vec3 {
        glam::Vec3::from_slice(&self.positions[i * 3..i * 3 + 3])
    }

    pub fn color(&self, i: usize) -> Rgb {
        let c = &self.colors[i * 3..i * 3 + 3];
        Rgb::new(c[0], c[1], c[2])
    }
}

/// All star shells of the scene, generated from a single seed.
#[derive(Clone, Debug)]
pub struct Starfield {
    layers: Vec<StarLayer>,
}

impl Starfield {
    /// Each layer draws from its own ChaCha stream, so changing one layer's
    /// count does not reshuffle the others.
    pub fn generate(seed: u64, params: &[StarLayerParams]) -> Self {
        let layers = params
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(i as u64);
                StarLayer::generate(*p, &mut rng)
            })
            .collect::<Vec<_>>();

        log::info!(
            "Generated {} star layers ({} stars, seed {seed:#x})",
            layers.len(),
            layers.iter().map(StarLayer::count).sum::<usize>()
        );

        Self { layers }
    }

    pub fn layers(&self) -> &[StarLayer] {
        &self.layers
    }

    pub fn parallax_factors(&self) -> Vec<f32> {
        self.layers
            .iter()
            .map(|l| l.params.parallax_factor)
            .collect()
    }
}
