//! Procedural nebula backdrop: layered simplex fBm baked into an
//! equirectangular RGBA8 image. Used on the nebula sphere until the nebula
//! image loads, and permanently if it fails.

use noise::{NoiseFn, Simplex};

/// One colored cloud layer.
#[derive(Clone, Debug)]
pub struct NebulaLayer {
    /// Linear RGB tint.
    pub color: [f32; 3],
    /// Peak coverage of this layer.
    pub max_coverage: f32,
    /// Base noise frequency; lower gives larger clouds.
    pub frequency: f64,
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
    /// Shifts this layer's sample domain away from the others.
    pub offset: glam::DVec3,
}

#[derive(Clone, Debug)]
pub struct NebulaConfig {
    pub seed: u64,
    pub layers: Vec<NebulaLayer>,
    /// Power applied to normalized noise. Higher is sparser.
    pub wisp_exponent: f32,
    /// Gain from summed coverage to texel value. The sphere material multiplies
    /// by its own low opacity, so the bake is kept bright.
    pub exposure: f32,
}

impl Default for NebulaConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            layers: vec![
                // Deep blue body
                NebulaLayer {
                    color: [0.10, 0.18, 0.65],
                    max_coverage: 0.5,
                    frequency: 1.2,
                    octaves: 5,
                    persistence: 0.5,
                    lacunarity: 2.1,
                    offset: glam::DVec3::ZERO,
                },
                // Violet filaments
                NebulaLayer {
                    color: [0.42, 0.12, 0.62],
                    max_coverage: 0.35,
                    frequency: 2.2,
                    octaves: 4,
                    persistence: 0.45,
                    lacunarity: 2.3,
                    offset: glam::DVec3::new(73.0, 0.0, 0.0),
                },
                NebulaLayer {
                    color: [0.55, 0.65, 0.95],
                    max_coverage: 0.2,
                    frequency: 3.5,
                    octaves: 3,
                    persistence: 0.5,
                    lacunarity: 2.0,
                    offset: glam::DVec3::new(0.0, -41.0, 19.0),
                },
            ],
            wisp_exponent: 2.5,
            exposure: 1.6,
        }
    }
}

/// Unit direction for an equirectangular texel coordinate, using the same
/// convention as the UV sphere mesh: `u` wraps longitude, `v = 0` is `+Y`.
pub fn equirect_direction(u: f64, v: f64) -> glam::DVec3 {
    let lon = u * std::f64::consts::TAU;
    let lat = v * std::f64::consts::PI;
    glam::DVec3::new(-lon.cos() * lat.sin(), lat.cos(), lon.sin() * lat.sin())
}

pub struct NebulaGenerator {
    noise: Simplex,
    config: NebulaConfig,
}

impl NebulaGenerator {
    pub fn new(config: NebulaConfig) -> Self {
        // Simplex takes a u32 seed; fold the high bits in.
        let noise = Simplex::new((config.seed ^ (config.seed >> 32)) as u32);
        Self { noise, config }
    }

    fn fbm(&self, p: glam::DVec3, layer: &NebulaLayer) -> f64 {
        let mut total = 0.0;
        let mut frequency = layer.frequency;
        let mut amplitude = 1.0;
        for _ in 0..layer.octaves {
            let q = p * frequency + layer.offset;
            total += self.noise.get([q.x, q.y, q.z]) * amplitude;
            frequency *= layer.lacunarity;
            amplitude *= layer.persistence;
        }
        total
    }

    /// Composite all layers at a sky direction. Returns premultiplied RGBA
    /// with alpha clamped to `[0, 1]`.
    pub fn sample(&self, direction: glam::DVec3) -> [f32; 4] {
        let mut out = [0.0_f32; 4];
        for layer in &self.config.layers {
            let n = ((self.fbm(direction, layer) + 1.0) * 0.5).clamp(0.0, 1.0) as f32;
            let coverage = n.powf(self.config.wisp_exponent) * layer.max_coverage;
            out[0] += layer.color[0] * coverage;
            out[1] += layer.color[1] * coverage;
            out[2] += layer.color[2] * coverage;
            out[3] += coverage;
        }
        out[3] = out[3].clamp(0.0, 1.0);
        out
    }

    /// Bake a `width x height` equirectangular RGBA8 image, rows top to bottom.
    ///
    /// Sampling on the unit sphere keeps the `u = 0 / u = 1` seam continuous.
    pub fn bake_equirect(&self, width: u32, height: u32) -> Vec<u8> {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        let gain = self.config.exposure;
        for y in 0..height {
            let v = (y as f64 + 0.5) / height as f64;
            for x in 0..width {
                let u = (x as f64 + 0.5) / width as f64;
                let [r, g, b, a] = self.sample(equirect_direction(u, v));
                pixels.extend([r, g, b, a].map(|c| to_unorm8(c * gain)));
            }
        }
        log::info!("Baked {width}x{height} procedural nebula backdrop");
        pixels
    }
}

fn to_unorm8(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere_dirs(n: usize) -> impl Iterator<Item = glam::DVec3> {
        (0..n).map(move |i| {
            let t = i as f64 / n as f64;
            equirect_direction(t, (t * 7.31).fract())
        })
    }

    #[test]
    fn test_samples_finite_and_bounded() {
        let generator = NebulaGenerator::new(NebulaConfig::default());
        for dir in sphere_dirs(2000) {
            let c = generator.sample(dir);
            for (ch, v) in c.iter().enumerate() {
                assert!(v.is_finite(), "channel {ch} not finite");
                assert!(*v >= 0.0, "channel {ch} negative: {v}");
            }
            assert!(c[3] <= 1.0);
        }
    }

    #[test]
    fn test_coverage_is_patchy() {
        let generator = NebulaGenerator::new(NebulaConfig::default());
        let mut alphas: Vec<f32> = sphere_dirs(3000).map(|d| generator.sample(d)[3]).collect();
        alphas.sort_by(f32::total_cmp);
        let median = alphas[alphas.len() / 2];
        let max = alphas[alphas.len() - 1];
        assert!(
            median < max * 0.6,
            "median coverage {median} too close to max {max}"
        );
    }

    #[test]
    fn test_equirect_direction_is_unit_and_poles() {
        for dir in sphere_dirs(500) {
            assert!((dir.length() - 1.0).abs() < 1e-9);
        }
        assert!((equirect_direction(0.3, 0.0) - glam::DVec3::Y).length() < 1e-9);
        assert!((equirect_direction(0.8, 1.0) + glam::DVec3::Y).length() < 1e-9);
    }

    #[test]
    fn test_bake_size_and_not_black() {
        let generator = NebulaGenerator::new(NebulaConfig::default());
        let pixels = generator.bake_equirect(64, 32);
        assert_eq!(pixels.len(), 64 * 32 * 4);
        assert!(pixels.iter().any(|&p| p > 0), "bake is completely black");
    }

    #[test]
    fn test_bake_seam_is_continuous() {
        let generator = NebulaGenerator::new(NebulaConfig::default());
        let (w, h) = (256u32, 64u32);
        let pixels = generator.bake_equirect(w, h);
        let texel = |x: u32, y: u32| {
            let i = ((y * w + x) * 4) as usize;
            [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
        };
        let diff = |a: [u8; 4], b: [u8; 4]| -> f64 {
            (0..4).map(|ch| (a[ch] as f64 - b[ch] as f64).abs()).sum()
        };
        // The seam pair is as close on the sphere as any interior neighbour
        // pair, so on average it must not jump more than they do.
        let seam: f64 = (0..h).map(|y| diff(texel(0, y), texel(w - 1, y))).sum::<f64>() / h as f64;
        let mut interior = 0.0;
        for y in 0..h {
            for x in 0..w - 1 {
                interior += diff(texel(x, y), texel(x + 1, y));
            }
        }
        let interior = interior / (h * (w - 1)) as f64;
        assert!(
            seam <= interior * 2.0 + 2.0,
            "seam mean jump {seam} vs interior {interior}"
        );
    }

    #[test]
    fn test_seed_determinism() {
        let cfg = |seed| NebulaConfig {
            seed,
            ..Default::default()
        };
        let a = NebulaGenerator::new(cfg(42)).bake_equirect(16, 8);
        let b = NebulaGenerator::new(cfg(42)).bake_equirect(16, 8);
        let c = NebulaGenerator::new(cfg(9999)).bake_equirect(16, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
