//! Unit UV sphere.
//!
//! Longitude runs with `u` and latitude with `v`; `v = 0` is the +Y pole and
//! the top row of an equirectangular image. The direction for `(u, v)` is
//! `(-cos(2πu)·sin(πv), cos(πv), sin(2πu)·sin(πv))`, the same mapping the
//! procedural nebula bakes with. Triangles wind counter-clockwise seen from
//! outside.

use std::f32::consts::{PI, TAU};

use crate::buffer::VertexPositionNormalUv;

#[derive(Debug, Clone)]
pub struct SphereMesh {
    pub vertices: Vec<VertexPositionNormalUv>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    /// `width_segments` around the equator, `height_segments` pole to pole.
    /// Both are raised to their minimums (3 and 2).
    pub fn uv(width_segments: u32, height_segments: u32) -> Self {
        let w = width_segments.max(3);
        let h = height_segments.max(2);

        let mut vertices = Vec::with_capacity(((w + 1) * (h + 1)) as usize);
        for iy in 0..=h {
            let v = iy as f32 / h as f32;
            // Pole vertices sit half a segment over so each pole triangle
            // samples the middle of its texel column.
            let u_offset = match iy {
                0 => 0.5 / w as f32,
                _ if iy == h => -0.5 / w as f32,
                _ => 0.0,
            };
            for ix in 0..=w {
                let u = ix as f32 / w as f32;
                let (sin_lat, cos_lat) = (v * PI).sin_cos();
                let (sin_lon, cos_lon) = (u * TAU).sin_cos();
                let p = [-cos_lon * sin_lat, cos_lat, sin_lon * sin_lat];
                vertices.push(VertexPositionNormalUv {
                    position: p,
                    normal: p,
                    uv: [u + u_offset, v],
                });
            }
        }

        let row = w + 1;
        let mut indices = Vec::with_capacity((6 * w * (h - 1)) as usize);
        for iy in 0..h {
            for ix in 0..w {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                // The pole rows collapse to a point; skip their zero-area halves.
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != h - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_counts() {
        let mesh = SphereMesh::uv(64, 64);
        assert_eq!(mesh.vertices.len(), 65 * 65);
        assert_eq!(mesh.triangle_count(), 2 * 64 * 63);
    }

    #[test]
    fn test_minimum_segments() {
        let mesh = SphereMesh::uv(0, 0);
        assert_eq!(mesh.vertices.len(), 4 * 3);
        assert_eq!(mesh.triangle_count(), 2 * 3);
    }

    #[test]
    fn test_vertices_on_unit_sphere_with_outward_normals() {
        let mesh = SphereMesh::uv(32, 16);
        for v in &mesh.vertices {
            let p = Vec3::from(v.position);
            assert!((p.length() - 1.0).abs() < 1e-5);
            assert_eq!(v.position, v.normal);
        }
    }

    #[test]
    fn test_uv_mapping_convention() {
        let mesh = SphereMesh::uv(4, 2);
        // Top row is the +Y pole.
        assert!((Vec3::from(mesh.vertices[0].position) - Vec3::Y).length() < 1e-6);
        // Equator, u = 0 faces -X; u = 0.25 faces +Z.
        let equator = &mesh.vertices[5..10];
        assert!((Vec3::from(equator[0].position) - Vec3::NEG_X).length() < 1e-6);
        assert!((Vec3::from(equator[1].position) - Vec3::Z).length() < 1e-6);
        assert_eq!(equator[1].uv, [0.25, 0.5]);
    }

    #[test]
    fn test_triangles_face_outward() {
        let mesh = SphereMesh::uv(16, 8);
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(mesh.vertices[i as usize].position));
            let n = (b - a).cross(c - a);
            let centre = (a + b + c) / 3.0;
            assert!(n.dot(centre) > 0.0, "inward triangle {tri:?}");
        }
    }

    #[test]
    fn test_indices_in_range() {
        let mesh = SphereMesh::uv(12, 6);
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
    }
}
