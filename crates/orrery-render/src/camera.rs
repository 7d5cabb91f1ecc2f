//! Look-at perspective camera with reverse-Z projection.

use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: std::f32::consts::FRAC_PI_4,
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    /// Unit vector from the eye toward the target.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Reverse-Z perspective: near maps to depth 1, `far` to 0.
    pub fn projection_with_far(&self, far: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, far, self.near)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_with_far(self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn ndc(m: Mat4, p: Vec3) -> Vec3 {
        let c = m * Vec4::new(p.x, p.y, p.z, 1.0);
        c.truncate() / c.w
    }

    #[test]
    fn test_forward_points_at_target() {
        let camera = Camera {
            position: Vec3::new(0.3, 0.2, 7.5),
            target: Vec3::new(-0.5, 0.0, 0.0),
            ..Camera::default()
        };
        let expected = (camera.target - camera.position).normalize();
        assert!((camera.forward() - expected).length() < 1e-6);
    }

    #[test]
    fn test_target_projects_to_screen_centre() {
        let camera = Camera {
            position: Vec3::new(0.3, 0.2, 7.5),
            target: Vec3::new(-0.5, 0.0, 0.0),
            ..Camera::default()
        };
        let p = ndc(camera.view_projection_matrix(), camera.target);
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5, "{p}");
    }

    #[test]
    fn test_reverse_z_depth_range() {
        let camera = Camera {
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            near: 0.1,
            far: 300.0,
            ..Camera::default()
        };
        let vp = camera.view_projection_matrix();
        assert!((ndc(vp, Vec3::new(0.0, 0.0, -0.1)).z - 1.0).abs() < 1e-4);
        assert!(ndc(vp, Vec3::new(0.0, 0.0, -300.0)).z.abs() < 1e-4);
        // Nearer is larger.
        assert!(ndc(vp, Vec3::new(0.0, 0.0, -5.0)).z > ndc(vp, Vec3::new(0.0, 0.0, -50.0)).z);
    }

    #[test]
    fn test_wider_far_keeps_distant_points_in_range() {
        let camera = Camera {
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            far: 300.0,
            ..Camera::default()
        };
        let point = Vec3::new(0.0, 0.0, -400.0);
        let clipped = ndc(camera.projection_matrix() * camera.view_matrix(), point);
        assert!(clipped.z < 0.0);
        let widened = ndc(camera.projection_with_far(1000.0) * camera.view_matrix(), point);
        assert!((0.0..=1.0).contains(&widened.z));
    }

    #[test]
    fn test_set_aspect_ratio_ignores_zero_height() {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(1920.0, 1080.0);
        assert!((camera.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
        camera.set_aspect_ratio(1920.0, 0.0);
        assert!((camera.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
    }
}
