use crate::picking::Ray;
use glam::{Mat4, Vec2, Vec3};

/// Fixed perspective camera looking into the cave, with a slow sideways sway.
/// Camera motion is presentation only; nothing in the population depends on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaveCamera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub sway_amplitude: f32,
    pub sway_rate: f32,
}

impl Default for CaveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.6, 5.0),
            target: Vec3::new(0.0, 0.6, -6.0),
            fov: 52.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 200.0,
            sway_amplitude: 0.06,
            sway_rate: 0.05,
        }
    }
}

impl CaveCamera {
    /// Recompute the aspect ratio from a surface size. Zero sizes are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Apply the idle sway for absolute time `t`.
    pub fn sway(&mut self, t: f32) {
        self.position.x = (t * self.sway_rate).sin() * self.sway_amplitude;
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray from the camera through a pointer position in
    /// normalized device coordinates (x right, y up, both in [-1, 1]).
    pub fn ray_through(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let on_frustum = inverse.project_point3(ndc.extend(0.5));
        Ray::new(self.position, on_frustum - self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_looks_into_the_cave() {
        let cam = CaveCamera::default();
        assert!(cam.forward().z < 0.0);
        assert!(!cam.view_projection().col(0).x.is_nan());
    }

    #[test]
    fn center_ray_follows_forward() {
        let cam = CaveCamera::default();
        let ray = cam.ray_through(Vec2::ZERO);
        assert!((ray.direction - cam.forward()).length() < 1e-4);
        assert_eq!(ray.origin, cam.position);
    }

    #[test]
    fn pointer_right_turns_ray_right() {
        let cam = CaveCamera::default();
        let ray = cam.ray_through(Vec2::new(0.8, 0.0));
        assert!(ray.direction.x > 0.1);
        let up = cam.ray_through(Vec2::new(0.0, 0.8));
        assert!(up.direction.y > cam.forward().y);
    }

    #[test]
    fn rays_are_normalized() {
        let cam = CaveCamera::default();
        for ndc in [Vec2::new(-1.0, -1.0), Vec2::new(0.3, 0.9), Vec2::new(1.0, -0.2)] {
            assert!((cam.ray_through(ndc).direction.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn viewport_updates_aspect_only() {
        let mut cam = CaveCamera::default();
        let before = cam;
        cam.set_viewport(800, 400);
        assert_eq!(cam.aspect, 2.0);
        assert_eq!(cam.fov, before.fov);
        assert_eq!(cam.position, before.position);
        cam.set_viewport(0, 400);
        assert_eq!(cam.aspect, 2.0);
    }

    #[test]
    fn sway_is_small_and_horizontal() {
        let mut cam = CaveCamera::default();
        for i in 0..100 {
            cam.sway(i as f32 * 3.7);
            assert!(cam.position.x.abs() <= 0.06 + 1e-6);
            assert_eq!(cam.position.y, 1.6);
        }
    }
}
