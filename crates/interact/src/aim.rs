use cavern_common::InteractionConfig;
use cavern_render::{CaveCamera, Ray};
use glam::Vec3;

/// The hand-held spotlight. Its target chases the pointer; its body trails
/// the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Torch {
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for Torch {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 3.0, 3.0),
            target: Vec3::ZERO,
        }
    }
}

impl Torch {
    /// Point at a fixed distance along the pointer ray.
    pub fn raw_target(ray: &Ray, config: &InteractionConfig) -> Vec3 {
        ray.at(config.aim_distance)
    }

    /// One frame of smoothing toward the pointer and the camera.
    pub fn follow(&mut self, camera: &CaveCamera, ray: &Ray, config: &InteractionConfig) {
        self.target = self.target.lerp(Self::raw_target(ray, config), config.aim_lerp);
        let rest = camera.position + Vec3::Y * config.torch_height;
        self.position = self.position.lerp(rest, config.torch_lerp);
    }

    /// Where the visible marker is drawn.
    pub fn marker(&self) -> Vec3 {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn raw_target_is_six_units_out() {
        let cam = CaveCamera::default();
        let ray = cam.ray_through(Vec2::ZERO);
        let target = Torch::raw_target(&ray, &InteractionConfig::default());
        assert!((target.distance(cam.position) - 6.0).abs() < 1e-4);
    }

    #[test]
    fn target_covers_sixty_percent_per_frame() {
        let config = InteractionConfig::default();
        let cam = CaveCamera::default();
        let ray = cam.ray_through(Vec2::ZERO);
        let raw = Torch::raw_target(&ray, &config);
        let mut torch = Torch::default();
        torch.follow(&cam, &ray, &config);
        let expected = raw * 0.6;
        assert!((torch.target - expected).length() < 1e-4);
        assert_eq!(torch.marker(), torch.target);
    }

    #[test]
    fn torch_converges_above_camera() {
        let config = InteractionConfig::default();
        let cam = CaveCamera::default();
        let ray = cam.ray_through(Vec2::new(0.5, 0.5));
        let mut torch = Torch::default();
        for _ in 0..200 {
            torch.follow(&cam, &ray, &config);
        }
        let rest = cam.position + Vec3::new(0.0, 0.6, 0.0);
        assert!((torch.position - rest).length() < 1e-3);
        assert!((torch.target - Torch::raw_target(&ray, &config)).length() < 1e-3);
    }
}
