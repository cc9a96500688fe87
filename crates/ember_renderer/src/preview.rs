//! Single-bounce preview: one scatter, then straight to the background.

use std::sync::Arc;

use crate::camera::Camera;
use crate::framebuffer::Framebuffer;
use crate::hittable::Hittable;
use crate::integrator::{sample_pixel, PixelRenderer};
use crate::scene::Scene;
use crate::viewport::Viewport;
use ember_math::{Color, Interval, Ray};
use rand::RngCore;

#[derive(Debug, Clone, Copy)]
pub struct PreviewSettings {
    pub samples_per_pixel: u32,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            samples_per_pixel: 100,
        }
    }
}

/// Fast look-development integrator. Lights show up only where they are
/// seen directly.
pub struct Preview {
    scene: Arc<Scene>,
    camera: Camera,
    target: Arc<dyn Framebuffer>,
    settings: PreviewSettings,
}

impl Preview {
    pub fn new(scene: Arc<Scene>, camera: Camera, target: Arc<dyn Framebuffer>) -> Self {
        Self {
            scene,
            camera,
            target,
            settings: PreviewSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: PreviewSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn shade(&self, ray: &Ray, rng: &mut dyn RngCore) -> Color {
        let background = self.scene.background();
        match self.scene.hit(ray, Interval::from_min(0.001)) {
            Some(rec) => {
                let emission = rec.emitted();
                match rec.scatter(ray, rng) {
                    Some(s) => emission + s.attenuation * background.sample(s.scattered.direction()),
                    None => emission,
                }
            }
            None => background.sample(ray.direction()),
        }
    }
}

impl PixelRenderer for Preview {
    fn viewport(&self) -> Viewport {
        Viewport::new(self.target.width(), self.target.height())
    }

    fn render_pixel(&self, col: u32, row: u32, rng: &mut dyn RngCore) {
        let color = sample_pixel(
            self.viewport(),
            col,
            row,
            self.settings.samples_per_pixel,
            rng,
            |u, v, rng| self.shade(&self.camera.get_ray(u, v, true, rng), rng),
        );
        self.target.store(col, row, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Background, Image, Metal, Sphere};
    use ember_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_mirror_shows_background() {
        // Looking down at a mirror reflects the top of the sky.
        let scene = Scene::new(Background::new(Color::ZERO, Color::new(0.2, 0.4, 0.8)))
            .with_object(Sphere::new(Vec3::ZERO, 1.0).with_material(Arc::new(Metal::new(Color::ONE, 0.0))));
        let camera = Camera::look_at(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, Vec3::Z, 20.0, 1.0);
        let image = Arc::new(Image::new(1, 1));
        let preview = Preview::new(Arc::new(scene), camera, image.clone())
            .with_settings(PreviewSettings { samples_per_pixel: 1 });
        let mut rng = StdRng::seed_from_u64(0);

        preview.render_pixel(0, 0, &mut rng);
        let expected = crate::to_display(Color::new(0.2, 0.4, 0.8));
        assert!((image.load(0, 0) - expected).length() < 0.01);
    }

    #[test]
    fn test_miss_is_background() {
        let scene = Scene::new(Background::uniform(Color::splat(0.3)));
        let camera = Camera::look_at(Vec3::ZERO, -Vec3::Z, Vec3::Y, 40.0, 1.0);
        let preview = Preview::new(Arc::new(scene), camera, Arc::new(Image::new(1, 1)));
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(preview.shade(&Ray::new(Vec3::ZERO, Vec3::X), &mut rng), Color::splat(0.3));
    }
}
