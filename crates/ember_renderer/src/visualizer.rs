//! Debug views of the scene: hit depth, surface normals, path length.

use std::sync::Arc;

use crate::camera::Camera;
use crate::framebuffer::Framebuffer;
use crate::hittable::Hittable;
use crate::integrator::{linear_to_gamma, PixelRenderer, DISPLAY_SCALE};
use crate::scene::Scene;
use crate::viewport::Viewport;
use ember_math::{Color, Interval, Ray};
use rand::RngCore;

/// What the visualizer writes for each pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualizeMode {
    /// `1 / (1 + t)` of the first hit, black on a miss
    Depth,
    /// First-hit normal mapped from [-1, 1] to [0, 1]
    Normal,
    /// Scatter events before the path ended, relative to `max_bounces`
    Bounces,
}

/// One centered pixel sample, depth of field off.
pub struct Visualizer {
    scene: Arc<Scene>,
    camera: Camera,
    target: Arc<dyn Framebuffer>,
    mode: VisualizeMode,
    max_bounces: u32,
}

impl Visualizer {
    pub fn new(
        scene: Arc<Scene>,
        camera: &Camera,
        target: Arc<dyn Framebuffer>,
        mode: VisualizeMode,
    ) -> Self {
        Self {
            scene,
            camera: camera.without_depth_of_field(),
            target,
            mode,
            max_bounces: 50,
        }
    }

    pub fn with_max_bounces(mut self, max_bounces: u32) -> Self {
        self.max_bounces = max_bounces;
        self
    }

    fn count_bounces(&self, ray: &Ray, bounces: u32, rng: &mut dyn RngCore) -> u32 {
        let Some(rec) = self.scene.hit(ray, Interval::from_min(0.001)) else {
            return bounces;
        };
        if bounces >= self.max_bounces {
            return bounces;
        }
        match rec.scatter(ray, rng) {
            Some(s) => self.count_bounces(&s.scattered, bounces + 1, rng),
            None => bounces,
        }
    }

    /// Linear value for `ray` in the current mode.
    pub fn evaluate(&self, ray: &Ray, rng: &mut dyn RngCore) -> Color {
        match self.mode {
            VisualizeMode::Depth => self
                .scene
                .hit(ray, Interval::from_min(0.001))
                .map_or(Color::ZERO, |rec| Color::splat(1.0 / (1.0 + rec.t))),
            VisualizeMode::Normal => self
                .scene
                .hit(ray, Interval::from_min(0.001))
                .map_or(Color::ZERO, |rec| rec.normal * 0.5 + 0.5),
            VisualizeMode::Bounces => {
                let bounces = self.count_bounces(ray, 0, rng);
                let ratio = bounces as f32 / self.max_bounces.max(1) as f32;
                Color::splat(linear_to_gamma(ratio))
            }
        }
    }
}

impl PixelRenderer for Visualizer {
    fn viewport(&self) -> Viewport {
        Viewport::new(self.target.width(), self.target.height())
    }

    fn render_pixel(&self, col: u32, row: u32, rng: &mut dyn RngCore) {
        let viewport = self.viewport();
        let u = (col as f32 + 0.5) * viewport.width_inv();
        let v = (row as f32 + 0.5) * viewport.height_inv();
        let ray = self.camera.get_ray(u, v, false, rng);
        let color = self.evaluate(&ray, rng) * DISPLAY_SCALE;
        self.target.store(col, row, color);
    }
}
