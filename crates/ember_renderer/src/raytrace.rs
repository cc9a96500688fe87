//! Recursive Monte Carlo path tracer.
//!
//! Implements path tracing with:
//! - Recursive scattering bounded by a bounce budget
//! - Emission from lights, background on escape
//! - Anti-aliasing via multi-sampling and gamma correction

use std::sync::Arc;

use crate::camera::Camera;
use crate::framebuffer::Framebuffer;
use crate::hittable::Hittable;
use crate::integrator::{sample_pixel, PixelRenderer};
use crate::scene::Scene;
use crate::viewport::Viewport;
use ember_math::{Color, Interval, Ray};
use rand::RngCore;

/// Smallest accepted hit distance, keeps bounces off their own surface.
const T_MIN: f32 = 0.001;

/// Path tracer configuration.
#[derive(Debug, Clone, Copy)]
pub struct RaytraceSettings {
    /// Maximum scatter events per path
    pub max_bounces: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
}

impl Default for RaytraceSettings {
    fn default() -> Self {
        Self {
            max_bounces: 50,
            samples_per_pixel: 100,
        }
    }
}

/// Path tracer writing into a framebuffer.
pub struct Raytrace {
    scene: Arc<Scene>,
    camera: Camera,
    target: Arc<dyn Framebuffer>,
    settings: RaytraceSettings,
}

impl Raytrace {
    pub fn new(scene: Arc<Scene>, camera: Camera, target: Arc<dyn Framebuffer>) -> Self {
        Self {
            scene,
            camera,
            target,
            settings: RaytraceSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: RaytraceSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> RaytraceSettings {
        self.settings
    }

    /// Radiance arriving along `ray` after `bounces` scatter events.
    pub fn trace(&self, ray: &Ray, bounces: u32, rng: &mut dyn RngCore) -> Color {
        let Some(rec) = self.scene.hit(ray, Interval::from_min(T_MIN)) else {
            return self.scene.background().sample(ray.direction());
        };

        let emission = rec.emitted();
        if bounces >= self.settings.max_bounces {
            return emission;
        }

        match rec.scatter(ray, rng) {
            Some(s) => emission + s.attenuation * self.trace(&s.scattered, bounces + 1, rng),
            None => emission,
        }
    }
}

impl PixelRenderer for Raytrace {
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
            |u, v, rng| {
                let ray = self.camera.get_ray(u, v, true, rng);
                self.trace(&ray, 0, rng)
            },
        );
        self.target.store(col, row, color);
    }
}
