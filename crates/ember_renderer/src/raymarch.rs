//! Sphere tracing over the scene's signed distance field.
//!
//! Shading matches the path tracer; only surface finding differs. Each step
//! advances by the distance to the nearest surface, which can never skip
//! past one.

use std::sync::Arc;

use crate::camera::Camera;
use crate::framebuffer::Framebuffer;
use crate::hittable::{HitRecord, Hittable, SdfHit};
use crate::integrator::{sample_pixel, PixelRenderer};
use crate::scene::Scene;
use crate::viewport::Viewport;
use ember_math::{Color, Ray};
use rand::RngCore;

/// Sphere tracer configuration.
#[derive(Debug, Clone, Copy)]
pub struct RaymarchSettings {
    /// Step budget per ray
    pub max_ray_iterations: u32,
    /// Maximum scatter events per path
    pub max_bounces: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Distance after which a ray counts as escaped
    pub max_ray_length: f32,
    /// Surface threshold for `|sdf|`
    pub hit_epsilon: f32,
}

impl Default for RaymarchSettings {
    fn default() -> Self {
        Self {
            max_ray_iterations: 300,
            max_bounces: 10,
            samples_per_pixel: 1,
            max_ray_length: 1000.0,
            hit_epsilon: 1e-4,
        }
    }
}

pub struct Raymarch {
    scene: Arc<Scene>,
    camera: Camera,
    target: Arc<dyn Framebuffer>,
    settings: RaymarchSettings,
}

impl Raymarch {
    pub fn new(scene: Arc<Scene>, camera: Camera, target: Arc<dyn Framebuffer>) -> Self {
        Self {
            scene,
            camera,
            target,
            settings: RaymarchSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: RaymarchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Walk `ray` until it reaches a surface.
    ///
    /// Stops without a hit when the ray passes `max_ray_length`, the step
    /// budget runs out, or the accumulated distance stops growing.
    pub fn march(&self, ray: &Ray) -> Option<HitRecord<'_>> {
        let eps = self.settings.hit_epsilon;
        let mut dist = 0.0f32;

        for _ in 0..self.settings.max_ray_iterations {
            match self.scene.hit_sdf(ray.at(dist), eps) {
                SdfHit::Hit(mut rec) => {
                    let outward = rec.normal;
                    rec.t = dist;
                    rec.set_face_normal(ray, outward);
                    return Some(rec);
                }
                SdfHit::Miss(step) => {
                    let next = dist + step;
                    // Also catches NaN steps.
                    if !(next > dist) || next > self.settings.max_ray_length {
                        return None;
                    }
                    dist = next;
                }
            }
        }
        None
    }

    pub fn trace(&self, ray: &Ray, bounces: u32, rng: &mut dyn RngCore) -> Color {
        let Some(rec) = self.march(ray) else {
            return self.scene.background().sample(ray.direction());
        };

        let emission = rec.emitted();
        if bounces >= self.settings.max_bounces {
            return emission;
        }

        match rec.scatter(ray, rng) {
            Some(s) => {
                // Leave the surface on the side the new ray is heading to,
                // far enough that the first step does not hit it again.
                let outward = rec.outward_normal();
                let side = if s.scattered.direction().dot(outward) >= 0.0 {
                    outward
                } else {
                    -outward
                };
                let origin = rec.p + side * (2.0 * self.settings.hit_epsilon);
                let next = Ray::new(origin, s.scattered.direction());
                emission + s.attenuation * self.trace(&next, bounces + 1, rng)
            }
            None => emission,
        }
    }
}

impl PixelRenderer for Raymarch {
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
