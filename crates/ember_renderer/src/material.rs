//! Material trait for surface scattering.

use std::sync::Arc;

use crate::hittable::HitRecord;
use crate::sampling::{gen_f32, sample_unit_sphere};
use crate::texture::{ConstantTexture, Texture};
use ember_math::{reflect, refract, schlick, Color, Ray, Vec3};
use rand::RngCore;

/// Attenuation and outgoing ray of a scattering event.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    pub attenuation: Color,
    pub scattered: Ray,
}

impl ScatterResult {
    pub fn new(attenuation: Color, scattered: Ray) -> Self {
        Self {
            attenuation,
            scattered,
        }
    }
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult>;

    /// Light emitted at `p`. Most materials return black.
    fn emitted(&self, _p: Vec3) -> Color {
        Color::ZERO
    }
}

/// Lambertian (diffuse) material.
pub struct Lambertian {
    albedo: Arc<dyn Texture>,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self::from_texture(Arc::new(ConstantTexture::new(albedo)))
    }

    pub fn from_texture(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let mut scatter_direction = rec.normal + sample_unit_sphere(rng);

        // Catch degenerate scatter direction
        if scatter_direction.length_squared() < 1e-8 {
            scatter_direction = rec.normal;
        }

        Some(ScatterResult::new(
            self.albedo.sample(rec.p),
            Ray::new(rec.p, scatter_direction),
        ))
    }
}

/// Retries allowed for a rough reflection that points into the surface.
const METAL_MAX_ATTEMPTS: u32 = 10;

/// Metal (specular) material.
pub struct Metal {
    albedo: Color,
    roughness: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `roughness`: 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, roughness: f32) -> Self {
        Self {
            albedo,
            roughness: roughness.clamp(0.0, 1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let reflected = reflect(ray_in.direction(), rec.normal);
        let mut direction = reflected;

        if self.roughness > 0.0 {
            for _ in 0..METAL_MAX_ATTEMPTS {
                direction = reflected + self.roughness * sample_unit_sphere(rng);
                if direction.dot(rec.normal) > 0.0 {
                    break;
                }
            }
        }

        if direction.dot(rec.normal) > 0.0 {
            Some(ScatterResult::new(self.albedo, Ray::new(rec.p, direction)))
        } else {
            None
        }
    }
}

/// Dielectric (glass) material.
pub struct Dielectric {
    albedo: Color,
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self {
            albedo: Color::ONE,
            ior,
        }
    }

    /// Tint applied to every transmitted or reflected ray.
    pub fn with_albedo(mut self, albedo: Color) -> Self {
        self.albedo = albedo;
        self
    }
}

impl Default for Dielectric {
    fn default() -> Self {
        Self::new(1.5)
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let unit_direction = ray_in.direction();
        let ratio = if rec.front_face {
            1.0 / self.ior
        } else {
            self.ior
        };
        let cosine = -unit_direction.dot(rec.normal);

        let (refracted, reflectance) = match refract(unit_direction, rec.normal, ratio) {
            Some(r) => (Some(r), schlick(cosine, self.ior)),
            None => (None, 1.0),
        };

        let direction = match refracted {
            Some(r) if gen_f32(rng) >= reflectance => r,
            _ => reflect(unit_direction, rec.normal),
        };

        Some(ScatterResult::new(self.albedo, Ray::new(rec.p, direction)))
    }
}

/// Diffuse light emitter.
pub struct DiffuseLight {
    emit: Arc<dyn Texture>,
}

impl DiffuseLight {
    /// Create a new diffuse light with the given emission color.
    pub fn new(emit: Color) -> Self {
        Self::from_texture(Arc::new(ConstantTexture::new(emit)))
    }

    pub fn from_texture(emit: Arc<dyn Texture>) -> Self {
        Self { emit }
    }
}

impl Material for DiffuseLight {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        None
    }

    fn emitted(&self, p: Vec3) -> Color {
        self.emit.sample(p)
    }
}
