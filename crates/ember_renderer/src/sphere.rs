//! Sphere primitive.

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::Material;
use ember_math::{Interval, Ray, Transform, Vec3};

/// A sphere, stored as a transform whose translation is the center and
/// whose scale is the radius.
///
/// A negative radius builds an inverted sphere: same surface, but the
/// normal points inward and the distance field is negated. Nesting an
/// inverted glass sphere inside a regular one gives a hollow shell.
pub struct Sphere {
    transform: Transform,
    inverted: bool,
    material: Option<Arc<dyn Material>>,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            transform: Transform::from_translation_scale(center, radius.abs()),
            inverted: radius < 0.0,
            material: None,
        }
    }

    pub fn with_material(mut self, material: Arc<dyn Material>) -> Self {
        self.material = Some(material);
        self
    }

    pub fn center(&self) -> Vec3 {
        self.transform.translation()
    }

    pub fn radius(&self) -> f32 {
        self.transform.scale()
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    fn outward(&self, normal: Vec3) -> Vec3 {
        if self.inverted {
            -normal
        } else {
            normal
        }
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let center = self.center();
        let radius = self.radius();
        let oc = ray.origin() - center;
        let a = ray.direction().length_squared();
        let b = oc.dot(ray.direction());
        let c = oc.length_squared() - radius * radius;

        let discriminant = b * b - a * c;
        if discriminant <= 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        // Compare a*t + b against the rescaled bounds so only the accepted
        // root pays for a division.
        let bounds = Interval::new(ray_t.min * a + b, ray_t.max * a + b);
        let root = if bounds.surrounds(-sqrtd) {
            -sqrtd
        } else if bounds.surrounds(sqrtd) {
            sqrtd
        } else {
            return None;
        };

        let t = (root - b) / a;
        let p = ray.at(t);
        let outward = self.outward((p - center) / radius);
        Some(HitRecord::new(ray, t, outward, self.material()))
    }

    fn sdf(&self, p: Vec3) -> f32 {
        let d = (p - self.center()).length() - self.radius();
        if self.inverted {
            -d
        } else {
            d
        }
    }

    fn sdf_normal(&self, p: Vec3, _eps: f32) -> Vec3 {
        self.outward((p - self.center()).normalize_or_zero())
    }

    fn material(&self) -> Option<&dyn Material> {
        self.material.as_deref()
    }
}
