//! Two-sided rectangle primitive.

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::Material;
use ember_math::{Interval, Ray, Transform, Vec3};

/// A rectangle in its local XY plane, facing local +Z.
pub struct Rect {
    transform: Transform,
    half_width: f32,
    half_height: f32,
    material: Option<Arc<dyn Material>>,
}

impl Rect {
    pub fn new(transform: Transform, width: f32, height: f32) -> Self {
        Self {
            transform,
            half_width: width.abs() * 0.5,
            half_height: height.abs() * 0.5,
            material: None,
        }
    }

    pub fn with_material(mut self, material: Arc<dyn Material>) -> Self {
        self.material = Some(material);
        self
    }
}

impl Hittable for Rect {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let local = self.transform.apply_inverse_ray(ray);
        let o = local.origin();
        let d = local.direction();
        if d.z == 0.0 {
            return None;
        }

        let t_local = -o.z / d.z;
        let t = t_local * self.transform.scale();
        if !ray_t.surrounds(t) {
            return None;
        }

        let p = o + d * t_local;
        if p.x.abs() > self.half_width || p.y.abs() > self.half_height {
            return None;
        }

        let outward = self.transform.apply_direction(Vec3::Z);
        Some(HitRecord::new(ray, t, outward, self.material()))
    }

    fn sdf(&self, p: Vec3) -> f32 {
        let local = self.transform.apply_inverse(p);
        let dx = (local.x.abs() - self.half_width).max(0.0);
        let dy = (local.y.abs() - self.half_height).max(0.0);
        Vec3::new(dx, dy, local.z).length() * self.transform.scale()
    }

    fn sdf_normal(&self, p: Vec3, _eps: f32) -> Vec3 {
        let local = self.transform.apply_inverse(p);
        let side = if local.z < 0.0 { -Vec3::Z } else { Vec3::Z };
        self.transform.apply_direction(side)
    }

    fn material(&self) -> Option<&dyn Material> {
        self.material.as_deref()
    }
}
