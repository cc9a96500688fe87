//! Oriented box primitive.

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::Material;
use ember_math::{sign, Interval, Ray, Transform, Vec3};

/// Slack, relative to the half extents, for origins lying on a face.
const FACE_TOLERANCE: f32 = 1e-4;

/// A box centered on its transform's origin.
///
/// Intersection happens in local space, where the box is axis-aligned.
pub struct Cuboid {
    transform: Transform,
    half_extents: Vec3,
    material: Option<Arc<dyn Material>>,
}

impl Cuboid {
    /// Create a box with the given full edge lengths.
    pub fn new(transform: Transform, extents: Vec3) -> Self {
        Self {
            transform,
            half_extents: extents.abs() * 0.5,
            material: None,
        }
    }

    pub fn with_material(mut self, material: Arc<dyn Material>) -> Self {
        self.material = Some(material);
        self
    }

    pub fn half_extents(&self) -> Vec3 {
        self.half_extents
    }

    /// Face normal of the slab `local` is closest to, in local space.
    fn local_normal(&self, local: Vec3) -> Vec3 {
        let r = local.abs() / self.half_extents;
        if r.x >= r.y && r.x >= r.z {
            Vec3::new(local.x.signum(), 0.0, 0.0)
        } else if r.y >= r.z {
            Vec3::new(0.0, local.y.signum(), 0.0)
        } else {
            Vec3::new(0.0, 0.0, local.z.signum())
        }
    }
}

impl Hittable for Cuboid {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let local = self.transform.apply_inverse_ray(ray);
        let o = local.origin();
        let d = local.direction();
        let h = self.half_extents;

        // -1 when the ray starts inside, so we aim for the exit faces. An
        // origin on a face counts as inside when the ray heads into the box.
        let r = o.abs() / h;
        let inside = (0..3)
            .all(|i| r[i] < 1.0 || (r[i] <= 1.0 + FACE_TOLERANCE && o[i] * d[i] < 0.0));
        let winding = if inside { -1.0 } else { 1.0 };
        let sgn = -sign(d);
        let dist = (h * winding * sgn - o) / d;

        let within = |a: f32, b: f32, t: f32, i: usize, j: usize| {
            t >= 0.0 && (a + d[i] * t).abs() < h[i] && (b + d[j] * t).abs() < h[j]
        };

        let (t_local, axis) = if within(o.y, o.z, dist.x, 1, 2) {
            (dist.x, Vec3::X)
        } else if within(o.z, o.x, dist.y, 2, 0) {
            (dist.y, Vec3::Y)
        } else if within(o.x, o.y, dist.z, 0, 1) {
            (dist.z, Vec3::Z)
        } else {
            return None;
        };

        let t = t_local * self.transform.scale();
        if !ray_t.surrounds(t) {
            return None;
        }

        let outward = self.transform.apply_direction(axis * sgn * winding);
        Some(HitRecord::new(ray, t, outward, self.material()))
    }

    fn sdf(&self, p: Vec3) -> f32 {
        let local = self.transform.apply_inverse(p);
        let q = local.abs() - self.half_extents;
        let outside = q.max(Vec3::ZERO).length();
        let inside = q.max_element().min(0.0);
        (outside + inside) * self.transform.scale()
    }

    fn sdf_normal(&self, p: Vec3, _eps: f32) -> Vec3 {
        let local = self.transform.apply_inverse(p);
        self.transform.apply_direction(self.local_normal(local))
    }

    fn material(&self) -> Option<&dyn Material> {
        self.material.as_deref()
    }
}
