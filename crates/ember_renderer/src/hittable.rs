//! Hittable trait and HitRecord for ray-object and point-object queries.

use crate::{Material, ScatterResult};
use ember_math::{Color, Interval, Ray, Vec3};
use rand::RngCore;

/// Record of a ray-object intersection.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against the ray)
    pub normal: Vec3,
    /// Whether the ray hit the outside of the surface
    pub front_face: bool,
    /// Material of the object that was hit, if it has one
    pub material: Option<&'a dyn Material>,
}

impl<'a> HitRecord<'a> {
    /// Build a record for a hit at `t` along `ray`.
    pub fn new(
        ray: &Ray,
        t: f32,
        outward_normal: Vec3,
        material: Option<&'a dyn Material>,
    ) -> Self {
        let mut rec = Self::at_point(ray.at(t), outward_normal, material);
        rec.t = t;
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Build a record for a surface point found without a ray.
    ///
    /// The normal is left facing outward until `set_face_normal` is called.
    pub fn at_point(p: Vec3, outward_normal: Vec3, material: Option<&'a dyn Material>) -> Self {
        Self {
            t: 0.0,
            p,
            normal: outward_normal,
            front_face: true,
            material,
        }
    }

    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we track whether we hit the front or back face.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }

    /// Outward-facing normal, whichever side the ray came from.
    pub fn outward_normal(&self) -> Vec3 {
        if self.front_face {
            self.normal
        } else {
            -self.normal
        }
    }

    /// Light emitted at the hit point. Objects without a material emit nothing.
    pub fn emitted(&self) -> Color {
        self.material.map_or(Color::ZERO, |m| m.emitted(self.p))
    }

    /// Scatter `ray_in` off the hit surface. Objects without a material absorb.
    pub fn scatter(&self, ray_in: &Ray, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        self.material?.scatter(ray_in, self, rng)
    }
}

/// Outcome of a signed-distance query at a point.
pub enum SdfHit<'a> {
    /// The point lies within epsilon of a surface.
    Hit(HitRecord<'a>),
    /// No surface within epsilon; carries the smallest absolute distance seen.
    Miss(f32),
}

/// Trait for objects that can be hit by rays and queried by distance.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with `ray_t.min < t < ray_t.max`.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>>;

    /// Signed distance from `p` to the surface, negative inside.
    ///
    /// Objects without a distance field report `f32::MAX` and are never
    /// reached by sphere tracing.
    fn sdf(&self, _p: Vec3) -> f32 {
        f32::MAX
    }

    /// Outward normal at `p`, by central differences of `sdf` with step `eps`.
    fn sdf_normal(&self, p: Vec3, eps: f32) -> Vec3 {
        let dx = Vec3::new(eps, 0.0, 0.0);
        let dy = Vec3::new(0.0, eps, 0.0);
        let dz = Vec3::new(0.0, 0.0, eps);
        Vec3::new(
            self.sdf(p + dx) - self.sdf(p - dx),
            self.sdf(p + dy) - self.sdf(p - dy),
            self.sdf(p + dz) - self.sdf(p - dz),
        )
        .normalize_or_zero()
    }

    /// Material attached to this object.
    fn material(&self) -> Option<&dyn Material> {
        None
    }

    /// Surface test for sphere tracing: a hit when `|sdf(p)| <= eps`.
    fn hit_sdf(&self, p: Vec3, eps: f32) -> SdfHit<'_> {
        let distance = self.sdf(p).abs();
        if distance <= eps {
            SdfHit::Hit(HitRecord::at_point(p, self.sdf_normal(p, eps), self.material()))
        } else {
            SdfHit::Miss(distance)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Half-space below the XZ plane, only available as a distance field.
    struct Ground;

    impl Hittable for Ground {
        fn hit(&self, _ray: &Ray, _ray_t: Interval) -> Option<HitRecord<'_>> {
            None
        }

        fn sdf(&self, p: Vec3) -> f32 {
            p.y
        }
    }

    #[test]
    fn test_face_normal_flips_inside() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        let rec = HitRecord::new(&ray, 1.0, Vec3::Y, None);
        assert!(!rec.front_face);
        assert_eq!(rec.normal, -Vec3::Y);
        assert_eq!(rec.outward_normal(), Vec3::Y);
        assert_eq!(rec.p, Vec3::Y);
    }

    #[test]
    fn test_missing_material_degrades() {
        let ray = Ray::new(Vec3::new(0.0, 2.0, 0.0), -Vec3::Y);
        let rec = HitRecord::new(&ray, 1.0, Vec3::Y, None);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(rec.emitted(), Color::ZERO);
        assert!(rec.scatter(&ray, &mut rng).is_none());
    }

    #[test]
    fn test_default_sdf_normal_is_gradient() {
        let n = Ground.sdf_normal(Vec3::new(3.0, 0.5, -2.0), 1e-3);
        assert!((n - Vec3::Y).length() < 1e-3);
    }

    #[test]
    fn test_default_hit_sdf() {
        match Ground.hit_sdf(Vec3::new(0.0, 1e-5, 0.0), 1e-4) {
            SdfHit::Hit(rec) => assert!(rec.material.is_none()),
            SdfHit::Miss(_) => panic!("expected a hit"),
        }
        match Ground.hit_sdf(Vec3::new(0.0, -2.0, 0.0), 1e-4) {
            SdfHit::Miss(d) => assert!((d - 2.0).abs() < 1e-6),
            SdfHit::Hit(_) => panic!("expected a miss"),
        }
    }
}
