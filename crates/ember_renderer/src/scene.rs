//! Scene: a background and a flat list of hittables.

use std::sync::Arc;

use crate::background::Background;
use crate::hittable::{HitRecord, Hittable, SdfHit};
use ember_math::{Interval, Ray, Vec3};

/// Aggregate of objects searched linearly.
///
/// When two objects report the same distance the one added first wins.
pub struct Scene {
    background: Background,
    objects: Vec<Arc<dyn Hittable>>,
}

impl Scene {
    /// Create a new empty scene.
    pub fn new(background: Background) -> Self {
        Self {
            background,
            objects: Vec::new(),
        }
    }

    /// Add an object to the scene.
    pub fn add(&mut self, object: Arc<dyn Hittable>) {
        self.objects.push(object);
    }

    pub fn with_object(mut self, object: impl Hittable + 'static) -> Self {
        self.add(Arc::new(object));
        self
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Background::default())
    }
}

impl Hittable for Scene {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut closest: Option<HitRecord<'_>> = None;
        let mut closest_so_far = ray_t.max;

        for object in &self.objects {
            if let Some(rec) = object.hit(ray, ray_t.with_max(closest_so_far)) {
                closest_so_far = rec.t;
                closest = Some(rec);
            }
        }

        closest
    }

    fn sdf(&self, p: Vec3) -> f32 {
        self.objects
            .iter()
            .map(|o| o.sdf(p))
            .fold(f32::MAX, f32::min)
    }

    fn hit_sdf(&self, p: Vec3, eps: f32) -> SdfHit<'_> {
        let mut nearest = f32::MAX;
        for object in &self.objects {
            match object.hit_sdf(p, eps) {
                SdfHit::Hit(rec) => return SdfHit::Hit(rec),
                SdfHit::Miss(distance) => nearest = nearest.min(distance),
            }
        }
        SdfHit::Miss(nearest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, Material, Sphere};
    use ember_math::Color;

    fn material_ptr(m: Option<&dyn Material>) -> *const u8 {
        m.map_or(std::ptr::null(), |m| m as *const dyn Material as *const u8)
    }

    #[test]
    fn test_nearest_hit_wins() {
        let scene = Scene::default()
            .with_object(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0))
            .with_object(Sphere::new(Vec3::new(0.0, 0.0, -4.0), 1.0))
            .with_object(Sphere::new(Vec3::new(0.0, 0.0, -7.0), 1.0));
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);

        let rec = scene.hit(&ray, Interval::from_min(0.001)).unwrap();
        assert!((rec.t - 3.0).abs() < 1e-4);
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn test_tie_goes_to_first_inserted() {
        let first: Arc<dyn Material> = Arc::new(Lambertian::new(Color::ONE));
        let second: Arc<dyn Material> = Arc::new(Lambertian::new(Color::ZERO));
        let scene = Scene::default()
            .with_object(Sphere::new(Vec3::ZERO, 1.0).with_material(first.clone()))
            .with_object(Sphere::new(Vec3::ZERO, 1.0).with_material(second.clone()));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);

        let rec = scene.hit(&ray, Interval::from_min(0.001)).unwrap();
        assert_eq!(material_ptr(rec.material), material_ptr(Some(first.as_ref())));

        match scene.hit_sdf(Vec3::new(0.0, 0.0, 1.0), 1e-4) {
            SdfHit::Hit(rec) => {
                assert_eq!(material_ptr(rec.material), material_ptr(Some(first.as_ref())))
            }
            SdfHit::Miss(_) => panic!("surface point should hit"),
        }
    }

    #[test]
    fn test_empty_scene_misses() {
        let scene = Scene::default();
        assert!(scene.is_empty());
        assert!(scene.hit(&Ray::new(Vec3::ZERO, Vec3::X), Interval::from_min(0.001)).is_none());
        assert_eq!(scene.sdf(Vec3::ZERO), f32::MAX);
    }

    #[test]
    fn test_sdf_is_minimum() {
        let scene = Scene::default()
            .with_object(Sphere::new(Vec3::new(5.0, 0.0, 0.0), 1.0))
            .with_object(Sphere::new(Vec3::new(-3.0, 0.0, 0.0), 1.0));
        assert!((scene.sdf(Vec3::ZERO) - 2.0).abs() < 1e-5);

        match scene.hit_sdf(Vec3::ZERO, 1e-4) {
            SdfHit::Miss(d) => assert!((d - 2.0).abs() < 1e-5),
            SdfHit::Hit(_) => panic!("origin is far from both spheres"),
        }
    }

    #[test]
    fn test_nested_scene() {
        let inner = Scene::default().with_object(Sphere::new(Vec3::new(0.0, 0.0, -4.0), 1.0));
        let outer = Scene::default().with_object(inner);
        let rec = outer
            .hit(&Ray::new(Vec3::ZERO, -Vec3::Z), Interval::from_min(0.001))
            .unwrap();
        assert!((rec.t - 3.0).abs() < 1e-4);
    }
}
