// Rigid transform with uniform scale.
//
// Primitives store one of these instead of a Mat4: a rotation quaternion,
// a translation and a single scale factor keep the inverse cheap and let
// ray parameters convert between spaces by a plain multiply.

use crate::{Quat, Ray, Vec3};

/// Build a rotation from an axis and an angle in radians.
///
/// A zero axis or a zero angle yields the identity rotation.
pub fn axis_angle(axis: Vec3, angle: f32) -> Quat {
    if angle == 0.0 || axis.length_squared() == 0.0 {
        return Quat::IDENTITY;
    }
    Quat::from_axis_angle(axis.normalize(), angle)
}

/// Rotation, translation and uniform scale, applied as `R(s * p) + t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    rotation: Quat,
    translation: Vec3,
    scale: f32,
    inv_scale: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
        scale: 1.0,
        inv_scale: 1.0,
    };

    /// Create a transform. A scale that is not strictly positive becomes 1.
    pub fn new(rotation: Quat, translation: Vec3, scale: f32) -> Self {
        let scale = if scale > 0.0 && scale.is_finite() {
            scale
        } else {
            1.0
        };
        Self {
            rotation,
            translation,
            scale,
            inv_scale: 1.0 / scale,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(Quat::IDENTITY, translation, 1.0)
    }

    pub fn from_translation_scale(translation: Vec3, scale: f32) -> Self {
        Self::new(Quat::IDENTITY, translation, scale)
    }

    #[inline]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    #[inline]
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn inv_scale(&self) -> f32 {
        self.inv_scale
    }

    /// The transform that undoes this one.
    pub fn inverse(&self) -> Transform {
        let conj = self.rotation.conjugate();
        Transform {
            rotation: conj,
            translation: -(conj * self.translation) * self.inv_scale,
            scale: self.inv_scale,
            inv_scale: self.scale,
        }
    }

    /// Local point to world point.
    #[inline]
    pub fn apply(&self, p: Vec3) -> Vec3 {
        self.rotation * (p * self.scale) + self.translation
    }

    /// World point to local point.
    #[inline]
    pub fn apply_inverse(&self, p: Vec3) -> Vec3 {
        (self.rotation.conjugate() * (p - self.translation)) * self.inv_scale
    }

    /// Local direction to world direction (rotation only).
    #[inline]
    pub fn apply_direction(&self, d: Vec3) -> Vec3 {
        self.rotation * d
    }

    /// World direction to local direction (rotation only).
    #[inline]
    pub fn apply_inverse_direction(&self, d: Vec3) -> Vec3 {
        self.rotation.conjugate() * d
    }

    /// Move a local ray into world space.
    ///
    /// Directions are only rotated, so a local parameter `t` corresponds to
    /// a world parameter `t * scale`.
    pub fn apply_ray(&self, ray: &Ray) -> Ray {
        Ray::new(self.apply(ray.origin()), self.apply_direction(ray.direction()))
    }

    /// Move a world ray into local space. Local `t` is world `t * inv_scale`.
    pub fn apply_inverse_ray(&self, ray: &Ray) -> Ray {
        Ray::new(
            self.apply_inverse(ray.origin()),
            self.apply_inverse_direction(ray.direction()),
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_axis_angle_degenerate_is_identity() {
        assert_eq!(axis_angle(Vec3::ZERO, 1.0), Quat::IDENTITY);
        assert_eq!(axis_angle(Vec3::Y, 0.0), Quat::IDENTITY);
    }

    #[test]
    fn test_axis_angle_normalizes_axis() {
        let q = axis_angle(Vec3::new(0.0, 10.0, 0.0), FRAC_PI_2);
        assert!((q.length() - 1.0).abs() < 1e-5);
        assert!(approx(q * Vec3::X, Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_scale_clamp() {
        assert_eq!(Transform::new(Quat::IDENTITY, Vec3::ZERO, 0.0).scale(), 1.0);
        assert_eq!(Transform::new(Quat::IDENTITY, Vec3::ZERO, -3.0).scale(), 1.0);
        assert_eq!(Transform::new(Quat::IDENTITY, Vec3::ZERO, f32::NAN).scale(), 1.0);
        let t = Transform::from_translation_scale(Vec3::ZERO, 4.0);
        assert_eq!(t.inv_scale(), 0.25);
    }

    #[test]
    fn test_inverse_matches_expected() {
        let b0 = Transform::new(
            axis_angle(Vec3::new(0.0, -1.0, 0.0), FRAC_PI_2),
            Vec3::new(-1.0, 0.0, 0.0),
            0.5,
        );
        let b1 = Transform::new(
            axis_angle(Vec3::Y, FRAC_PI_2),
            Vec3::new(0.0, 0.0, -2.0),
            2.0,
        );
        let inv = b0.inverse();

        assert!((inv.rotation().dot(b1.rotation()).abs() - 1.0).abs() < 1e-5);
        assert!(approx(inv.translation(), b1.translation()));
        assert!((inv.scale() - b1.scale()).abs() < 1e-6);

        assert!(approx(b0.apply(Vec3::X), Vec3::new(-1.0, 0.0, 0.5)));
        assert!(approx(b1.apply(Vec3::X), Vec3::new(0.0, 0.0, -4.0)));
    }

    #[test]
    fn test_apply_inverse_round_trip() {
        let t = Transform::new(
            axis_angle(Vec3::new(1.0, 2.0, 3.0), 0.7),
            Vec3::new(4.0, -2.0, 1.0),
            3.0,
        );
        let p = Vec3::new(0.3, -1.2, 5.0);
        assert!(approx(t.apply_inverse(t.apply(p)), p));
        assert!(approx(t.inverse().apply(p), t.apply_inverse(p)));
    }

    #[test]
    fn test_ray_parameter_scales() {
        let t = Transform::from_translation_scale(Vec3::new(0.0, 0.0, -10.0), 2.0);
        let world = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let local = t.apply_inverse_ray(&world);

        // World distance 6 along the ray is local distance 3.
        assert!(approx(local.at(3.0), t.apply_inverse(world.at(6.0))));
        assert!(approx(t.apply_ray(&local).direction(), world.direction()));
    }
}
