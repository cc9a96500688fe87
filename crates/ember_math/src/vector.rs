//! Free-standing vector helpers shared by materials and primitives.

use crate::Vec3;

/// Mirror `v` about the plane with normal `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Bend the unit vector `v` through a surface with unit normal `n`.
///
/// `ratio` is n1 / n2. Returns `None` on total internal reflection.
pub fn refract(v: Vec3, n: Vec3, ratio: f32) -> Option<Vec3> {
    let v_dot_n = v.dot(n);
    let discriminant = 1.0 - ratio * ratio * (1.0 - v_dot_n * v_dot_n);
    if discriminant > 0.0 {
        Some(ratio * (v - n * v_dot_n) - n * discriminant.sqrt())
    } else {
        None
    }
}

/// Schlick's approximation of Fresnel reflectance.
#[inline]
pub fn schlick(cosine: f32, ior: f32) -> f32 {
    let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Per-component sign, with zero mapping to -1.
#[inline]
pub fn sign(v: Vec3) -> Vec3 {
    let s = |x: f32| if x > 0.0 { 1.0 } else { -1.0 };
    Vec3::new(s(v.x), s(v.y), s(v.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflection_law() {
        let n = Vec3::new(0.3, 1.0, -0.2).normalize();
        let inputs = [
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(-0.2, -0.9, 0.4),
            Vec3::new(0.0, 0.5, 1.0),
        ];
        for v in inputs {
            let r = reflect(v, n);
            assert!((r.dot(n) + v.dot(n)).abs() < 1e-5);
            assert!((r.length() - v.length()).abs() < 1e-5);
        }
    }

    #[test]
    fn test_snell_law() {
        let n = Vec3::Y;
        let n1 = 1.0;
        let n2 = 1.5;
        let v = Vec3::new(1.0, -1.0, 0.0).normalize();
        let out = refract(v, n, n1 / n2).expect("entering glass always refracts");

        let sin_in = v.cross(-n).length();
        let sin_out = out.cross(-n).length();
        assert!((n1 * sin_in - n2 * sin_out).abs() < 1e-4);
        assert!(out.y < 0.0);
        assert!((out.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_total_internal_reflection() {
        // Leaving glass at a grazing angle.
        let v = Vec3::new(1.0, -0.2, 0.0).normalize();
        assert!(refract(v, Vec3::Y, 1.5).is_none());
    }

    #[test]
    fn test_schlick_normal_incidence() {
        let (n1, n2) = (1.0f32, 1.5f32);
        let expected = ((n1 - n2) / (n1 + n2)).powi(2);
        assert!((schlick(1.0, n2 / n1) - expected).abs() < 1e-6);
        assert!((schlick(0.0, 1.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_sign_maps_zero_to_negative() {
        assert_eq!(sign(Vec3::new(2.0, 0.0, -3.0)), Vec3::new(1.0, -1.0, -1.0));
    }
}
