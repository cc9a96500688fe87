//! Background seen by rays that leave the scene.

use ember_math::{Color, Interval, Vec3};

/// Vertical gradient from `bottom` (looking down) to `top` (looking up).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Background {
    pub bottom: Color,
    pub top: Color,
}

impl Background {
    pub fn new(bottom: Color, top: Color) -> Self {
        Self { bottom, top }
    }

    /// The same color in every direction.
    pub fn uniform(color: Color) -> Self {
        Self::new(color, color)
    }

    pub fn sample(&self, direction: Vec3) -> Color {
        let t = Interval::UNIT.clamp(0.5 * (direction.y + 1.0));
        self.bottom.lerp(self.top, t)
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::new(Color::new(1.0, 0.0, 0.0), Color::new(0.0, 0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_endpoints() {
        let bg = Background::new(Color::ZERO, Color::ONE);
        assert_eq!(bg.sample(-Vec3::Y), Color::ZERO);
        assert_eq!(bg.sample(Vec3::Y), Color::ONE);
        assert!((bg.sample(Vec3::X) - Color::splat(0.5)).length() < 1e-6);
    }

    #[test]
    fn test_unnormalized_direction_is_clamped() {
        let bg = Background::default();
        assert_eq!(bg.sample(Vec3::new(0.0, 7.0, 0.0)), bg.top);
        assert_eq!(bg.sample(Vec3::new(0.0, -7.0, 0.0)), bg.bottom);
    }
}
