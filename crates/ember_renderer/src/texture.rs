//! Solid textures sampled by world-space position.

use std::sync::Arc;

use ember_math::{Color, Vec3};

/// A color lookup used for albedo and emission.
pub trait Texture: Send + Sync {
    fn sample(&self, p: Vec3) -> Color;
}

/// The same color everywhere.
#[derive(Debug, Clone, Copy)]
pub struct ConstantTexture {
    color: Color,
}

impl ConstantTexture {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Texture for ConstantTexture {
    fn sample(&self, _p: Vec3) -> Color {
        self.color
    }
}

/// 3D checker: the sign of `sin(fx x) sin(fy y) sin(fz z)` picks a texture.
pub struct CheckerTexture {
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
    frequency: Vec3,
}

impl CheckerTexture {
    pub fn new(even: Arc<dyn Texture>, odd: Arc<dyn Texture>) -> Self {
        Self {
            even,
            odd,
            frequency: Vec3::ONE,
        }
    }

    pub fn from_colors(even: Color, odd: Color) -> Self {
        Self::new(
            Arc::new(ConstantTexture::new(even)),
            Arc::new(ConstantTexture::new(odd)),
        )
    }

    pub fn with_frequency(mut self, frequency: Vec3) -> Self {
        self.frequency = frequency;
        self
    }
}

impl Texture for CheckerTexture {
    fn sample(&self, p: Vec3) -> Color {
        let f = self.frequency * p;
        if f.x.sin() * f.y.sin() * f.z.sin() >= 0.0 {
            self.even.sample(p)
        } else {
            self.odd.sample(p)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_checker_alternates() {
        let checker = CheckerTexture::from_colors(Color::ONE, Color::ZERO);
        let inside = Vec3::splat(FRAC_PI_2);
        assert_eq!(checker.sample(inside), Color::ONE);
        assert_eq!(checker.sample(inside * Vec3::new(-1.0, 1.0, 1.0)), Color::ZERO);
    }

    #[test]
    fn test_checker_frequency_scales_cells() {
        let checker =
            CheckerTexture::from_colors(Color::ONE, Color::ZERO).with_frequency(Vec3::splat(2.0));
        // sin(2 * 2.0) is negative, so one axis flips the product.
        assert_eq!(checker.sample(Vec3::new(2.0, 0.5, 0.5)), Color::ZERO);
        assert_eq!(checker.sample(Vec3::new(0.5, 0.5, 0.5)), Color::ONE);
    }
}
