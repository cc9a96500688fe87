//! The per-pixel contract between integrators and the scheduler.

use crate::sampling::gen_f32;
use crate::viewport::Viewport;
use ember_math::Color;
use rand::RngCore;

/// Scale from gamma-corrected [0, 1] to the display range written to disk.
pub const DISPLAY_SCALE: f32 = 255.99;

/// A task the `Renderer` can spread over worker threads.
///
/// `render_pixel` computes one pixel and stores it into the integrator's
/// framebuffer. It is called exactly once per pixel per render.
pub trait PixelRenderer: Send + Sync {
    fn viewport(&self) -> Viewport;
    fn render_pixel(&self, col: u32, row: u32, rng: &mut dyn RngCore);
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Gamma-correct and scale a linear color for storage.
pub fn to_display(color: Color) -> Color {
    Color::new(
        linear_to_gamma(color.x),
        linear_to_gamma(color.y),
        linear_to_gamma(color.z),
    ) * DISPLAY_SCALE
}

/// Average `samples` radiance estimates over pixel `(col, row)` and return
/// the display value.
///
/// A single sample goes through the pixel center, otherwise every sample is
/// jittered within the pixel. `radiance` receives image-plane coordinates.
pub fn sample_pixel<F>(
    viewport: Viewport,
    col: u32,
    row: u32,
    samples: u32,
    rng: &mut dyn RngCore,
    mut radiance: F,
) -> Color
where
    F: FnMut(f32, f32, &mut dyn RngCore) -> Color,
{
    let samples = samples.max(1);
    let mut total = Color::ZERO;

    for _ in 0..samples {
        let (du, dv) = if samples == 1 {
            (0.5, 0.5)
        } else {
            (gen_f32(rng), gen_f32(rng))
        };
        let u = (col as f32 + du) * viewport.width_inv();
        let v = (row as f32 + dv) * viewport.height_inv();
        total += radiance(u, v, rng);
    }

    to_display(total / samples as f32)
}
