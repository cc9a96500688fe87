// Re-export glam for convenience
pub use glam::*;

// Ember math types
mod interval;
mod ray;
mod transform;
mod vector;

pub use interval::Interval;
pub use ray::Ray;
pub use transform::{axis_angle, Transform};
pub use vector::{reflect, refract, schlick, sign};

/// RGB color, linear unless stated otherwise.
pub type Color = Vec3;
