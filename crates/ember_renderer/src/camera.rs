//! Thin-lens camera for primary ray generation.

use crate::sampling::sample_unit_disk;
use ember_math::{Ray, Vec3};
use rand::RngCore;

/// Camera for generating rays into the scene.
///
/// `(u, v)` in `[0, 1]^2` spans the image plane from the bottom-left corner.
#[derive(Debug, Clone)]
pub struct Camera {
    // Camera positioning
    position: Vec3,
    direction: Vec3,
    up_hint: Vec3,

    // Lens settings
    vfov: f32,     // Vertical field of view in degrees
    aspect: f32,   // Width over height
    aperture: f32, // Lens diameter
    focus_dist: f32,
    depth_of_field: bool,

    // Cached computed values
    right: Vec3,
    up: Vec3,
    bottom_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
}

impl Camera {
    /// Create a pinhole camera at `position` looking along `direction`.
    pub fn new(position: Vec3, direction: Vec3, up: Vec3, vfov: f32, aspect: f32) -> Self {
        let mut camera = Self {
            position,
            direction,
            up_hint: up,
            vfov,
            aspect,
            aperture: 0.0,
            focus_dist: 1.0,
            depth_of_field: true,
            right: Vec3::X,
            up: Vec3::Y,
            bottom_left: Vec3::ZERO,
            horizontal: Vec3::ZERO,
            vertical: Vec3::ZERO,
        };
        camera.update();
        camera
    }

    /// Camera at `position` aimed at `target`.
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3, vfov: f32, aspect: f32) -> Self {
        Self::new(position, target - position, up, vfov, aspect)
    }

    /// Set lens settings.
    pub fn with_lens(mut self, aperture: f32, focus_dist: f32) -> Self {
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self.update();
        self
    }

    /// Copy of this camera with lens jitter disabled for every ray.
    pub fn without_depth_of_field(&self) -> Self {
        let mut camera = self.clone();
        camera.depth_of_field = false;
        camera
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn lens_radius(&self) -> f32 {
        self.aperture * 0.5
    }

    fn update(&mut self) {
        let theta = self.vfov.to_radians();
        let half_height = (theta * 0.5).tan();
        let half_width = half_height * self.aspect;

        let w = self.direction.normalize_or_zero();
        self.right = w.cross(self.up_hint).normalize_or_zero();
        self.up = self.right.cross(w);

        let focus = self.focus_dist;
        self.bottom_left = self.position
            + focus * (w - half_width * self.right - half_height * self.up);
        self.horizontal = 2.0 * half_width * focus * self.right;
        self.vertical = 2.0 * half_height * focus * self.up;
    }

    /// Generate the ray through image-plane coordinates `(u, v)`.
    ///
    /// The origin is jittered over the lens only when depth of field is
    /// enabled both on the camera and for this call.
    pub fn get_ray(&self, u: f32, v: f32, use_depth_of_field: bool, rng: &mut dyn RngCore) -> Ray {
        let target = self.bottom_left + u * self.horizontal + v * self.vertical;

        let lens_radius = self.lens_radius();
        let origin = if use_depth_of_field && self.depth_of_field && lens_radius > 0.0 {
            let rd = lens_radius * sample_unit_disk(rng);
            self.position + self.right * rd.x + self.up * rd.y
        } else {
            self.position
        };

        Ray::new(origin, target - origin)
    }
}
