//! Pinhole camera for ray generation.

use lumen_math::{Ray, Vec3};

/// Pinhole camera generating view rays from normalized image coordinates.
#[derive(Debug, Clone)]
pub struct Camera {
    center: Vec3,
    upper_left: Vec3,
    viewport_u: Vec3,
    viewport_v: Vec3,
}

impl Camera {
    /// Create a camera.
    ///
    /// - `look_from` / `look_at`: eye position and the point it faces
    /// - `vup`: world up, used to level the image
    /// - `vfov`: vertical field of view in degrees
    /// - `aspect`: image width over height
    pub fn new(look_from: Vec3, look_at: Vec3, vup: Vec3, vfov: f32, aspect: f32) -> Self {
        // Calculate viewport dimensions
        let theta = vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = viewport_height * aspect;

        // Calculate camera basis vectors
        let w = (look_from - look_at).normalize();
        let u = vup.cross(w).normalize();
        let v = w.cross(u);

        // Image rows run top to bottom
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;
        let upper_left = look_from - w - viewport_u / 2.0 - viewport_v / 2.0;

        Self {
            center: look_from,
            upper_left,
            viewport_u,
            viewport_v,
        }
    }

    /// Ray through normalized image coordinates.
    ///
    /// `s` runs left to right and `t` top to bottom, both over [0, 1].
    pub fn get_ray(&self, s: f32, t: f32) -> Ray {
        let target = self.upper_left + s * self.viewport_u + t * self.viewport_v;
        Ray::new(self.center, target - self.center)
    }
}
