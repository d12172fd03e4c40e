//! Sphere primitive for ray tracing.

use crate::Material;
use lumen_math::{Interval, Ray, Vec3};
use std::f32::consts::PI;
use std::sync::Arc;

/// A sphere primitive.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<Material>,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Arc<Material>) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Nearest root of `|O + tD − C|² = r²` strictly inside `ray_t`.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let oc = ray.origin() - self.center;
        let a = ray.direction().length_squared();
        let half_b = oc.dot(ray.direction());
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let near = (-half_b - sqrtd) / a;
        if ray_t.surrounds(near) {
            return Some(near);
        }
        let far = (-half_b + sqrtd) / a;
        if ray_t.surrounds(far) {
            return Some(far);
        }

        None
    }

    /// Outward normal at a surface point.
    pub fn normal_at(&self, p: Vec3) -> Vec3 {
        (p - self.center) / self.radius
    }

    pub fn surface_area(&self) -> f32 {
        4.0 * PI * self.radius * self.radius
    }
}
