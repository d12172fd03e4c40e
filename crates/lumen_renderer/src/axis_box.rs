//! Axis-aligned box primitive. Doubles as an area light.

use crate::Material;
use lumen_math::{Aabb, Interval, Ray, Vec3};
use std::sync::Arc;

/// A solid axis-aligned box.
#[derive(Debug, Clone)]
pub struct AxisBox {
    bounds: Aabb,
    material: Arc<Material>,
}

impl AxisBox {
    /// Create a box from two opposite corners.
    pub fn new(min: Vec3, max: Vec3, material: Arc<Material>) -> Self {
        Self {
            bounds: Aabb::from_points(min, max),
            material,
        }
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Slab test against the box surface.
    #[inline]
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        self.bounds.hit(ray, ray_t)
    }

    /// Outward normal of the face containing `p`.
    #[inline]
    pub fn normal_at(&self, p: Vec3) -> Vec3 {
        self.bounds.face_normal(p)
    }

    pub fn center(&self) -> Vec3 {
        self.bounds.centroid()
    }

    pub fn surface_area(&self) -> f32 {
        self.bounds.surface_area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    #[test]
    fn test_axis_box_hit_and_normal() {
        let block = AxisBox::new(
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, -1.0, -1.0),
            Arc::new(Material::lambertian(Color::ONE)),
        );
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y);

        let t = block.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
        assert_eq!(block.normal_at(ray.at(t)), Vec3::Y);
        assert_eq!(block.center(), Vec3::ZERO);
        assert_eq!(block.surface_area(), 24.0);
    }
}
